//! MongoDB storage handle.
//!
//! The composition root calls [`connect`] once and hands the resulting
//! [`Database`] to whatever needs collections. There is no global client.

use anyhow::Context;
use catalog_kernel::settings::DatabaseSettings;
use mongodb::{bson::doc, Client, Collection};

/// Owned handle to the configured MongoDB database.
///
/// Cloning is cheap; clones share the driver's connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    client: Client,
    inner: mongodb::Database,
}

/// Build a client for `settings.uri` and verify the server answers a ping.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let client = Client::with_uri_str(&settings.uri)
        .await
        .context("invalid MongoDB connection string")?;

    let database = Database {
        inner: client.database(&settings.name),
        client,
    };

    database
        .ping()
        .await
        .context("MongoDB did not answer ping")?;

    tracing::info!(
        target: "catalog-db",
        database = %settings.name,
        "connected to MongoDB"
    );
    Ok(database)
}

impl Database {
    /// Name of the database this handle points at.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Typed handle to a collection in this database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.inner.collection(name)
    }

    /// Liveness check against the server.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.inner.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Close the client, waiting for in-flight operations to finish.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!(target: "catalog-db", "MongoDB client shut down");
    }
}
