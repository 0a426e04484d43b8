//! Product catalog service.
//!
//! [`run`] is the composition root shared by the `catalog-app` binary and the
//! `catalog serve` command: it connects to MongoDB once, hands the handle to
//! the modules and serves HTTP until a shutdown signal arrives.

use anyhow::Context;
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

pub use modules::products;

/// Connect, register modules and serve until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let database = catalog_db::connect(&settings.database)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.database.name))?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &database);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let app = catalog_http::build_router(&registry, &settings);
    let served = catalog_http::start_server(app, &settings).await;

    registry.stop_modules().await?;
    database.shutdown().await;

    served
}
