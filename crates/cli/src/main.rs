use anyhow::Context;
use catalog_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Operate the product catalog service
#[derive(Debug, Parser)]
#[command(name = "catalog", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (the default)
    Serve,
    /// Connect to MongoDB, ping it and exit
    Check,
    /// Print the resolved settings as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load catalog settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            catalog_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "catalog serve");
            catalog_app::run(settings).await
        }
        Command::Check => {
            catalog_telemetry::init(&settings.telemetry)?;
            let database = catalog_db::connect(&settings.database).await?;
            println!("database '{}' is reachable", database.name());
            database.shutdown().await;
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
