use anyhow::Result;
use clap::Parser;
use devis::cli::Cli;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // DEVIS_LOG wins over --verbose.
    let default_filter = if cli.verbose { "devis=debug" } else { "devis=warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("DEVIS_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli.run().await
}
