//! tabular-serve - Main Entry Point

use clap::Parser;
use tabular_serve::cli::{cmd_predict, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabular_serve=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, model_root, cache_ttl_secs, allow_methods, error_status_codes } => {
            cmd_serve(host, port, model_root, cache_ttl_secs, &allow_methods, error_status_codes).await?;
        }
        Commands::Predict { data, model_uri, target, output } => {
            cmd_predict(&data, &model_uri, &target, output.as_deref())?;
        }
    }

    Ok(())
}
