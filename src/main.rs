use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bingewatch::{
    config::Config,
    routes::{create_router, AppState},
    services::pipeline,
};

#[derive(Parser)]
#[command(name = "bingewatch", version, about = "Item-to-item and attribute-based title recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve recommendations over HTTP from the published snapshot
    Serve,

    /// Rebuild the recommendation snapshot from the rating files
    Build {
        /// Write the snapshot here instead of SNAPSHOT_PATH
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bingewatch=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Build { output } => {
            if let Some(output) = output {
                config.snapshot_path = output;
            }
            let path = config.snapshot_path.clone();
            tokio::task::spawn_blocking(move || {
                let store = pipeline::build_store(&config)?;
                store.save(&config.snapshot_path)
            })
            .await?
            .with_context(|| format!("Failed to build snapshot {}", path.display()))?;
        }
        Commands::Serve => {
            let loader_config = config.clone();
            let snapshot = tokio::task::spawn_blocking(move || pipeline::load_snapshot(&loader_config))
                .await?
                .with_context(|| {
                    format!(
                        "Failed to load snapshot {}; run `bingewatch build` first",
                        config.snapshot_path.display()
                    )
                })?;

            let addr = format!("{}:{}", config.host, config.port);
            let app = create_router(AppState::new(snapshot, config));

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!(addr = %addr, "Server running");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutdown signal received");
                })
                .await?;
        }
    }

    Ok(())
}
