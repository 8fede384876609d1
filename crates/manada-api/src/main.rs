//! ManadaBook API server entry point
//!
//! Run with:
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=dev cargo run -p manada-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use manada_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting ManadaBook API server...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.api.port,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    manada_api::run(config).await?;

    Ok(())
}
