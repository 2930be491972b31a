/**
 * OpenField ingest server entry point
 *
 * Receives submissions from collecting devices and stores them once per
 * client identifier.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use openfield_collect::backend::{create_app_from_config, IngestConfig};
    use tracing_subscriber::EnvFilter;

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("openfield_collect=info")),
        )
        .init();

    let config = IngestConfig::from_env()?;
    let app = create_app_from_config(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Ingest server listening on {}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("The ingest server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin openfield-ingest --features ssr");
    std::process::exit(1);
}
