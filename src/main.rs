use api_rest::AppState;
use hms_core::constants::DEFAULT_APP_NAME;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the hospital management backend
///
/// Starts the development REST API that the admin client talks to.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:8080")
/// - `HMS_APP_NAME`: Application name used in alert headers (default: "hospitalManagementApp")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("HMS_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;
    let app_name = std::env::var("HMS_APP_NAME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_APP_NAME.into());

    tracing::info!("-- Starting {} REST API on {}", app_name, rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    api_rest::serve(listener, AppState::new(&app_name)).await
}
