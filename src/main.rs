use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod routes;
mod services;

use services::dataset::{loader, Dataset};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;

    // Load the dataset once; it stays read-only for the process lifetime
    let dataset = loader::load_from_path(&config.dataset_path).await?;

    // Build our application state
    let state = Arc::new(AppState::new(config, dataset));

    // Build our application with a route
    let app = Router::new()
        .merge(routes::dashboard::routes())
        .with_state(state);

    // Run it
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
#[derive(Clone)]
pub struct AppState {
    config: config::Config,
    dataset: Dataset,
}

impl AppState {
    fn new(config: config::Config, dataset: Dataset) -> Self {
        Self { config, dataset }
    }
}
