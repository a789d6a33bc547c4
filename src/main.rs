use std::sync::Arc;

use salon_pricing::config::ServerConfig;
use salon_pricing::costing::{
    load_snapshot_file, seed, CostingResult, InMemoryStore, PerformanceMetrics, PricingWorkspace, WorkspaceSnapshot,
};
use salon_pricing::{create_router, AppState};
use tracing_subscriber::EnvFilter;

fn initial_snapshot(config: &ServerConfig) -> CostingResult<WorkspaceSnapshot> {
    let mut snapshot = match &config.seed_path {
        Some(path) => load_snapshot_file(path)?,
        None => {
            tracing::info!("No SEED_PATH configured, starting from the demo salon");
            seed::demo_snapshot()
        }
    };
    snapshot.policy = config.auto_increase;
    Ok(snapshot)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Salon Pricing API - Starting...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let metrics = PerformanceMetrics::new();
    let workspace = match initial_snapshot(&config)
        .and_then(|snapshot| PricingWorkspace::from_snapshot(snapshot, metrics.clone()))
    {
        Ok(workspace) => workspace,
        Err(e) => {
            tracing::error!("Failed to open workspace: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(workspace, Arc::new(InMemoryStore::new()));
    let app = create_router(state);

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Salon Pricing API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }

    metrics.log_summary();
}
