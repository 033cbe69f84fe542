//! Example consumer: serves the resources imported by a routing manifest.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Or from this directory: `cargo run`

use crud_sdk::{common_routes, resource_router, AppState, HeaderGrants, ResourceLoader, SqlCrudController};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crud_sdk=info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/crud".into());
    let manifest =
        std::env::var("CRUD_MANIFEST").unwrap_or_else(|_| "resources/routing.yaml".into());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let loaded = ResourceLoader::new().load_manifest(&manifest).await?;
    let mut state = AppState::new(loaded.routes).with_access(Arc::new(HeaderGrants));
    for config in loaded.resources {
        let (base, resource) = (config.base_name.clone(), config.resource_name.clone());
        state = state.with_controller(base, resource, Arc::new(SqlCrudController::new(pool.clone(), config)))?;
    }
    tracing::info!(routes = state.routes.len(), "routes compiled");

    let app = common_routes().merge(resource_router(state));
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
