//! Server bootstrap: connect, ensure declared tables, reflect metadata, and
//! mount one CRUD router per declared table.

use autocrud::{
    apply_migrations, common_routes, connect, derive_all, reflect, register_all, registry,
    AppState, DbConfig,
};
use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("autocrud=info".parse()?))
        .init();

    let config = DbConfig::default();
    let pool = connect(&config).await?;

    let tables = registry();
    apply_migrations(&pool, &tables).await?;

    let metadata = reflect(&pool).await?;
    tracing::info!(tables = metadata.tables.len(), "reflected database metadata");

    let models = derive_all(&tables)?;
    let state = AppState { pool };
    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(register_all(state, models));

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
