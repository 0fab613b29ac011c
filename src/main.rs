//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        offset = %settings.company_offset,
        standard_work_minutes = settings.standard_work_minutes,
        "Calendário da empresa configurado"
    );

    let app_state = AppState::new(settings).await?;
    let addr = app_state.settings.server_addr;
    let app = routes::build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger UI em http://{}/swagger-ui", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
