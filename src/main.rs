//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod storage;

#[cfg(test)]
mod testing;

// Importações principais
use crate::config::{AppState, Config, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let db_pool = config.connect().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let stores = Stores::postgres(&config, db_pool).await?;
    let bootstrap_admin = config.bootstrap_admin.clone();
    let bind_addr = config.bind_addr;

    let app_state = AppState::new(config, stores)?;

    if let Some((email, password)) = bootstrap_admin {
        app_state
            .admin_service
            .ensure_bootstrap_admin(&email, &password)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao criar o super admin inicial: {e}"))?;
    }

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
