//src/main.rs

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;

// Folga para os cabeçalhos multipart além do próprio PDF
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env é opcional (em produção as variáveis vêm do ambiente)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("enpl_backend=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let (Some(email), Some(password)) = (&app_state.config.admin_email, &app_state.config.admin_password) {
        app_state
            .auth_service
            .bootstrap_admin(email, password)
            .await
            .context("Falha ao criar o admin inicial")?;
    }

    let cors = cors_layer(app_state.config.cors_origin.as_deref());
    let body_limit = app_state.config.max_upload_bytes + MULTIPART_SLACK_BYTES;
    let addr = app_state.config.server_addr;

    let app = routes::build_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Inicia o servidor
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

// CORS_ORIGIN aceita uma lista separada por vírgulas; sem ela, libera tudo (desenvolvimento)
fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("CORS_ORIGIN não definida; usando CORS permissivo");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
