// src/routes.rs

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

// Folga para os cabeçalhos do multipart além do arquivo em si
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn cors_layer(site_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT_LANGUAGE])
        .max_age(Duration::from_secs(3600));

    match site_url.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(site_url, error = %e, "SITE_URL inválida, CORS sem origem liberada");
            layer
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    let upload_limit = app_state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/accept-invite", post(handlers::auth::accept_invite));

    // O contexto de acesso é resolvido a cada requisição
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/password", put(handlers::auth::update_password));

    let muazzin_routes = Router::new()
        .route("/donations", get(handlers::donations::list_donations))
        .route("/donations/{id}/review", post(handlers::donations::review_donation))
        .route(
            "/collections",
            get(handlers::collections::list_own_collections)
                .post(handlers::collections::create_collection),
        )
        .route("/stats", get(handlers::dashboard::muazzin_stats));

    let restaurant_routes = Router::new()
        .route("/collections", get(handlers::collections::list_all_collections))
        .route(
            "/collections/{id}/status",
            post(handlers::collections::update_collection_status),
        )
        .route("/stats", get(handlers::dashboard::restaurant_stats));

    let admin_routes = Router::new()
        .route("/users", get(handlers::admin::get_users))
        .route("/users/invite", post(handlers::admin::invite_user))
        .route("/users/{id}/resend-invite", post(handlers::admin::resend_invite))
        .route("/users/{id}", delete(handlers::admin::delete_user));

    let storage_routes = Router::new()
        .route("/receipts/{path}", get(handlers::storage::download_receipt));

    let cors = cors_layer(&app_state.config.site_url);

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        // Formulário público de doação
        .route(
            "/api/donations",
            post(handlers::donations::submit_donation).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest("/api/muazzin", muazzin_routes)
        .nest("/api/restaurant", restaurant_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/storage", storage_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(app_state)
}
