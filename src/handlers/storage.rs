// src/handlers/storage.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{extract::AppQuery, i18n::Locale},
    storage::content_type_for,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedUrlQuery {
    /// Unix timestamp de expiração
    pub expires: i64,
    /// HMAC-SHA256 em hex
    pub token: String,
}

// GET /api/storage/receipts/{path}
#[utoipa::path(
    get,
    path = "/api/storage/receipts/{path}",
    tag = "Storage",
    params(
        ("path" = String, Path, description = "Chave do comprovante"),
        SignedUrlQuery
    ),
    responses(
        (status = 200, description = "Arquivo do comprovante"),
        (status = 403, description = "Assinatura inválida ou expirada"),
        (status = 404, description = "Objeto não encontrado")
    )
)]
pub async fn download_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(path): Path<String>,
    AppQuery(query): AppQuery<SignedUrlQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !app_state.storage.verify(&path, query.expires, &query.token) {
        return Err(AppError::Forbidden("signed_url").to_api_error(&locale, &app_state.i18n_store));
    }

    let bytes = app_state
        .storage
        .download(&path)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?
        .ok_or_else(|| {
            AppError::ResourceNotFound(format!("receipt {path}")).to_api_error(&locale, &app_state.i18n_store)
        })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        bytes,
    ))
}
