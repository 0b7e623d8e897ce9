// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{RequireRole, RoleMuazzin, RoleRestaurantAdmin},
    },
    models::dashboard::{MuazzinStats, RestaurantStats},
};

// GET /api/muazzin/stats
#[utoipa::path(
    get,
    path = "/api/muazzin/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do painel do muazzin", body = MuazzinStats),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas muazzin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn muazzin_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleMuazzin>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .muazzin_stats(guard.ctx())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/restaurant/stats
#[utoipa::path(
    get,
    path = "/api/restaurant/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do painel do restaurante", body = RestaurantStats),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas restaurante")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn restaurant_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleRestaurantAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .dashboard_service
        .restaurant_stats(guard.ctx())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}
