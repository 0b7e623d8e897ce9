// src/handlers/admin.rs

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        extract::AppJson,
        i18n::Locale,
        rbac::{RequireRole, RoleSuperAdmin},
    },
    models::profile::{InviteResponse, InviteUserPayload, ProfileWithStatus, ResendInvitePayload},
};

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Perfis com status do convite", body = Vec<ProfileWithStatus>),
        (status = 403, description = "Apenas super admin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_users(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleSuperAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .admin_service
        .get_users(guard.ctx())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/admin/users/invite
#[utoipa::path(
    post,
    path = "/api/admin/users/invite",
    tag = "Admin",
    request_body = InviteUserPayload,
    responses(
        (status = 201, description = "Convite criado", body = InviteResponse),
        (status = 400, description = "E-mail ou papel inválido"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn invite_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleSuperAdmin>,
    AppJson(payload): AppJson<InviteUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invite = app_state
        .admin_service
        .invite_user(guard.ctx(), &payload, &locale.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(invite)))
}

// POST /api/admin/users/{id}/resend-invite
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/resend-invite",
    tag = "Admin",
    request_body = ResendInvitePayload,
    params(
        ("id" = Uuid, Path, description = "ID do usuário convidado")
    ),
    responses(
        (status = 200, description = "Novo link de convite", body = InviteResponse),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "Convite já aceito")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn resend_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleSuperAdmin>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // Corpo opcional: sem corpo usa o idioma da requisição
    let payload: ResendInvitePayload = if body.is_empty() {
        ResendInvitePayload::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            AppError::InvalidForm(e.to_string()).to_api_error(&locale, &app_state.i18n_store)
        })?
    };
    let invite_locale = payload.locale.unwrap_or_else(|| locale.0.clone());

    let invite = app_state
        .admin_service
        .resend_invite(guard.ctx(), id, &invite_locale)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invite)))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(
        ("id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 403, description = "Conta protegida"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleSuperAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .admin_service
        .delete_user(guard.ctx(), id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
