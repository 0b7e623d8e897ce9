// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{extract::AppJson, i18n::Locale},
    models::auth::{
        AcceptInvitePayload, AccessContext, AuthResponse, LoginPayload, UpdatePasswordPayload,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(AuthResponse { token })))
}

// POST /api/auth/accept-invite
#[utoipa::path(
    post,
    path = "/api/auth/accept-invite",
    tag = "Auth",
    request_body = AcceptInvitePayload,
    responses(
        (status = 200, description = "Senha definida, sessão iniciada", body = AuthResponse),
        (status = 400, description = "Token inválido/expirado ou senha fraca"),
        (status = 409, description = "Convite já aceito")
    )
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<AcceptInvitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let token = app_state
        .auth_service
        .accept_invite(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(AuthResponse { token })))
}

// GET /api/users/me
// Sem sessão devolve o contexto público (role = "public")
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Contexto de acesso resolvido", body = AccessContext)
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_me(ctx: AccessContext) -> Json<AccessContext> {
    Json(ctx)
}

// PUT /api/users/me/password
#[utoipa::path(
    put,
    path = "/api/users/me/password",
    tag = "Users",
    request_body = UpdatePasswordPayload,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Senha inválida"),
        (status = 401, description = "Não autenticado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_password(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AccessContext,
    AppJson(payload): AppJson<UpdatePasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .update_password(&ctx, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
