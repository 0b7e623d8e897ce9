// src/handlers/collections.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::ApiError, pagination::ListQuery},
    config::AppState,
    middleware::{
        extract::{AppJson, AppQuery},
        i18n::Locale,
        rbac::{RequireRole, RoleMuazzin, RoleRestaurantAdmin},
    },
    models::collection::{
        CollectionRequest, CollectionRequestWithCreator, CollectionStatus,
        CreateCollectionPayload, UpdateCollectionStatusPayload,
    },
};

// GET /api/muazzin/collections
#[utoipa::path(
    get,
    path = "/api/muazzin/collections",
    tag = "Muazzin",
    params(ListQuery),
    responses(
        (status = 200, description = "Pedidos de coleta do próprio muazzin", body = Vec<CollectionRequest>),
        (status = 403, description = "Apenas muazzin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_own_collections(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleMuazzin>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query
        .page_params()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let status = query
        .status_filter::<CollectionStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requests = app_state
        .collection_service
        .list_own(guard.ctx(), page, status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/muazzin/collections
#[utoipa::path(
    post,
    path = "/api/muazzin/collections",
    tag = "Muazzin",
    request_body = CreateCollectionPayload,
    responses(
        (status = 201, description = "Pedido criado como pendente", body = CollectionRequest),
        (status = 400, description = "Quantidade ou data inválida")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn create_collection(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleMuazzin>,
    AppJson(payload): AppJson<CreateCollectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .collection_service
        .create(guard.ctx(), &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/restaurant/collections
#[utoipa::path(
    get,
    path = "/api/restaurant/collections",
    tag = "Restaurant",
    params(ListQuery),
    responses(
        (status = 200, description = "Todos os pedidos com o e-mail do criador", body = Vec<CollectionRequestWithCreator>),
        (status = 403, description = "Apenas restaurante")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_all_collections(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleRestaurantAdmin>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query
        .page_params()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let status = query
        .status_filter::<CollectionStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requests = app_state
        .collection_service
        .list_all(guard.ctx(), page, status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/restaurant/collections/{id}/status
#[utoipa::path(
    post,
    path = "/api/restaurant/collections/{id}/status",
    tag = "Restaurant",
    request_body = UpdateCollectionStatusPayload,
    params(
        ("id" = Uuid, Path, description = "ID do pedido de coleta")
    ),
    responses(
        (status = 200, description = "Status atualizado", body = CollectionRequest),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Transição não permitida")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn update_collection_status(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleRestaurantAdmin>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCollectionStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .collection_service
        .update_status(guard.ctx(), id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}
