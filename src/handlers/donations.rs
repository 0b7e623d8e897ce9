// src/handlers/donations.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::ListQuery,
    },
    config::AppState,
    middleware::{
        extract::{AppJson, AppQuery},
        i18n::Locale,
        rbac::{RequireRole, RoleMuazzin},
    },
    models::donation::{
        Donation, DonationStatus, DonationWithSignedUrl, ProofFile, ReviewDonationPayload,
    },
};

// Só para a documentação do formulário multipart
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DonationForm {
    /// Número de pacotes (inteiro positivo)
    #[schema(example = 10)]
    quantity: i64,
    /// Imagem ou PDF do comprovante
    #[schema(value_type = String, format = Binary)]
    receipt: Vec<u8>,
}

// Campos `quantity` e `receipt`; o resto é ignorado
// Estouro do limite de corpo vira 413, o resto é formulário malformado
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidForm(e.body_text())
    }
}

async fn read_donation_form(mut multipart: Multipart) -> Result<(i64, ProofFile), AppError> {
    let mut quantity = None;
    let mut proof = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        match field.name() {
            Some("quantity") => {
                let text = field.text().await.map_err(multipart_error)?;
                quantity = Some(text);
            }
            Some("receipt") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                proof = Some(ProofFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    // "5.5", "abc" ou vazio não são inteiros
    let quantity = quantity
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or(AppError::InvalidQuantity)?;
    let proof = proof.ok_or(AppError::MissingProof)?;

    Ok((quantity, proof))
}

// POST /api/donations
#[utoipa::path(
    post,
    path = "/api/donations",
    tag = "Donations",
    request_body(content = DonationForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Doação registrada como pendente", body = Donation),
        (status = 400, description = "Quantidade inválida ou comprovante ausente"),
        (status = 413, description = "Comprovante acima do limite de upload")
    )
)]
pub async fn submit_donation(
    State(app_state): State<AppState>,
    locale: Locale,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (quantity, proof) = read_donation_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let donation = app_state
        .donation_service
        .submit(quantity, proof)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(donation)))
}

// GET /api/muazzin/donations
#[utoipa::path(
    get,
    path = "/api/muazzin/donations",
    tag = "Muazzin",
    params(ListQuery),
    responses(
        (status = 200, description = "Doações com URL assinada do comprovante", body = Vec<DonationWithSignedUrl>),
        (status = 401, description = "Não autenticado"),
        (status = 403, description = "Apenas muazzin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_donations(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleMuazzin>,
    AppQuery(query): AppQuery<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query
        .page_params()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let status = query
        .status_filter::<DonationStatus>()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let donations = app_state
        .donation_service
        .list(guard.ctx(), page, status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(donations)))
}

// POST /api/muazzin/donations/{id}/review
#[utoipa::path(
    post,
    path = "/api/muazzin/donations/{id}/review",
    tag = "Muazzin",
    request_body = ReviewDonationPayload,
    params(
        ("id" = Uuid, Path, description = "ID da doação")
    ),
    responses(
        (status = 200, description = "Doação revisada", body = Donation),
        (status = 404, description = "Doação não encontrada"),
        (status = 409, description = "Doação já revisada")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn review_donation(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<RoleMuazzin>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ReviewDonationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let donation = app_state
        .donation_service
        .review(guard.ctx(), id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(donation)))
}
