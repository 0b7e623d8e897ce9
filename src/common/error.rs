use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    services::status_rules::TransitionError,
};

// Erro de domínio único. Os serviços devolvem `Result<T, AppError>` e os handlers
// convertem para `ApiError` (já traduzido) com `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Quantidade inválida")]
    InvalidQuantity,

    #[error("Comprovante ausente ou vazio")]
    MissingProof,

    #[error("Formulário inválido: {0}")]
    InvalidForm(String),

    #[error("Corpo da requisição acima do limite")]
    PayloadTooLarge,

    #[error("Filtro de status inválido: {0}")]
    InvalidStatusFilter(String),

    #[error("Paginação inválida")]
    InvalidPagination,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Convite inválido ou expirado")]
    InvalidInvite,

    #[error("Convite já aceito")]
    InviteAlreadyAccepted,

    #[error("Sessão ausente")]
    Unauthenticated,

    #[error("Acesso negado para o papel '{0}'")]
    Forbidden(&'static str),

    #[error("Conta protegida contra exclusão")]
    ProtectedAccount,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    // O status mudou entre a leitura e a escrita (outra revisão venceu a corrida)
    #[error("Status alterado por outra requisição")]
    StaleTransition,

    #[error("Erro no armazenamento de arquivos: {0}")]
    StorageError(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Status HTTP + chave de tradução de cada variante
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::InvalidQuantity => (StatusCode::BAD_REQUEST, "invalid_quantity"),
            AppError::MissingProof => (StatusCode::BAD_REQUEST, "proof_required"),
            AppError::InvalidForm(_) => (StatusCode::BAD_REQUEST, "invalid_form"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::InvalidStatusFilter(_) => (StatusCode::BAD_REQUEST, "invalid_status_filter"),
            AppError::InvalidPagination => (StatusCode::BAD_REQUEST, "invalid_pagination"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::InvalidInvite => (StatusCode::BAD_REQUEST, "invalid_invite"),
            AppError::InviteAlreadyAccepted => (StatusCode::CONFLICT, "invite_already_accepted"),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ProtectedAccount => (StatusCode::FORBIDDEN, "protected_account"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "resource_not_found"),
            AppError::InvalidTransition(TransitionError::RoleNotAllowed { .. }) => {
                (StatusCode::FORBIDDEN, "forbidden")
            }
            AppError::InvalidTransition(TransitionError::Illegal { .. }) => {
                (StatusCode::CONFLICT, "invalid_transition")
            }
            AppError::StaleTransition => (StatusCode::CONFLICT, "stale_transition"),

            // Todos os outros erros (banco, storage, interno) viram 500 genérico.
            AppError::StorageError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected_error"),
        }
    }

    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log, o cliente recebe a mensagem genérica
            tracing::error!(error = ?self, "Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let message_key = e.message.as_deref().unwrap_or_else(|| e.code.as_ref());
                            Value::String(i18n.translate(&locale.0, message_key))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            AppError::InvalidTransition(TransitionError::Illegal { from, to }) => {
                Some(json!({ "from": from, "to": to }))
            }
            _ => None,
        };

        ApiError {
            status,
            error: i18n.translate(&locale.0, key),
            details,
        }
    }
}

// O erro que sai na resposta HTTP: `{"error": "...", "details": {...}}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
