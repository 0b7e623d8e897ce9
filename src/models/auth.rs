// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, models::profile::UserRole};

// Identidade do provedor de autenticação (tabela auth_identities)
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: Option<String>,

    #[serde(skip_serializing)]
    pub invite_token_hash: Option<String>,
    pub invite_sent_at: Option<DateTime<Utc>>,

    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    // Convite aceito = e-mail confirmado ou pelo menos um login
    pub fn is_accepted(&self) -> bool {
        self.email_confirmed_at.is_some() || self.last_sign_in_at.is_some()
    }

    // Link de convite emitido e ainda não consumido
    pub fn has_pending_invite(&self) -> bool {
        !self.is_accepted() && self.invite_token_hash.is_some()
    }
}

// Alterações parciais aplicadas pelo `update_user` do provedor
#[derive(Debug, Clone, Default)]
pub struct IdentityUpdate {
    pub password_hash: Option<String>,
    pub confirm_email: bool,
    pub clear_invite: bool,
    pub signed_in_at: Option<DateTime<Utc>>,
}

// Papel efetivo de quem faz a requisição. `Public` = sem sessão ou sem perfil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    Public,
    Muazzin,
    RestaurantAdmin,
    SuperAdmin,
}

impl From<UserRole> for AccessRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Muazzin => AccessRole::Muazzin,
            UserRole::RestaurantAdmin => AccessRole::RestaurantAdmin,
            UserRole::SuperAdmin => AccessRole::SuperAdmin,
        }
    }
}

impl AccessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRole::Public => "public",
            AccessRole::Muazzin => "muazzin",
            AccessRole::RestaurantAdmin => "restaurant_admin",
            AccessRole::SuperAdmin => "super_admin",
        }
    }
}

// Contexto da requisição, resolvido no servidor a cada chamada.
// Nunca vem do cliente e nunca é cacheado entre requisições.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessContext {
    pub identity_id: Option<Uuid>,
    pub email: Option<String>,
    pub role: AccessRole,
}

impl AccessContext {
    pub fn public() -> Self {
        Self {
            identity_id: None,
            email: None,
            role: AccessRole::Public,
        }
    }

    pub fn authenticated(identity_id: Uuid, email: String, role: UserRole) -> Self {
        Self {
            identity_id: Some(identity_id),
            email: Some(email),
            role: role.into(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.role == AccessRole::Public
    }

    /// Garante o papel exigido e devolve o id da identidade.
    /// Sem sessão -> 401, papel diferente -> 403.
    pub fn require(&self, role: AccessRole) -> Result<Uuid, AppError> {
        match self.identity_id {
            Some(id) if self.role == role => Ok(id),
            _ if self.is_public() => Err(AppError::Unauthenticated),
            _ => Err(AppError::Forbidden(role.as_str())),
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT.
// O papel NÃO vai no token: é buscado no perfil a cada requisição.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID da identidade)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "imam@masjid.org")]
    pub email: String,
    #[validate(length(min = 1, message = "password_required"))]
    pub password: String,
}

// Aceite do convite: define a senha usando o token recebido no link
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitePayload {
    #[validate(length(min = 1, message = "invite_token_required"))]
    pub token: String,
    #[validate(length(min = 8, message = "password_too_short"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords_do_not_match"))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordPayload {
    #[validate(length(min = 8, message = "password_too_short"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords_do_not_match"))]
    pub confirm_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}
