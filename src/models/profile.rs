// src/models/profile.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Muazzin,
    RestaurantAdmin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Muazzin => "muazzin",
            UserRole::RestaurantAdmin => "restaurant_admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Um perfil por identidade. O papel é definido no convite e não muda por self-service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "imam@masjid.org")]
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

// Dados para inserir um perfil (o ID vem da identidade já criada)
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

// Papéis que o super admin pode distribuir por convite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitableRole {
    Muazzin,
    RestaurantAdmin,
}

impl From<InvitableRole> for UserRole {
    fn from(role: InvitableRole) -> Self {
        match role {
            InvitableRole::Muazzin => UserRole::Muazzin,
            InvitableRole::RestaurantAdmin => UserRole::RestaurantAdmin,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "restaurant@partner.com")]
    pub email: String,

    pub role: InvitableRole,

    // Idioma da página de definição de senha. Se ausente, usa o Accept-Language.
    #[schema(example = "ar")]
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendInvitePayload {
    #[schema(example = "en")]
    pub locale: Option<String>,
}

// Resposta do convite: o link vai para o admin repassar (não há envio de e-mail)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    #[schema(example = "https://iftar.example.org/ar/update-password?token=...")]
    pub invite_link: String,
}

// Linha da tela de usuários: perfil + metadados da identidade
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWithStatus {
    #[serde(flatten)]
    pub profile: Profile,
    pub is_accepted: bool,
    // Há um link de convite válido para reenviar ou aguardar
    pub invite_pending: bool,
    pub last_sign_in: Option<DateTime<Utc>>,
}
