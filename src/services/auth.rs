// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{IdentityProvider, ProfileStore},
    models::auth::{
        AcceptInvitePayload, AccessContext, Claims, IdentityUpdate, UpdatePasswordPayload,
    },
};

const INVITE_TOKEN_LENGTH: usize = 48;

/// Token de convite em texto (vai no link) + hash SHA-256 (vai para o banco).
pub fn generate_invite_token() -> (String, String) {
    let token: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(INVITE_TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let token_hash = hash_invite_token(&token);
    (token, token_hash)
}

pub fn hash_invite_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// bcrypt é CPU-bound: roda fora do runtime assíncrono
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    jwt_secret: String,
    session_ttl: Duration,
    invite_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        jwt_secret: String,
        session_ttl: Duration,
        invite_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            identities,
            profiles,
            jwt_secret,
            session_ttl,
            invite_ttl,
            bcrypt_cost,
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let identity = self
            .identities
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Convite ainda não aceito: não existe senha para comparar
        let password_hash = identity.password_hash.clone().ok_or(AppError::InvalidCredentials)?;
        let password_clone = password.to_owned();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.identities
            .update_user(
                identity.id,
                IdentityUpdate {
                    signed_in_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(identity_id = %identity.id, "Login efetuado");
        self.create_token(identity.id)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Resolve quem está chamando. Qualquer falha vira `public`: nunca eleva privilégio.
    pub async fn resolve_access(&self, bearer_token: Option<&str>) -> AccessContext {
        let Some(token) = bearer_token else {
            return AccessContext::public();
        };

        match self.try_resolve(token).await {
            Ok(Some(ctx)) => ctx,
            Ok(None) => AccessContext::public(),
            Err(e) => {
                tracing::warn!(error = %e, "Sessão não resolvida, tratando como pública");
                AccessContext::public()
            }
        }
    }

    async fn try_resolve(&self, token: &str) -> Result<Option<AccessContext>, AppError> {
        let claims = self.validate_token(token)?;

        let Some(identity) = self.identities.get_user(claims.sub).await? else {
            return Ok(None);
        };
        // Identidade sem perfil (ex.: convite com perfil não criado) não tem papel
        let Some(profile) = self.profiles.find_by_id(identity.id).await? else {
            return Ok(None);
        };

        Ok(Some(AccessContext::authenticated(identity.id, identity.email, profile.role)))
    }

    pub async fn accept_invite(&self, payload: &AcceptInvitePayload) -> Result<String, AppError> {
        payload.validate()?;

        let identity = self
            .identities
            .find_by_invite_token_hash(&hash_invite_token(&payload.token))
            .await?
            .ok_or(AppError::InvalidInvite)?;

        if identity.is_accepted() {
            return Err(AppError::InviteAlreadyAccepted);
        }

        let sent_at = identity.invite_sent_at.ok_or(AppError::InvalidInvite)?;
        if sent_at + self.invite_ttl < Utc::now() {
            return Err(AppError::InvalidInvite);
        }

        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;

        self.identities
            .update_user(
                identity.id,
                IdentityUpdate {
                    password_hash: Some(password_hash),
                    confirm_email: true,
                    clear_invite: true,
                    signed_in_at: Some(Utc::now()),
                },
            )
            .await?
            .ok_or(AppError::InvalidInvite)?;

        tracing::info!(identity_id = %identity.id, "Convite aceito");
        self.create_token(identity.id)
    }

    pub async fn update_password(
        &self,
        ctx: &AccessContext,
        payload: &UpdatePasswordPayload,
    ) -> Result<(), AppError> {
        let identity_id = match ctx.identity_id {
            Some(id) if !ctx.is_public() => id,
            _ => return Err(AppError::Unauthenticated),
        };
        payload.validate()?;

        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;

        self.identities
            .update_user(
                identity_id,
                IdentityUpdate {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(())
    }

    pub fn create_token(&self, identity_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: identity_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
