// src/services/admin_service.rs

use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{compensation::with_compensation, error::AppError, i18n::normalize_locale},
    db::{IdentityProvider, ProfileStore},
    models::{
        auth::{AccessContext, AccessRole},
        profile::{InviteResponse, InviteUserPayload, NewProfile, ProfileWithStatus, UserRole},
    },
    services::auth::{generate_invite_token, hash_password, normalize_email},
};

#[derive(Clone)]
pub struct AdminService {
    identities: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    site_url: String,
    bcrypt_cost: u32,
}

impl AdminService {
    pub fn new(
        identities: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        site_url: &str,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            identities,
            profiles,
            site_url: site_url.trim_end_matches('/').to_string(),
            bcrypt_cost,
        }
    }

    fn invite_link(&self, locale: &str, token: &str) -> String {
        format!("{}/{}/update-password?token={}", self.site_url, locale, token)
    }

    /// Convida um muazzin ou restaurante. Identidade primeiro, perfil depois;
    /// se o perfil falhar, a identidade é apagada.
    pub async fn invite_user(
        &self,
        ctx: &AccessContext,
        payload: &InviteUserPayload,
        request_locale: &str,
    ) -> Result<InviteResponse, AppError> {
        ctx.require(AccessRole::SuperAdmin)?;
        payload.validate()?;

        let email = normalize_email(&payload.email);
        let role: UserRole = payload.role.into();
        let locale = normalize_locale(payload.locale.as_deref().unwrap_or(request_locale));

        let (token, token_hash) = generate_invite_token();
        let identity = self.identities.invite_user_by_email(&email, &token_hash).await?;

        let identity_id = identity.id;
        with_compensation(
            "insert_profile",
            &format!("identity {identity_id}"),
            self.profiles.insert(NewProfile {
                id: identity_id,
                email: email.clone(),
                role,
            }),
            || async move { self.identities.delete_user(identity_id).await.map(|_| ()) },
        )
        .await?;

        let invite_link = self.invite_link(locale, &token);
        // Sem envio de e-mail: o link fica no log e volta para o admin
        tracing::info!(%identity_id, %email, %role, %invite_link, "Convite emitido");

        Ok(InviteResponse {
            user_id: identity_id,
            email,
            role,
            invite_link,
        })
    }

    pub async fn resend_invite(
        &self,
        ctx: &AccessContext,
        user_id: Uuid,
        locale: &str,
    ) -> Result<InviteResponse, AppError> {
        ctx.require(AccessRole::SuperAdmin)?;

        let identity = self.identities.get_user(user_id).await?.ok_or(AppError::UserNotFound)?;
        if identity.is_accepted() {
            return Err(AppError::InviteAlreadyAccepted);
        }
        let profile = self.profiles.find_by_id(user_id).await?.ok_or(AppError::UserNotFound)?;

        let (token, token_hash) = generate_invite_token();
        self.identities
            .reissue_invite(user_id, &token_hash)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let invite_link = self.invite_link(normalize_locale(locale), &token);
        tracing::info!(identity_id = %user_id, email = %profile.email, %invite_link, "Convite reenviado");

        Ok(InviteResponse {
            user_id,
            email: profile.email,
            role: profile.role,
            invite_link,
        })
    }

    /// Perfil primeiro, identidade depois. Se a identidade não puder ser apagada,
    /// o perfil é recriado.
    pub async fn delete_user(&self, ctx: &AccessContext, user_id: Uuid) -> Result<(), AppError> {
        let caller = ctx.require(AccessRole::SuperAdmin)?;
        if caller == user_id {
            return Err(AppError::ProtectedAccount);
        }

        let profile = self.profiles.find_by_id(user_id).await?;
        if matches!(&profile, Some(p) if p.role == UserRole::SuperAdmin) {
            return Err(AppError::ProtectedAccount);
        }

        let Some(profile) = profile else {
            // Identidade sem perfil (sobra de convite): só a identidade sai
            return if self.identities.delete_user(user_id).await? {
                tracing::info!(identity_id = %user_id, "Identidade sem perfil removida");
                Ok(())
            } else {
                Err(AppError::UserNotFound)
            };
        };

        // A linha removida volta igual se a identidade não puder ser apagada
        let removed = self.profiles.delete(user_id).await?.unwrap_or_else(|| profile.clone());

        with_compensation(
            "delete_identity",
            &format!("profile {user_id}"),
            async { self.identities.delete_user(user_id).await.map(|_| ()) },
            || async move { self.profiles.restore(removed).await.map(|_| ()) },
        )
        .await?;

        tracing::info!(identity_id = %user_id, email = %profile.email, "Usuário removido");
        Ok(())
    }

    pub async fn get_users(&self, ctx: &AccessContext) -> Result<Vec<ProfileWithStatus>, AppError> {
        ctx.require(AccessRole::SuperAdmin)?;

        let (profiles, identities) = tokio::try_join!(self.profiles.list(), self.identities.list_users())?;
        let identities: HashMap<Uuid, _> = identities.into_iter().map(|i| (i.id, i)).collect();

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let identity = identities.get(&profile.id);
                ProfileWithStatus {
                    is_accepted: identity.is_some_and(|i| i.is_accepted()),
                    invite_pending: identity.is_some_and(|i| i.has_pending_invite()),
                    last_sign_in: identity.and_then(|i| i.last_sign_in_at),
                    profile,
                }
            })
            .collect())
    }

    /// Cria o super admin inicial se o e-mail ainda não existir.
    pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        if self.identities.find_by_email(&email).await?.is_some() {
            tracing::info!(%email, "Super admin inicial já existe");
            return Ok(());
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let identity = self.identities.create_confirmed_user(&email, &password_hash).await?;

        let identity_id = identity.id;
        with_compensation(
            "insert_admin_profile",
            &format!("identity {identity_id}"),
            self.profiles.insert(NewProfile {
                id: identity_id,
                email: email.clone(),
                role: UserRole::SuperAdmin,
            }),
            || async move { self.identities.delete_user(identity_id).await.map(|_| ()) },
        )
        .await?;

        tracing::info!(%identity_id, %email, "Super admin inicial criado");
        Ok(())
    }
}
