// src/middleware/rbac.rs

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{AccessContext, AccessRole},
};

/// 1. O Trait que define o papel exigido pela rota
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> AccessRole;
}

/// 2. O Extractor (Guardião). Carrega o contexto já verificado.
pub struct RequireRole<T>(pub AccessContext, pub PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn ctx(&self) -> &AccessContext {
        &self.0
    }
}

// 3. Sem sessão -> 401, outro papel -> 403 (mensagem traduzida)
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Ok(locale) = Locale::from_request_parts(parts, state).await;
        let Ok(ctx) = AccessContext::from_request_parts(parts, state).await;

        ctx.require(T::role())
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(RequireRole(ctx, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct RoleMuazzin;
impl RoleDef for RoleMuazzin {
    fn role() -> AccessRole { AccessRole::Muazzin }
}

pub struct RoleRestaurantAdmin;
impl RoleDef for RoleRestaurantAdmin {
    fn role() -> AccessRole { AccessRole::RestaurantAdmin }
}

pub struct RoleSuperAdmin;
impl RoleDef for RoleSuperAdmin {
    fn role() -> AccessRole { AccessRole::SuperAdmin }
}
