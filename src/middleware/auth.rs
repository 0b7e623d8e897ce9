// src/middleware/auth.rs

use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{config::AppState, models::auth::AccessContext};

// Extrator do contexto de acesso. Nunca rejeita: sem sessão válida o contexto é `public`
// e cada serviço decide se isso basta.
impl<S> FromRequestParts<S> for AccessContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Já resolvido nesta mesma requisição (ex.: RequireRole + AccessContext no handler)
        if let Some(ctx) = parts.extensions.get::<AccessContext>() {
            return Ok(ctx.clone());
        }

        let app_state = AppState::from_ref(state);

        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        let token = bearer.as_ref().map(|TypedHeader(Authorization(b))| b.token());

        let ctx = app_state.auth_service.resolve_access(token).await;
        parts.extensions.insert(ctx.clone());

        Ok(ctx)
    }
}
