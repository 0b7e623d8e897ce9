// src/middleware/extract.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRef, FromRequest, FromRequestParts, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Corpo JSON cuja rejeição sai no mesmo formato `{"error": ...}` do resto da API
#[derive(Debug)]
pub struct AppJson<T>(pub T);

// Query string com a mesma regra de rejeição do `AppJson`
#[derive(Debug)]
pub struct AppQuery<T>(pub T);

fn json_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidForm(rejection.body_text())
    }
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::InvalidForm(rejection.body_text())
}

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(req.headers());

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                Err(json_rejection(rejection).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => {
                let locale = Locale::from_headers(&parts.headers);
                let app_state = AppState::from_ref(state);
                Err(query_rejection(rejection).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}
