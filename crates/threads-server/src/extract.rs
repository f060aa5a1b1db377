//! Request extractors with API-shaped rejections.

use crate::error::ApiError;
use crate::server::AppState;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;
use threads_core::auth::user_from_access_token;
use threads_core::config::TokenConfig;
use threads_core::User;
use tracing::warn;

/// JSON body; malformed input becomes a 400 with a `detail` message.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; unparsable ids become a 404.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// The user behind a valid `Authorization: Bearer <access>` header.
pub struct AuthUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != TokenConfig::AUTH_HEADER_TYPE {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts).map(str::to_owned) else {
            return Err(ApiError::NotAuthenticated);
        };

        let result = state
            .run_blocking(move |state| user_from_access_token(&state.store, &state.jwt, &token))
            .await;
        match result {
            Ok(user) => Ok(AuthUser(user)),
            Err(err) => {
                warn!("Rejected bearer token: {:?}", err);
                Err(err.into())
            }
        }
    }
}
