//! Token obtain/refresh handlers.

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use threads_core::auth::{authenticate, refresh_access_token};
use threads_core::TokenPair;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenObtain {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRefresh {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

/// Exchange credentials for an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token/",
    tag = "auth",
    request_body = TokenObtain,
    responses(
        (status = 200, body = TokenPair),
        (status = 401, description = "No active account found with the given credentials"),
    )
)]
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TokenObtain>,
) -> ApiResult<Json<TokenPair>> {
    // Argon2 verification is CPU bound.
    let user = state
        .run_blocking(move |state| {
            authenticate(&state.store, &state.hasher, &body.username, &body.password)
        })
        .await?;

    info!("Issued token pair for {}", user.username);
    Ok(Json(state.jwt.issue_pair(&user)?))
}

/// Exchange a refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token/refresh/",
    tag = "auth",
    request_body = TokenRefresh,
    responses(
        (status = 200, body = AccessToken),
        (status = 401, description = "Token is invalid or expired"),
    )
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<TokenRefresh>,
) -> ApiResult<Json<AccessToken>> {
    let access = state
        .run_blocking(move |state| refresh_access_token(&state.store, &state.jwt, &body.refresh))
        .await?;
    Ok(Json(AccessToken { access }))
}
