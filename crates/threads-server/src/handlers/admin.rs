use crate::error::ApiResult;
use crate::extract::{ApiJson, AuthUser};
use crate::server::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use threads_core::AdminService;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadFlagUpdate {
    pub ids: Vec<i64>,
    pub is_read: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadFlagUpdated {
    pub updated: usize,
}

/// Bulk mark messages read or unread (staff only).
#[utoipa::path(
    post,
    path = "/api/v1/admin/messages/read-flag/",
    tag = "admin",
    request_body = ReadFlagUpdate,
    responses(
        (status = 200, body = ReadFlagUpdated),
        (status = 403, description = "Not a staff user"),
    ),
    security(("bearer" = []))
)]
pub async fn set_read_flag(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<ReadFlagUpdate>,
) -> ApiResult<Json<ReadFlagUpdated>> {
    let updated = state
        .run_blocking(move |state| {
            AdminService::new(&state.store).set_messages_read(&user, &body.ids, body.is_read)
        })
        .await?;
    Ok(Json(ReadFlagUpdated { updated }))
}
