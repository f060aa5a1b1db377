//! Per-user handlers, available to the user themselves and to staff.

use super::{ListParams, Paginated};
use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery, AuthUser};
use crate::server::AppState;
use axum::extract::{OriginalUri, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use threads_core::{Ordering, PageQuery, ThreadRead, UserService};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/threads/",
    tag = "users",
    params(
        ("user_id" = i64, Path, description = "User id"),
        ("limit" = Option<i64>, Query, description = "Number of records per page"),
        ("offset" = Option<i64>, Query, description = "Number of records to skip"),
        ("ordering" = Option<String>, Query, description = "Order by field (\"created\" or \"-created\")"),
    ),
    responses(
        (status = 200, body = Paginated<ThreadRead>),
        (status = 403, description = "Not authorized to view these threads"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = []))
)]
pub async fn user_threads(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    OriginalUri(uri): OriginalUri,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<ThreadRead>>> {
    let params = ListParams::parse(&query, state.settings.page_size, Ordering::UpdatedDesc)?;
    let (ordering, window) = (params.ordering, params.page);
    let page = state
        .run_blocking(move |state| {
            UserService::new(&state.store).user_threads(&requester, user_id, ordering, window)
        })
        .await?;
    Ok(Json(params.respond(&uri, page)))
}

/// Unread messages addressed to a user across all of their threads.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/unread-messages-count/",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = UnreadCount),
        (status = 403, description = "Not authorized to view this count"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = []))
)]
pub async fn unread_messages_count(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<UnreadCount>> {
    let count = state
        .run_blocking(move |state| {
            UserService::new(&state.store).unread_messages_count(&requester, user_id)
        })
        .await?;
    Ok(Json(UnreadCount { count }))
}
