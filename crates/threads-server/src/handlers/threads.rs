//! Thread list/create/delete handlers.

use super::{ListParams, Paginated};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::server::AppState;
use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use threads_core::{Ordering, PageQuery, ThreadRead, ThreadService};
use utoipa::ToSchema;

/// Body of a thread creation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadCreate {
    /// ID of the user to create thread with
    pub participant_id: i64,
}

/// Threads of the authenticated user, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/v1/threads/",
    tag = "threads",
    operation_id = "list_threads",
    params(
        ("limit" = Option<i64>, Query, description = "Number of records per page"),
        ("offset" = Option<i64>, Query, description = "Number of records to skip"),
        ("ordering" = Option<String>, Query, description = "Order by field (\"created\" or \"-created\")"),
    ),
    responses(
        (status = 200, body = Paginated<ThreadRead>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = []))
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<ThreadRead>>> {
    let params = ListParams::parse(&query, state.settings.page_size, Ordering::UpdatedDesc)?;
    let (ordering, window) = (params.ordering, params.page);
    let page = state
        .run_blocking(move |state| {
            ThreadService::new(&state.store).user_threads(user.id, ordering, window)
        })
        .await?;
    Ok(Json(params.respond(&uri, page)))
}

/// Open a private thread with another user, or return the existing one.
#[utoipa::path(
    post,
    path = "/api/v1/threads/",
    tag = "threads",
    operation_id = "create_thread",
    request_body = ThreadCreate,
    responses(
        (status = 201, body = ThreadRead),
        (status = 400, description = "Invalid participant_id or attempt to create thread with self"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Participant not found"),
    ),
    security(("bearer" = []))
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiJson(body): ApiJson<ThreadCreate>,
) -> ApiResult<(StatusCode, Json<ThreadRead>)> {
    let thread = state
        .run_blocking(move |state| {
            ThreadService::new(&state.store).get_or_create_thread(user.id, body.participant_id)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

/// Permanently delete a thread and all its messages.
#[utoipa::path(
    delete,
    path = "/api/v1/threads/{pk}/",
    tag = "threads",
    operation_id = "delete_thread",
    params(("pk" = i64, Path, description = "Thread id")),
    responses(
        (status = 204, description = "Thread deleted successfully"),
        (status = 403, description = "Not a thread participant"),
        (status = 404, description = "Thread not found"),
    ),
    security(("bearer" = []))
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(pk): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state
        .run_blocking(move |state| ThreadService::new(&state.store).delete_thread(user.id, pk))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
