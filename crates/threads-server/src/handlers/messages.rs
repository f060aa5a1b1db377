//! Message handlers nested under a thread.

use super::{ListParams, Paginated};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::server::AppState;
use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use threads_core::{MessageRead, MessageService, Ordering, PageQuery};
use utoipa::ToSchema;

/// Body of a new message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageCreate {
    /// Up to 1000 characters, surrounding whitespace is trimmed
    pub text: String,
}

/// Messages of a thread in creation order.
#[utoipa::path(
    get,
    path = "/api/v1/threads/{thread_id}/messages/",
    tag = "messages",
    params(
        ("thread_id" = i64, Path, description = "Thread id"),
        ("limit" = Option<i64>, Query, description = "Number of records per page"),
        ("offset" = Option<i64>, Query, description = "Number of records to skip"),
        ("ordering" = Option<String>, Query, description = "Order by field (\"created\" or \"-created\")"),
    ),
    responses(
        (status = 200, body = Paginated<MessageRead>),
        (status = 403, description = "Not a thread participant"),
        (status = 404, description = "Thread not found"),
    ),
    security(("bearer" = []))
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    OriginalUri(uri): OriginalUri,
    ApiPath(thread_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<Paginated<MessageRead>>> {
    let params = ListParams::parse(&query, state.settings.page_size, Ordering::CreatedAsc)?;
    let (ordering, window) = (params.ordering, params.page);
    let page = state
        .run_blocking(move |state| {
            MessageService::new(&state.store).thread_messages(&user, thread_id, ordering, window)
        })
        .await?;
    Ok(Json(params.respond(&uri, page)))
}

/// Send a message to a thread.
#[utoipa::path(
    post,
    path = "/api/v1/threads/{thread_id}/messages/",
    tag = "messages",
    operation_id = "create_message",
    params(("thread_id" = i64, Path, description = "Thread id")),
    request_body = MessageCreate,
    responses(
        (status = 201, body = MessageRead),
        (status = 400, description = "Blank or too long text"),
        (status = 403, description = "Not a thread participant"),
        (status = 404, description = "Thread not found"),
    ),
    security(("bearer" = []))
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(thread_id): ApiPath<i64>,
    ApiJson(body): ApiJson<MessageCreate>,
) -> ApiResult<(StatusCode, Json<MessageRead>)> {
    let message = state
        .run_blocking(move |state| {
            MessageService::new(&state.store).create_message(user.id, thread_id, &body.text)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark every message addressed to the current user in a thread as read.
#[utoipa::path(
    patch,
    path = "/api/v1/threads/{thread_id}/messages/",
    tag = "messages",
    params(("thread_id" = i64, Path, description = "Thread id")),
    responses(
        (status = 204, description = "Messages marked as read"),
        (status = 403, description = "Not a thread participant"),
        (status = 404, description = "Thread not found"),
    ),
    security(("bearer" = []))
)]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath(thread_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state
        .run_blocking(move |state| {
            MessageService::new(&state.store).mark_all_read(user.id, thread_id)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a single message as read.
#[utoipa::path(
    patch,
    path = "/api/v1/threads/{thread_id}/messages/{pk}/",
    tag = "messages",
    params(
        ("thread_id" = i64, Path, description = "Thread id"),
        ("pk" = i64, Path, description = "Message id"),
    ),
    responses(
        (status = 204, description = "Message marked as read"),
        (status = 403, description = "Sender of the message or not a participant"),
        (status = 404, description = "Message not found or doesn't belong to thread"),
    ),
    security(("bearer" = []))
)]
pub async fn mark_message_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ApiPath((thread_id, pk)): ApiPath<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .run_blocking(move |state| {
            MessageService::new(&state.store).mark_message_read(&user, thread_id, pk)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
