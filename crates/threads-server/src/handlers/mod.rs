//! REST handlers, split by resource.

pub mod admin;
pub mod auth;
pub mod docs;
pub mod messages;
pub mod threads;
pub mod users;

use axum::http::Uri;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use threads_core::{Ordering, Page, PageQuery, PageRequest};
use utoipa::ToSchema;

use crate::error::ApiResult;

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Limit/offset paginated list body.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Validated list parameters for one request.
pub(crate) struct ListParams {
    pub page: PageRequest,
    pub ordering: Ordering,
    raw_ordering: Option<String>,
}

impl ListParams {
    pub fn parse(query: &PageQuery, page_size: usize, default: Ordering) -> ApiResult<Self> {
        Ok(Self {
            page: query.page_request(page_size)?,
            ordering: Ordering::from_query(query.ordering.as_deref(), default),
            raw_ordering: query.ordering.clone(),
        })
    }

    fn link(&self, uri: &Uri, offset: Option<usize>) -> String {
        let mut query = format!("limit={}", self.page.limit);
        if let Some(offset) = offset.filter(|o| *o > 0) {
            query.push_str(&format!("&offset={}", offset));
        }
        if let Some(ordering) = &self.raw_ordering {
            query.push_str(&format!("&ordering={}", ordering));
        }
        format!("{}?{}", uri.path(), query)
    }

    /// Wrap a page with `next`/`previous` links relative to the request path.
    pub fn respond<T>(&self, uri: &Uri, page: Page<T>) -> Paginated<T> {
        let next = self
            .page
            .next_offset(page.count)
            .map(|offset| self.link(uri, Some(offset)));
        let previous = self
            .page
            .previous_offset()
            .map(|offset| self.link(uri, Some(offset)));
        Paginated {
            count: page.count,
            next,
            previous,
            results: page.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        let query = PageQuery {
            limit: Some("1".into()),
            offset: Some("1".into()),
            ordering: Some("-created".into()),
        };
        let params = ListParams::parse(&query, 20, Ordering::CreatedAsc).unwrap();
        assert_eq!(params.ordering, Ordering::CreatedDesc);

        let uri: Uri = "/api/v1/threads/?limit=1&offset=1".parse().unwrap();
        let body = params.respond(
            &uri,
            Page {
                count: 3,
                results: vec![1],
            },
        );
        assert_eq!(
            body.next.as_deref(),
            Some("/api/v1/threads/?limit=1&offset=2&ordering=-created")
        );
        assert_eq!(
            body.previous.as_deref(),
            Some("/api/v1/threads/?limit=1&ordering=-created")
        );
    }

    #[test]
    fn test_first_and_last_page_have_no_links() {
        let params = ListParams::parse(&PageQuery::default(), 20, Ordering::CreatedAsc).unwrap();
        let uri: Uri = "/api/v1/threads/".parse().unwrap();
        let body = params.respond(
            &uri,
            Page {
                count: 2,
                results: vec![1, 2],
            },
        );
        assert!(body.next.is_none());
        assert!(body.previous.is_none());
    }
}
