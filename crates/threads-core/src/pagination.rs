//! Limit/offset pagination.

use crate::{Result, ThreadsError};
use serde::{Deserialize, Serialize};

/// Raw list query parameters as they arrive on the URL.
///
/// Values are kept as strings so that malformed input can be reported per
/// field instead of failing the whole query extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub ordering: Option<String>,
}

impl PageQuery {
    /// Validate `limit` (>= 1) and `offset` (>= 0).
    pub fn page_request(&self, default_limit: usize) -> Result<PageRequest> {
        let limit = match parse_field("limit", self.limit.as_deref(), 1)? {
            Some(limit) => limit,
            None => default_limit,
        };
        let offset = parse_field("offset", self.offset.as_deref(), 0)?.unwrap_or(0);
        Ok(PageRequest { limit, offset })
    }
}

fn parse_field(field: &str, raw: Option<&str>, min: i64) -> Result<Option<usize>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ThreadsError::validation(field, "A valid integer is required."))?;
    if value < min {
        return Err(ThreadsError::validation(
            field,
            format!("Ensure this value is greater than or equal to {}.", min),
        ));
    }
    Ok(Some(value as usize))
}

/// A validated window into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Offset of the following page, if any rows remain.
    pub fn next_offset(&self, count: usize) -> Option<usize> {
        let next = self.offset + self.limit;
        (next < count).then_some(next)
    }

    /// Offset of the preceding page, if this is not the first.
    pub fn previous_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
