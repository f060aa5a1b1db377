//! Result ordering accepted by the list endpoints.

use serde::{Deserialize, Serialize};

/// Sort order for thread and message listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ordering {
    CreatedAsc,
    CreatedDesc,
    UpdatedDesc,
}

impl Ordering {
    /// Parse an `ordering` query value, falling back to `default`.
    ///
    /// Only `created` and `-created` are orderable. The value may be a
    /// comma-separated list; the first recognised field wins and unknown
    /// fields are ignored.
    pub fn from_query(value: Option<&str>, default: Ordering) -> Ordering {
        let Some(value) = value else {
            return default;
        };
        value
            .split(',')
            .map(str::trim)
            .find_map(|field| match field {
                "created" => Some(Ordering::CreatedAsc),
                "-created" => Some(Ordering::CreatedDesc),
                _ => None,
            })
            .unwrap_or(default)
    }

    /// SQL `ORDER BY` body for a table alias. Ties break on id.
    pub fn order_clause(&self, alias: &str) -> String {
        match self {
            Ordering::CreatedAsc => format!("{alias}.created ASC, {alias}.id ASC"),
            Ordering::CreatedDesc => format!("{alias}.created DESC, {alias}.id DESC"),
            Ordering::UpdatedDesc => format!("{alias}.updated DESC, {alias}.id DESC"),
        }
    }
}
