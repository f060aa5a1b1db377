//! Domain records and their API projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Fields needed to insert a user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Public view of a user embedded in threads and messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// A stored thread row, without its participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub creator_id: Option<i64>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Thread as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadRead {
    pub id: i64,
    pub participants: Vec<UserSummary>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ThreadRead {
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participants.iter().any(|p| p.id == user_id)
    }
}

/// A stored message row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub thread_id: i64,
    pub sender_id: i64,
    pub text: String,
    pub is_read: bool,
    pub created: DateTime<Utc>,
}

/// Message as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageRead {
    pub id: i64,
    pub sender: UserSummary,
    pub text: String,
    pub thread_id: i64,
    pub created: DateTime<Utc>,
    pub is_read: bool,
}

/// Canonical key for an unordered pair of users.
pub fn pair_key(a: i64, b: i64) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", low, high)
}

/// Truncate text to at most `max` characters.
pub fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
