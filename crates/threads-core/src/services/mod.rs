//! Business rules on top of [`Store`](crate::store::Store).
//!
//! Services borrow the store and are constructed per request. They own the
//! permission checks and the not-found / forbidden distinctions; the store
//! only runs queries.

mod admin;
mod messages;
mod threads;
mod users;

pub use admin::AdminService;
pub use messages::{validate_text, MessageService};
pub use threads::ThreadService;
pub use users::UserService;
