//! Threads Core - private two-party message threads.
//!
//! This crate holds the domain model, the SQLite store and the services that
//! enforce who may read, write and delete what. It has no HTTP layer; the
//! `threads-server` crate exposes it as a REST API.
//!
//! # Example
//!
//! ```rust,ignore
//! use threads_core::{MessageService, Store, ThreadService};
//!
//! let store = Store::open("threads.db")?;
//! store.migrate()?;
//!
//! let thread = ThreadService::new(&store).get_or_create_thread(1, 2)?;
//! MessageService::new(&store).create_message(1, thread.id, "Hello!")?;
//! ```

pub mod auth;
pub mod config;
pub mod dump;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod ordering;
pub mod pagination;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use auth::{Argon2Hasher, JwtAuth, PasswordHasher, TokenPair};
pub use config::Settings;
pub use error::{Result, ThreadsError};
pub use models::{Message, MessageRead, NewUser, Thread, ThreadRead, User, UserSummary};
pub use ordering::Ordering;
pub use pagination::{Page, PageQuery, PageRequest};
pub use services::{AdminService, MessageService, ThreadService, UserService};
pub use store::Store;
