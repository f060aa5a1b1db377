//! Demo data for local development.

use crate::auth::PasswordHasher;
use crate::models::NewUser;
use crate::store::Store;
use crate::Result;
use tracing::info;

/// What [`setup_test_data`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureOutcome {
    Created { users: usize, threads: usize, messages: usize },
    AlreadyPresent,
}

/// Create `admin`, `user1` and `user2` (password = username), a thread between
/// the two regular users and a short exchange in it.
///
/// Does nothing when an `admin` account already exists.
pub fn setup_test_data(store: &Store, hasher: &dyn PasswordHasher) -> Result<FixtureOutcome> {
    if store.get_user_by_username("admin")?.is_some() {
        info!("Test data already present, skipping");
        return Ok(FixtureOutcome::AlreadyPresent);
    }

    let account = |username: &str, staff: bool| -> Result<NewUser> {
        Ok(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: hasher.hash(username)?,
            is_staff: staff,
            is_superuser: staff,
        })
    };

    store.create_user(&account("admin", true)?)?;
    let user1 = store.create_user(&account("user1", false)?)?;
    let user2 = store.create_user(&account("user2", false)?)?;

    let thread = match store.find_thread_between(user1.id, user2.id)? {
        Some(thread) => thread,
        None => store.create_thread(Some(user1.id), user1.id, user2.id)?,
    };

    store.create_message(thread.id, user1.id, "Hello from user1!")?;
    store.create_message(thread.id, user2.id, "Hi user1!")?;

    info!("Test data created successfully");
    Ok(FixtureOutcome::Created {
        users: 3,
        threads: 1,
        messages: 2,
    })
}
