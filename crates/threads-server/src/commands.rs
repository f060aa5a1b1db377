//! Management commands run by the `threads-server` binary.

use crate::server::{start_server, AppState};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use threads_core::fixtures::{self, FixtureOutcome};
use threads_core::{dump, NewUser, PasswordHasher, Settings, Store, User};
use tracing::info;

/// Open the database file, creating its directory if needed.
pub fn open_store(path: &Path) -> Result<Store> {
    Store::open(path).with_context(|| format!("failed to open database {}", path.display()))
}

/// Apply pending schema migrations and return their names.
pub fn migrate(store: &Store) -> Result<Vec<String>> {
    let applied = store.migrate()?;
    if applied.is_empty() {
        info!("No migrations to apply");
    }
    for name in &applied {
        info!("Applied migration {}", name);
    }
    Ok(applied)
}

/// Create a staff superuser account.
pub fn create_superuser(
    store: &Store,
    hasher: &dyn PasswordHasher,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    if password.is_empty() {
        bail!("a password is required (--password or SUPERUSER_PASSWORD)");
    }
    if store.get_user_by_username(username)?.is_some() {
        bail!("user {} already exists", username);
    }

    let user = store.create_user(&NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hasher.hash(password)?,
        is_staff: true,
        is_superuser: true,
    })?;
    info!("Superuser {} created", user.username);
    Ok(user)
}

/// Set a new password for an existing account.
pub fn change_password(
    store: &Store,
    hasher: &dyn PasswordHasher,
    username: &str,
    password: &str,
) -> Result<()> {
    if password.is_empty() {
        bail!("the new password may not be blank");
    }
    let Some(user) = store.get_user_by_username(username)? else {
        bail!("user {} does not exist", username);
    };
    store.set_password(user.id, &hasher.hash(password)?)?;
    info!("Password changed for {}", user.username);
    Ok(())
}

/// Populate the database with demo accounts and messages.
pub fn setup_test_data(store: &Store, hasher: &dyn PasswordHasher) -> Result<FixtureOutcome> {
    Ok(fixtures::setup_test_data(store, hasher)?)
}

/// Write a JSON dump of every table into `dir`.
pub fn dump_db(store: &Store, dir: &Path, output: Option<&str>) -> Result<PathBuf> {
    Ok(dump::write_dump(store, dir, output)?)
}

/// Migrate, then serve the API until Ctrl-C.
pub async fn runserver(settings: Settings, host: &str, port: u16) -> Result<()> {
    settings.validate()?;

    let store = open_store(&settings.database_path)?;
    migrate(&store)?;

    let state = Arc::new(AppState::new(store, settings));
    let (addr, handle) = start_server(state, host, port).await?;
    info!("Serving API on http://{}", addr);

    handle.await??;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threads_core::Argon2Hasher;

    #[test]
    fn test_migrate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp.path().join("data").join("threads.db")).unwrap();

        assert_eq!(migrate(&store).unwrap(), vec!["0001_initial".to_string()]);
        assert!(migrate(&store).unwrap().is_empty());
    }

    #[test]
    fn test_create_superuser() {
        let store = Store::open_in_memory().unwrap();
        let hasher = Argon2Hasher::new();

        let user = create_superuser(&store, &hasher, "root", "root@example.com", "pw").unwrap();
        assert!(user.is_staff);
        assert!(user.is_superuser);
        assert!(hasher.verify("pw", &user.password_hash).unwrap());

        assert!(create_superuser(&store, &hasher, "root", "", "pw").is_err());
        assert!(create_superuser(&store, &hasher, "other", "", "").is_err());
    }

    #[test]
    fn test_change_password() {
        let store = Store::open_in_memory().unwrap();
        let hasher = Argon2Hasher::new();
        create_superuser(&store, &hasher, "root", "", "old").unwrap();

        change_password(&store, &hasher, "root", "new").unwrap();
        let user = store.get_user_by_username("root").unwrap().unwrap();
        assert!(hasher.verify("new", &user.password_hash).unwrap());
        assert!(!hasher.verify("old", &user.password_hash).unwrap());

        assert!(change_password(&store, &hasher, "missing", "pw").is_err());
    }

    #[test]
    fn test_dump_db_writes_named_file() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open_in_memory().unwrap();

        let path = dump_db(&store, tmp.path(), Some("out.json")).unwrap();
        assert_eq!(path, tmp.path().join("out.json"));
        assert!(path.exists());
    }
}
