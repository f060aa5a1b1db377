use super::{timestamp_column, timestamp_to_sql, Store};
use crate::models::{NewUser, User};
use crate::{Result, ThreadsError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_staff, is_superuser, date_joined";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_staff: row.get(4)?,
        is_superuser: row.get(5)?,
        date_joined: timestamp_column(row, 6)?,
    })
}

fn load_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

impl Store {
    /// Insert a user. Usernames are unique and may not be blank.
    pub fn create_user(&self, new_user: &NewUser) -> Result<User> {
        let username = new_user.username.trim();
        if username.is_empty() {
            return Err(ThreadsError::validation(
                "username",
                "This field may not be blank.",
            ));
        }

        let conn = self.conn()?;
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            [username],
            |row| row.get(0),
        )?;
        if taken {
            return Err(ThreadsError::validation(
                "username",
                "A user with that username already exists.",
            ));
        }

        conn.execute(
            "INSERT INTO users (username, email, password_hash, is_staff, is_superuser, date_joined)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                username,
                new_user.email,
                new_user.password_hash,
                new_user.is_staff,
                new_user.is_superuser,
                timestamp_to_sql(&Utc::now()),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Created user {} ({})", id, username);

        load_user(&conn, id)?.ok_or(ThreadsError::UserNotFound { user_id: id })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        load_user(&conn, id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Replace a user's password hash. Returns false for an unknown id.
    pub fn set_password(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user_id],
        )?;
        Ok(updated > 0)
    }

    /// All users ordered by id.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "!".to_string(),
            ..NewUser::default()
        }
    }

    #[test]
    fn test_set_password() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(&new_user("user1")).unwrap();

        assert!(store.set_password(user.id, "new-hash").unwrap());
        let user = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert!(!store.set_password(9999, "x").unwrap());
    }

    #[test]
    fn test_create_and_get_user() {
        let store = Store::open_in_memory().unwrap();
        let user = store.create_user(&new_user("user1")).unwrap();
        assert_eq!(user.username, "user1");
        assert!(!user.is_staff);

        let loaded = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(loaded.email, "user1@example.com");

        let by_name = store.get_user_by_username("user1").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(store.user_exists(user.id).unwrap());
        assert!(!store.user_exists(user.id + 100).unwrap());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = Store::open_in_memory().unwrap();
        store.create_user(&new_user("user1")).unwrap();
        let err = store.create_user(&new_user("user1")).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_blank_username_rejected() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.create_user(&new_user("   ")).is_err());
        assert!(store.list_users().unwrap().is_empty());
    }
}
