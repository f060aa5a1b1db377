//! Credentials: password hashing, bearer tokens and login.

mod jwt;
mod password;

pub use jwt::{Claims, JwtAuth, TokenPair, TokenType, INVALID_TOKEN};
pub use password::{Argon2Hasher, PasswordHasher};

use crate::models::User;
use crate::store::Store;
use crate::{Result, ThreadsError};
use tracing::warn;

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Check a username/password pair against the store.
pub fn authenticate(
    store: &Store,
    hasher: &dyn PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User> {
    let Some(user) = store.get_user_by_username(username)? else {
        warn!("Login attempt for unknown user {}", username);
        return Err(ThreadsError::Authentication(INVALID_CREDENTIALS.to_string()));
    };

    // Unusable hashes (e.g. "!") simply fail verification.
    let matches = hasher.verify(password, &user.password_hash).unwrap_or(false);
    if !matches {
        warn!("Rejected password for user {}", username);
        return Err(ThreadsError::Authentication(INVALID_CREDENTIALS.to_string()));
    }
    Ok(user)
}

/// Resolve the user behind an access token.
pub fn user_from_access_token(store: &Store, jwt: &JwtAuth, token: &str) -> Result<User> {
    let claims = jwt.decode_access(token)?;
    let user_id = claims.user_id()?;
    store
        .get_user(user_id)?
        .ok_or_else(|| ThreadsError::InvalidToken(INVALID_TOKEN.to_string()))
}

/// Exchange a refresh token for a new access token.
pub fn refresh_access_token(store: &Store, jwt: &JwtAuth, refresh: &str) -> Result<String> {
    let claims = jwt.decode_refresh(refresh)?;
    let user = store
        .get_user(claims.user_id()?)?
        .ok_or_else(|| ThreadsError::InvalidToken(INVALID_TOKEN.to_string()))?;
    jwt.issue_access(&user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use std::time::Duration;

    #[test]
    fn test_authenticate() {
        let store = Store::open_in_memory().unwrap();
        let hasher = Argon2Hasher::new();
        store
            .create_user(&NewUser {
                username: "user1".into(),
                password_hash: hasher.hash("user1").unwrap(),
                ..NewUser::default()
            })
            .unwrap();

        assert!(authenticate(&store, &hasher, "user1", "user1").is_ok());
        let err = authenticate(&store, &hasher, "user1", "wrong").unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        assert!(authenticate(&store, &hasher, "ghost", "user1").is_err());
    }

    #[test]
    fn test_token_for_deleted_user_rejected() {
        let store = Store::open_in_memory().unwrap();
        let jwt = JwtAuth::new(b"k", Duration::from_secs(60), Duration::from_secs(60));
        let user = store
            .create_user(&NewUser {
                username: "user1".into(),
                password_hash: "!".into(),
                ..NewUser::default()
            })
            .unwrap();
        let pair = jwt.issue_pair(&user).unwrap();

        assert_eq!(user_from_access_token(&store, &jwt, &pair.access).unwrap().id, user.id);
        let access = refresh_access_token(&store, &jwt, &pair.refresh).unwrap();
        assert!(jwt.decode_access(&access).is_ok());

        let empty = Store::open_in_memory().unwrap();
        let err = user_from_access_token(&empty, &jwt, &pair.access).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN);
        let err = refresh_access_token(&empty, &jwt, &pair.refresh).unwrap_err();
        assert_eq!(err.to_string(), INVALID_TOKEN);
    }
}
