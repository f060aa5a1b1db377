//! HS256 access/refresh tokens.

use crate::models::User;
use crate::{Result, ThreadsError};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use utoipa::ToSchema;

/// Detail returned for every rejected token, whatever the cause.
pub const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string.
    pub sub: String,
    pub username: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            token_type,
            iat: now,
            exp: now + expires_in.as_secs() as i64,
        }
    }

    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| ThreadsError::InvalidToken(INVALID_TOKEN.to_string()))
    }
}

/// Access and refresh token issued together at login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates tokens with one shared secret.
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl JwtAuth {
    pub fn new(secret: &[u8], access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_lifetime,
            refresh_lifetime,
        }
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    fn decode_expecting(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ThreadsError::InvalidToken(INVALID_TOKEN.to_string()))?;
        if claims.token_type != expected {
            debug!("Rejected {:?} token where {:?} was expected", claims.token_type, expected);
            return Err(ThreadsError::InvalidToken(INVALID_TOKEN.to_string()));
        }
        Ok(claims)
    }

    /// Issue a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.issue_access(user)?,
            refresh: self.encode(&Claims::new(user, TokenType::Refresh, self.refresh_lifetime))?,
        })
    }

    pub fn issue_access(&self, user: &User) -> Result<String> {
        self.encode(&Claims::new(user, TokenType::Access, self.access_lifetime))
    }

    /// Validate a bearer token presented on a request.
    pub fn decode_access(&self, token: &str) -> Result<Claims> {
        self.decode_expecting(token, TokenType::Access)
    }

    /// Validate a refresh token and return its claims.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims> {
        self.decode_expecting(token, TokenType::Refresh)
    }
}
