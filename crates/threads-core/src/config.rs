//! Centralized configuration for the threads service.
//!
//! Constants live on unit structs grouped by concern. [`Settings`] carries the
//! values that vary per deployment and is filled in by the server CLI.

use crate::{Result, ThreadsError};
use std::path::PathBuf;
use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Threads";
    pub const API_TITLE: &'static str = "Threads API";
    pub const API_DESCRIPTION: &'static str = "Private two-party message threads";
    pub const API_VERSION: &'static str = "1.0.0";
    pub const API_PREFIX: &'static str = "/api/v1";
    pub const DEFAULT_BIND_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_BIND_PORT: u16 = 8000;
}

/// Limit/offset pagination defaults.
pub struct PaginationConfig;

impl PaginationConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 20;
}

/// Token lifetimes.
pub struct TokenConfig;

impl TokenConfig {
    pub const ACCESS_TOKEN_EXPIRES_MINUTES: u64 = 60;
    pub const REFRESH_TOKEN_EXPIRES_MINUTES: u64 = 60 * 24 * 14;
    pub const AUTH_HEADER_TYPE: &'static str = "Bearer";
}

/// Message constraints.
pub struct MessageConfig;

impl MessageConfig {
    pub const MAX_TEXT_LENGTH: usize = 1000;
    /// Length of the preview shown in logs and listings.
    pub const PREVIEW_LENGTH: usize = 50;
}

/// File and directory names.
pub struct PathsConfig;

impl PathsConfig {
    pub const DEFAULT_DATABASE_FILE: &'static str = "threads.db";
    pub const DUMPS_DIR_NAME: &'static str = "dumps";
    pub const DUMP_FILE_PREFIX: &'static str = "db_dump_";
}

/// Runtime settings for one deployment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub secret_key: String,
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(PathsConfig::DEFAULT_DATABASE_FILE),
            secret_key: String::new(),
            access_token_lifetime: Duration::from_secs(
                TokenConfig::ACCESS_TOKEN_EXPIRES_MINUTES * 60,
            ),
            refresh_token_lifetime: Duration::from_secs(
                TokenConfig::REFRESH_TOKEN_EXPIRES_MINUTES * 60,
            ),
            page_size: PaginationConfig::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.trim().is_empty() {
            return Err(ThreadsError::Config {
                message: "SECRET_KEY must be set".to_string(),
            });
        }
        if self.access_token_lifetime.is_zero() || self.refresh_token_lifetime.is_zero() {
            return Err(ThreadsError::Config {
                message: "token lifetimes must be greater than zero".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ThreadsError::Config {
                message: "PAGE_SIZE must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_need_secret() {
        let settings = Settings::default();
        assert!(settings.validate().is_err());

        let settings = Settings {
            secret_key: "not-a-real-secret".into(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.refresh_token_lifetime.as_secs(), 14 * 24 * 3600);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let settings = Settings {
            secret_key: "k".into(),
            page_size: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
