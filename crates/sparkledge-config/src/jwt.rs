use std::env;

use crate::duration_or;

/// Token signing configuration.
///
/// Expiry values are in seconds.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_token_expiry: i64,
    pub refresh_secret: String,
    pub refresh_token_expiry: i64,
    pub reset_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            access_secret: lookup("JWT_ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|| "access-secret-change-in-production".to_string()),
            access_token_expiry: duration_or(
                "JWT_ACCESS_TOKEN_EXPIRATION_TIME",
                lookup("JWT_ACCESS_TOKEN_EXPIRATION_TIME"),
                3600, // 1 hour
            ),
            refresh_secret: lookup("JWT_REFRESH_TOKEN_SECRET")
                .unwrap_or_else(|| "refresh-secret-change-in-production".to_string()),
            refresh_token_expiry: duration_or(
                "JWT_REFRESH_TOKEN_EXPIRATION_TIME",
                lookup("JWT_REFRESH_TOKEN_EXPIRATION_TIME"),
                604800, // 7 days
            ),
            reset_token_expiry: duration_or(
                "JWT_FORGOT_PASSWORD_TOKEN_EXPIRATION_TIME",
                lookup("JWT_FORGOT_PASSWORD_TOKEN_EXPIRATION_TIME"),
                3600,
            ),
        }
    }
}
