//! Token creation and verification.
//!
//! All tokens are HS256 JWTs with an `exp` claim. Verification fails closed:
//! a bad signature, a malformed token and an expired token all produce the same
//! error.
//!
//! - Access tokens: signed with `access_secret`, short-lived
//! - Refresh tokens: signed with `refresh_secret`, long-lived
//! - Reset tokens: signed with the account's current password hash, so they
//!   stop verifying as soon as the password changes
//!
//! # Example
//!
//! ```ignore
//! use sparkledge_auth::{SessionSubject, create_access_token, verify_access_token};
//! use sparkledge_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let subject = SessionSubject { id: 1, email: "a@x.com".into(), is_verified: false };
//! let token = create_access_token(&subject, &config)?;
//! let claims = verify_access_token(&token, &config)?;
//! assert_eq!(claims.id, 1);
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use sparkledge_config::JwtConfig;
use sparkledge_core::AppError;

use crate::claims::{ResetTokenClaims, SessionClaims, SessionSubject};

fn expiry_from_now(ttl_seconds: i64) -> (usize, usize) {
    let now = Utc::now().timestamp();
    (now as usize, now.saturating_add(ttl_seconds).max(0) as usize)
}

fn sign_session(
    subject: &SessionSubject,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let (iat, exp) = expiry_from_now(ttl_seconds);

    let claims = SessionClaims {
        id: subject.id,
        email: subject.email.clone(),
        is_verified: subject.is_verified,
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

fn decode_session(token: &str, secret: &str) -> Option<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Creates a short-lived access token for `subject`.
pub fn create_access_token(
    subject: &SessionSubject,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    sign_session(
        subject,
        &jwt_config.access_secret,
        jwt_config.access_token_expiry,
    )
}

/// Creates a long-lived refresh token for `subject`.
///
/// Each call embeds a fresh `jti`, so two refresh tokens are never equal.
pub fn create_refresh_token(
    subject: &SessionSubject,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    sign_session(
        subject,
        &jwt_config.refresh_secret,
        jwt_config.refresh_token_expiry,
    )
}

/// Verifies an access token.
///
/// # Errors
///
/// [`AppError::AccessDenied`] if the token is malformed, expired, or signed
/// with another secret.
pub fn verify_access_token(token: &str, jwt_config: &JwtConfig) -> Result<SessionClaims, AppError> {
    decode_session(token, &jwt_config.access_secret).ok_or(AppError::AccessDenied)
}

/// Verifies a refresh token's signature and expiry.
///
/// This does not check the token against the hash stored on the account;
/// rotation and revocation are enforced by the caller.
pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<SessionClaims, AppError> {
    decode_session(token, &jwt_config.refresh_secret).ok_or(AppError::AccessDenied)
}

/// Creates a password-reset token for `email`, keyed by `password_hash`.
pub fn create_reset_token(
    email: &str,
    password_hash: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let (iat, exp) = expiry_from_now(ttl_seconds);

    let claims = ResetTokenClaims {
        email: email.to_string(),
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(password_hash.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create reset token: {}", e)))
}

/// Verifies a password-reset token against the account's current password hash.
///
/// # Errors
///
/// [`AppError::InvalidToken`] on any verification failure, including a
/// password that changed after the token was issued.
pub fn verify_reset_token(token: &str, password_hash: &str) -> Result<ResetTokenClaims, AppError> {
    decode::<ResetTokenClaims>(
        token,
        &DecodingKey::from_secret(password_hash.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            refresh_token_expiry: 604800,
            reset_token_expiry: 3600,
        }
    }

    fn subject() -> SessionSubject {
        SessionSubject {
            id: 42,
            email: "test@example.com".to_string(),
            is_verified: true,
        }
    }

    #[test]
    fn test_access_token_round() {
        let config = get_test_jwt_config();
        let token = create_access_token(&subject(), &config).unwrap();
        assert!(!token.is_empty());

        let claims = verify_access_token(&token, &config).unwrap();
        assert_eq!(claims.subject(), subject());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_access_token_rejected_as_refresh_token() {
        let config = get_test_jwt_config();
        let token = create_access_token(&subject(), &config).unwrap();

        let result = verify_refresh_token(&token, &config);
        assert!(matches!(result, Err(AppError::AccessDenied)));
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let config = get_test_jwt_config();
        let token = create_refresh_token(&subject(), &config).unwrap();

        assert!(verify_refresh_token(&token, &config).is_ok());
        assert!(matches!(
            verify_access_token(&token, &config),
            Err(AppError::AccessDenied)
        ));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        let config = get_test_jwt_config();
        let first = create_refresh_token(&subject(), &config).unwrap();
        let second = create_refresh_token(&subject(), &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_refresh_outlives_access() {
        let config = get_test_jwt_config();
        let access = create_access_token(&subject(), &config).unwrap();
        let refresh = create_refresh_token(&subject(), &config).unwrap();

        let access_claims = verify_access_token(&access, &config).unwrap();
        let refresh_claims = verify_refresh_token(&refresh, &config).unwrap();
        assert!(refresh_claims.exp > access_claims.exp);
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let mut config = get_test_jwt_config();
        // well beyond the default 60s validation leeway
        config.access_token_expiry = -600;
        let token = create_access_token(&subject(), &config).unwrap();

        assert!(matches!(
            verify_access_token(&token, &config),
            Err(AppError::AccessDenied)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = get_test_jwt_config();
        let token = create_access_token(&subject(), &config).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = "eyJpZCI6MSwiZW1haWwiOiJldmlsQHguY29tIiwiaXNWZXJpZmllZCI6dHJ1ZX0";
        parts[1] = forged_payload;
        let forged = parts.join(".");

        assert!(verify_access_token(&forged, &config).is_err());
        assert!(verify_access_token("not-a-token", &config).is_err());
    }

    #[test]
    fn test_reset_token_round() {
        let hash = "$2b$12$abcdefghijklmnopqrstuuK2yZ7xk0a6mU2p8kS3Yg5xH1lqv9bW6";
        let token = create_reset_token("reset@example.com", hash, 3600).unwrap();

        let claims = verify_reset_token(&token, hash).unwrap();
        assert_eq!(claims.email, "reset@example.com");
    }

    #[test]
    fn test_reset_token_dies_with_password_hash() {
        let old_hash = "$2b$12$oldoldoldoldoldoldoldo0000000000000000000000000000000";
        let new_hash = "$2b$12$newnewnewnewnewnewnewn1111111111111111111111111111111";
        let token = create_reset_token("reset@example.com", old_hash, 3600).unwrap();

        assert!(matches!(
            verify_reset_token(&token, new_hash),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_reset_token_rejected() {
        let hash = "some-password-hash";
        let token = create_reset_token("reset@example.com", hash, -600).unwrap();
        assert!(matches!(
            verify_reset_token(&token, hash),
            Err(AppError::InvalidToken)
        ));
    }
}
