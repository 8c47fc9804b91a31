//! Credential hashing.
//!
//! Passwords are hashed with bcrypt at [`DEFAULT_COST`]; every call generates a
//! fresh salt, so hashing the same input twice yields different outputs.
//!
//! Refresh tokens are JWTs well past bcrypt's 72-byte input limit, and two
//! tokens for the same account share their first 72 bytes (header plus
//! subject). They are therefore reduced to a hex SHA-256 digest before being
//! handed to bcrypt.

use bcrypt::{DEFAULT_COST, hash, verify};
use sha2::{Digest, Sha256};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Salted one-way hash of a raw refresh token, suitable for storage.
pub fn hash_refresh_token(token: &str) -> Result<String, AppError> {
    hash(token_digest(token), DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash refresh token: {}", e)))
}

/// Compares a presented refresh token against a hash from [`hash_refresh_token`].
///
/// A malformed stored hash is reported as a mismatch rather than an error.
pub fn verify_refresh_token_hash(token: &str, stored_hash: &str) -> bool {
    verify(token_digest(token), stored_hash).unwrap_or(false)
}
