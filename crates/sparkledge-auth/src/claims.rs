//! JWT claim structures.
//!
//! - [`SessionClaims`]: payload of both access and refresh tokens
//! - [`ResetTokenClaims`]: payload of password-reset tokens

use serde::{Deserialize, Serialize};

/// The account facts a session token vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub id: i32,
    pub email: String,
    pub is_verified: bool,
}

/// Claims carried by access and refresh tokens.
///
/// Serialized in camelCase so the payload reads `{id, email, isVerified, ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Account id
    pub id: i32,
    pub email: String,
    pub is_verified: bool,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
    /// Unique token identifier, keeps tokens minted in the same second distinct
    pub jti: String,
}

impl SessionClaims {
    pub fn subject(&self) -> SessionSubject {
        SessionSubject {
            id: self.id,
            email: self.email.clone(),
            is_verified: self.is_verified,
        }
    }
}

/// Claims carried by password-reset tokens.
///
/// These tokens are signed with the account's current password hash, not with
/// a configured secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTokenClaims {
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}
