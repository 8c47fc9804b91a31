//! # Sparkledge Auth
//!
//! Token types and JWT utilities for the Sparkledge account service.
//!
//! - [`claims`]: claim structures for session and reset tokens
//! - [`jwt`]: token creation and verification
//!
//! # Token Types
//!
//! - **Access Token** ([`SessionClaims`]): short-lived, authorizes requests
//! - **Refresh Token** ([`SessionClaims`]): long-lived, exchanged for a new pair
//! - **Reset Token** ([`ResetTokenClaims`]): one password change, keyed by the
//!   current password hash

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{ResetTokenClaims, SessionClaims, SessionSubject};
pub use jwt::{
    create_access_token, create_refresh_token, create_reset_token, verify_access_token,
    verify_refresh_token, verify_reset_token,
};
