//! # Sparkledge Core
//!
//! Core types shared by every Sparkledge crate:
//!
//! - [`errors`]: the [`AppError`] taxonomy returned by account operations
//! - [`password`]: bcrypt hashing for passwords and refresh tokens
//!
//! # Example
//!
//! ```ignore
//! use sparkledge_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("Passw0rd!")?;
//! assert!(verify_password("Passw0rd!", &hash)?);
//! ```

pub mod errors;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, hash_refresh_token, verify_password, verify_refresh_token_hash};
