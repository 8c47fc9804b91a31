//! # Sparkledge Models
//!
//! Account records and request/response DTOs.
//!
//! - [`auth`]: sign-in, refresh, password reset and verification DTOs
//! - [`users`]: the stored account record, its public view and update shapes

pub mod auth;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, TokenPair, VerifyEmailRequest,
};

pub use users::{NewUser, User, UserAccount, UserChanges};
