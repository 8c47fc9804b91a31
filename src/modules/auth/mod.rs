//! Credential and session management.

pub mod service;

pub use service::AuthService;
