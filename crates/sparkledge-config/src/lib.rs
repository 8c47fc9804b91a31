//! # Sparkledge Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: signing secrets and expiry windows for access, refresh and reset tokens
//! - [`email`]: SMTP transport, sender identity and the frontend base URL
//! - [`auth`]: the flattened [`AuthConfig`] handed to the account service
//!
//! # Example
//!
//! ```ignore
//! use sparkledge_config::{AuthConfig, EmailConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! let auth_config = AuthConfig::new(&jwt_config, &email_config);
//! ```

use tracing::warn;

pub mod auth;
pub mod email;
pub mod jwt;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;

pub(crate) fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// Parses a time span in seconds: plain seconds (`"600"`) or a number with an
/// `s`, `m`, `h` or `d` suffix (`"600s"`, `"15m"`, `"12h"`, `"7d"`).
pub fn parse_duration_secs(value: &str) -> Option<i64> {
    let value = value.trim().to_ascii_lowercase();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: i64 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    amount.checked_mul(multiplier)
}

/// Reads a duration variable, warning and falling back to `default` when it
/// is set but unparseable.
pub(crate) fn duration_or(key: &str, value: Option<String>, default: i64) -> i64 {
    match value {
        None => default,
        Some(raw) => parse_duration_secs(&raw).unwrap_or_else(|| {
            warn!(
                key,
                value = %raw,
                default,
                "unparseable duration, using default"
            );
            default
        }),
    }
}
