//! Account models.
//!
//! [`UserAccount`] is the stored record including credential material and is
//! never serialized. [`User`] is the public view handed back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use sparkledge_auth::SessionSubject;

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// bcrypt hash of the current password
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub is_verified: bool,
    /// bcrypt hash of the live refresh token, `None` when logged out
    #[sqlx(rename = "refresh_token")]
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn session_subject(&self) -> SessionSubject {
        SessionSubject {
            id: self.id,
            email: self.email.clone(),
            is_verified: self.is_verified,
        }
    }

    pub fn has_active_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserAccount> for User {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            is_verified: account.is_verified,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Fields for a new account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Partial update of an account. `None` leaves a field untouched.
///
/// `refresh_token_hash` is doubly optional: `Some(None)` clears the stored
/// hash, `Some(Some(h))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub password_hash: Option<String>,
    pub is_verified: Option<bool>,
    pub refresh_token_hash: Option<Option<String>>,
}

impl UserChanges {
    pub fn password(hash: String) -> Self {
        Self {
            password_hash: Some(hash),
            ..Default::default()
        }
    }

    pub fn refresh_token(hash: Option<String>) -> Self {
        Self {
            refresh_token_hash: Some(hash),
            ..Default::default()
        }
    }

    pub fn verified() -> Self {
        Self {
            is_verified: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.is_verified.is_none() && self.refresh_token_hash.is_none()
    }

    /// Applies the changes to an in-memory record.
    pub fn apply_to(&self, account: &mut UserAccount) {
        if let Some(hash) = &self.password_hash {
            account.password_hash = hash.clone();
        }
        if let Some(verified) = self.is_verified {
            account.is_verified = verified;
        }
        if let Some(refresh) = &self.refresh_token_hash {
            account.refresh_token_hash = refresh.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> UserAccount {
        let now = Utc::now();
        UserAccount {
            id: 1,
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            is_verified: false,
            refresh_token_hash: Some("$2b$12$refresh".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_view_has_no_credentials() {
        let user = User::from(account());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("$2b$12$"));
        assert!(json.contains(r#""is_verified":false"#));
    }

    #[test]
    fn test_clear_refresh_token() {
        let mut account = account();
        assert!(account.has_active_session());
        UserChanges::refresh_token(None).apply_to(&mut account);
        assert!(!account.has_active_session());
        assert_eq!(account.password_hash, "$2b$12$hash");
    }

    #[test]
    fn test_default_changes_are_noop() {
        let mut account = account();
        let changes = UserChanges::default();
        assert!(changes.is_empty());
        changes.apply_to(&mut account);
        assert!(account.has_active_session());
        assert!(!account.is_verified);
    }

    #[test]
    fn test_verified_and_password_changes() {
        let mut account = account();
        UserChanges::verified().apply_to(&mut account);
        UserChanges::password("$2b$12$new".to_string()).apply_to(&mut account);
        assert!(account.is_verified);
        assert_eq!(account.password_hash, "$2b$12$new");
    }

    #[test]
    fn test_session_subject() {
        let subject = account().session_subject();
        assert_eq!(subject.id, 1);
        assert_eq!(subject.email, "a@x.com");
        assert!(!subject.is_verified);
    }
}
