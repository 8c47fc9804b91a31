use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use sparkledge_core::AppError;
use sparkledge_models::{NewUser, UserAccount, UserChanges};

use super::repository::UserStore;

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    users: HashMap<String, UserAccount>,
}

/// In-process [`UserStore`] for tests and local experiments.
///
/// Enforces email uniqueness like the `users` table does.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::internal_error("user store lock poisoned"))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        Ok(self.lock()?.users.get(email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AppError> {
        Ok(self.lock()?.users.values().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<UserAccount, AppError> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(&new_user.email) {
            return Err(AppError::DuplicateIdentity);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let account = UserAccount {
            id: inner.next_id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash: new_user.password_hash,
            is_verified: false,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    async fn update(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<UserAccount>, AppError> {
        let mut inner = self.lock()?;
        Ok(inner.users.get_mut(email).map(|account| {
            if !changes.is_empty() {
                changes.apply_to(account);
                account.updated_at = Utc::now();
            }
            account.clone()
        }))
    }
}
