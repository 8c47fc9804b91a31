use async_trait::async_trait;

use sparkledge_core::AppError;
use sparkledge_models::{NewUser, UserAccount, UserChanges};

/// Persistence seam for account records.
///
/// Every call touches a single record and is atomic on its own. Nothing spans
/// calls: two concurrent `update`s on the same email resolve last-write-wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AppError>;

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// [`AppError::DuplicateIdentity`] if the email is already taken.
    async fn create(&self, new_user: NewUser) -> Result<UserAccount, AppError>;

    /// Applies `changes` to the account with `email`.
    ///
    /// Returns `None` when no account matched.
    async fn update(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<UserAccount>, AppError>;
}
