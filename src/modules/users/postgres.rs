use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use sparkledge_core::AppError;
use sparkledge_models::{NewUser, UserAccount, UserChanges};

use super::repository::UserStore;

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password, is_verified, refresh_token, created_at, updated_at";

/// [`UserStore`] backed by the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        sqlx::query_as::<_, UserAccount>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("Failed to fetch user by email")
        .map_err(AppError::internal)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<UserAccount>, AppError> {
        sqlx::query_as::<_, UserAccount>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch user by id")
            .map_err(AppError::internal)
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: NewUser) -> Result<UserAccount, AppError> {
        let result = sqlx::query_as::<_, UserAccount>(&format!(
            "INSERT INTO users (email, first_name, last_name, password)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(account) => Ok(account),
            Err(err) if is_unique_violation(&err) => {
                debug!("email already registered");
                Err(AppError::DuplicateIdentity)
            }
            Err(err) => Err(AppError::internal(
                anyhow::Error::new(err).context("Failed to insert user"),
            )),
        }
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        email: &str,
        changes: UserChanges,
    ) -> Result<Option<UserAccount>, AppError> {
        if changes.is_empty() {
            return self.find_by_email(email).await;
        }

        let (set_refresh, refresh_value) = match changes.refresh_token_hash {
            Some(value) => (true, value),
            None => (false, None),
        };

        sqlx::query_as::<_, UserAccount>(&format!(
            "UPDATE users
             SET password = COALESCE($2, password),
                 is_verified = COALESCE($3, is_verified),
                 refresh_token = CASE WHEN $4 THEN $5 ELSE refresh_token END,
                 updated_at = NOW()
             WHERE email = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(changes.password_hash)
        .bind(changes.is_verified)
        .bind(set_refresh)
        .bind(refresh_value)
        .fetch_optional(&self.db)
        .await
        .context("Failed to update user")
        .map_err(AppError::internal)
    }
}
