use std::sync::Arc;

use tracing::{info, instrument, warn};

use sparkledge_auth::{
    SessionClaims, create_access_token, create_refresh_token, create_reset_token,
    verify_access_token, verify_refresh_token, verify_reset_token,
};
use sparkledge_config::{AuthConfig, JwtConfig};
use sparkledge_core::{
    AppError, hash_password, hash_refresh_token, verify_password, verify_refresh_token_hash,
};
use sparkledge_models::{NewUser, TokenPair, User, UserAccount, UserChanges};

use crate::modules::users::UserStore;
use crate::utils::email::{Mailer, password_reset_email, password_reset_link};

/// Credential and session manager.
///
/// Owns registration, sign-in, refresh-token rotation, logout, password reset
/// and email verification. Holds no mutable state of its own; everything lives
/// in the [`UserStore`].
pub struct AuthService<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    config: AuthConfig,
    jwt: JwtConfig,
}

impl<S, M> Clone for AuthService<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mailer: Arc::clone(&self.mailer),
            config: self.config.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

impl<S: UserStore, M: Mailer> AuthService<S, M> {
    pub fn new(store: Arc<S>, mailer: Arc<M>, config: AuthConfig) -> Self {
        let jwt = config.jwt();
        Self {
            store,
            mailer,
            config,
            jwt,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Creates an unverified account with no active session.
    ///
    /// # Errors
    ///
    /// [`AppError::DuplicateIdentity`] if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(password)?;

        let account = self
            .store
            .create(NewUser {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = account.id, "user registered");
        Ok(account.into())
    }

    /// Checks credentials and opens a session.
    ///
    /// A new refresh token replaces whatever session the account had before.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidCredentials`] for an unknown email and for a wrong
    /// password alike.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            warn!("sign-in failed");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_hash)? {
            warn!(user_id = account.id, "sign-in failed");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.issue_session(&account).await?;
        info!(user_id = account.id, "user signed in");
        Ok(tokens)
    }

    /// Exchanges the current refresh token for a new pair.
    ///
    /// The presented token must verify with the refresh secret, belong to
    /// `email`, and match the hash stored on the account. On success the stored
    /// hash is replaced, so the presented token cannot be used again.
    ///
    /// # Errors
    ///
    /// [`AppError::AccessDenied`] on any failed check.
    #[instrument(skip(self, presented_token))]
    pub async fn refresh(&self, email: &str, presented_token: &str) -> Result<TokenPair, AppError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::AccessDenied)?;

        let claims = verify_refresh_token(presented_token, &self.jwt)?;
        if claims.email != account.email || claims.id != account.id {
            warn!(user_id = account.id, "refresh token issued for another account");
            return Err(AppError::AccessDenied);
        }

        let Some(stored_hash) = account.refresh_token_hash.as_deref() else {
            warn!(user_id = account.id, "refresh without an active session");
            return Err(AppError::AccessDenied);
        };

        if !verify_refresh_token_hash(presented_token, stored_hash) {
            warn!(user_id = account.id, "refresh token superseded or revoked");
            return Err(AppError::AccessDenied);
        }

        let tokens = self.issue_session(&account).await?;
        info!(user_id = account.id, "session refreshed");
        Ok(tokens)
    }

    /// Ends the account's session. Safe to call repeatedly or for unknown emails.
    #[instrument(skip(self))]
    pub async fn logout(&self, email: &str) -> Result<(), AppError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            return Ok(());
        };

        if account.has_active_session() {
            self.store
                .update(email, UserChanges::refresh_token(None))
                .await?;
            info!(user_id = account.id, "user logged out");
        }

        Ok(())
    }

    /// Emails a password-reset link.
    ///
    /// The token is signed with the account's current password hash and
    /// therefore stops working once the password changes.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] for an unknown email. A mail failure is returned
    /// as [`AppError::InternalFailure`].
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("Email not found."))?;

        let token = create_reset_token(
            &account.email,
            &account.password_hash,
            self.config.reset_ttl,
        )?;
        let link = password_reset_link(&self.config.base_url, &account.email, &token)?;

        self.mailer
            .send(password_reset_email(&account.email, &link))
            .await?;

        info!(user_id = account.id, "password reset requested");
        Ok(())
    }

    /// Sets a new password if `token` is a live reset token for `email`.
    ///
    /// Active sessions are left alone.
    ///
    /// # Errors
    ///
    /// [`AppError::InvalidToken`] if the account is unknown or the token does
    /// not verify against the current password hash.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<User, AppError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidToken)?;

        let claims = verify_reset_token(token, &account.password_hash)?;
        if claims.email != account.email {
            warn!(user_id = account.id, "reset token issued for another email");
            return Err(AppError::InvalidToken);
        }

        let password_hash = hash_password(new_password)?;
        let updated = self
            .store
            .update(email, UserChanges::password(password_hash))
            .await?
            .ok_or(AppError::InvalidToken)?;

        info!(user_id = updated.id, "password reset");
        Ok(updated.into())
    }

    /// Marks the account's email as verified. Idempotent.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] for an unknown email.
    #[instrument(skip(self))]
    pub async fn confirm_email_verification(&self, email: &str) -> Result<User, AppError> {
        let account = self
            .store
            .update(email, UserChanges::verified())
            .await?
            .ok_or_else(|| AppError::not_found("User not found."))?;

        info!(user_id = account.id, "email verified");
        Ok(account.into())
    }

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// [`AppError::AccessDenied`] if the token is expired, malformed or forged.
    pub fn authenticate(&self, access_token: &str) -> Result<SessionClaims, AppError> {
        verify_access_token(access_token, &self.jwt)
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.store.find_by_email(email).await?.map(User::from))
    }

    #[instrument(skip(self))]
    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.store.find_by_id(id).await?.map(User::from))
    }

    async fn issue_session(&self, account: &UserAccount) -> Result<TokenPair, AppError> {
        let subject = account.session_subject();
        let access_token = create_access_token(&subject, &self.jwt)?;
        let refresh_token = create_refresh_token(&subject, &self.jwt)?;

        let refresh_hash = hash_refresh_token(&refresh_token)?;
        self.store
            .update(&account.email, UserChanges::refresh_token(Some(refresh_hash)))
            .await?
            .ok_or_else(|| AppError::internal_error("account vanished while issuing session"))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
