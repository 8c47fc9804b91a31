use crate::email::EmailConfig;
use crate::jwt::JwtConfig;

/// Everything the account service needs, in one place.
///
/// Expiry windows are in seconds.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub access_secret: String,
    pub access_ttl: i64,
    pub refresh_secret: String,
    pub refresh_ttl: i64,
    pub reset_ttl: i64,
    /// `From` header for outbound mail.
    pub mail_sender: String,
    /// Base URL for password-reset links.
    pub base_url: String,
}

impl AuthConfig {
    pub fn new(jwt: &JwtConfig, email: &EmailConfig) -> Self {
        Self {
            access_secret: jwt.access_secret.clone(),
            access_ttl: jwt.access_token_expiry,
            refresh_secret: jwt.refresh_secret.clone(),
            refresh_ttl: jwt.refresh_token_expiry,
            reset_ttl: jwt.reset_token_expiry,
            mail_sender: email.sender(),
            base_url: email.frontend_url.clone(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(&JwtConfig::from_env(), &EmailConfig::from_env())
    }

    /// View of the token settings in the shape the token functions take.
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            access_secret: self.access_secret.clone(),
            access_token_expiry: self.access_ttl,
            refresh_secret: self.refresh_secret.clone(),
            refresh_token_expiry: self.refresh_ttl,
            reset_token_expiry: self.reset_ttl,
        }
    }
}
