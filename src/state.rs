use std::sync::Arc;

use sqlx::PgPool;

use sparkledge_config::{AuthConfig, EmailConfig, JwtConfig};
use sparkledge_db::init_db_pool;

use crate::modules::auth::AuthService;
use crate::modules::users::PgUserStore;
use crate::utils::email::SmtpMailer;

pub type AppAuthService = AuthService<PgUserStore, SmtpMailer>;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
}

impl AppState {
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(&self.jwt_config, &self.email_config)
    }

    /// Account service wired to Postgres and SMTP.
    pub fn auth_service(&self) -> AppAuthService {
        AuthService::new(
            Arc::new(PgUserStore::new(self.db.clone())),
            Arc::new(SmtpMailer::new(self.email_config.clone())),
            self.auth_config(),
        )
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    Ok(AppState {
        db: init_db_pool().await?,
        jwt_config: JwtConfig::from_env(),
        email_config: EmailConfig::from_env(),
    })
}
