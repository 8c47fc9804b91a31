#![allow(dead_code)]

use std::sync::Arc;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sparkledge::modules::auth::AuthService;
use sparkledge::modules::users::MemoryUserStore;
use sparkledge::utils::email::{Mailer, RecordingMailer};
use sparkledge_config::{AuthConfig, JwtConfig};

pub const TEST_PASSWORD: &str = "Passw0rd!";
pub const BASE_URL: &str = "https://test.sparkledge.pl";

pub type TestService = AuthService<MemoryUserStore, RecordingMailer>;

pub struct TestContext {
    pub service: TestService,
    pub store: Arc<MemoryUserStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: AuthConfig,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test_access_secret_key_for_testing".to_string(),
        access_token_expiry: 3600,
        refresh_secret: "test_refresh_secret_key_for_testing".to_string(),
        refresh_token_expiry: 604800,
        reset_token_expiry: 3600,
    }
}

pub fn test_auth_config() -> AuthConfig {
    let jwt = test_jwt_config();
    AuthConfig {
        access_secret: jwt.access_secret,
        access_ttl: jwt.access_token_expiry,
        refresh_secret: jwt.refresh_secret,
        refresh_ttl: jwt.refresh_token_expiry,
        reset_ttl: jwt.reset_token_expiry,
        mail_sender: "Sparkledge <noreply@sparkledge.pl>".to_string(),
        base_url: BASE_URL.to_string(),
    }
}

pub fn setup() -> TestContext {
    let store = Arc::new(MemoryUserStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let config = test_auth_config();
    let service = AuthService::new(Arc::clone(&store), Arc::clone(&mailer), config.clone());

    TestContext {
        service,
        store,
        mailer,
        config,
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", uuid::Uuid::new_v4())
}

/// Registers a fresh account with [`TEST_PASSWORD`] and returns its email.
pub async fn register_user<M: Mailer>(service: &AuthService<MemoryUserStore, M>) -> String {
    let email = generate_unique_email();
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    service
        .register(&email, TEST_PASSWORD, &first_name, &last_name)
        .await
        .unwrap();
    email
}

/// Pulls the reset token out of the link in a password-reset email body.
pub fn reset_token_from(html_body: &str, email: &str) -> String {
    let marker = format!("/resetPassword/{}/", email);
    let start = html_body.find(&marker).unwrap() + marker.len();
    html_body[start..]
        .chars()
        .take_while(|c| *c != '"' && *c != '<' && !c.is_whitespace())
        .collect()
}
