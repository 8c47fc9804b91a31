//! Command-line front end for the account service.
//!
//! Each subcommand validates its input with the request DTO's `validator`
//! rules, calls one [`AuthService`] operation and prints the result as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use serde_json::{Value, json};
use validator::Validate;

use sparkledge_models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, VerifyEmailRequest,
};

use crate::modules::auth::AuthService;
use crate::modules::users::UserStore;
use crate::utils::email::Mailer;

#[derive(Debug, Parser)]
#[command(name = "sparkledge")]
#[command(about = "Sparkledge - account and session management", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a new account
    Register {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 'f', long)]
        first_name: String,

        #[arg(short = 'l', long)]
        last_name: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Sign in and print an access/refresh token pair
    Login {
        #[arg(short = 'e', long)]
        email: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Exchange a refresh token for a new pair
    Refresh {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 't', long)]
        refresh_token: String,
    },
    /// End the current session
    Logout {
        #[arg(short = 'e', long)]
        email: String,
    },
    /// Email a password-reset link
    ForgotPassword {
        #[arg(short = 'e', long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 't', long)]
        token: String,

        /// New password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        new_password: Option<String>,
    },
    /// Mark an account's email as verified
    VerifyEmail {
        #[arg(short = 'e', long)]
        email: String,
    },
    /// Decode and check an access token
    Whoami {
        #[arg(short = 't', long)]
        access_token: String,
    },
}

fn prompt_password(password: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords don't match");
    }
    prompt.interact().context("Failed to read password")
}

fn validated<T: Validate>(request: T) -> anyhow::Result<T> {
    request.validate().context("Invalid input")?;
    Ok(request)
}

fn message(text: &str) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(MessageResponse::new(text))?)
}

/// Runs one account command. `Migrate` is handled by the binary, which owns
/// the pool.
pub async fn execute<S, M>(service: &AuthService<S, M>, command: Commands) -> anyhow::Result<Value>
where
    S: UserStore,
    M: Mailer,
{
    match command {
        Commands::Migrate => anyhow::bail!("migrate needs a database connection"),
        Commands::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let request = validated(RegisterRequest {
                email,
                password: prompt_password(password, true)?,
                first_name,
                last_name,
            })?;
            let user = service
                .register(
                    &request.email,
                    &request.password,
                    &request.first_name,
                    &request.last_name,
                )
                .await?;
            Ok(serde_json::to_value(user)?)
        }
        Commands::Login { email, password } => {
            let request = validated(LoginRequest {
                email,
                password: prompt_password(password, false)?,
            })?;
            let tokens = service.sign_in(&request.email, &request.password).await?;
            Ok(serde_json::to_value(tokens)?)
        }
        Commands::Refresh {
            email,
            refresh_token,
        } => {
            let request = validated(RefreshTokenRequest {
                email,
                refresh_token,
            })?;
            let tokens = service
                .refresh(&request.email, &request.refresh_token)
                .await?;
            Ok(serde_json::to_value(tokens)?)
        }
        Commands::Logout { email } => {
            service.logout(&email).await?;
            message("Logged out.")
        }
        Commands::ForgotPassword { email } => {
            let request = validated(ForgotPasswordRequest { email })?;
            service.request_password_reset(&request.email).await?;
            message("Password reset email sent.")
        }
        Commands::ResetPassword {
            email,
            token,
            new_password,
        } => {
            let request = validated(ResetPasswordRequest {
                email,
                token,
                new_password: prompt_password(new_password, true)?,
            })?;
            service
                .reset_password(&request.email, &request.token, &request.new_password)
                .await?;
            message("Password changed.")
        }
        Commands::VerifyEmail { email } => {
            let request = validated(VerifyEmailRequest { email })?;
            let user = service.confirm_email_verification(&request.email).await?;
            Ok(serde_json::to_value(user)?)
        }
        Commands::Whoami { access_token } => {
            let claims = service.authenticate(&access_token)?;
            Ok(json!({
                "id": claims.id,
                "email": claims.email,
                "isVerified": claims.is_verified,
                "exp": claims.exp,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sparkledge_config::{AuthConfig, EmailConfig, JwtConfig};
    use sparkledge_core::AppError;

    use super::*;
    use crate::modules::users::MemoryUserStore;
    use crate::utils::email::RecordingMailer;

    fn service() -> AuthService<MemoryUserStore, RecordingMailer> {
        let config = AuthConfig::new(
            &JwtConfig::from_lookup(|_| None),
            &EmailConfig::from_lookup(|_| None),
        );
        AuthService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(RecordingMailer::new()),
            config,
        )
    }

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["sparkledge"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_parse_subcommands() {
        assert!(matches!(parse(&["migrate"]), Commands::Migrate));
        assert!(matches!(
            parse(&["login", "-e", "a@x.com"]),
            Commands::Login { password: None, .. }
        ));
        assert!(matches!(
            parse(&["reset-password", "--email", "a@x.com", "--token", "t", "--new-password", "x"]),
            Commands::ResetPassword { .. }
        ));
        assert!(Cli::try_parse_from(["sparkledge", "refresh", "-e", "a@x.com"]).is_err());
    }

    #[tokio::test]
    async fn test_register_login_whoami() {
        let service = service();

        let user = execute(
            &service,
            parse(&["register", "-e", "cli@x.com", "-f", "Ada", "-l", "Lovelace", "-p", "Passw0rd!"]),
        )
        .await
        .unwrap();
        assert_eq!(user["email"], "cli@x.com");
        assert_eq!(user["is_verified"], false);

        let tokens = execute(&service, parse(&["login", "-e", "cli@x.com", "-p", "Passw0rd!"]))
            .await
            .unwrap();
        let access = tokens["accessToken"].as_str().unwrap().to_string();
        assert!(!tokens["refreshToken"].as_str().unwrap().is_empty());

        let me = execute(&service, parse(&["whoami", "-t", &access]))
            .await
            .unwrap();
        assert_eq!(me["email"], "cli@x.com");
        assert_eq!(me["id"], user["id"]);
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_email() {
        let service = service();
        let result = execute(
            &service,
            parse(&["register", "-e", "nope", "-f", "A", "-l", "B", "-p", "Passw0rd!"]),
        )
        .await;
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<AppError>().is_none());
        assert!(err.to_string().contains("Invalid input"));
    }

    #[tokio::test]
    async fn test_service_errors_keep_their_code() {
        let service = service();
        let err = execute(&service, parse(&["login", "-e", "ghost@x.com", "-p", "whatever"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AppError>().map(AppError::code),
            Some("invalid_credentials")
        );
    }

    #[tokio::test]
    async fn test_logout_prints_message() {
        let service = service();
        let out = execute(&service, parse(&["logout", "-e", "ghost@x.com"]))
            .await
            .unwrap();
        assert_eq!(out["message"], "Logged out.");
    }
}
