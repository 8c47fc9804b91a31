//! Outbound mail.
//!
//! [`Mailer`] is the notification seam used by the account service.
//! [`SmtpMailer`] delivers through lettre's SMTP transport; [`RecordingMailer`]
//! keeps messages in memory for tests.

use async_trait::async_trait;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};
use url::Url;

use sparkledge_config::EmailConfig;
use sparkledge_core::AppError;

pub const PASSWORD_RESET_SUBJECT: &str = "Sparkledge - przywróć hasło";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one message. Failures are returned, never retried.
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError>;
}

/// `<base-url>/resetPassword/<email>/<token>`, with the email and token
/// percent-encoded as path segments.
pub fn password_reset_link(base_url: &str, email: &str, token: &str) -> Result<String, AppError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::internal_error(format!("Invalid frontend URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::internal_error("Frontend URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["resetPassword", email, token]);

    Ok(url.into())
}

pub fn password_reset_email(to: &str, reset_link: &str) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        subject: PASSWORD_RESET_SUBJECT.to_string(),
        html_body: password_reset_template(to, reset_link),
    }
}

fn password_reset_template(email: &str, reset_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pl">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sparkledge</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #F59E0B; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Sparkledge</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Otrzymaliśmy prośbę o zmianę hasła dla konta <strong>{email}</strong>.
                            </p>
                            <table width="100%" cellpadding="0" cellspacing="0" style="margin: 30px 0;">
                                <tr>
                                    <td align="center">
                                        <a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #F59E0B; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">Zmień hasło</a>
                                    </td>
                                </tr>
                            </table>
                            <p style="margin: 0 0 20px 0; color: #F59E0B; font-size: 14px; word-break: break-all;">
                                {link}
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 14px; line-height: 1.5;">
                                Jeśli to nie Ty, zignoruj tę wiadomość.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        email = escape_html(email),
        link = escape_html(reset_link)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// SMTP delivery configured from [`EmailConfig`].
#[derive(Clone, Debug)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutboundEmail) -> Result<Message, AppError> {
        Message::builder()
            .from(
                self.config
                    .sender()
                    .parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::alternative().singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(email.html_body.clone()),
                ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal_error(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to, subject = %email.subject))]
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        let message = self.build_message(&email)?;
        let mailer = self.transport()?;

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        info!("email sent");
        Ok(())
    }
}

/// [`Mailer`] that records every message instead of sending it.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<OutboundEmail>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<OutboundEmail> {
        self.sent().pop()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AppError::internal_error("Failed to send email: mailbox unavailable"));
        }
        self.sent
            .lock()
            .map_err(|_| AppError::internal_error("mailer lock poisoned"))?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_link_format() {
        let link =
            password_reset_link("https://www.sparkledge.pl/", "a@x.com", "tok.en.sig").unwrap();
        assert_eq!(link, "https://www.sparkledge.pl/resetPassword/a@x.com/tok.en.sig");

        let link = password_reset_link("https://www.sparkledge.pl", "a@x.com", "t").unwrap();
        assert_eq!(link, "https://www.sparkledge.pl/resetPassword/a@x.com/t");
    }

    #[test]
    fn test_password_reset_link_encodes_email() {
        let link = password_reset_link("https://www.sparkledge.pl", "a#b@x.com", "t").unwrap();
        assert_eq!(link, "https://www.sparkledge.pl/resetPassword/a%23b@x.com/t");

        let link = password_reset_link("http://localhost:5173/app", "a/b?c@x.com", "t").unwrap();
        assert_eq!(link, "http://localhost:5173/app/resetPassword/a%2Fb%3Fc@x.com/t");
    }

    #[test]
    fn test_password_reset_link_rejects_bad_base_url() {
        let err = password_reset_link("not a url", "a@x.com", "t").unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_password_reset_email_escapes_markup() {
        let link = password_reset_link("http://localhost:3000", "o'neil&co@x.com", "t").unwrap();
        let email = password_reset_email("o'neil&co@x.com", &link);
        assert!(email.html_body.contains("<strong>o&#39;neil&amp;co@x.com</strong>"));
        assert!(!email.html_body.contains("o'neil&co"));
    }

    #[test]
    fn test_password_reset_email_contains_link() {
        let link = password_reset_link("http://localhost:3000", "a@x.com", "abc").unwrap();
        let email = password_reset_email("a@x.com", &link);
        assert_eq!(email.to, "a@x.com");
        assert_eq!(email.subject, PASSWORD_RESET_SUBJECT);
        assert!(email.html_body.contains(&link));
        assert!(email.html_body.contains("<strong>a@x.com</strong>"));
    }

    #[test]
    fn test_build_message() {
        let mailer = SmtpMailer::new(EmailConfig::from_lookup(|_| None));
        let email = password_reset_email("a@x.com", "http://localhost/resetPassword/a@x.com/t");
        assert!(mailer.build_message(&email).is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(EmailConfig::from_lookup(|_| None));
        let email = OutboundEmail {
            to: "not an address".to_string(),
            subject: "s".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };
        assert!(mailer.build_message(&email).unwrap_err().is_internal());
    }

    #[tokio::test]
    async fn test_unreachable_smtp_server_fails_send() {
        let mailer = SmtpMailer::new(EmailConfig::from_lookup(|key| match key {
            "SMTP_HOST" => Some("127.0.0.1".to_string()),
            "SMTP_PORT" => Some("1".to_string()),
            _ => None,
        }));
        let email = password_reset_email("a@x.com", "http://localhost/r");

        let err = mailer.send(email).await.unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("Failed to send email"));
    }

    #[tokio::test]
    async fn test_recording_mailer() {
        let mailer = RecordingMailer::new();
        mailer
            .send(password_reset_email("a@x.com", "link"))
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);

        mailer.set_failing(true);
        let result = mailer.send(password_reset_email("b@x.com", "link")).await;
        assert!(result.unwrap_err().is_internal());
        assert_eq!(mailer.last().unwrap().to, "a@x.com");
    }
}
