use std::env;

use crate::parse_or;

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    /// Base URL that password-reset links point at.
    pub frontend_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port: parse_or(lookup("SMTP_PORT"), 1025),
            smtp_username: lookup("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: lookup("SMTP_PASSWORD").unwrap_or_default(),
            from_email: lookup("FROM_EMAIL").unwrap_or_else(|| "noreply@sparkledge.pl".to_string()),
            from_name: lookup("FROM_NAME").unwrap_or_else(|| "Sparkledge".to_string()),
            frontend_url: lookup("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://www.sparkledge.pl".to_string()),
        }
    }

    /// `Name <address>` form used in the `From` header.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}
