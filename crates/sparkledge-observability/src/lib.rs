//! Sparkledge logging setup.
//!
//! Console logging through `tracing-subscriber`, configured from the
//! environment:
//!
//! - `RUST_LOG`: full `EnvFilter` directive string, wins when set
//! - `LOG_LEVEL`: level for Sparkledge crates when `RUST_LOG` is unset (default "info")
//! - `LOG_FORMAT`: `json` for JSON lines, anything else for compact text
//!
//! # Examples
//!
//! ```no_run
//! sparkledge_observability::init_logging();
//! tracing::info!("ready");
//! ```

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SPARKLEDGE_TARGETS: &[&str] = &[
    "sparkledge",
    "sparkledge_auth",
    "sparkledge_config",
    "sparkledge_core",
    "sparkledge_db",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Default filter directives: Sparkledge crates at `log_level`, noisy deps at warn.
pub fn default_directives(log_level: &str) -> String {
    let mut directives: Vec<String> = SPARKLEDGE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, log_level))
        .collect();
    directives.push("sqlx=warn".to_string());
    directives.push("lettre=warn".to_string());
    directives.join(",")
}

/// Initialize console logging. Call once, at startup.
pub fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log_level)));

    let console_layer = match LogFormat::from_env() {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(console_layer.with_filter(env_filter))
        .init();
}
