//! Utilities for logging.

use std::fmt;
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Crates that are too chatty below info.
const QUIET_CRATES: &[&str] = &["h2=info", "hyper=info", "hyper_util=info", "reqwest=info", "rustls=info"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    HumanReadable,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "human-readable" | "text" => Ok(LogFormat::HumanReadable),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format '{other}', expected 'human' or 'json'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumanReadable => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Filter logging at `default_level` unless overridden with `RUST_LOG`.
pub fn env_filter(default_level: Level) -> EnvFilter {
    let mut filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    for directive in QUIET_CRATES {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Configure the global logger writing to `writer`.
///
/// Does nothing if a global logger is already set.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = FmtSubscriber::builder()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer);

    let result = match format {
        LogFormat::HumanReadable => tracing::subscriber::set_global_default(
            builder.with_target(true).finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            builder
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        ),
    };

    if result.is_err() {
        tracing::debug!("global logger already configured");
    }
}
