//! Error type shared across the leadsheet crates.
//!
//! Provider responses that aren't successful are turned into errors by
//! [`classify_provider_error`]. That's the only place that inspects provider
//! text to decide on an error kind.

use std::fmt;

pub use reqwest::StatusCode;
use serde::Deserialize;

/// The remote operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Lookup,
    Append,
    Update,
    TokenExchange,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Lookup => "lookup",
            Self::Append => "append",
            Self::Update => "update",
            Self::TokenExchange => "token exchange",
        }
    }

    /// If this operation writes to the spreadsheet.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Append | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeadsheetError {
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid column address: '{0}'")]
    InvalidColumn(String),

    #[error("No lead found with trip id '{trip_id}'")]
    NotFound { trip_id: String },

    #[error("Spreadsheet {operation} failed ({status}): {message}")]
    Provider {
        operation: Operation,
        status: StatusCode,
        message: String,
    },

    #[error("Spreadsheet {operation} rejected, range is protected: {message}")]
    Protected { operation: Operation, message: String },

    #[error("Failed to send {operation} request: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to sign token assertion: {0}")]
    Signing(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LeadsheetError {
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing(_) | Self::InvalidConfig(_) | Self::InvalidColumn(_)
        )
    }

    /// Failures a caller may re-trigger without changing anything.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Request { .. })
    }

    /// The provider's own message, if this error came from the provider.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Provider { message, .. } | Self::Protected { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type Result<T, E = LeadsheetError> = std::result::Result<T, E>;

/// Error payload returned by the values API.
///
/// `{"error": {"code": 403, "message": "...", "status": "PERMISSION_DENIED"}}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Error payload returned by the token endpoint.
///
/// `{"error": "invalid_grant", "error_description": "..."}`
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Pull the human readable message out of a provider error body.
///
/// Falls back to the raw body when it isn't one of the known json shapes.
pub fn provider_message(body: &str) -> String {
    if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(body) {
        return match oauth.error_description {
            Some(desc) => format!("{}: {}", oauth.error, desc),
            None => oauth.error,
        };
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api) => api.error.message,
        Err(_) => body.trim().to_string(),
    }
}

const PROTECTED_MARKER: &str = "protected";

/// Turn a non-success provider response into an error.
///
/// Writes rejected because the target range or worksheet is protected are
/// reported as [`LeadsheetError::Protected`]. The provider has no structured
/// code for this, so it's detected by the message text.
pub fn classify_provider_error(
    operation: Operation,
    status: StatusCode,
    body: &str,
) -> LeadsheetError {
    let message = provider_message(body);
    if operation.is_write() && message.to_ascii_lowercase().contains(PROTECTED_MARKER) {
        return LeadsheetError::Protected { operation, message };
    }
    LeadsheetError::Provider {
        operation,
        status,
        message,
    }
}
