//! Credentials and sheet settings loaded from the local credential store.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use leadsheet_error::{LeadsheetError, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::mapping::ColumnMapping;

static SPREADSHEET_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("valid regex"));

/// Extract the spreadsheet id from a spreadsheet url.
///
/// A bare id is returned as is.
pub fn extract_spreadsheet_id(url_or_id: &str) -> Result<String> {
    let url_or_id = url_or_id.trim();
    if let Some(caps) = SPREADSHEET_URL_REGEX.captures(url_or_id) {
        return Ok(caps[1].to_string());
    }

    let is_bare_id = !url_or_id.is_empty()
        && url_or_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_bare_id {
        return Ok(url_or_id.to_string());
    }

    Err(LeadsheetError::InvalidConfig(format!(
        "Could not extract spreadsheet id from '{url_or_id}'"
    )))
}

/// Service account key material.
///
/// Field names match the json key file handed out by the provider, extra
/// fields in that file are ignored.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Private key PEM with escaped newlines restored.
    ///
    /// Keys pasted through environment variables or text fields often carry
    /// literal `\n` sequences.
    pub fn private_key_pem(&self) -> String {
        self.private_key.replace("\\n", "\n")
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// The key either inline or as a json string holding the key file.
#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceAccountSource {
    Inline(ServiceAccountKey),
    Encoded(String),
}

impl ServiceAccountSource {
    fn into_key(self) -> Result<ServiceAccountKey> {
        match self {
            Self::Inline(key) => Ok(key),
            Self::Encoded(s) => serde_json::from_str(&s).map_err(|e| {
                LeadsheetError::InvalidConfig(format!("Invalid service account json: {e}"))
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBundle {
    #[serde(alias = "spreadsheetId")]
    spreadsheet_url: String,
    #[serde(default)]
    worksheet_names: Vec<String>,
    #[serde(default)]
    column_mapping: ColumnMapping,
    #[serde(default)]
    service_account: Option<ServiceAccountSource>,
    #[serde(default)]
    api_key: Option<String>,
}

/// Everything needed to talk to the lead spreadsheet.
///
/// Loaded once per session and never written back.
#[derive(Clone)]
pub struct CredentialBundle {
    pub spreadsheet_id: String,
    pub worksheets: Vec<String>,
    pub column_mapping: ColumnMapping,
    pub service_account: Option<ServiceAccountKey>,
    pub api_key: Option<String>,
}

impl CredentialBundle {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawBundle = serde_json::from_str(s)
            .map_err(|e| LeadsheetError::InvalidConfig(format!("Invalid credential bundle: {e}")))?;

        let service_account = raw.service_account.map(|s| s.into_key()).transpose()?;
        let api_key = raw.api_key.filter(|k| !k.trim().is_empty());

        let bundle = CredentialBundle {
            spreadsheet_id: extract_spreadsheet_id(&raw.spreadsheet_url)?,
            worksheets: raw.worksheet_names,
            column_mapping: raw.column_mapping,
            service_account,
            api_key,
        };

        debug!(
            spreadsheet_id = %bundle.spreadsheet_id,
            worksheets = ?bundle.worksheets,
            mapped_fields = bundle.column_mapping.len(),
            has_service_account = bundle.service_account.is_some(),
            has_api_key = bundle.api_key.is_some(),
            "loaded credential bundle"
        );

        Ok(bundle)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LeadsheetError::ConfigurationMissing(format!(
                    "No credentials found at {}",
                    path.display()
                ))
            } else {
                LeadsheetError::Io(e)
            }
        })?;
        Self::from_json_str(&contents)
    }

    /// Worksheet holding the leads, the first configured one.
    pub fn active_worksheet(&self) -> Result<&str> {
        self.worksheets
            .first()
            .map(|s| s.as_str())
            .ok_or_else(|| LeadsheetError::ConfigurationMissing("No worksheet configured".into()))
    }

    /// Key material required for writes.
    pub fn service_account(&self) -> Result<&ServiceAccountKey> {
        self.service_account.as_ref().ok_or_else(|| {
            LeadsheetError::ConfigurationMissing("No service account configured for writes".into())
        })
    }

    /// Api key required for reads.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LeadsheetError::ConfigurationMissing("No api key configured".into()))
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("worksheets", &self.worksheets)
            .field("column_mapping", &self.column_mapping)
            .field("service_account", &self.service_account)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
