use std::sync::Arc;
use std::time::Duration;

use leadsheet_core::column::Column;
use leadsheet_core::config::CredentialBundle;
use leadsheet_core::lead::{Lead, LeadField, LeadPatch};
use leadsheet_core::lookup::find_row_by_key;
use leadsheet_core::mapper::{lead_to_cell_writes, lead_to_row, row_to_lead, writable_fields};
use leadsheet_core::range::{data_range, quote_sheet_name};
use leadsheet_error::{LeadsheetError, Operation, Result};
use reqwest::{Method, Request};
use tracing::{debug, info};
use url::Url;

use crate::client::{
    HttpClient,
    ReqwestHttpClient,
    execute,
    read_json,
    set_bearer_auth,
    set_json_body,
};
use crate::credentials::{TokenPolicy, TokenProvider};
use crate::sheets::{
    AppendRequest,
    AppendResponse,
    BatchUpdateRequest,
    BatchUpdateResponse,
    VALUE_INPUT_OPTION,
    ValueRange,
};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches always read at least through this column.
const MIN_FETCH_COLUMN_INDEX: usize = 51; // AZ

macro_rules! builder_fn {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(mut self, $field: $ty) -> Self {
            self.$field = $field;
            self
        }
    };
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base url of the spreadsheets api, the spreadsheet id is appended.
    pub base_url: String,
    pub timeout: Duration,
    pub token_policy: TokenPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token_policy: TokenPolicy::default(),
        }
    }
}

impl ClientOptions {
    builder_fn!(with_base_url, base_url, String);
    builder_fn!(with_timeout, timeout, Duration);
    builder_fn!(with_token_policy, token_policy, TokenPolicy);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub trip_id: String,
    /// Range written as reported by the provider.
    pub updated_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { row: u32, ranges: Vec<String> },
    /// Nothing in the update maps to a writable column.
    NoOp,
}

/// A blank trip id never identifies a lead.
fn ensure_trip_id(trip_id: &str) -> Result<()> {
    if trip_id.trim().is_empty() {
        return Err(LeadsheetError::NotFound {
            trip_id: trip_id.to_string(),
        });
    }
    Ok(())
}

/// How a read request is authorized.
#[derive(Clone, Copy)]
enum ReadAuth<'a> {
    ApiKey(&'a str),
    Bearer(&'a str),
}

/// Reads and writes leads in the configured worksheet.
///
/// Holds no mutable state between calls other than an optional token cache,
/// operations may be issued concurrently. Concurrent updates to the same lead
/// are last writer wins.
#[derive(Debug)]
pub struct LeadSheetClient<C: HttpClient> {
    http: C,
    bundle: Arc<CredentialBundle>,
    base_url: Url,
    tokens: TokenProvider,
}

impl LeadSheetClient<ReqwestHttpClient> {
    /// Create a client backed by reqwest using the timeout from `options`.
    pub fn with_reqwest(bundle: Arc<CredentialBundle>, options: ClientOptions) -> Result<Self> {
        let http = ReqwestHttpClient::with_timeout(options.timeout)?;
        Self::new(http, bundle, options)
    }
}

impl<C: HttpClient> LeadSheetClient<C> {
    pub fn new(http: C, bundle: Arc<CredentialBundle>, options: ClientOptions) -> Result<Self> {
        let mut base_url = options.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .map_err(|e| LeadsheetError::InvalidConfig(format!("Invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(LeadsheetError::InvalidConfig(format!(
                "Base url cannot be a base: {base_url}"
            )));
        }

        Ok(LeadSheetClient {
            http,
            bundle,
            base_url,
            tokens: TokenProvider::new(options.token_policy),
        })
    }

    pub fn bundle(&self) -> &CredentialBundle {
        &self.bundle
    }

    /// Read every lead in the data range.
    ///
    /// Uses the api key, no token is minted. An empty sheet yields no leads.
    pub async fn fetch_all(&self) -> Result<Vec<Lead>> {
        let api_key = self.bundle.api_key()?;
        let worksheet = self.bundle.active_worksheet()?;
        let mapping = &self.bundle.column_mapping;

        let last = match mapping.last_column() {
            Some(col) if col.index() > MIN_FETCH_COLUMN_INDEX => col.clone(),
            _ => Column::from_index(MIN_FETCH_COLUMN_INDEX),
        };
        let range = data_range(worksheet, &Column::from_index(0), &last);

        let rows = self
            .read_range(Operation::Fetch, &range, ReadAuth::ApiKey(api_key))
            .await?
            .into_string_rows();
        let leads: Vec<_> = rows.iter().map(|row| row_to_lead(row, mapping)).collect();

        debug!(%range, count = leads.len(), "fetched leads");
        Ok(leads)
    }

    /// Find the physical row of a lead.
    pub async fn locate_row(&self, trip_id: &str) -> Result<u32> {
        let api_key = self.bundle.api_key()?;
        ensure_trip_id(trip_id)?;
        self.lookup_row(trip_id, ReadAuth::ApiKey(api_key)).await
    }

    /// Append a lead as a new row.
    ///
    /// A lead without a trip id gets a generated one, returned in the outcome.
    pub async fn append(&self, lead: &LeadPatch) -> Result<AppendOutcome> {
        let key = self.bundle.service_account()?;
        let worksheet = self.bundle.active_worksheet()?;
        let mapping = &self.bundle.column_mapping;
        if mapping.is_empty() {
            return Err(LeadsheetError::ConfigurationMissing(
                "No column mapping configured".to_string(),
            ));
        }

        let token = self.tokens.token(&self.http, key).await?;
        let row = lead_to_row(lead, mapping);

        let mut url = self.values_url(&format!("{}:append", quote_sheet_name(worksheet)))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);

        let mut request = Request::new(Method::POST, url);
        set_bearer_auth(&mut request, token.secret())?;
        set_json_body(&mut request, &AppendRequest::single_row(&row.cells))?;

        let body = execute(&self.http, Operation::Append, request).await?;
        let resp: AppendResponse = read_json(&body)?;
        let updated_range = resp.updates.and_then(|u| u.updated_range);

        info!(trip_id = %row.trip_id, range = ?updated_range, "appended lead");
        Ok(AppendOutcome {
            trip_id: row.trip_id,
            updated_range,
        })
    }

    /// Write the supplied fields of `updates` to the row holding `trip_id`.
    ///
    /// The trip id column is never rewritten. If no supplied field has a
    /// mapped column nothing is sent and [`UpdateOutcome::NoOp`] is returned.
    pub async fn update(&self, trip_id: &str, updates: &LeadPatch) -> Result<UpdateOutcome> {
        let mapping = &self.bundle.column_mapping;
        if writable_fields(updates, mapping).next().is_none() {
            info!(%trip_id, "no mapped fields to update");
            return Ok(UpdateOutcome::NoOp);
        }

        ensure_trip_id(trip_id)?;
        let key = self.bundle.service_account()?;
        let worksheet = self.bundle.active_worksheet()?;

        let token = self.tokens.token(&self.http, key).await?;
        let row = self
            .lookup_row(trip_id, ReadAuth::Bearer(token.secret()))
            .await?;

        let writes = lead_to_cell_writes(worksheet, updates, mapping, row);
        let url = self.spreadsheet_url("values:batchUpdate")?;
        let mut request = Request::new(Method::POST, url);
        set_bearer_auth(&mut request, token.secret())?;
        set_json_body(&mut request, &BatchUpdateRequest::from_writes(&writes))?;

        let body = execute(&self.http, Operation::Update, request).await?;
        let resp: BatchUpdateResponse = read_json(&body)?;

        let ranges: Vec<_> = writes.into_iter().map(|w| w.range).collect();
        info!(%trip_id, row, ?ranges, cells = ?resp.total_updated_cells, "updated lead");
        Ok(UpdateOutcome::Updated { row, ranges })
    }

    async fn lookup_row(&self, trip_id: &str, auth: ReadAuth<'_>) -> Result<u32> {
        let worksheet = self.bundle.active_worksheet()?;
        let key_column = self
            .bundle
            .column_mapping
            .column(LeadField::TripId)
            .ok_or_else(|| {
                LeadsheetError::ConfigurationMissing("No column mapped for tripId".to_string())
            })?;
        let range = data_range(worksheet, key_column, key_column);

        // Blank rows come back as `[]` and have no key.
        let cells: Vec<Option<String>> = self
            .read_range(Operation::Lookup, &range, auth)
            .await?
            .into_string_rows()
            .into_iter()
            .map(|row| row.into_iter().next())
            .collect();

        let row = find_row_by_key(trip_id, &cells).ok_or_else(|| LeadsheetError::NotFound {
            trip_id: trip_id.to_string(),
        })?;
        debug!(%trip_id, row, "located lead");
        Ok(row)
    }

    async fn read_range(
        &self,
        operation: Operation,
        range: &str,
        auth: ReadAuth<'_>,
    ) -> Result<ValueRange> {
        let mut url = self.values_url(range)?;
        if let ReadAuth::ApiKey(key) = auth {
            url.query_pairs_mut().append_pair("key", key);
        }

        let mut request = Request::new(Method::GET, url);
        if let ReadAuth::Bearer(token) = auth {
            set_bearer_auth(&mut request, token)?;
        }

        let body = execute(&self.http, operation, request).await?;
        read_json(&body)
    }

    /// `{base}/{spreadsheet_id}/values/{segment}`
    fn values_url(&self, segment: &str) -> Result<Url> {
        self.build_url(&["values", segment])
    }

    /// `{base}/{spreadsheet_id}/{segment}`
    fn spreadsheet_url(&self, segment: &str) -> Result<Url> {
        self.build_url(&[segment])
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LeadsheetError::InvalidConfig("Base url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.bundle.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }
}
