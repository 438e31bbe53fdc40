//! Recording http client for tests.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::{Ready, ready};
use futures::stream::{Iter, iter};
use leadsheet_core::config::{CredentialBundle, ServiceAccountKey};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, StatusCode};
use url::Url;

use crate::client::{HttpClient, HttpResponse};

pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../testdata/service_account.json");

pub const TOKEN_RESPONSE: &str =
    r#"{"access_token":"ya29.test-token","expires_in":3599,"token_type":"Bearer"}"#;

pub fn service_account() -> ServiceAccountKey {
    serde_json::from_str(SERVICE_ACCOUNT_JSON).unwrap()
}

/// Bundle json for sheet `sheet-123`, worksheet `Sheet`, with the given
/// column mapping.
pub fn bundle_json(column_mapping: serde_json::Value) -> serde_json::Value {
    let service_account: serde_json::Value = serde_json::from_str(SERVICE_ACCOUNT_JSON).unwrap();
    serde_json::json!({
        "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/sheet-123/edit",
        "worksheetNames": ["Sheet"],
        "columnMapping": column_mapping,
        "serviceAccount": service_account,
        "apiKey": "api-key-1",
    })
}

/// Bundle mapping trip id to A and status to B.
pub fn test_bundle() -> CredentialBundle {
    let json = bundle_json(serde_json::json!({"tripId": "A", "status": "B"}));
    CredentialBundle::from_json_str(&json.to_string()).unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(self.body.as_deref().unwrap_or_default()).unwrap()
    }

    pub fn form(&self) -> Vec<(String, String)> {
        serde_urlencoded::from_bytes(self.body.as_deref().unwrap_or_default()).unwrap()
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<(StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

/// Records every request and answers with canned responses in order.
///
/// Once the canned responses run out every request gets a 500.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    pub fn push_response(&self, status: StatusCode, body: impl Into<String>) {
        self.state
            .lock()
            .responses
            .push_back((status, body.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

impl HttpClient for MockHttpClient {
    type Response = MockResponse;
    type RequestFuture = Ready<Result<MockResponse, reqwest::Error>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| b.to_vec()),
        });

        let (status, body) = state.responses.pop_front().unwrap_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "no canned response".to_string(),
            )
        });
        ready(Ok(MockResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        }))
    }
}

#[derive(Debug)]
pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse for MockResponse {
    type BytesStream = Iter<std::vec::IntoIter<Result<Bytes, reqwest::Error>>>;

    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        iter(vec![Ok(self.body)])
    }
}
