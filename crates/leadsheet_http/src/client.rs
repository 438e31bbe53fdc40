use std::fmt::Debug;
use std::time::Duration;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, StreamExt};
use futures::{Stream, TryStreamExt};
use leadsheet_error::{LeadsheetError, Operation, Result, classify_provider_error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

const USER_AGENT: &str = concat!("leadsheet/", env!("CARGO_PKG_VERSION"));

pub trait HttpClient: Sync + Send + Debug + Clone + 'static {
    type Response: HttpResponse;
    type RequestFuture: Future<Output = Result<Self::Response, reqwest::Error>> + Send + Unpin;

    /// Do the request.
    fn do_request(&self, request: Request) -> Self::RequestFuture;
}

pub trait HttpResponse: Send {
    type BytesStream: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin;

    fn status(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;

    /// Convert the response body into a byte stream.
    fn into_bytes_stream(self) -> Self::BytesStream;
}

/// Client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestHttpClient { client }
    }

    /// Create a client where every request times out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LeadsheetError::InvalidConfig(format!("Failed to build http client: {e}")))?;
        Ok(ReqwestHttpClient { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    type Response = ReqwestHttpResponse;
    type RequestFuture = BoxFuture<'static, Result<Self::Response, reqwest::Error>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        let client = self.client.clone();
        async move { client.execute(request).await }
            .map(|result| result.map(ReqwestHttpResponse))
            .boxed()
    }
}

#[derive(Debug)]
pub struct ReqwestHttpResponse(reqwest::Response);

impl HttpResponse for ReqwestHttpResponse {
    type BytesStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

    fn status(&self) -> StatusCode {
        self.0.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.0.headers()
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        self.0.bytes_stream().boxed()
    }
}

/// Helper to set a json body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_json_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(body)?;
    *request.body_mut() = Some(body.into());
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(())
}

/// Helper to set a form body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_form_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_urlencoded::to_string(body).map_err(|e| {
        LeadsheetError::InvalidConfig(format!("Failed to encode request body as form: {e}"))
    })?;
    *request.body_mut() = Some(body.into());
    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    Ok(())
}

/// Set a bearer token on this request.
///
/// The header is marked sensitive so it's left out of debug output.
pub fn set_bearer_auth(request: &mut Request, token: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        LeadsheetError::InvalidConfig("Access token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

/// Send a request and collect the full response body.
///
/// Transport failures are reported as [`LeadsheetError::Request`], non-2xx
/// responses go through [`classify_provider_error`].
pub async fn execute<C>(client: &C, operation: Operation, request: Request) -> Result<Bytes>
where
    C: HttpClient,
{
    // Only the path is logged, the query may carry the api key.
    debug!(%operation, method = %request.method(), path = %request.url().path(), "sending request");

    let response = client
        .do_request(request)
        .await
        .map_err(|source| LeadsheetError::Request { operation, source })?;
    let status = response.status();

    let mut stream = response.into_bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream
        .try_next()
        .await
        .map_err(|source| LeadsheetError::Request { operation, source })?
    {
        body.extend_from_slice(chunk.as_ref());
    }
    trace!(%operation, %status, len = body.len(), "response");

    if !status.is_success() {
        let err = classify_provider_error(operation, status, &String::from_utf8_lossy(&body));
        debug!(%operation, %status, error = %err, "provider rejected request");
        return Err(err);
    }

    Ok(body.into())
}

/// Deserialize a json response body.
pub fn read_json<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_slice(body)?)
}
