/*
[INPUT]:  Base URL, API key, timeouts
[OUTPUT]: Authenticated JSON request execution with a uniform response envelope
[POS]:    HTTP layer - core transport implementation
[UPDATE]: When adding connection options or changing status/body handling
*/

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::{LedgerError, Result};

/// Response header carrying the server-side trace identifier
pub const REQUEST_ID_HEADER: &str = "x-request-guid";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request deadline; expiry surfaces as a connection error
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Uniform result of one successful HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Parsed JSON body; `None` when the body was empty
    pub body: Option<Value>,
    pub status_code: u16,
    /// Value of the `x-request-guid` header, if sent
    pub request_id: Option<String>,
}

impl ApiResponse {
    /// Body with a JSON `null` treated as absent
    pub fn into_body(self) -> Option<Value> {
        self.body.filter(|value| !value.is_null())
    }

    /// Decode the body as `T`, or `None` when there is no body
    pub fn decode<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self.into_body() {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Decode the body as `T`; an absent body is a protocol violation
    pub fn decode_required<T: DeserializeOwned>(self) -> Result<T> {
        self.decode()?.ok_or_else(LedgerError::no_data)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "Message")]
    message: Option<String>,
    #[serde(default, alias = "Description")]
    description: Option<String>,
}

/// Owns the connection pool and the bearer credential for one client
#[derive(Debug)]
pub struct Transport {
    http_client: Client,
    base_url: Url,
}

impl Transport {
    pub fn new(base_url: &str, api_key: &str, config: ClientConfig) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LedgerError::Config("API key cannot be empty".to_string()));
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| LedgerError::Config("API key contains invalid characters".to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LedgerError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL from path segments; each segment is percent-escaped.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|_| LedgerError::Config(format!("Base URL {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build a URL from path segments plus form-encoded query pairs.
    pub(crate) fn endpoint_with_query<K, V>(&self, segments: &[&str], pairs: &[(K, V)]) -> Result<Url>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.endpoint(segments)?;
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key.as_ref(), value.as_ref());
            }
        }
        Ok(url)
    }

    pub async fn get(&self, url: Url) -> Result<ApiResponse> {
        let builder = self.http_client.get(url.clone());
        self.execute(Method::GET, &url, builder).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<ApiResponse> {
        let builder = self.http_client.put(url.clone()).json(body);
        self.execute(Method::PUT, &url, builder).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: Url, body: Option<&B>) -> Result<ApiResponse> {
        let mut builder = self.http_client.post(url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(Method::POST, &url, builder).await
    }

    pub async fn delete(&self, url: Url) -> Result<()> {
        let builder = self.http_client.delete(url.clone());
        self.execute(Method::DELETE, &url, builder).await?;
        Ok(())
    }

    /// Existence check. Any status outside 2xx yields `false`; only network
    /// failures and timeouts are errors.
    pub async fn head(&self, url: Url) -> Result<bool> {
        debug!(method = "HEAD", url = %url, "sending request");
        let response = self
            .http_client
            .head(url)
            .send()
            .await
            .map_err(LedgerError::from_transport)?;
        let status = response.status();
        debug!(status = status.as_u16(), "received response");
        Ok(status.is_success())
    }

    async fn execute(&self, method: Method, url: &Url, builder: RequestBuilder) -> Result<ApiResponse> {
        debug!(method = %method, url = %url, "sending request");
        let response = builder.send().await.map_err(LedgerError::from_transport)?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(LedgerError::from_transport)?;
        debug!(
            status = status.as_u16(),
            request_id = request_id.as_deref().unwrap_or("-"),
            body_len = text.len(),
            "received response"
        );

        if !status.is_success() {
            return Err(error_from_body(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(ApiResponse {
                body: None,
                status_code: status.as_u16(),
                request_id,
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|_| LedgerError::api_error(status, "Failed to parse response", None))?;
        Ok(ApiResponse {
            body: Some(body),
            status_code: status.as_u16(),
            request_id,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(LedgerError::Config("Base URL cannot be empty".to_string()));
    }
    let url = Url::parse(trimmed)?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(LedgerError::Config(format!(
            "Base URL must be an http or https address: {trimmed}"
        )));
    }
    Ok(url)
}

/// Map a non-2xx response to an API error using `{message, description}`
/// when the body carries them, else the reason phrase.
fn error_from_body(status: StatusCode, text: &str) -> LedgerError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    LedgerError::api_error(status, message, body.description)
}
