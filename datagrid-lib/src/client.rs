//! HTTP page client

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use url::Url;

use crate::api::FetchRequest;
use crate::api::Page;
use crate::api::PageSource;
use crate::api::normalize;
use crate::config::HttpConfig;
use crate::config::HttpMethod;
use crate::config::PostDataFormat;
use crate::config::parse_endpoint;
use crate::error::ApiError;
use crate::error::ConfigError;
use crate::error::Error;

/// Fetches pages from a remote endpoint.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::GridClient;
/// use datagrid_lib::config::HttpConfig;
///
/// let client = GridClient::builder()
///     .endpoint("https://example.com/api/rows")
///     .http_config(HttpConfig::default().with_bearer_token("secret"))
///     .build()?;
/// ```
#[derive(Clone)]
pub struct GridClient {
    inner: Arc<GridClientInner>,
}

struct GridClientInner {
    endpoint: Url,
    http: HttpConfig,
    headers: HeaderMap,
    http_client: Client,
}

impl std::fmt::Debug for GridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("method", &self.inner.http.method)
            .finish_non_exhaustive()
    }
}

impl GridClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> GridClientBuilder<Missing> {
        GridClientBuilder::new()
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Sends one page request and normalizes the response body.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Page, ApiError> {
        let inner = &self.inner;
        let timeout = inner.http.timeout;

        let mut builder = match inner.http.method {
            HttpMethod::Get => {
                let mut url = inner.endpoint.clone();
                url.query_pairs_mut().extend_pairs(request.to_pairs());
                inner.http_client.get(url)
            }
            HttpMethod::Post => {
                let builder = inner.http_client.post(inner.endpoint.clone());
                match inner.http.post_data_format {
                    PostDataFormat::Form => builder.form(&request.to_pairs()),
                    PostDataFormat::Json => builder.json(request),
                }
            }
        };

        builder = builder.headers(inner.headers.clone()).timeout(timeout);
        if let Some(token) = &inner.http.bearer_token {
            builder = builder.bearer_auth(token);
        }

        log::debug!(
            "Fetching page {} (size {}) from {}",
            request.page,
            request.page_size,
            inner.endpoint
        );

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body
            };
            return Err(ApiError::http(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;

        Ok(normalize(json))
    }
}

#[async_trait]
impl PageSource for GridClient {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, ApiError> {
        self.fetch(request).await
    }
}

/// Builds the static header set: `Accept`, the API key and custom headers.
fn default_headers(http: &HttpConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = &http.api_key {
        let value = HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidHeader {
            name: "X-API-Key".to_string(),
        })?;
        headers.insert(HeaderName::from_static("x-api-key"), value);
    }

    for (name, value) in &http.custom_headers {
        let invalid = || ConfigError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`GridClient`].
///
/// Uses the typestate pattern so `build` is only available once the
/// endpoint has been set.
pub struct GridClientBuilder<Endpoint> {
    endpoint: Endpoint,
    http: HttpConfig,
    http_client: Option<Client>,
}

impl GridClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoint: Missing,
            http: HttpConfig::default(),
            http_client: None,
        }
    }

    /// Sets the endpoint URL.
    pub fn endpoint(self, endpoint: impl Into<String>) -> GridClientBuilder<Set<String>> {
        GridClientBuilder {
            endpoint: Set(endpoint.into()),
            http: self.http,
            http_client: self.http_client,
        }
    }
}

impl Default for GridClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> GridClientBuilder<E> {
    /// Sets the request settings.
    pub fn http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created. A custom client is used
    /// as is, so `with_credentials` has no effect on it.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl GridClientBuilder<Set<String>> {
    /// Builds the [`GridClient`].
    ///
    /// Fails if the endpoint or a header is invalid, or if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<GridClient, Error> {
        let endpoint = parse_endpoint(&self.endpoint.0)?;
        let headers = default_headers(&self.http)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => Client::builder()
                .cookie_store(self.http.with_credentials)
                .build()
                .map_err(ApiError::from)?,
        };

        Ok(GridClient {
            inner: Arc::new(GridClientInner {
                endpoint,
                http: self.http,
                headers,
                http_client,
            }),
        })
    }
}
