//! Grid and HTTP configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::ConfigError;
use crate::model::ColumnDescriptor;
use crate::model::Row;

/// HTTP verb used for page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Request parameters in the query string.
    #[default]
    Get,
    /// Request parameters in the body.
    Post,
}

/// Body encoding for POST requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostDataFormat {
    /// `application/x-www-form-urlencoded`.
    Form,
    /// `application/json`.
    #[default]
    Json,
}

/// How page requests reach the endpoint.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::config::{HttpConfig, HttpMethod};
///
/// let http = HttpConfig::default()
///     .with_bearer_token("secret")
///     .with_method(HttpMethod::Post)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(http.timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: Option<String>,
    /// Sent as `X-API-Key`.
    pub api_key: Option<String>,
    /// Extra headers sent with every request.
    pub custom_headers: BTreeMap<String, String>,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Body encoding when `method` is POST.
    pub post_data_format: PostDataFormat,
    /// Keep and resend cookies set by the endpoint.
    pub with_credentials: bool,
    /// Per-request timeout, in milliseconds on the wire.
    ///
    /// Default: 30 seconds
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            api_key: None,
            custom_headers: BTreeMap::new(),
            method: HttpMethod::Get,
            post_data_format: PostDataFormat::Json,
            with_credentials: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpConfig {
    /// Sets the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Adds a custom header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    /// Sets the HTTP verb.
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the POST body encoding.
    pub fn with_post_data_format(mut self, format: PostDataFormat) -> Self {
        self.post_data_format = format;
        self
    }

    /// Enables the cookie store.
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = enabled;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for one grid instance.
///
/// Exactly one of `data` (client mode) and `endpoint` (server mode) must be
/// set; [`GridConfig::validate`] enforces it.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::GridConfig;
/// use datagrid_lib::model::Row;
///
/// let config = GridConfig::default()
///     .with_data(vec![Row::new().set("name", "Amy")])
///     .with_page_size(25);
/// assert!(config.validate().is_ok());
///
/// let both = config.with_endpoint("https://example.com/rows");
/// assert!(both.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Static rows (client mode).
    pub data: Option<Vec<Row>>,
    /// Endpoint URL (server mode).
    pub endpoint: Option<String>,
    /// Request settings for server mode.
    #[serde(rename = "httpConfig")]
    pub http: HttpConfig,
    /// Rows per page in client mode.
    ///
    /// Default: 10
    pub page_size: usize,
    /// Rows per request in server mode. Falls back to `page_size`.
    pub server_page_size: Option<usize>,
    /// Page sizes offered to the user.
    pub page_size_options: Vec<usize>,
    /// Allow free-text search.
    pub enable_search: bool,
    /// Allow column sorting.
    pub enable_sorting: bool,
    /// Allow column filters.
    pub enable_filters: bool,
    /// Allow row selection.
    pub enable_selection: bool,
    /// Allow refresh.
    pub enable_refresh: bool,
    /// Allow bulk delete requests.
    pub enable_delete: bool,
    /// Require confirmation before a bulk delete is requested.
    pub delete_confirmation: bool,
    /// Column descriptors; derived from the first row when absent.
    pub columns: Option<Vec<ColumnDescriptor>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            data: None,
            endpoint: None,
            http: HttpConfig::default(),
            page_size: 10,
            server_page_size: None,
            page_size_options: vec![5, 10, 25, 50],
            enable_search: true,
            enable_sorting: true,
            enable_filters: true,
            enable_selection: true,
            enable_refresh: true,
            enable_delete: false,
            delete_confirmation: true,
            columns: None,
        }
    }
}

impl GridConfig {
    /// Creates a config with default values and no data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets static rows.
    pub fn with_data(mut self, rows: Vec<Row>) -> Self {
        self.data = Some(rows);
        self
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the HTTP settings.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Sets the client-mode page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the server-mode page size.
    pub fn with_server_page_size(mut self, page_size: usize) -> Self {
        self.server_page_size = Some(page_size);
        self
    }

    /// Sets the column descriptors.
    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Enables or disables bulk delete requests.
    pub fn with_delete(mut self, enabled: bool, confirmation: bool) -> Self {
        self.enable_delete = enabled;
        self.delete_confirmation = confirmation;
        self
    }

    /// Returns the page size requests use in server mode.
    pub fn effective_server_page_size(&self) -> usize {
        self.server_page_size.unwrap_or(self.page_size)
    }

    /// Checks the source and size settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.data, &self.endpoint) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingSources),
            (None, None) => return Err(ConfigError::MissingSource),
            (None, Some(endpoint)) => {
                parse_endpoint(endpoint)?;
            }
            (Some(_), None) => {}
        }
        self.validate_sizes()
    }

    /// Checks the page size settings only.
    pub fn validate_sizes(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize { field: "pageSize" });
        }
        if self.server_page_size == Some(0) {
            return Err(ConfigError::InvalidPageSize {
                field: "serverPageSize",
            });
        }
        Ok(())
    }
}

/// Parses an endpoint, accepting only absolute http(s) URLs.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| ConfigError::invalid_endpoint(endpoint, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::invalid_endpoint(
            endpoint,
            format!("unsupported scheme '{}'", other),
        )),
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.effective_server_page_size(), 10);
        assert!(config.enable_search && config.enable_sorting && config.enable_selection);
        assert!(!config.enable_delete);
        assert_eq!(config.http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validate_sources() {
        assert_eq!(GridConfig::new().validate(), Err(ConfigError::MissingSource));
        assert_eq!(
            GridConfig::new()
                .with_data(vec![])
                .with_endpoint("https://example.com")
                .validate(),
            Err(ConfigError::ConflictingSources)
        );
        assert!(GridConfig::new().with_data(vec![]).validate().is_ok());
        assert!(GridConfig::new().with_endpoint("http://localhost:8080/rows").validate().is_ok());
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(matches!(
            GridConfig::new().with_endpoint("not a url").validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            GridConfig::new().with_endpoint("ftp://example.com").validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_validate_page_sizes() {
        assert_eq!(
            GridConfig::new().with_data(vec![]).with_page_size(0).validate(),
            Err(ConfigError::InvalidPageSize { field: "pageSize" })
        );
        assert_eq!(
            GridConfig::new().with_data(vec![]).with_server_page_size(0).validate(),
            Err(ConfigError::InvalidPageSize {
                field: "serverPageSize"
            })
        );
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "endpoint": "https://example.com/rows",
            "pageSize": 25,
            "serverPageSize": 100,
            "enableDelete": true,
            "httpConfig": {
                "bearerToken": "t",
                "method": "POST",
                "postDataFormat": "form",
                "timeout": 1500,
                "customHeaders": {"X-Tenant": "acme"}
            },
            "columns": [{"key": "age", "label": "Age", "dataType": "number"}]
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.page_size, 25);
        assert_eq!(config.effective_server_page_size(), 100);
        assert!(config.enable_delete);
        assert!(config.enable_search);
        assert_eq!(config.http.method, HttpMethod::Post);
        assert_eq!(config.http.post_data_format, PostDataFormat::Form);
        assert_eq!(config.http.timeout, Duration::from_millis(1500));
        assert_eq!(config.http.custom_headers["X-Tenant"], "acme");
        let columns = config.columns.unwrap();
        assert!(columns[0].sortable);
        assert_eq!(columns[0].data_type, crate::model::DataType::Number);
    }
}
