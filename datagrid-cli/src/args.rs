//! Command-line arguments

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::ArgAction;
use clap::Parser;
use datagrid_lib::api::normalize;
use datagrid_lib::config::GridConfig;
use datagrid_lib::config::HttpMethod;
use datagrid_lib::config::PostDataFormat;
use datagrid_lib::grid::GridAction;
use datagrid_lib::model::DataType;
use datagrid_lib::model::Value;
use datagrid_lib::query::FilterSpec;
use datagrid_lib::query::Operator;

use crate::error::CliError;

/// Query a static JSON dataset or a paged HTTP endpoint like a data grid
#[derive(Parser, Debug)]
#[command(name = "datagrid")]
#[command(version)]
pub struct Args {
    /// JSON file holding the rows (an array or a paged response body)
    #[arg(long, value_name = "FILE", conflicts_with = "endpoint")]
    pub data: Option<PathBuf>,

    /// Endpoint serving pages of rows
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Grid configuration file; flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Free-text search term
    #[arg(short, long)]
    pub search: Option<String>,

    /// Column filter; repeat for several columns
    #[arg(short, long = "filter", value_name = "COLUMN:OP:VALUE[:TYPE]", value_parser = parse_filter)]
    pub filters: Vec<FilterSpec>,

    /// Sort column; repeat the same column to sort descending
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sorts: Vec<String>,

    /// Page to show (static data only)
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Pages to advance after loading
    #[arg(short, long, default_value_t = 0)]
    pub next: usize,

    /// Bearer token for the endpoint
    #[arg(long)]
    pub bearer_token: Option<String>,

    /// API key for the endpoint
    #[arg(long)]
    pub api_key: Option<String>,

    /// Extra request header; repeat for several
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Send requests as POST
    #[arg(long)]
    pub post: bool,

    /// Encode POST bodies as a form instead of JSON
    #[arg(long, requires = "post")]
    pub form: bool,

    /// Keep cookies set by the endpoint
    #[arg(long)]
    pub with_credentials: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the grid config: the config file first, then flags.
    pub fn grid_config(&self) -> Result<GridConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?).map_err(|source| CliError::Json {
                path: path.display().to_string(),
                source,
            })?,
            None => GridConfig::default(),
        };

        if let Some(path) = &self.data {
            config.data = Some(read_rows(path)?);
            config.endpoint = None;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
            config.data = None;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
            config.server_page_size = Some(page_size);
        }

        let http = &mut config.http;
        if let Some(token) = &self.bearer_token {
            http.bearer_token = Some(token.clone());
        }
        if let Some(key) = &self.api_key {
            http.api_key = Some(key.clone());
        }
        for (name, value) in &self.headers {
            http.custom_headers.insert(name.clone(), value.clone());
        }
        if self.post {
            http.method = HttpMethod::Post;
            http.post_data_format = if self.form {
                PostDataFormat::Form
            } else {
                PostDataFormat::Json
            };
        }
        if self.with_credentials {
            http.with_credentials = true;
        }
        if let Some(secs) = self.timeout_secs {
            http.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Query actions to apply before the first page is shown.
    pub fn query_actions(&self) -> Vec<GridAction> {
        let search = self.search.iter().map(|term| GridAction::SetSearchTerm(term.clone()));
        let filters = self.filters.iter().map(|spec| GridAction::AddFilter(spec.clone()));
        let sorts = self.sorts.iter().map(|column| GridAction::SetSort(column.clone()));
        search.chain(filters).chain(sorts).collect()
    }
}

/// Reads rows from any response shape the normalizer understands.
fn read_rows(path: &Path) -> Result<Vec<datagrid_lib::model::Row>, CliError> {
    let text = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(normalize(json).into_items())
}

const DATA_TYPES: &[&str] = &["string", "number", "boolean", "date", "datetime"];

/// Parses `column:operator:value[:type]`.
///
/// The value may itself contain colons; a trailing segment is only taken as
/// the type when it names one.
fn parse_filter(s: &str) -> Result<FilterSpec, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(column), Some(operator), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected COLUMN:OP:VALUE[:TYPE]".to_string());
    };
    if column.is_empty() {
        return Err("empty column".to_string());
    }

    let name = operator;
    let operator = name.parse::<Operator>().unwrap_or(Operator::Other);
    if operator == Operator::Other {
        return Err(format!("unknown operator '{}'", name));
    }

    let (raw, data_type) = match rest.rsplit_once(':') {
        Some((raw, suffix)) if DATA_TYPES.contains(&suffix.to_ascii_lowercase().as_str()) => {
            (raw, suffix.parse::<DataType>().unwrap_or_default())
        }
        _ => (rest, DataType::String),
    };

    Ok(FilterSpec::new(column, operator, typed_value(raw, data_type), data_type))
}

fn typed_value(raw: &str, data_type: DataType) -> Value {
    match data_type {
        DataType::Number => raw
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| raw.parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| Value::from(raw)),
        DataType::Boolean => raw.parse::<bool>().map(Value::from).unwrap_or_else(|_| Value::from(raw)),
        _ => Value::from(raw),
    }
}

/// Parses `NAME=VALUE`.
fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err("expected NAME=VALUE".to_string()),
    }
}
