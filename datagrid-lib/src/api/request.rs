//! Outbound page request.

use serde::Serialize;

use crate::query::ActiveFilter;

/// The request sent to the endpoint for one page.
///
/// Sorting is never sent; it is applied locally to the loaded page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Free-text search term.
    pub search: String,
    /// Active filters.
    pub filters: Vec<ActiveFilter>,
    /// Token returned with the previous page, absent for the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl FetchRequest {
    /// Flattens the request into name/value pairs for a query string or a
    /// form body. Filters travel as JSON text.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let filters = serde_json::to_string(&self.filters).unwrap_or_else(|_| "[]".to_string());
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("search", self.search.clone()),
            ("filters", filters),
        ];
        if let Some(token) = &self.continuation_token {
            pairs.push(("continuationToken", token.clone()));
        }
        pairs
    }
}
