//! Page type and response normalization.
//!
//! Endpoints answer in several shapes. [`normalize`] classifies the body
//! against an ordered rule table and extracts one canonical [`Page`]:
//!
//! | Priority | Shape | Recognized by |
//! |----------|-------|---------------|
//! | 1 | [`ResponseShape::Array`] | a bare JSON array |
//! | 2 | [`ResponseShape::CursorStore`] | an object with a `LastEvaluatedKey` field |
//! | 3 | [`ResponseShape::Envelope`] | any other object |
//! | 4 | [`ResponseShape::Unrecognized`] | anything else |
//!
//! Normalization never fails; a body it cannot make sense of becomes an
//! empty page.

use serde_json::Map;
use serde_json::Value as Json;

use crate::model::Row;
use crate::model::Value;
use crate::query::coerce_bool;
use crate::query::parse_float;

const ITEMS_KEYS: &[&str] = &["Items", "items", "data", "Data"];

const TOKEN_KEYS: &[&str] = &[
    "ContinuationToken",
    "continuationToken",
    "continuationtoken",
    "nextToken",
    "next_token",
    "NextToken",
];

const HAS_MORE_KEYS: &[&str] = &[
    "HasMore",
    "hasMore",
    "hasmore",
    "has_more",
    "hasNextPage",
    "has_next_page",
];

const COUNT_KEYS: &[&str] = &["Count", "count", "COUNT", "total", "Total", "length", "size"];

const CURSOR_KEY: &str = "LastEvaluatedKey";

/// One page of rows as returned by the endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    items: Vec<Row>,
    continuation_token: Option<String>,
    has_more: bool,
    count: usize,
}

impl Page {
    /// Creates a page holding `items` with no further pages.
    pub fn new(items: Vec<Row>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Sets the token for fetching the next page.
    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    /// Sets whether more pages follow.
    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    /// Sets the reported record count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Returns the rows of this page.
    pub fn items(&self) -> &[Row] {
        &self.items
    }

    /// Consumes the page and returns the rows.
    pub fn into_items(self) -> Vec<Row> {
        self.items
    }

    /// Returns the token for fetching the next page, if any.
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// Returns `true` if the endpoint reported more pages.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Returns the count reported by the endpoint (0 when absent).
    pub fn count(&self) -> usize {
        self.count
    }
}

/// The shapes a response body can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A bare array of rows.
    Array,
    /// `Items` plus a `LastEvaluatedKey` cursor.
    CursorStore,
    /// An object wrapping the rows with optional paging fields.
    Envelope,
    /// Nothing usable.
    Unrecognized,
}

/// Shape detection rules, highest priority first.
const RULES: &[(ResponseShape, fn(&Json) -> bool)] = &[
    (ResponseShape::Array, Json::is_array),
    (ResponseShape::CursorStore, has_cursor_key),
    (ResponseShape::Envelope, Json::is_object),
];

fn has_cursor_key(json: &Json) -> bool {
    json.as_object().is_some_and(|obj| obj.contains_key(CURSOR_KEY))
}

impl ResponseShape {
    /// Classifies a response body using the first matching rule.
    pub fn detect(json: &Json) -> Self {
        RULES
            .iter()
            .find(|(_, applies)| applies(json))
            .map(|(shape, _)| *shape)
            .unwrap_or(ResponseShape::Unrecognized)
    }
}

/// Maps a response body of any supported shape onto a [`Page`].
///
/// # Example
///
/// ```
/// use datagrid_lib::api::normalize;
/// use serde_json::json;
///
/// let pascal = normalize(json!({"Items": [{"a": 1}], "HasMore": true, "Count": 5}));
/// let camel = normalize(json!({"items": [{"a": 1}], "hasMore": true, "count": 5}));
/// assert_eq!(pascal, camel);
/// assert!(pascal.has_more());
/// ```
pub fn normalize(json: Json) -> Page {
    let shape = ResponseShape::detect(&json);
    log::debug!("Normalizing response with shape {:?}", shape);

    match (shape, json) {
        (ResponseShape::Array, Json::Array(items)) => {
            let items = to_rows(items);
            let count = items.len();
            Page::new(items).with_count(count)
        }
        (ResponseShape::CursorStore, Json::Object(mut obj)) => {
            let key = obj.remove(CURSOR_KEY).filter(|k| !k.is_null());
            let page = Page {
                items: take_items(&mut obj),
                continuation_token: None,
                has_more: key.is_some(),
                count: lookup(&obj, COUNT_KEYS).map(coerce_count).unwrap_or(0),
            };
            match key {
                Some(key) => page.with_continuation_token(key.to_string()),
                None => page,
            }
        }
        (ResponseShape::Envelope, Json::Object(mut obj)) => Page {
            items: take_items(&mut obj),
            continuation_token: lookup(&obj, TOKEN_KEYS).and_then(coerce_token),
            has_more: lookup(&obj, HAS_MORE_KEYS)
                .map(|v| coerce_bool(&Value::from(v.clone())))
                .unwrap_or(false),
            count: lookup(&obj, COUNT_KEYS).map(coerce_count).unwrap_or(0),
        },
        (shape, _) => {
            log::warn!("Unrecognized response shape ({:?}), using an empty page", shape);
            Page::default()
        }
    }
}

/// Returns the first non-null value stored under any of `keys`.
fn lookup<'a>(obj: &'a Map<String, Json>, keys: &[&str]) -> Option<&'a Json> {
    keys.iter().filter_map(|k| obj.get(*k)).find(|v| !v.is_null())
}

fn take_items(obj: &mut Map<String, Json>) -> Vec<Row> {
    let key = ITEMS_KEYS
        .iter()
        .find(|k| obj.get(**k).is_some_and(Json::is_array));
    match key.and_then(|k| obj.remove(*k)) {
        Some(Json::Array(items)) => to_rows(items),
        _ => Vec::new(),
    }
}

fn to_rows(items: Vec<Json>) -> Vec<Row> {
    let total = items.len();
    let rows: Vec<Row> = items.into_iter().filter_map(|item| Row::try_from(item).ok()).collect();
    if rows.len() < total {
        log::warn!("Dropped {} non-object item(s) from response", total - rows.len());
    }
    rows
}

fn coerce_token(json: &Json) -> Option<String> {
    match json {
        Json::String(s) if s.is_empty() => None,
        Json::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn coerce_count(json: &Json) -> usize {
    let n = parse_float(&Value::from(json.clone()));
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}
