//! Wire protocol: the page request, response normalization and the
//! [`PageSource`] seam the grid fetches through.

mod page;
mod request;

pub use page::*;
pub use request::*;

use async_trait::async_trait;

use crate::error::ApiError;

/// Something that can fetch a page of rows for a request.
///
/// [`GridClient`](crate::GridClient) is the HTTP implementation; tests and
/// embedders can plug in their own.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches and normalizes one page.
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, ApiError>;
}
