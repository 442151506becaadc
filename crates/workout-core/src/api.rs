//! The page-database collaborator, as seen by the workflow.
//!
//! [`PageApi`] covers the three calls duplication needs. The HTTP
//! implementation lives in [`crate::client`]; tests substitute an in-memory
//! store.

use crate::error::Result;
use crate::ids::PageId;
use crate::properties::PropertyBag;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A single record with its property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

/// One page of a database query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Page>,
    /// Continuation token. `None` means this was the last page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Access to a hosted page database.
///
/// Uses native async fn in traits; every future is `Send` so callers can run
/// inside spawned tasks and axum handlers.
pub trait PageApi: Send + Sync {
    /// `POST /databases/{id}/query`, continuing from `start_cursor` if given.
    fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> impl Future<Output = Result<QueryPage>> + Send;

    /// `GET /pages/{id}`.
    fn retrieve_page(&self, page_id: &PageId) -> impl Future<Output = Result<Page>> + Send;

    /// `POST /pages` with `{parent: {database_id}, properties}`.
    fn create_page(
        &self,
        database_id: &str,
        properties: PropertyBag,
    ) -> impl Future<Output = Result<Page>> + Send;
}
