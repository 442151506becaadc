//! Interaction logging.
//!
//! The workflow reports each handled request to an [`InteractionObserver`].
//! Observers are side channels: they cannot fail the caller, and the
//! workflow behaves the same with [`NoopObserver`], [`InboxObserver`], or an
//! observer whose writes fail.

use crate::api::PageApi;
use crate::properties::{self, PropertyBag};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

/// Rich-text values are capped at this many characters by the page API.
pub const RICH_TEXT_LIMIT: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Success,
    Failure,
}

impl InteractionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionStatus::Success => "success",
            InteractionStatus::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionEvent {
    pub endpoint: String,
    pub request: Value,
    pub response: Value,
    pub status: InteractionStatus,
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn new(
        endpoint: impl Into<String>,
        request: Value,
        response: Value,
        status: InteractionStatus,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            request,
            response,
            status,
            timestamp: Utc::now(),
        }
    }

    /// Properties of the inbox page recording this event.
    pub fn to_properties(&self) -> PropertyBag {
        let mut props = PropertyBag::new();
        props.insert(
            "Name".into(),
            properties::title_value(&format!("API Call: {}", self.endpoint)),
        );
        props.insert(
            "Timestamp".into(),
            serde_json::json!({ "date": { "start": self.timestamp.to_rfc3339() } }),
        );
        props.insert(
            "Status".into(),
            serde_json::json!({ "select": { "name": self.status.as_str() } }),
        );
        props.insert(
            "Request".into(),
            properties::rich_text_value(&truncate(&pretty(&self.request), RICH_TEXT_LIMIT)),
        );
        props.insert(
            "Response".into(),
            properties::rich_text_value(&truncate(&pretty(&self.response), RICH_TEXT_LIMIT)),
        );
        props
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Cut `text` to `limit` characters, marking the cut with `...`.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

pub trait InteractionObserver: Send + Sync {
    fn record(&self, event: InteractionEvent);

    /// Hand over writes still running in the background, if any. Callers
    /// about to drop their runtime await these first.
    fn take_pending(&self) -> JoinSet<()> {
        JoinSet::new()
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl InteractionObserver for NoopObserver {
    fn record(&self, _event: InteractionEvent) {}
}

/// Writes each event as a page in an inbox database.
///
/// The write runs on a spawned task; errors are logged and dropped. Spawned
/// writes are tracked until [`InteractionObserver::take_pending`] collects
/// them.
pub struct InboxObserver<A> {
    api: Arc<A>,
    database_id: String,
    pending: Mutex<JoinSet<()>>,
}

impl<A> InboxObserver<A> {
    pub fn new(api: Arc<A>, database_id: impl Into<String>) -> Self {
        Self {
            api,
            database_id: database_id.into(),
            pending: Mutex::new(JoinSet::new()),
        }
    }
}

impl<A: PageApi + 'static> InteractionObserver for InboxObserver<A> {
    fn record(&self, event: InteractionEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(endpoint = %event.endpoint, "no runtime; interaction not logged");
            return;
        };
        let api = Arc::clone(&self.api);
        let database_id = self.database_id.clone();
        let write = async move {
            if let Err(e) = api.create_page(&database_id, event.to_properties()).await {
                tracing::warn!(
                    endpoint = %event.endpoint,
                    "failed to log API interaction: {e}"
                );
            }
        };

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished writes so a long-running server does not accumulate them.
        while pending.try_join_next().is_some() {}
        pending.spawn_on(write, &handle);
    }

    fn take_pending(&self) -> JoinSet<()> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *pending)
    }
}
