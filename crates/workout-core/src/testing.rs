//! In-memory [`PageApi`] for unit tests.

use crate::api::{Page, PageApi, QueryPage};
use crate::error::{Result, WorkoutError};
use crate::ids::PageId;
use crate::properties::{self, PropertyBag, EXERCISE_RELATION};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A create call as the fake saw it.
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub database_id: String,
    pub properties: PropertyBag,
    pub at: Instant,
}

impl CreateCall {
    pub fn relation(&self, key: &str) -> Option<PageId> {
        properties::relation_id(&self.properties, &[key])
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.properties
            .get(key)?
            .get("rich_text")?
            .get(0)?
            .get("text")?
            .get("content")?
            .as_str()
            .map(str::to_string)
    }
}

#[derive(Default)]
pub struct FakePages {
    query_pages: HashMap<String, Vec<Vec<Page>>>,
    failing_query_page: Option<usize>,
    pages: HashMap<PageId, Page>,
    retrieve_status: Option<u16>,
    failing_exercises: HashSet<PageId>,
    failing_databases: HashSet<String>,
    create_latency: Duration,
    query_calls: AtomicUsize,
    retrieve_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    creates: Mutex<Vec<CreateCall>>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query results for `database_id`, one inner vec per page. Cursors are
    /// `cursor-<n>` for page `n`.
    pub fn with_query_pages(mut self, database_id: &str, pages: Vec<Vec<Page>>) -> Self {
        self.query_pages.insert(database_id.to_string(), pages);
        self
    }

    /// Answer 500 when page `n` (zero-based) is requested.
    pub fn failing_query_page(mut self, n: usize) -> Self {
        self.failing_query_page = Some(n);
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        let id = PageId::parse(&page.id).unwrap();
        self.pages.insert(id, page);
        self
    }

    /// A workout page whose template relation points at `template`.
    pub fn with_workout(self, workout_id: &str, template: Option<&str>) -> Self {
        let properties = match template {
            Some(t) => serde_json::json!({
                "Workout Template": { "type": "relation", "relation": [{ "id": t }] },
            }),
            None => serde_json::json!({
                "Workout Template": { "type": "relation", "relation": [] },
            }),
        };
        self.with_page(Page {
            id: workout_id.to_string(),
            properties: properties.as_object().cloned().unwrap(),
        })
    }

    /// Every `retrieve_page` answers with this status.
    pub fn failing_retrieve(mut self, status: u16) -> Self {
        self.retrieve_status = Some(status);
        self
    }

    /// Creates linking to `exercise_id` answer 400.
    pub fn failing_exercise(mut self, exercise_id: &str) -> Self {
        self.failing_exercises
            .insert(PageId::parse(exercise_id).unwrap());
        self
    }

    /// Every create in `database_id` answers 503.
    pub fn failing_database(mut self, database_id: &str) -> Self {
        self.failing_databases.insert(database_id.to_string());
        self
    }

    /// Each create call sleeps this long before answering.
    pub fn with_create_latency(mut self, latency: Duration) -> Self {
        self.create_latency = latency;
        self
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.lock().unwrap().clone()
    }

    /// Create calls grouped by the instant they were issued.
    pub fn create_batches(&self) -> Vec<(Instant, usize)> {
        let mut batches: Vec<(Instant, usize)> = Vec::new();
        for call in self.creates() {
            match batches.last_mut() {
                Some((at, n)) if *at == call.at => *n += 1,
                _ => batches.push((call.at, 1)),
            }
        }
        batches
    }
}

fn api_error(operation: &'static str, status: u16) -> WorkoutError {
    WorkoutError::Api {
        operation,
        status,
        body: format!(r#"{{"object":"error","status":{status}}}"#),
    }
}

impl PageApi for FakePages {
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let n = match start_cursor {
            None => 0,
            Some(c) => c.trim_start_matches("cursor-").parse().unwrap(),
        };
        if self.failing_query_page == Some(n) {
            return Err(api_error("query database", 500));
        }
        let pages = self
            .query_pages
            .get(database_id)
            .ok_or_else(|| api_error("query database", 404))?;
        let results = pages.get(n).cloned().unwrap_or_default();
        let next_cursor = (n + 1 < pages.len()).then(|| format!("cursor-{}", n + 1));
        Ok(QueryPage {
            results,
            next_cursor,
        })
    }

    async fn retrieve_page(&self, page_id: &PageId) -> Result<Page> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.retrieve_status {
            return Err(api_error("retrieve page", status));
        }
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| api_error("retrieve page", 404))
    }

    async fn create_page(&self, database_id: &str, properties: PropertyBag) -> Result<Page> {
        let call = CreateCall {
            database_id: database_id.to_string(),
            properties,
            at: Instant::now(),
        };
        let exercise = properties::relation_id(&call.properties, EXERCISE_RELATION);
        let index = {
            let mut creates = self.creates.lock().unwrap();
            creates.push(call);
            creates.len()
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.create_latency.is_zero() {
            tokio::time::sleep(self.create_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_databases.contains(database_id) {
            return Err(api_error("create page", 503));
        }
        if exercise.is_some_and(|e| self.failing_exercises.contains(&e)) {
            return Err(api_error("create page", 400));
        }
        Ok(Page {
            id: format!("created-{index}"),
            properties: PropertyBag::new(),
        })
    }
}
