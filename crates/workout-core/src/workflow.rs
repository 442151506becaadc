//! The duplication workflow.
//!
//! ```text
//! Start → IndexBuilt → TemplateResolved → Duplicated → Done
//!              │               │
//!              │               ├─ no template relation   → NoTemplate
//!              │               └─ template not in index  → NoEntriesForTemplate
//!              └─ any failed fetch                        → Failed(error)
//! ```
//!
//! The index is rebuilt for every request and owned by it; nothing is shared
//! between concurrent requests.

use crate::api::PageApi;
use crate::config::Config;
use crate::duplicator::{DuplicationOutcome, Duplicator};
use crate::error::Result;
use crate::ids::PageId;
use crate::index::{self, TemplateEntryBlueprint, TemplateIndex};
use crate::observer::{InteractionEvent, InteractionObserver, InteractionStatus, NoopObserver};
use crate::resolver;
use serde::Serialize;
use std::sync::Arc;

/// Endpoint name used when reporting duplication requests to the observer.
pub const DUPLICATE_ENDPOINT: &str = "duplicate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    IndexBuilt,
    TemplateResolved,
    Duplicated,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::IndexBuilt => "index_built",
            Stage::TemplateResolved => "template_resolved",
            Stage::Duplicated => "duplicated",
        }
    }
}

/// Terminal state of a request that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkflowOutcome {
    /// The workout references no template; nothing to do.
    NoTemplate { workout_id: PageId },
    /// The template has no entries in the template-entries database.
    NoEntriesForTemplate {
        workout_id: PageId,
        template_id: PageId,
    },
    Duplicated {
        workout_id: PageId,
        template_id: PageId,
        entries: DuplicationOutcome,
    },
}

impl WorkflowOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowOutcome::NoTemplate { .. } => "no_template",
            WorkflowOutcome::NoEntriesForTemplate { .. } => "no_entries_for_template",
            WorkflowOutcome::Duplicated { .. } => "duplicated",
        }
    }

    pub fn template_id(&self) -> Option<&PageId> {
        match self {
            WorkflowOutcome::NoTemplate { .. } => None,
            WorkflowOutcome::NoEntriesForTemplate { template_id, .. }
            | WorkflowOutcome::Duplicated { template_id, .. } => Some(template_id),
        }
    }

    pub fn entries(&self) -> Option<&DuplicationOutcome> {
        match self {
            WorkflowOutcome::Duplicated { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Short JSON summary, used for interaction logging.
    pub fn summary(&self) -> serde_json::Value {
        let (created, failed) = self
            .entries()
            .map(|e| (e.created(), e.failed()))
            .unwrap_or((0, 0));
        serde_json::json!({
            "outcome": self.name(),
            "template_id": self.template_id(),
            "created": created,
            "failed": failed,
        })
    }
}

// ---------------------------------------------------------------------------
// WorkoutService
// ---------------------------------------------------------------------------

/// Entry point for duplication requests.
pub struct WorkoutService<A> {
    api: A,
    config: Arc<Config>,
    observer: Arc<dyn InteractionObserver>,
}

impl<A: PageApi> WorkoutService<A> {
    pub fn new(api: A, config: Arc<Config>) -> Self {
        Self {
            api,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn InteractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full scan of the template-entries database.
    pub async fn build_template_index(&self) -> Result<TemplateIndex> {
        index::build_template_index(&self.api, &self.config.template_entries_db_id).await
    }

    pub async fn resolve_template_id(&self, workout_id: &PageId) -> Result<Option<PageId>> {
        resolver::resolve_template_id(&self.api, workout_id).await
    }

    pub async fn duplicate(
        &self,
        workout_id: &PageId,
        blueprints: &[TemplateEntryBlueprint],
    ) -> DuplicationOutcome {
        Duplicator::new(
            &self.api,
            &self.config.entries_db_id,
            &self.config.duplication,
        )
        .duplicate(workout_id, blueprints)
        .await
    }

    /// Run the whole workflow for one workout and report it to the observer.
    ///
    /// Only failures that prevent working out *which* entries to create are
    /// returned as errors; failed creates are part of the outcome.
    pub async fn duplicate_workout_entries(
        &self,
        workout_id: &PageId,
    ) -> Result<WorkflowOutcome> {
        let result = self.run(workout_id).await;

        let request = serde_json::json!({ "workout_id": workout_id });
        let event = match &result {
            Ok(outcome) => InteractionEvent::new(
                DUPLICATE_ENDPOINT,
                request,
                outcome.summary(),
                InteractionStatus::Success,
            ),
            Err(e) => InteractionEvent::new(
                DUPLICATE_ENDPOINT,
                request,
                serde_json::json!({ "error": e.to_string() }),
                InteractionStatus::Failure,
            ),
        };
        self.observer.record(event);

        result
    }

    /// Wait for interaction writes still in flight. One-shot callers run this
    /// before dropping their runtime, which would otherwise cancel the writes.
    pub async fn flush_interactions(&self) {
        let mut pending = self.observer.take_pending();
        while let Some(res) = pending.join_next().await {
            if let Err(e) = res {
                tracing::warn!("interaction write did not complete: {e}");
            }
        }
    }

    async fn run(&self, workout_id: &PageId) -> Result<WorkflowOutcome> {
        tracing::info!(
            %workout_id,
            stage = Stage::Start.as_str(),
            "duplicating workout entries"
        );

        let index = self.build_template_index().await?;
        tracing::debug!(%workout_id, stage = Stage::IndexBuilt.as_str());

        let Some(template_id) = self.resolve_template_id(workout_id).await? else {
            tracing::warn!(%workout_id, "no matching template found for workout");
            return Ok(WorkflowOutcome::NoTemplate {
                workout_id: workout_id.clone(),
            });
        };
        tracing::debug!(%workout_id, %template_id, stage = Stage::TemplateResolved.as_str());

        let Some(blueprints) = index.get(&template_id) else {
            tracing::warn!(
                %workout_id,
                %template_id,
                "no template entries found for template"
            );
            return Ok(WorkflowOutcome::NoEntriesForTemplate {
                workout_id: workout_id.clone(),
                template_id,
            });
        };

        tracing::info!(
            %workout_id,
            %template_id,
            count = blueprints.len(),
            "duplicating entries"
        );
        let entries = self.duplicate(workout_id, blueprints).await;
        tracing::info!(
            %workout_id,
            stage = Stage::Duplicated.as_str(),
            created = entries.created(),
            failed = entries.failed(),
            "workout entries duplicated"
        );

        Ok(WorkflowOutcome::Duplicated {
            workout_id: workout_id.clone(),
            template_id,
            entries,
        })
    }
}
