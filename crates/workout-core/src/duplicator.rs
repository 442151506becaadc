//! Creating workout entries from template blueprints.
//!
//! Blueprints are created in fixed-size batches. Calls within a batch run
//! concurrently and settle independently; the loop waits for the whole batch
//! before pausing and starting the next one. A batch containing a failure is
//! followed by the longer backoff pause.

use crate::api::PageApi;
use crate::config::DuplicationConfig;
use crate::ids::PageId;
use crate::index::TemplateEntryBlueprint;
use crate::properties::{self, PropertyBag};
use futures::future::join_all;
use serde::Serialize;

/// Property names on the workout-entries database.
pub const ENTRY_WORKOUT: &str = "Workout";
pub const ENTRY_EXERCISE: &str = "Exercises";
pub const ENTRY_SET: &str = "set";
pub const ENTRY_WEIGHT: &str = "weight";
pub const ENTRY_REPS: &str = "reps";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Created { entry_id: String },
    Failed { reason: String },
}

impl EntryOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, EntryOutcome::Created { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryResult {
    pub blueprint: TemplateEntryBlueprint,
    pub outcome: EntryOutcome,
}

/// Per-blueprint results of one duplication, in blueprint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicationOutcome {
    pub results: Vec<EntryResult>,
    pub batches: usize,
}

impl DuplicationOutcome {
    pub fn created(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_created()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.created()
    }

    /// Failed blueprints with the reason each one failed.
    pub fn failures(&self) -> impl Iterator<Item = (&TemplateEntryBlueprint, &str)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            EntryOutcome::Failed { reason } => Some((&r.blueprint, reason.as_str())),
            EntryOutcome::Created { .. } => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Numbers are stored as text on the entries database: `10`, `52.5`.
fn number_text(value: f64) -> String {
    value.to_string()
}

/// Properties of a new entry linking `workout_id` to the blueprint's exercise.
pub fn entry_properties(workout_id: &PageId, blueprint: &TemplateEntryBlueprint) -> PropertyBag {
    let mut props = PropertyBag::new();
    props.insert(ENTRY_WORKOUT.into(), properties::relation_value(workout_id));
    props.insert(
        ENTRY_EXERCISE.into(),
        properties::relation_value(&blueprint.exercise_id),
    );
    props.insert(ENTRY_SET.into(), properties::rich_text_value(&blueprint.set));
    props.insert(
        ENTRY_WEIGHT.into(),
        properties::rich_text_value(&number_text(blueprint.weight)),
    );
    props.insert(
        ENTRY_REPS.into(),
        properties::rich_text_value(&number_text(blueprint.reps)),
    );
    props
}

// ---------------------------------------------------------------------------
// Duplicator
// ---------------------------------------------------------------------------

pub struct Duplicator<'a, A> {
    api: &'a A,
    entries_db_id: &'a str,
    config: &'a DuplicationConfig,
}

impl<'a, A: PageApi> Duplicator<'a, A> {
    pub fn new(api: &'a A, entries_db_id: &'a str, config: &'a DuplicationConfig) -> Self {
        Self {
            api,
            entries_db_id,
            config,
        }
    }

    /// Create one entry per blueprint in `workout_id`.
    ///
    /// Never fails as a whole: individual create failures are recorded in the
    /// returned outcome and the remaining batches still run.
    pub async fn duplicate(
        &self,
        workout_id: &PageId,
        blueprints: &[TemplateEntryBlueprint],
    ) -> DuplicationOutcome {
        let batch_size = self.config.batch_size.max(1);
        let total_batches = blueprints.len().div_ceil(batch_size);
        let mut outcome = DuplicationOutcome {
            results: Vec::with_capacity(blueprints.len()),
            batches: total_batches,
        };

        for (n, batch) in blueprints.chunks(batch_size).enumerate() {
            tracing::debug!(
                batch = n + 1,
                of = total_batches,
                size = batch.len(),
                "creating workout entries"
            );
            let settled = join_all(batch.iter().map(|bp| self.create_entry(workout_id, bp))).await;
            let batch_failed = settled.iter().any(|o| !o.is_created());

            outcome
                .results
                .extend(batch.iter().cloned().zip(settled).map(|(blueprint, outcome)| {
                    EntryResult { blueprint, outcome }
                }));

            if n + 1 < total_batches {
                let pause = if batch_failed {
                    self.config.backoff_delay
                } else {
                    self.config.base_delay
                };
                tokio::time::sleep(pause).await;
            }
        }

        outcome
    }

    async fn create_entry(
        &self,
        workout_id: &PageId,
        blueprint: &TemplateEntryBlueprint,
    ) -> EntryOutcome {
        let props = entry_properties(workout_id, blueprint);
        match self.api.create_page(self.entries_db_id, props).await {
            Ok(page) => {
                tracing::info!(
                    entry_id = %page.id,
                    exercise_id = %blueprint.exercise_id,
                    "created workout entry"
                );
                EntryOutcome::Created { entry_id: page.id }
            }
            Err(e) => {
                tracing::warn!(
                    exercise_id = %blueprint.exercise_id,
                    "failed to create workout entry: {e}"
                );
                EntryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
