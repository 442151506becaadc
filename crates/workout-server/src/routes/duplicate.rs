use axum::extract::{Query, State};
use axum::Json;
use workout_core::{PageApi, PageId, WorkflowOutcome};

use crate::error::AppError;
use crate::state::AppState;

pub const MISSING_WORKOUT_ID: &str = "Missing required 'workout_id' parameter.";

#[derive(serde::Deserialize)]
pub struct DuplicateParams {
    pub workout_id: Option<String>,
}

/// GET|POST /?workout_id=<id> — copy the workout's template entries into it.
pub async fn duplicate_entries<A: PageApi + 'static>(
    State(app): State<AppState<A>>,
    Query(params): Query<DuplicateParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let raw = params
        .workout_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_WORKOUT_ID))?;
    let workout_id = PageId::parse(raw)?;

    let outcome = app.service.duplicate_workout_entries(&workout_id).await?;
    Ok(Json(outcome_body(&outcome)))
}

fn outcome_body(outcome: &WorkflowOutcome) -> serde_json::Value {
    let (message, created, failures) = match outcome {
        WorkflowOutcome::NoTemplate { .. } => (
            "No matching template found for workout.".to_string(),
            0,
            Vec::new(),
        ),
        WorkflowOutcome::NoEntriesForTemplate { .. } => (
            "No template entries found for the workout's template.".to_string(),
            0,
            Vec::new(),
        ),
        WorkflowOutcome::Duplicated { entries, .. } => {
            let failures: Vec<serde_json::Value> = entries
                .failures()
                .map(|(blueprint, reason)| {
                    serde_json::json!({
                        "template_entry_id": blueprint.id,
                        "exercise_id": blueprint.exercise_id,
                        "reason": reason,
                    })
                })
                .collect();
            let message = if failures.is_empty() {
                "Workout entries duplicated successfully.".to_string()
            } else {
                format!(
                    "Workout entries duplicated with {} failure(s).",
                    failures.len()
                )
            };
            (message, entries.created(), failures)
        }
    };

    serde_json::json!({
        "message": message,
        "outcome": outcome.name(),
        "template_id": outcome.template_id(),
        "created": created,
        "failed": failures.len(),
        "failures": failures,
    })
}
