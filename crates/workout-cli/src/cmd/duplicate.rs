use crate::output::{print_json, print_table};
use anyhow::Result;
use workout_core::{Config, EntryOutcome, PageId, WorkflowOutcome};

pub fn run(config: Config, workout_id: &str, json: bool) -> Result<()> {
    let workout_id = PageId::parse(workout_id)?;
    let service = super::build_service(config)?;
    let rt = super::runtime()?;

    let outcome = rt.block_on(async {
        let outcome = service.duplicate_workout_entries(&workout_id).await;
        service.flush_interactions().await;
        outcome
    })?;

    if json {
        return print_json(&outcome);
    }

    match &outcome {
        WorkflowOutcome::NoTemplate { workout_id } => {
            println!("Workout {workout_id} has no template; nothing duplicated.");
        }
        WorkflowOutcome::NoEntriesForTemplate { template_id, .. } => {
            println!("Template {template_id} has no entries; nothing duplicated.");
        }
        WorkflowOutcome::Duplicated {
            template_id,
            entries,
            ..
        } => {
            let rows = entries
                .results
                .iter()
                .map(|r| {
                    let (status, detail) = match &r.outcome {
                        EntryOutcome::Created { entry_id } => ("created", entry_id.clone()),
                        EntryOutcome::Failed { reason } => ("failed", reason.clone()),
                    };
                    vec![
                        r.blueprint.exercise_id.to_string(),
                        r.blueprint.set.clone(),
                        status.to_string(),
                        detail,
                    ]
                })
                .collect();
            print_table(&["EXERCISE", "SET", "STATUS", "DETAIL"], rows);
            println!(
                "\nTemplate {template_id}: {} created, {} failed in {} batch(es).",
                entries.created(),
                entries.failed(),
                entries.batches
            );
        }
    }
    Ok(())
}
