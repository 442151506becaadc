use crate::api::PageApi;
use crate::error::Result;
use crate::ids::PageId;
use crate::properties::{self, TEMPLATE_RELATION};

/// Find the template a workout was created from.
///
/// `Ok(None)` when the workout has no template relation, or an empty one; a
/// workout without a template is not an error. A failed fetch is.
pub async fn resolve_template_id<A: PageApi>(
    api: &A,
    workout_id: &PageId,
) -> Result<Option<PageId>> {
    tracing::info!(%workout_id, "fetching workout details");
    let workout = api.retrieve_page(workout_id).await?;
    let template_id = properties::relation_id(&workout.properties, TEMPLATE_RELATION);
    match &template_id {
        Some(id) => tracing::info!(%workout_id, template_id = %id, "matched template"),
        None => tracing::info!(%workout_id, "workout has no template relation"),
    }
    Ok(template_id)
}
