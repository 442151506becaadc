//! Reading values out of a page's `properties` bag.
//!
//! Schemas have been renamed over time, so the same semantic field may live
//! under different keys. Relation lookups therefore take an ordered list of
//! candidate keys: the first key present in the bag wins, and later keys are
//! only consulted when earlier ones are absent.

use crate::ids::PageId;
use serde_json::{Map, Value};

pub type PropertyBag = Map<String, Value>;

/// Relation from a template entry (or workout) to its template.
pub const TEMPLATE_RELATION: &[&str] = &["Workout Template", "workout template"];
/// Relation from a template entry to its exercise.
pub const EXERCISE_RELATION: &[&str] = &["Exercises", "Exercise"];
pub const REPS: &str = "Reps";
pub const WEIGHT: &str = "Weight";
pub const SET: &str = "Set #";

fn first_present<'a>(props: &'a PropertyBag, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|key| props.get(*key))
}

/// First related page id of a relation property, normalized.
///
/// `None` when no candidate key is present or the relation is empty.
pub fn relation_id(props: &PropertyBag, candidates: &[&str]) -> Option<PageId> {
    first_present(props, candidates)?
        .get("relation")?
        .as_array()?
        .first()?
        .get("id")?
        .as_str()
        .and_then(PageId::normalize)
}

/// Value of a number property. `None` for absent or `null` numbers.
pub fn number(props: &PropertyBag, key: &str) -> Option<f64> {
    props.get(key)?.get("number")?.as_f64()
}

/// Plain text of the first rich-text fragment.
pub fn plain_text(props: &PropertyBag, key: &str) -> Option<String> {
    props
        .get(key)?
        .get("rich_text")?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Builders for outgoing property values
// ---------------------------------------------------------------------------

pub fn relation_value(id: &PageId) -> Value {
    serde_json::json!({ "relation": [{ "id": id.as_str() }] })
}

pub fn rich_text_value(content: &str) -> Value {
    serde_json::json!({ "rich_text": [{ "text": { "content": content } }] })
}

pub fn title_value(content: &str) -> Value {
    serde_json::json!({ "title": [{ "text": { "content": content } }] })
}
