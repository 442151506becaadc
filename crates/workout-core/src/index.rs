//! Template index: template id → ordered entry blueprints.
//!
//! Built by a full scan of the template-entries database. The scan is a lazy
//! stream of query pages, each request closing over the cursor returned by
//! the previous one, folded into the index as pages arrive.

use crate::api::{Page, PageApi, QueryPage};
use crate::error::{Result, WorkoutError};
use crate::ids::PageId;
use crate::properties::{self, EXERCISE_RELATION, TEMPLATE_RELATION};
use futures::stream::{self, Stream, TryStreamExt};
use serde::Serialize;
use std::collections::HashMap;

/// Placeholder set label when a template entry has none.
pub const UNSET_LABEL: &str = "N/A";

/// One template row: an exercise with its prescribed reps, weight and set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateEntryBlueprint {
    /// Id of the template-entry record this was read from.
    pub id: String,
    pub exercise_id: PageId,
    pub reps: f64,
    pub weight: f64,
    pub set: String,
}

impl TemplateEntryBlueprint {
    /// Parse a template-entry record. Returns the template it belongs to and
    /// the blueprint, or `None` when either relation is missing.
    pub fn from_page(page: &Page) -> Option<(PageId, Self)> {
        let props = &page.properties;
        let template_id = properties::relation_id(props, TEMPLATE_RELATION)?;
        let exercise_id = properties::relation_id(props, EXERCISE_RELATION)?;
        let blueprint = Self {
            id: page.id.clone(),
            exercise_id,
            reps: properties::number(props, properties::REPS).unwrap_or(0.0),
            weight: properties::number(props, properties::WEIGHT).unwrap_or(0.0),
            set: properties::plain_text(props, properties::SET)
                .unwrap_or_else(|| UNSET_LABEL.to_string()),
        };
        Some((template_id, blueprint))
    }
}

/// Template id → blueprints, in scan order.
///
/// Keys iterate in first-seen order; each list keeps the order its records
/// were scanned in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateIndex {
    order: Vec<PageId>,
    entries: HashMap<PageId, Vec<TemplateEntryBlueprint>>,
}

impl TemplateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template_id: PageId, blueprint: TemplateEntryBlueprint) {
        match self.entries.get_mut(&template_id) {
            Some(list) => list.push(blueprint),
            None => {
                self.order.push(template_id.clone());
                self.entries.insert(template_id, vec![blueprint]);
            }
        }
    }

    /// Add every usable record of a query page. Returns how many were kept.
    pub fn absorb(&mut self, pages: &[Page]) -> usize {
        let mut kept = 0;
        for page in pages {
            if let Some((template_id, blueprint)) = TemplateEntryBlueprint::from_page(page) {
                self.insert(template_id, blueprint);
                kept += 1;
            }
        }
        kept
    }

    pub fn get(&self, template_id: &PageId) -> Option<&[TemplateEntryBlueprint]> {
        self.entries.get(template_id).map(Vec::as_slice)
    }

    /// Templates with their blueprints, in first-seen order.
    pub fn templates(&self) -> impl Iterator<Item = (&PageId, &[TemplateEntryBlueprint])> {
        self.order
            .iter()
            .map(move |id| (id, self.entries[id].as_slice()))
    }

    pub fn template_count(&self) -> usize {
        self.order.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

enum Cursor {
    Start,
    Next(String),
}

/// Every page of `database_id`, lazily, until the collaborator reports no
/// next cursor. The first failed request ends the stream with its error.
pub fn query_pages<'a, A: PageApi>(
    api: &'a A,
    database_id: &'a str,
) -> impl Stream<Item = Result<QueryPage>> + Send + 'a {
    stream::try_unfold(Some(Cursor::Start), move |cursor| async move {
        let start = match cursor {
            None => return Ok(None),
            Some(Cursor::Start) => None,
            Some(Cursor::Next(c)) => Some(c),
        };
        let page = api.query_database(database_id, start.as_deref()).await?;
        let next = page.next_cursor.clone().map(Cursor::Next);
        Ok(Some((page, next)))
    })
}

/// Scan the template-entries database and build a fresh index.
///
/// Any failed page request fails the whole build; no partial index is
/// returned.
pub async fn build_template_index<A: PageApi>(
    api: &A,
    database_id: &str,
) -> Result<TemplateIndex> {
    tracing::info!("fetching all workout template entries");
    let mut pages_read = 0usize;
    let mut scanned = 0usize;

    let index = query_pages(api, database_id)
        .try_fold(TemplateIndex::new(), |mut index, page| {
            pages_read += 1;
            scanned += page.results.len();
            let kept = index.absorb(&page.results);
            tracing::debug!(
                page = pages_read,
                records = page.results.len(),
                kept,
                "scanned template entries page"
            );
            async move { Ok::<_, WorkoutError>(index) }
        })
        .await?;

    tracing::info!(
        entries = index.entry_count(),
        templates = index.template_count(),
        skipped = scanned - index.entry_count(),
        "built template index"
    );
    for (template_id, blueprints) in index.templates() {
        tracing::debug!(%template_id, entry_count = blueprints.len(), "template");
    }
    Ok(index)
}
