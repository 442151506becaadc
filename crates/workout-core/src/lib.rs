pub mod api;
pub mod client;
pub mod config;
pub mod duplicator;
pub mod error;
pub mod ids;
pub mod index;
pub mod observer;
pub mod properties;
pub mod resolver;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{Page, PageApi, QueryPage};
pub use client::NotionClient;
pub use config::{Config, DuplicationConfig};
pub use duplicator::{DuplicationOutcome, EntryOutcome, EntryResult};
pub use error::{Result, WorkoutError};
pub use ids::PageId;
pub use index::{TemplateEntryBlueprint, TemplateIndex};
pub use observer::{InboxObserver, InteractionEvent, InteractionObserver, NoopObserver};
pub use workflow::{WorkflowOutcome, WorkoutService};
