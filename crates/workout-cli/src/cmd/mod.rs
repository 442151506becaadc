pub mod duplicate;
pub mod schema;
pub mod serve;
pub mod templates;

use std::sync::Arc;
use workout_core::{Config, InboxObserver, NotionClient, WorkoutService};

/// Build the service, attaching the inbox observer when an inbox database is
/// configured.
pub fn build_service(config: Config) -> anyhow::Result<WorkoutService<NotionClient>> {
    let client = NotionClient::new(&config)?;
    let inbox = config.inbox_db_id.clone();
    let service = WorkoutService::new(client.clone(), Arc::new(config));

    Ok(match inbox {
        Some(database_id) => {
            tracing::debug!(%database_id, "interaction logging enabled");
            service.with_observer(Arc::new(InboxObserver::new(Arc::new(client), database_id)))
        }
        None => service,
    })
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}
