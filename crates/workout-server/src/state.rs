use std::sync::Arc;
use workout_core::{PageApi, WorkoutService};

/// Shared application state passed to all route handlers.
pub struct AppState<A> {
    pub service: Arc<WorkoutService<A>>,
}

// Manual impl: cloning only bumps the Arc, so `A` need not be `Clone`.
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<A: PageApi> AppState<A> {
    pub fn new(service: WorkoutService<A>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
