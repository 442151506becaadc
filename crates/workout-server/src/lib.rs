pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use workout_core::{PageApi, WorkoutService};

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router<A: PageApi + 'static>(service: WorkoutService<A>) -> Router {
    let app_state = state::AppState::new(service);

    Router::new()
        // Duplication: the workout id travels as a query parameter.
        .route(
            "/",
            get(routes::duplicate::duplicate_entries::<A>)
                .post(routes::duplicate::duplicate_entries::<A>),
        )
        .route(
            "/duplicate",
            get(routes::duplicate::duplicate_entries::<A>)
                .post(routes::duplicate::duplicate_entries::<A>),
        )
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the duplication server on `port`.
pub async fn serve<A: PageApi + 'static>(
    service: WorkoutService<A>,
    port: u16,
) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(service, listener).await
}

/// Start the duplication server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on<A: PageApi + 'static>(
    service: WorkoutService<A>,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(service);

    tracing::info!("workout duplication server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
