pub mod handlers;

pub use handlers::AppState;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the Axum router with all endpoints. `ui_dir` adds static
/// serving of the single-page UI bundle when set.
pub fn create_router(state: AppState, ui_dir: Option<&Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Task CRUD and status views
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        // Person CRUD
        .route(
            "/api/persons",
            get(handlers::list_persons).post(handlers::create_person),
        )
        .route(
            "/api/persons/{id}",
            put(handlers::update_person).delete(handlers::delete_person),
        )
        // Read models
        .route("/api/overview", get(handlers::overview))
        // Export/import round-trip
        .route("/api/export", get(handlers::export_data))
        .route("/api/import", post(handlers::import_data))
        // Toasts
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/{id}",
            delete(handlers::dismiss_notification),
        )
        // Confirmation dialog slot
        .route(
            "/api/confirmations/current",
            get(handlers::current_confirmation),
        )
        .route(
            "/api/confirmations/{id}/resolve",
            post(handlers::resolve_confirmation),
        );

    if let Some(dir) = ui_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
