//! Route configuration.

use crate::auth::auth_middleware;
use crate::envelope::envelope_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check (intentionally unauthenticated for load balancers)
        .route("/v1/health", get(handlers::health_check))
        // Form definition CRUD
        .route(
            "/v1/forms",
            get(handlers::list_forms).post(handlers::create_form),
        )
        .route(
            "/v1/forms/{form_id}",
            get(handlers::get_form)
                .put(handlers::update_form)
                .delete(handlers::delete_form),
        )
        // Submission intake and retrieval
        .route(
            "/v1/forms/{form_id}/submissions",
            get(handlers::list_submissions).post(handlers::submit_form),
        )
        .route(
            "/v1/forms/{form_id}/submissions/{submission_id}",
            get(handlers::get_submission),
        )
        // Unknown routes still answer with the JSON error shape
        .fallback(handlers::not_found);

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: TraceLayer -> Envelope -> Auth -> Handler.
    // The envelope wraps auth so even 401 responses carry the CORS headers,
    // and OPTIONS pre-flight short-circuits before auth runs.
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(envelope_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
