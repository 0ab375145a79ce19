//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - the booking page is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Public booking flow
        .route("/bookings", post(handlers::create_booking))
        .route(
            "/bookings/slots/{slug}/{date}",
            get(handlers::get_available_slots),
        )
        .route("/bookings/{id}", get(handlers::get_booking))
        .route("/bookings/{id}/cancel", put(handlers::cancel_booking))
        .route("/bookings/{id}/reschedule", put(handlers::reschedule_booking))
        // Event types
        .route(
            "/event-types",
            get(handlers::list_event_types).post(handlers::create_event_type),
        )
        .route("/event-types/check-slug", get(handlers::check_slug))
        .route("/event-types/slug/{slug}", get(handlers::get_event_type_by_slug))
        .route(
            "/event-types/{id}",
            get(handlers::get_event_type)
                .put(handlers::update_event_type)
                .delete(handlers::delete_event_type),
        )
        // Availability
        .route(
            "/availability",
            get(handlers::list_availabilities).post(handlers::create_availability),
        )
        .route("/availability/default", get(handlers::get_default_availability))
        .route(
            "/availability/{id}",
            get(handlers::get_availability).put(handlers::update_availability),
        )
        .route("/availability/{id}/overrides", post(handlers::add_date_override))
        .route(
            "/availability/overrides/{override_id}",
            delete(handlers::remove_date_override),
        )
        // Meetings
        .route("/meetings", get(handlers::list_meetings))
        .route("/meetings/counts", get(handlers::meeting_counts))
        .route("/meetings/{id}", get(handlers::get_meeting))
        .route("/meetings/{id}/cancel", put(handlers::cancel_meeting));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
