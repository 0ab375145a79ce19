//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    Availability, AvailabilityUpdate, Booking, CreateBookingRequest, DataResponse, DateOverride,
    EventType, EventTypeUpdate, HealthResponse, MeetingCounts, MeetingsQuery, NewAvailability,
    NewDateOverride, NewEventType, RescheduleRequest, Slot, SlugAvailability, SlugQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::BookingRepository;
use crate::models::{parse_date, AvailabilityId, BookingId, EventTypeId, OverrideId};
use crate::services::{self, availability, event_types, meetings, MeetingFilter};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<DataResponse<T>>), AppError>;

fn data<T>(value: T) -> HandlerResult<DataResponse<T>> {
    Ok(Json(DataResponse::new(value)))
}

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(DataResponse::new(value))))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Public booking flow
// =============================================================================

/// GET /api/bookings/slots/{slug}/{date}
///
/// Free slots for an event type on a `YYYY-MM-DD` date.
pub async fn get_available_slots(
    State(state): State<AppState>,
    Path((slug, date)): Path<(String, String)>,
) -> HandlerResult<DataResponse<Vec<Slot>>> {
    let date = parse_date(&date)
        .map_err(|e| AppError::BadRequest(format!("Invalid date '{}': {}", date, e)))?;
    let ctx = state.context();
    let slots =
        services::get_available_slots(state.repository.as_ref(), &ctx, &slug, date).await?;
    data(slots)
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> CreatedResult<Booking> {
    let ctx = state.context();
    let booking = services::create_booking(state.repository.as_ref(), &ctx, &request).await?;
    created(booking)
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<Booking>> {
    data(services::get_booking(state.repository.as_ref(), BookingId(id)).await?)
}

/// PUT /api/bookings/{id}/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<Booking>> {
    let booking = services::cancel_booking(state.repository.as_ref(), BookingId(id)).await?;
    Ok(Json(DataResponse::with_message(booking, "Booking cancelled")))
}

/// PUT /api/bookings/{id}/reschedule
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RescheduleRequest>,
) -> HandlerResult<DataResponse<Booking>> {
    let ctx = state.context();
    let booking = services::reschedule_booking(
        state.repository.as_ref(),
        &ctx,
        BookingId(id),
        request.new_start_time,
    )
    .await?;
    Ok(Json(DataResponse::with_message(booking, "Booking rescheduled")))
}

// =============================================================================
// Event types
// =============================================================================

/// GET /api/event-types
pub async fn list_event_types(
    State(state): State<AppState>,
) -> HandlerResult<DataResponse<Vec<EventType>>> {
    let host_id = state.booking.host_id;
    data(event_types::list_event_types(state.repository.as_ref(), host_id).await?)
}

/// POST /api/event-types
pub async fn create_event_type(
    State(state): State<AppState>,
    Json(new): Json<NewEventType>,
) -> CreatedResult<EventType> {
    let host_id = state.booking.host_id;
    created(event_types::create_event_type(state.repository.as_ref(), host_id, &new).await?)
}

/// GET /api/event-types/slug/{slug}
pub async fn get_event_type_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> HandlerResult<DataResponse<EventType>> {
    let host_id = state.booking.host_id;
    data(event_types::get_event_type_by_slug(state.repository.as_ref(), host_id, &slug).await?)
}

/// GET /api/event-types/check-slug?slug=&exclude_id=
pub async fn check_slug(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> HandlerResult<DataResponse<SlugAvailability>> {
    let host_id = state.booking.host_id;
    let available = event_types::is_slug_available(
        state.repository.as_ref(),
        host_id,
        &query.slug,
        query.exclude_id.map(EventTypeId),
    )
    .await?;
    data(SlugAvailability {
        slug: query.slug,
        available,
    })
}

/// GET /api/event-types/{id}
pub async fn get_event_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<EventType>> {
    data(event_types::get_event_type(state.repository.as_ref(), EventTypeId(id)).await?)
}

/// PUT /api/event-types/{id}
pub async fn update_event_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<EventTypeUpdate>,
) -> HandlerResult<DataResponse<EventType>> {
    data(event_types::update_event_type(state.repository.as_ref(), EventTypeId(id), &update).await?)
}

/// DELETE /api/event-types/{id}
pub async fn delete_event_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    event_types::delete_event_type(state.repository.as_ref(), EventTypeId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Availability
// =============================================================================

/// GET /api/availability
pub async fn list_availabilities(
    State(state): State<AppState>,
) -> HandlerResult<DataResponse<Vec<Availability>>> {
    let host_id = state.booking.host_id;
    data(availability::list_availabilities(state.repository.as_ref(), host_id).await?)
}

/// POST /api/availability
pub async fn create_availability(
    State(state): State<AppState>,
    Json(new): Json<NewAvailability>,
) -> CreatedResult<Availability> {
    let host_id = state.booking.host_id;
    created(availability::create_availability(state.repository.as_ref(), host_id, &new).await?)
}

/// GET /api/availability/default
///
/// Creates the working-hours default on first access.
pub async fn get_default_availability(
    State(state): State<AppState>,
) -> HandlerResult<DataResponse<Availability>> {
    let host_id = state.booking.host_id;
    data(availability::get_default_availability(state.repository.as_ref(), host_id).await?)
}

/// GET /api/availability/{id}
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<Availability>> {
    data(availability::get_availability(state.repository.as_ref(), AvailabilityId(id)).await?)
}

/// PUT /api/availability/{id}
pub async fn update_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<AvailabilityUpdate>,
) -> HandlerResult<DataResponse<Availability>> {
    let updated =
        availability::update_availability(state.repository.as_ref(), AvailabilityId(id), &update)
            .await?;
    data(updated)
}

/// POST /api/availability/{id}/overrides
///
/// Adds or replaces the override for the given date.
pub async fn add_date_override(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(new): Json<NewDateOverride>,
) -> CreatedResult<DateOverride> {
    let saved =
        availability::add_date_override(state.repository.as_ref(), AvailabilityId(id), &new)
            .await?;
    created(saved)
}

/// DELETE /api/availability/overrides/{override_id}
pub async fn remove_date_override(
    State(state): State<AppState>,
    Path(override_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    availability::remove_date_override(state.repository.as_ref(), OverrideId(override_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Meetings (host view)
// =============================================================================

/// GET /api/meetings?filter=upcoming|past|cancelled
pub async fn list_meetings(
    State(state): State<AppState>,
    Query(query): Query<MeetingsQuery>,
) -> HandlerResult<DataResponse<Vec<Booking>>> {
    let filter: MeetingFilter = query
        .filter
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;
    let ctx = state.context();
    data(meetings::list_meetings(state.repository.as_ref(), &ctx, filter).await?)
}

/// GET /api/meetings/counts
pub async fn meeting_counts(
    State(state): State<AppState>,
) -> HandlerResult<DataResponse<MeetingCounts>> {
    let ctx = state.context();
    data(meetings::meeting_counts(state.repository.as_ref(), &ctx).await?)
}

/// GET /api/meetings/{id}
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<Booking>> {
    data(meetings::get_meeting(state.repository.as_ref(), BookingId(id)).await?)
}

/// PUT /api/meetings/{id}/cancel
pub async fn cancel_meeting(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<DataResponse<Booking>> {
    let booking = meetings::cancel_meeting(state.repository.as_ref(), BookingId(id)).await?;
    Ok(Json(DataResponse::with_message(booking, "Meeting cancelled")))
}
