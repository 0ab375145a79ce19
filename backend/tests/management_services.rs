//! Host-side management: event types, availability schedules and meetings.

mod support;

use slotbook::db::LocalRepository;
use slotbook::models::{
    AvailabilityId, AvailabilityUpdate, BookingStatus, DayWindow, EventTypeId, EventTypeUpdate,
    HostId, NewAvailability, NewAvailabilityRule, NewBooking, NewDateOverride, NewEventType,
    DEFAULT_EVENT_COLOR, DEFAULT_SCHEDULE_NAME,
};
use slotbook::services::availability::{
    add_date_override, create_availability, get_availability, get_default_availability,
    list_availabilities, remove_date_override, resolve_day, update_availability,
};
use slotbook::services::event_types::{
    create_event_type, delete_event_type, get_event_type, get_event_type_by_slug,
    is_slug_available, list_event_types, update_event_type,
};
use slotbook::services::meetings::{cancel_meeting, list_meetings, meeting_counts};
use slotbook::services::{create_booking, BookingError, MeetingFilter};

use support::{at, ctx, date, hm, request, seed_event_type, wednesday};

const HOST: HostId = HostId(1);

// =============================================================================
// Event types
// =============================================================================

#[tokio::test]
async fn test_create_event_type_applies_defaults() {
    let repo = LocalRepository::new();
    let created = create_event_type(&repo, HOST, &NewEventType::new("  Intro call ", "intro", 30))
        .await
        .unwrap();

    assert_eq!(created.name, "Intro call");
    assert_eq!(created.color, DEFAULT_EVENT_COLOR);
    assert!(created.is_active);
    assert_eq!(get_event_type(&repo, created.id).await.unwrap(), created);
    assert_eq!(get_event_type_by_slug(&repo, HOST, "intro").await.unwrap().id, created.id);
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let repo = LocalRepository::new();
    seed_event_type(&repo, "intro", 30).await;

    let err = create_event_type(&repo, HOST, &NewEventType::new("Other", "intro", 15))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlugTaken(ref slug) if slug == "intro"));
    assert_eq!(repo.event_type_count(), 1);
}

#[tokio::test]
async fn test_event_type_validation() {
    let repo = LocalRepository::new();
    let cases = [
        NewEventType::new("Bad slug", "Not Valid", 30),
        NewEventType::new("Too short", "short", 1),
        NewEventType::new("", "blank", 30),
        NewEventType {
            color: Some("blue".to_string()),
            ..NewEventType::new("Colour", "colour", 30)
        },
    ];
    for case in cases {
        let err = create_event_type(&repo, HOST, &case).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)), "{:?}", case);
    }
    assert_eq!(repo.event_type_count(), 0);
}

#[tokio::test]
async fn test_slug_availability_respects_exclusion() {
    let repo = LocalRepository::new();
    let intro = seed_event_type(&repo, "intro", 30).await;

    assert!(!is_slug_available(&repo, HOST, "intro", None).await.unwrap());
    assert!(is_slug_available(&repo, HOST, "intro", Some(intro.id)).await.unwrap());
    assert!(is_slug_available(&repo, HOST, "demo", None).await.unwrap());
}

#[tokio::test]
async fn test_update_event_type() {
    let repo = LocalRepository::new();
    let intro = seed_event_type(&repo, "intro", 30).await;
    seed_event_type(&repo, "demo", 60).await;

    let taken = update_event_type(
        &repo,
        intro.id,
        &EventTypeUpdate {
            slug: Some("demo".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(taken, BookingError::SlugTaken(_)));

    let updated = update_event_type(
        &repo,
        intro.id,
        &EventTypeUpdate {
            slug: Some("intro".to_string()),
            duration_minutes: Some(45),
            description: Some("First chat".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.duration_minutes, 45);
    assert_eq!(updated.description.as_deref(), Some("First chat"));
    assert_eq!(list_event_types(&repo, HOST).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_event_type() {
    let repo = LocalRepository::new();
    let intro = seed_event_type(&repo, "intro", 30).await;

    delete_event_type(&repo, intro.id).await.unwrap();

    assert!(matches!(
        get_event_type(&repo, intro.id).await.unwrap_err(),
        BookingError::NotFound { .. }
    ));
    assert!(matches!(
        delete_event_type(&repo, EventTypeId(99)).await.unwrap_err(),
        BookingError::NotFound { .. }
    ));
}

// =============================================================================
// Availability
// =============================================================================

#[tokio::test]
async fn test_default_availability_is_created_once() {
    let repo = LocalRepository::new();

    let first = get_default_availability(&repo, HOST).await.unwrap();
    let second = get_default_availability(&repo, HOST).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.name, DEFAULT_SCHEDULE_NAME);
    assert!(first.is_default);
    assert_eq!(first.rules.len(), 5);
    assert_eq!(list_availabilities(&repo, HOST).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_new_default_replaces_previous() {
    let repo = LocalRepository::new();
    let working = get_default_availability(&repo, HOST).await.unwrap();

    let short = create_availability(
        &repo,
        HOST,
        &NewAvailability {
            name: "Short days".to_string(),
            is_default: true,
            rules: vec![NewAvailabilityRule::new(3, hm(10, 0), hm(12, 0))],
        },
    )
    .await
    .unwrap();

    let all = list_availabilities(&repo, HOST).await.unwrap();
    assert_eq!(all.iter().filter(|a| a.is_default).count(), 1);
    assert!(!get_availability(&repo, working.id).await.unwrap().is_default);
    assert_eq!(get_default_availability(&repo, HOST).await.unwrap().id, short.id);
    assert_eq!(
        resolve_day(&repo, HOST, wednesday()).await.unwrap(),
        Some(DayWindow::new(hm(10, 0), hm(12, 0)))
    );
}

#[tokio::test]
async fn test_update_availability_replaces_rules() {
    let repo = LocalRepository::new();
    let working = get_default_availability(&repo, HOST).await.unwrap();

    let updated = update_availability(
        &repo,
        working.id,
        &AvailabilityUpdate {
            name: Some("Mornings".to_string()),
            rules: Some(vec![NewAvailabilityRule::new(3, hm(8, 0), hm(11, 30))]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Mornings");
    assert_eq!(updated.rules.len(), 1);
    assert_eq!(resolve_day(&repo, HOST, date(2026, 10, 19)).await.unwrap(), None);
}

#[tokio::test]
async fn test_availability_validation() {
    let repo = LocalRepository::new();

    let inverted = create_availability(
        &repo,
        HOST,
        &NewAvailability {
            name: "Backwards".to_string(),
            is_default: false,
            rules: vec![NewAvailabilityRule::new(1, hm(17, 0), hm(9, 0))],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(inverted, BookingError::Validation(_)));

    let working = get_default_availability(&repo, HOST).await.unwrap();
    let half_open = NewDateOverride {
        start_time: Some(hm(9, 0)),
        ..NewDateOverride::unavailable(wednesday())
    };
    let missing_end = NewDateOverride {
        is_unavailable: false,
        ..half_open
    };
    let err = add_date_override(&repo, working.id, &missing_end)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    assert!(matches!(
        get_availability(&repo, AvailabilityId(42)).await.unwrap_err(),
        BookingError::NotFound { .. }
    ));
}

#[tokio::test]
async fn test_override_upsert_and_removal() {
    let repo = LocalRepository::new();
    let working = get_default_availability(&repo, HOST).await.unwrap();

    add_date_override(&repo, working.id, &NewDateOverride::unavailable(wednesday()))
        .await
        .unwrap();
    let replaced = add_date_override(
        &repo,
        working.id,
        &NewDateOverride::window(wednesday(), hm(12, 0), hm(13, 0)),
    )
    .await
    .unwrap();

    let stored = get_availability(&repo, working.id).await.unwrap();
    assert_eq!(stored.overrides.len(), 1);
    assert_eq!(
        resolve_day(&repo, HOST, wednesday()).await.unwrap(),
        Some(DayWindow::new(hm(12, 0), hm(13, 0)))
    );

    remove_date_override(&repo, replaced.id).await.unwrap();
    assert_eq!(
        resolve_day(&repo, HOST, wednesday()).await.unwrap(),
        Some(DayWindow::new(hm(9, 0), hm(17, 0)))
    );
}

#[tokio::test]
async fn test_unavailable_override_drops_times() {
    let repo = LocalRepository::new();
    let working = get_default_availability(&repo, HOST).await.unwrap();

    let saved = add_date_override(
        &repo,
        working.id,
        &NewDateOverride {
            is_unavailable: true,
            ..NewDateOverride::window(wednesday(), hm(9, 0), hm(10, 0))
        },
    )
    .await
    .unwrap();

    assert!(saved.is_unavailable);
    assert_eq!(saved.start_time, None);
    assert_eq!(saved.end_time, None);
}

// =============================================================================
// Meetings
// =============================================================================

fn past_booking(event_type_id: EventTypeId, day: u32) -> NewBooking {
    let start = at(date(2026, 10, day), 10, 0);
    NewBooking {
        host_id: HOST,
        event_type_id,
        event_type_name: "Meeting intro".to_string(),
        duration_minutes: 30,
        invitee_name: "Grace Hopper".to_string(),
        invitee_email: "grace@example.com".to_string(),
        start_time: start,
        end_time: at(date(2026, 10, day), 10, 30),
        notes: None,
    }
}

#[tokio::test]
async fn test_meeting_filters_and_counts() {
    let repo = LocalRepository::new();
    let et = seed_event_type(&repo, "intro", 30).await;
    let ctx = ctx();

    let older = repo.seed_booking(&past_booking(et.id, 15), BookingStatus::Cancelled);
    let recent = repo.seed_booking(&past_booking(et.id, 16), BookingStatus::Confirmed);
    let upcoming = create_booking(&repo, &ctx, &request(et.id, at(wednesday(), 9, 0)))
        .await
        .unwrap();
    let dropped = create_booking(&repo, &ctx, &request(et.id, at(wednesday(), 11, 0)))
        .await
        .unwrap();
    cancel_meeting(&repo, dropped.id).await.unwrap();

    let ids = |bookings: Vec<slotbook::models::Booking>| -> Vec<_> {
        bookings.into_iter().map(|b| b.id).collect()
    };

    assert_eq!(
        ids(list_meetings(&repo, &ctx, MeetingFilter::Upcoming).await.unwrap()),
        vec![upcoming.id]
    );
    assert_eq!(
        ids(list_meetings(&repo, &ctx, MeetingFilter::Past).await.unwrap()),
        vec![recent.id, older.id]
    );
    assert_eq!(
        ids(list_meetings(&repo, &ctx, MeetingFilter::Cancelled).await.unwrap()),
        vec![older.id, dropped.id]
    );
    assert_eq!(
        list_meetings(&repo, &ctx, MeetingFilter::All).await.unwrap().len(),
        4
    );

    let counts = meeting_counts(&repo, &ctx).await.unwrap();
    assert_eq!(counts.upcoming, 1);
    assert_eq!(counts.past, 2);
    assert_eq!(counts.cancelled, 2);
}
