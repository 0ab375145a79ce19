//! In-memory local repository implementation.
//!
//! Stores every aggregate in ordered maps behind a single lock, which makes it
//! suitable for unit tests and local development. The atomic check-and-write
//! operations hold the write lock across the conflict query and the insert, so
//! concurrent bookings for one slot serialize exactly like they do in Postgres.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use parking_lot::RwLock;

use crate::db::repository::*;
use crate::models::{
    Availability, AvailabilityId, AvailabilityRule, AvailabilityUpdate, Booking, BookingId,
    BookingStatus, ConflictPolicy, DateOverride, EventType, EventTypeId, EventTypeUpdate, HostId,
    NewAvailability, NewAvailabilityRule, NewBooking, NewDateOverride, NewEventType, OverrideId,
    Reservation, RuleId, StatusChange,
};
use crate::scheduling::find_conflict;

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// ```
/// use slotbook::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.booking_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    event_types: BTreeMap<EventTypeId, EventType>,
    availabilities: BTreeMap<AvailabilityId, Availability>,
    bookings: BTreeMap<BookingId, Booking>,

    // ID counters
    next_event_type_id: i64,
    next_availability_id: i64,
    next_rule_id: i64,
    next_override_id: i64,
    next_booking_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            event_types: BTreeMap::new(),
            availabilities: BTreeMap::new(),
            bookings: BTreeMap::new(),
            next_event_type_id: 1,
            next_availability_id: 1,
            next_rule_id: 1,
            next_override_id: 1,
            next_booking_id: 1,
            is_healthy: true,
        }
    }
}

fn next_id(counter: &mut i64) -> i64 {
    let id = *counter;
    *counter += 1;
    id
}

impl LocalData {
    fn build_rules(&mut self, rules: &[NewAvailabilityRule]) -> Vec<AvailabilityRule> {
        rules
            .iter()
            .map(|rule| AvailabilityRule {
                id: RuleId(next_id(&mut self.next_rule_id)),
                day_of_week: rule.day_of_week,
                start_time: rule.start_time,
                end_time: rule.end_time,
            })
            .collect()
    }

    fn clear_default_flags(&mut self, host_id: HostId, keep: Option<AvailabilityId>) {
        for availability in self.availabilities.values_mut() {
            if availability.host_id == host_id && Some(availability.id) != keep {
                availability.is_default = false;
            }
        }
    }

    fn slug_taken(&self, host_id: HostId, slug: &str, exclude: Option<EventTypeId>) -> bool {
        self.event_types
            .values()
            .any(|et| et.host_id == host_id && et.slug == slug && Some(et.id) != exclude)
    }

    fn conflict(
        &self,
        event_type_id: EventTypeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<BookingId>,
        policy: ConflictPolicy,
    ) -> Option<Booking> {
        find_conflict(
            self.bookings.values(),
            event_type_id,
            start,
            end,
            exclude,
            policy,
        )
        .cloned()
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn booking_count(&self) -> usize {
        self.data.read().bookings.len()
    }

    pub fn event_type_count(&self) -> usize {
        self.data.read().event_types.len()
    }

    /// Store a booking verbatim, bypassing conflict checks. Test fixture helper.
    pub fn seed_booking(&self, booking: &NewBooking, status: BookingStatus) -> Booking {
        let mut data = self.data.write();
        let id = BookingId(next_id(&mut data.next_booking_id));
        let stored = materialize_booking(id, booking, status);
        data.bookings.insert(id, stored.clone());
        stored
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn materialize_booking(id: BookingId, booking: &NewBooking, status: BookingStatus) -> Booking {
    Booking {
        id,
        host_id: booking.host_id,
        event_type_id: booking.event_type_id,
        event_type_name: booking.event_type_name.clone(),
        duration_minutes: booking.duration_minutes,
        invitee_name: booking.invitee_name.clone(),
        invitee_email: booking.invitee_email.clone(),
        start_time: booking.start_time,
        end_time: booking.end_time,
        status,
        notes: booking.notes.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl EventTypeRepository for LocalRepository {
    async fn list_event_types(&self, host_id: HostId) -> RepositoryResult<Vec<EventType>> {
        self.check_health()?;
        let data = self.data.read();
        let mut event_types: Vec<EventType> = data
            .event_types
            .values()
            .filter(|et| et.host_id == host_id)
            .cloned()
            .collect();
        event_types.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(event_types)
    }

    async fn get_event_type(&self, id: EventTypeId) -> RepositoryResult<EventType> {
        self.check_health()?;
        self.data
            .read()
            .event_types
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found_entity("event_type", id))
    }

    async fn get_event_type_by_slug(
        &self,
        host_id: HostId,
        slug: &str,
    ) -> RepositoryResult<Option<EventType>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .event_types
            .values()
            .find(|et| et.host_id == host_id && et.slug == slug)
            .cloned())
    }

    async fn insert_event_type(
        &self,
        host_id: HostId,
        event_type: &NewEventType,
    ) -> RepositoryResult<EventType> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.slug_taken(host_id, &event_type.slug, None) {
            return Err(RepositoryError::conflict_with_context(
                format!("slug '{}' already exists", event_type.slug),
                ErrorContext::new("insert_event_type").with_entity("event_type"),
            ));
        }

        let id = EventTypeId(next_id(&mut data.next_event_type_id));
        let stored = EventType {
            id,
            host_id,
            name: event_type.name.clone(),
            slug: event_type.slug.clone(),
            description: event_type.description.clone(),
            duration_minutes: event_type.duration_minutes,
            is_active: event_type.is_active,
            color: event_type.color_or_default(),
            created_at: Utc::now(),
        };
        data.event_types.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_event_type(
        &self,
        id: EventTypeId,
        update: &EventTypeUpdate,
    ) -> RepositoryResult<EventType> {
        self.check_health()?;
        let mut data = self.data.write();
        let host_id = data
            .event_types
            .get(&id)
            .map(|et| et.host_id)
            .ok_or_else(|| RepositoryError::not_found_entity("event_type", id))?;

        if let Some(slug) = &update.slug {
            if data.slug_taken(host_id, slug, Some(id)) {
                return Err(RepositoryError::conflict_with_context(
                    format!("slug '{}' already exists", slug),
                    ErrorContext::new("update_event_type").with_entity("event_type"),
                ));
            }
        }

        let event_type = data
            .event_types
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found_entity("event_type", id))?;
        update.apply_to(event_type);
        Ok(event_type.clone())
    }

    async fn delete_event_type(&self, id: EventTypeId) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .event_types
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found_entity("event_type", id))
    }
}

#[async_trait]
impl AvailabilityRepository for LocalRepository {
    async fn list_availabilities(&self, host_id: HostId) -> RepositoryResult<Vec<Availability>> {
        self.check_health()?;
        let data = self.data.read();
        let mut availabilities: Vec<Availability> = data
            .availabilities
            .values()
            .filter(|a| a.host_id == host_id)
            .cloned()
            .collect();
        // Default first, then creation order.
        availabilities.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(a.id.cmp(&b.id)));
        Ok(availabilities)
    }

    async fn get_availability(&self, id: AvailabilityId) -> RepositoryResult<Availability> {
        self.check_health()?;
        self.data
            .read()
            .availabilities
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found_entity("availability", id))
    }

    async fn get_default_availability(
        &self,
        host_id: HostId,
    ) -> RepositoryResult<Option<Availability>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .availabilities
            .values()
            .find(|a| a.host_id == host_id && a.is_default)
            .cloned())
    }

    async fn insert_availability(
        &self,
        host_id: HostId,
        availability: &NewAvailability,
    ) -> RepositoryResult<Availability> {
        self.check_health()?;
        let mut data = self.data.write();
        if availability.is_default {
            data.clear_default_flags(host_id, None);
        }

        let id = AvailabilityId(next_id(&mut data.next_availability_id));
        let rules = data.build_rules(&availability.rules);
        let mut stored = Availability {
            id,
            host_id,
            name: availability.name.clone(),
            is_default: availability.is_default,
            rules,
            overrides: Vec::new(),
        };
        stored.sort_children();
        data.availabilities.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_availability(
        &self,
        id: AvailabilityId,
        update: &AvailabilityUpdate,
    ) -> RepositoryResult<Availability> {
        self.check_health()?;
        let mut data = self.data.write();
        let host_id = data
            .availabilities
            .get(&id)
            .map(|a| a.host_id)
            .ok_or_else(|| RepositoryError::not_found_entity("availability", id))?;

        if update.is_default == Some(true) {
            data.clear_default_flags(host_id, Some(id));
        }
        let rules = update.rules.as_deref().map(|rules| data.build_rules(rules));

        let availability = data
            .availabilities
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found_entity("availability", id))?;
        if let Some(name) = &update.name {
            availability.name = name.clone();
        }
        if let Some(is_default) = update.is_default {
            availability.is_default = is_default;
        }
        if let Some(rules) = rules {
            availability.rules = rules;
        }
        availability.sort_children();
        Ok(availability.clone())
    }

    async fn upsert_date_override(
        &self,
        availability_id: AvailabilityId,
        date_override: &NewDateOverride,
    ) -> RepositoryResult<DateOverride> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.availabilities.contains_key(&availability_id) {
            return Err(RepositoryError::not_found_entity(
                "availability",
                availability_id,
            ));
        }

        let normalized = date_override.normalized();
        let stored = DateOverride {
            id: OverrideId(next_id(&mut data.next_override_id)),
            date: normalized.date,
            start_time: normalized.start_time,
            end_time: normalized.end_time,
            is_unavailable: normalized.is_unavailable,
        };

        let availability = data
            .availabilities
            .get_mut(&availability_id)
            .ok_or_else(|| RepositoryError::not_found_entity("availability", availability_id))?;
        availability.overrides.retain(|o| o.date != stored.date);
        availability.overrides.push(stored.clone());
        availability.sort_children();
        Ok(stored)
    }

    async fn delete_date_override(&self, id: OverrideId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        for availability in data.availabilities.values_mut() {
            let before = availability.overrides.len();
            availability.overrides.retain(|o| o.id != id);
            if availability.overrides.len() != before {
                return Ok(());
            }
        }
        Err(RepositoryError::not_found_entity("date_override", id))
    }

    async fn find_date_override(
        &self,
        availability_id: AvailabilityId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DateOverride>> {
        self.check_health()?;
        let data = self.data.read();
        let availability = data
            .availabilities
            .get(&availability_id)
            .ok_or_else(|| RepositoryError::not_found_entity("availability", availability_id))?;
        Ok(crate::scheduling::find_override(&availability.overrides, date).cloned())
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Booking> {
        self.check_health()?;
        self.data
            .read()
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found_entity("booking", id))
    }

    async fn list_bookings_for_host(&self, host_id: HostId) -> RepositoryResult<Vec<Booking>> {
        self.check_health()?;
        let data = self.data.read();
        let mut bookings: Vec<Booking> = data
            .bookings
            .values()
            .filter(|b| b.host_id == host_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn fetch_bookings_starting_between(
        &self,
        event_type_id: EventTypeId,
        from: NaiveDateTime,
        to: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Vec<Booking>> {
        self.check_health()?;
        let data = self.data.read();
        let mut bookings: Vec<Booking> = data
            .bookings
            .values()
            .filter(|b| {
                b.event_type_id == event_type_id
                    && policy.blocks(b.status)
                    && b.start_time >= from
                    && b.start_time < to
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn find_conflicting_booking(
        &self,
        event_type_id: EventTypeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<BookingId>,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Option<Booking>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .conflict(event_type_id, start, end, exclude, policy))
    }

    async fn insert_booking_if_free(
        &self,
        booking: &NewBooking,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(existing) = data.conflict(
            booking.event_type_id,
            booking.start_time,
            booking.end_time,
            None,
            policy,
        ) {
            return Ok(Reservation::Conflict(existing));
        }

        let id = BookingId(next_id(&mut data.next_booking_id));
        let stored = materialize_booking(id, booking, BookingStatus::Confirmed);
        data.bookings.insert(id, stored.clone());
        Ok(Reservation::Reserved(stored))
    }

    async fn reschedule_booking_if_free(
        &self,
        id: BookingId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: ConflictPolicy,
    ) -> RepositoryResult<Reservation> {
        self.check_health()?;
        let mut data = self.data.write();
        let current = data
            .bookings
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found_entity("booking", id))?;
        if current.is_cancelled() {
            return Ok(Reservation::Cancelled(current.clone()));
        }
        let event_type_id = current.event_type_id;

        if let Some(existing) = data.conflict(event_type_id, start, end, Some(id), policy) {
            return Ok(Reservation::Conflict(existing));
        }

        let booking = data
            .bookings
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found_entity("booking", id))?;
        booking.start_time = start;
        booking.end_time = end;
        booking.status = BookingStatus::Rescheduled;
        Ok(Reservation::Reserved(booking.clone()))
    }

    async fn cancel_booking(&self, id: BookingId) -> RepositoryResult<Option<StatusChange>> {
        self.check_health()?;
        let mut data = self.data.write();
        Ok(data.bookings.get_mut(&id).map(|booking| {
            if booking.is_cancelled() {
                StatusChange::Unchanged(booking.clone())
            } else {
                booking.status = BookingStatus::Cancelled;
                StatusChange::Applied(booking.clone())
            }
        }))
    }
}
