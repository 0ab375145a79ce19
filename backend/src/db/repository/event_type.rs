//! Event type repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{EventType, EventTypeId, EventTypeUpdate, HostId, NewEventType};

#[async_trait]
pub trait EventTypeRepository: Send + Sync {
    /// All event types of a host, newest first.
    async fn list_event_types(&self, host_id: HostId) -> RepositoryResult<Vec<EventType>>;

    /// # Returns
    /// * `Ok(EventType)` - The event type
    /// * `Err(RepositoryError::NotFound)` - If no event type has this id
    async fn get_event_type(&self, id: EventTypeId) -> RepositoryResult<EventType>;

    /// Look up an event type by slug within a host. Inactive event types are returned too.
    async fn get_event_type_by_slug(
        &self,
        host_id: HostId,
        slug: &str,
    ) -> RepositoryResult<Option<EventType>>;

    /// Insert a new event type. A duplicate `(host_id, slug)` pair yields
    /// `RepositoryError::ConflictError`.
    async fn insert_event_type(
        &self,
        host_id: HostId,
        event_type: &NewEventType,
    ) -> RepositoryResult<EventType>;

    /// Apply a partial update and return the stored result.
    async fn update_event_type(
        &self,
        id: EventTypeId,
        update: &EventTypeUpdate,
    ) -> RepositoryResult<EventType>;

    /// Delete an event type. Bookings keep their snapshot of it.
    async fn delete_event_type(&self, id: EventTypeId) -> RepositoryResult<()>;
}
