//! Event type management.

use log::info;

use super::error::{BookingError, BookingResult};
use super::validation::validate_input;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{EventType, EventTypeId, EventTypeUpdate, HostId, NewEventType};

/// A store-level uniqueness violation on insert/update means the slug was taken
/// between our check and the write.
fn slug_conflict(slug: &str) -> impl FnOnce(RepositoryError) -> BookingError + '_ {
    move |err| match err {
        RepositoryError::ConflictError { .. } => BookingError::SlugTaken(slug.to_string()),
        other => other.into(),
    }
}

pub async fn list_event_types<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
) -> BookingResult<Vec<EventType>> {
    Ok(repo.list_event_types(host_id).await?)
}

pub async fn get_event_type<R: FullRepository + ?Sized>(
    repo: &R,
    id: EventTypeId,
) -> BookingResult<EventType> {
    Ok(repo.get_event_type(id).await?)
}

pub async fn get_event_type_by_slug<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
    slug: &str,
) -> BookingResult<EventType> {
    repo.get_event_type_by_slug(host_id, slug)
        .await?
        .ok_or_else(|| BookingError::not_found("event type", slug))
}

pub async fn is_slug_available<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
    slug: &str,
    exclude: Option<EventTypeId>,
) -> BookingResult<bool> {
    Ok(match repo.get_event_type_by_slug(host_id, slug).await? {
        Some(existing) => Some(existing.id) == exclude,
        None => true,
    })
}

pub async fn create_event_type<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
    new: &NewEventType,
) -> BookingResult<EventType> {
    let mut new = new.clone();
    new.name = new.name.trim().to_string();
    validate_input(&new)?;

    if !is_slug_available(repo, host_id, &new.slug, None).await? {
        return Err(BookingError::SlugTaken(new.slug));
    }

    let created = repo
        .insert_event_type(host_id, &new)
        .await
        .map_err(slug_conflict(&new.slug))?;
    info!("Created event type '{}' ({})", created.slug, created.id);
    Ok(created)
}

pub async fn update_event_type<R: FullRepository + ?Sized>(
    repo: &R,
    id: EventTypeId,
    update: &EventTypeUpdate,
) -> BookingResult<EventType> {
    let mut update = update.clone();
    if let Some(name) = update.name.as_mut() {
        *name = name.trim().to_string();
    }
    validate_input(&update)?;

    let current = repo.get_event_type(id).await?;
    if let Some(slug) = &update.slug {
        if !is_slug_available(repo, current.host_id, slug, Some(id)).await? {
            return Err(BookingError::SlugTaken(slug.clone()));
        }
    }

    let slug = update.slug.clone().unwrap_or_default();
    Ok(repo
        .update_event_type(id, &update)
        .await
        .map_err(slug_conflict(&slug))?)
}

/// Delete an event type. Its bookings stay readable through their snapshot.
pub async fn delete_event_type<R: FullRepository + ?Sized>(
    repo: &R,
    id: EventTypeId,
) -> BookingResult<()> {
    repo.delete_event_type(id).await?;
    info!("Deleted event type {}", id);
    Ok(())
}
