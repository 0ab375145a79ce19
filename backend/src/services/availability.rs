//! Availability schedule management.

use chrono::NaiveDate;
use log::info;

use super::error::BookingResult;
use super::validation::{validate_input, validate_rules};
use crate::db::repository::FullRepository;
use crate::models::{
    Availability, AvailabilityId, AvailabilityUpdate, DateOverride, DayWindow, HostId,
    NewAvailability, NewDateOverride, OverrideId,
};
use crate::scheduling::resolve_window;

/// The host's default schedule, created as Mon-Fri 09:00-17:00 on first access.
pub async fn get_default_availability<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
) -> BookingResult<Availability> {
    if let Some(existing) = repo.get_default_availability(host_id).await? {
        return Ok(existing);
    }

    let created = repo
        .insert_availability(host_id, &NewAvailability::working_hours())
        .await?;
    info!(
        "Created default schedule '{}' for host {}",
        created.name, host_id
    );
    Ok(created)
}

pub async fn list_availabilities<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
) -> BookingResult<Vec<Availability>> {
    Ok(repo.list_availabilities(host_id).await?)
}

pub async fn get_availability<R: FullRepository + ?Sized>(
    repo: &R,
    id: AvailabilityId,
) -> BookingResult<Availability> {
    Ok(repo.get_availability(id).await?)
}

pub async fn create_availability<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
    new: &NewAvailability,
) -> BookingResult<Availability> {
    validate_input(new)?;
    validate_rules(&new.rules)?;
    Ok(repo.insert_availability(host_id, new).await?)
}

pub async fn update_availability<R: FullRepository + ?Sized>(
    repo: &R,
    id: AvailabilityId,
    update: &AvailabilityUpdate,
) -> BookingResult<Availability> {
    validate_input(update)?;
    if let Some(rules) = &update.rules {
        validate_rules(rules)?;
    }
    Ok(repo.update_availability(id, update).await?)
}

/// Store an override; an existing override on the same date is replaced.
pub async fn add_date_override<R: FullRepository + ?Sized>(
    repo: &R,
    availability_id: AvailabilityId,
    date_override: &NewDateOverride,
) -> BookingResult<DateOverride> {
    validate_input(date_override)?;
    Ok(repo
        .upsert_date_override(availability_id, &date_override.normalized())
        .await?)
}

pub async fn remove_date_override<R: FullRepository + ?Sized>(
    repo: &R,
    override_id: OverrideId,
) -> BookingResult<()> {
    Ok(repo.delete_date_override(override_id).await?)
}

/// Working window of the host's default schedule on `date`.
pub async fn resolve_day<R: FullRepository + ?Sized>(
    repo: &R,
    host_id: HostId,
    date: NaiveDate,
) -> BookingResult<Option<DayWindow>> {
    let availability = get_default_availability(repo, host_id).await?;
    Ok(resolve_window(&availability, date))
}
