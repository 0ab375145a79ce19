//! Availability repository trait.
//!
//! An availability is stored together with its weekly rules and date overrides;
//! every read returns the whole aggregate with rules ordered by weekday and
//! overrides ordered by date.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    Availability, AvailabilityId, AvailabilityUpdate, DateOverride, HostId, NewAvailability,
    NewDateOverride, OverrideId,
};

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// All schedules of a host, default first.
    async fn list_availabilities(&self, host_id: HostId) -> RepositoryResult<Vec<Availability>>;

    async fn get_availability(&self, id: AvailabilityId) -> RepositoryResult<Availability>;

    /// The host's default schedule, if one exists.
    async fn get_default_availability(
        &self,
        host_id: HostId,
    ) -> RepositoryResult<Option<Availability>>;

    /// Insert a schedule with its rules. When `is_default` is set, every other
    /// schedule of the host loses the flag in the same write.
    async fn insert_availability(
        &self,
        host_id: HostId,
        availability: &NewAvailability,
    ) -> RepositoryResult<Availability>;

    /// Update name and default flag; when `rules` is present the rule set is replaced.
    async fn update_availability(
        &self,
        id: AvailabilityId,
        update: &AvailabilityUpdate,
    ) -> RepositoryResult<Availability>;

    /// Store an override, replacing any existing override for the same date.
    async fn upsert_date_override(
        &self,
        availability_id: AvailabilityId,
        date_override: &NewDateOverride,
    ) -> RepositoryResult<DateOverride>;

    async fn delete_date_override(&self, id: OverrideId) -> RepositoryResult<()>;

    /// The override stored for `date`, if any.
    async fn find_date_override(
        &self,
        availability_id: AvailabilityId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DateOverride>>;
}
