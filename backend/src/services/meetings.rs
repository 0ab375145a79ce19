//! Host-facing views over bookings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bookings;
use super::context::BookingContext;
use super::error::BookingResult;
use crate::db::repository::FullRepository;
use crate::models::{Booking, BookingId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingFilter {
    #[default]
    All,
    /// Not cancelled, starting at or after now; soonest first.
    Upcoming,
    /// Started before now; most recent first.
    Past,
    Cancelled,
}

impl FromStr for MeetingFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "upcoming" => Ok(Self::Upcoming),
            "past" => Ok(Self::Past),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown meeting filter: {}", other)),
        }
    }
}

impl fmt::Display for MeetingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeetingCounts {
    pub upcoming: usize,
    pub past: usize,
    pub cancelled: usize,
}

fn is_upcoming(booking: &Booking, ctx: &BookingContext) -> bool {
    !booking.is_cancelled() && booking.start_time >= ctx.now
}

/// The host's bookings matching `filter`.
pub async fn list_meetings<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
    filter: MeetingFilter,
) -> BookingResult<Vec<Booking>> {
    // Already ordered by start time.
    let all = repo.list_bookings_for_host(ctx.host_id).await?;

    Ok(match filter {
        MeetingFilter::All => all,
        MeetingFilter::Upcoming => all.into_iter().filter(|b| is_upcoming(b, ctx)).collect(),
        MeetingFilter::Past => all
            .into_iter()
            .rev()
            .filter(|b| b.start_time < ctx.now)
            .collect(),
        MeetingFilter::Cancelled => all.into_iter().filter(Booking::is_cancelled).collect(),
    })
}

pub async fn meeting_counts<R: FullRepository + ?Sized>(
    repo: &R,
    ctx: &BookingContext,
) -> BookingResult<MeetingCounts> {
    let all = repo.list_bookings_for_host(ctx.host_id).await?;
    Ok(all.iter().fold(MeetingCounts::default(), |mut counts, b| {
        if is_upcoming(b, ctx) {
            counts.upcoming += 1;
        }
        if b.start_time < ctx.now {
            counts.past += 1;
        }
        if b.is_cancelled() {
            counts.cancelled += 1;
        }
        counts
    }))
}

pub async fn get_meeting<R: FullRepository + ?Sized>(
    repo: &R,
    id: BookingId,
) -> BookingResult<Booking> {
    bookings::get_booking(repo, id).await
}

pub async fn cancel_meeting<R: FullRepository + ?Sized>(
    repo: &R,
    id: BookingId,
) -> BookingResult<Booking> {
    bookings::cancel_booking(repo, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        assert_eq!("".parse::<MeetingFilter>().unwrap(), MeetingFilter::All);
        assert_eq!("Upcoming".parse::<MeetingFilter>().unwrap(), MeetingFilter::Upcoming);
        assert_eq!("canceled".parse::<MeetingFilter>().unwrap(), MeetingFilter::Cancelled);
        assert!("later".parse::<MeetingFilter>().is_err());
    }
}
