//! Domain errors raised by the service layer.

use crate::db::repository::RepositoryError;
use crate::models::BookingId;

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The addressed entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The event type exists but is disabled.
    #[error("event type '{0}' is not active")]
    Inactive(String),

    /// The requested interval overlaps a blocking booking.
    #[error("the requested time slot is no longer available")]
    SlotUnavailable { conflicting: Option<BookingId> },

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(BookingId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("slug '{0}' is already taken")]
    SlugTaken(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Inactive(_) => "EVENT_TYPE_INACTIVE",
            Self::SlotUnavailable { .. } => "SLOT_UNAVAILABLE",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::SlugTaken(_) => "SLUG_TAKEN",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}

fn entity_name(entity: Option<&str>) -> &'static str {
    match entity {
        Some("booking") => "booking",
        Some("event_type") => "event type",
        Some("availability") => "availability",
        Some("date_override") => "date override",
        _ => "record",
    }
}

impl From<RepositoryError> for BookingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { ref context, .. } => BookingError::NotFound {
                entity: entity_name(context.entity.as_deref()),
                id: context.entity_id.clone().unwrap_or_default(),
            },
            other => BookingError::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_becomes_domain_not_found() {
        let err: BookingError = RepositoryError::not_found_entity("event_type", 7).into();
        match err {
            BookingError::NotFound { entity, id } => {
                assert_eq!(entity, "event type");
                assert_eq!(id, "7");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_repository_errors_are_wrapped() {
        let err: BookingError = RepositoryError::connection("down").into();
        assert!(matches!(err, BookingError::Repository(_)));
        assert_eq!(err.code(), "REPOSITORY_ERROR");
    }
}
