//! Record managers: the only write path into the stores. Each operation
//! normalizes and validates its input, runs a friendly pre-check, and lets
//! the store's constraints decide the final outcome.

use crate::error::RecordError;
use crate::repo::StoreError;

pub mod bookings;
pub mod events;

pub use bookings::BookingRecords;
pub use events::EventRecords;

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => {
                RecordError::Uniqueness(format!("duplicate value violates {constraint}"))
            }
            StoreError::ForeignKeyViolation { constraint } => {
                RecordError::ReferentialIntegrity(format!("reference violates {constraint}"))
            }
            StoreError::Connection(m) => RecordError::BackendConfiguration(m),
            StoreError::Database(e) => RecordError::Unexpected(e.into()),
        }
    }
}

