use async_trait::async_trait;
use thiserror::Error;

use crate::domain::booking::{Booking, NewBooking};
use crate::domain::event::{Event, EventSort, NewEvent};

pub mod booking_repo;
pub mod event_repo;
pub mod memory;

pub use booking_repo::PgBookingStore;
pub use event_repo::PgEventStore;
pub use memory::MemoryStore;

pub const EVENTS_SLUG_KEY: &str = "events_slug_key";
pub const BOOKINGS_EVENT_EMAIL_KEY: &str = "bookings_event_id_email_key";
pub const BOOKINGS_EVENT_FKEY: &str = "bookings_event_id_fkey";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint {constraint} violated")] UniqueViolation { constraint: String },
    #[error("foreign key constraint {constraint} violated")] ForeignKeyViolation { constraint: String },
    #[error("backend unavailable: {0}")] Connection(String),
    #[error(transparent)] Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            match db.code().as_deref() {
                Some("23505") => return StoreError::UniqueViolation { constraint },
                Some("23503") => return StoreError::ForeignKeyViolation { constraint },
                _ => {}
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                StoreError::Connection(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Event persistence. Implementations enforce slug uniqueness themselves.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, new: &NewEvent) -> StoreResult<Event>;
    async fn update(&self, id: i64, next: &NewEvent) -> StoreResult<Option<Event>>;
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Event>>;
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>>;
    async fn list(&self, sort: EventSort) -> StoreResult<Vec<Event>>;
    /// Newest first, excluding `exclude_id`.
    async fn find_sharing_tags(&self, exclude_id: i64, tags: &[String]) -> StoreResult<Vec<Event>>;
}

/// Booking persistence. Implementations enforce the event foreign key and
/// `(event_id, email)` uniqueness themselves.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, new: &NewBooking) -> StoreResult<Booking>;
    async fn find(&self, event_id: i64, email: &str) -> StoreResult<Option<Booking>>;
    async fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Booking>>;
    async fn count_for_event(&self, event_id: i64) -> StoreResult<i64>;
}
