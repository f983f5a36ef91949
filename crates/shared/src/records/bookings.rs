use std::sync::Arc;

use crate::domain::booking::{Booking, NewBooking};
use crate::error::{RecordError, RecordResult};
use crate::normalize::normalize_email;
use crate::records::EventRecords;
use crate::repo::{BookingStore, StoreError};

const MISSING_EVENT_MESSAGE: &str = "Referenced event does not exist";

#[derive(Clone)]
pub struct BookingRecords {
    store: Arc<dyn BookingStore>,
    events: EventRecords,
}

impl BookingRecords {
    pub fn new(store: Arc<dyn BookingStore>, events: EventRecords) -> Self { Self { store, events } }

    /// Books `email` for the event whose id is `event_id`. A malformed id is
    /// reported the same way as a missing event.
    pub async fn create_booking(&self, event_id: &str, email: &str) -> RecordResult<Booking> {
        let email = normalize_email(email)?;
        let event_id = parse_event_id(event_id)?;
        if !self.events.exists(event_id).await? {
            return Err(RecordError::ReferentialIntegrity(MISSING_EVENT_MESSAGE.into()));
        }
        self.insert_unique(NewBooking { event_id, email }).await
    }

    /// Same as [`create_booking`](Self::create_booking) but resolves the
    /// event from its slug.
    pub async fn create_booking_for_slug(&self, slug: &str, email: &str) -> RecordResult<Booking> {
        let email = normalize_email(email)?;
        let event = self.events.find_by_slug(slug).await?;
        self.insert_unique(NewBooking { event_id: event.id, email }).await
    }

    pub async fn list_for_event(&self, event_id: i64) -> RecordResult<Vec<Booking>> {
        Ok(self.store.list_for_event(event_id).await?)
    }

    pub async fn count_for_event(&self, event_id: i64) -> RecordResult<i64> {
        Ok(self.store.count_for_event(event_id).await?)
    }

    async fn insert_unique(&self, new: NewBooking) -> RecordResult<Booking> {
        if self.store.find(new.event_id, &new.email).await?.is_some() {
            return Err(duplicate_booking(&new.email));
        }
        let booking = self.store.insert(&new).await.map_err(|e| match e {
            StoreError::UniqueViolation { .. } => duplicate_booking(&new.email),
            StoreError::ForeignKeyViolation { .. } => RecordError::ReferentialIntegrity(MISSING_EVENT_MESSAGE.into()),
            other => other.into(),
        })?;
        tracing::info!(booking_id = booking.id, event_id = booking.event_id, "booking created");
        Ok(booking)
    }
}

fn parse_event_id(raw: &str) -> RecordResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RecordError::ReferentialIntegrity(format!("Invalid event id '{}'", raw.trim()))),
    }
}

fn duplicate_booking(email: &str) -> RecordError {
    RecordError::Uniqueness(format!("{email} has already booked this event"))
}
