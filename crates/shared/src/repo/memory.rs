use crate::domain::booking::{Booking, NewBooking};
use crate::domain::event::{Event, EventSort, NewEvent};
use crate::repo::{
    BookingStore, EventStore, StoreError, StoreResult, BOOKINGS_EVENT_EMAIL_KEY, BOOKINGS_EVENT_FKEY,
    EVENTS_SLUG_KEY,
};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    bookings: Vec<Booking>,
    next_event_id: i64,
    next_booking_id: i64,
}

/// In-process store with the same constraints as the Postgres schema.
#[derive(Clone, Default)]
pub struct MemoryStore(Arc<Mutex<Tables>>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first(events: &mut [Event]) {
    events.sort_by_key(|e| Reverse((e.created_at, e.id)));
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation { constraint: constraint.to_string() }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, new: &NewEvent) -> StoreResult<Event> {
        let mut t = self.tables();
        if t.events.iter().any(|e| e.slug == new.slug) {
            return Err(unique_violation(EVENTS_SLUG_KEY));
        }
        t.next_event_id += 1;
        let now = Utc::now();
        let event = Event {
            id: t.next_event_id,
            title: new.title.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            overview: new.overview.clone(),
            image: new.image.clone(),
            venue: new.venue.clone(),
            location: new.location.clone(),
            date: new.date.clone(),
            time: new.time.clone(),
            mode: new.mode.clone(),
            audience: new.audience.clone(),
            agenda: new.agenda.clone(),
            organizer: new.organizer.clone(),
            tags: new.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        t.events.push(event.clone());
        Ok(event)
    }

    async fn update(&self, id: i64, next: &NewEvent) -> StoreResult<Option<Event>> {
        let mut t = self.tables();
        if t.events.iter().any(|e| e.id != id && e.slug == next.slug) {
            return Err(unique_violation(EVENTS_SLUG_KEY));
        }
        let Some(event) = t.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        let NewEvent {
            title, slug, description, overview, image, venue, location, date, time, mode, audience, agenda,
            organizer, tags,
        } = next.clone();
        *event = Event {
            id,
            title, slug, description, overview, image, venue, location, date, time, mode, audience, agenda,
            organizer, tags,
            created_at: event.created_at,
            updated_at: Utc::now(),
        };
        Ok(Some(event.clone()))
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.tables().events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        Ok(self.tables().events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn list(&self, sort: EventSort) -> StoreResult<Vec<Event>> {
        let mut events = self.tables().events.clone();
        newest_first(&mut events);
        if sort == EventSort::Asc {
            events.reverse();
        }
        Ok(events)
    }

    async fn find_sharing_tags(&self, exclude_id: i64, tags: &[String]) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .tables()
            .events
            .iter()
            .filter(|e| e.id != exclude_id && e.tags.iter().any(|t| tags.contains(t)))
            .cloned()
            .collect();
        newest_first(&mut events);
        Ok(events)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, new: &NewBooking) -> StoreResult<Booking> {
        let mut t = self.tables();
        if !t.events.iter().any(|e| e.id == new.event_id) {
            return Err(StoreError::ForeignKeyViolation { constraint: BOOKINGS_EVENT_FKEY.to_string() });
        }
        if t.bookings.iter().any(|b| b.event_id == new.event_id && b.email == new.email) {
            return Err(unique_violation(BOOKINGS_EVENT_EMAIL_KEY));
        }
        t.next_booking_id += 1;
        let now = Utc::now();
        let booking = Booking {
            id: t.next_booking_id,
            event_id: new.event_id,
            email: new.email.clone(),
            created_at: now,
            updated_at: now,
        };
        t.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find(&self, event_id: i64, email: &str) -> StoreResult<Option<Booking>> {
        Ok(self.tables().bookings.iter().find(|b| b.event_id == event_id && b.email == email).cloned())
    }

    async fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Booking>> {
        Ok(self.tables().bookings.iter().filter(|b| b.event_id == event_id).cloned().collect())
    }

    async fn count_for_event(&self, event_id: i64) -> StoreResult<i64> {
        Ok(self.tables().bookings.iter().filter(|b| b.event_id == event_id).count() as i64)
    }
}
