use crate::db::{Db, PgConnections};
use crate::domain::booking::{Booking, NewBooking};
use crate::repo::{BookingStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::sync::Arc;

pub struct PgBookingStore { connections: Arc<PgConnections> }

impl PgBookingStore {
    pub fn new(connections: Arc<PgConnections>) -> Self { Self { connections } }

    async fn db(&self) -> StoreResult<Db> {
        self.connections.get_connection().await.map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, new: &NewBooking) -> StoreResult<Booking> {
        let db = self.db().await?;
        let rec = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (event_id, email) VALUES ($1,$2) \
             RETURNING id, event_id, email, created_at, updated_at",
        )
        .bind(new.event_id)
        .bind(&new.email)
        .fetch_one(&db.0)
        .await?;
        Ok(rec)
    }

    async fn find(&self, event_id: i64, email: &str) -> StoreResult<Option<Booking>> {
        let db = self.db().await?;
        let rec = sqlx::query_as::<_, Booking>(
            "SELECT id, event_id, email, created_at, updated_at FROM bookings WHERE event_id=$1 AND email=$2",
        )
        .bind(event_id)
        .bind(email)
        .fetch_optional(&db.0)
        .await?;
        Ok(rec)
    }

    async fn list_for_event(&self, event_id: i64) -> StoreResult<Vec<Booking>> {
        let db = self.db().await?;
        let recs = sqlx::query_as::<_, Booking>(
            "SELECT id, event_id, email, created_at, updated_at FROM bookings WHERE event_id=$1 ORDER BY created_at, id",
        )
        .bind(event_id)
        .fetch_all(&db.0)
        .await?;
        Ok(recs)
    }

    async fn count_for_event(&self, event_id: i64) -> StoreResult<i64> {
        let db = self.db().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE event_id=$1")
            .bind(event_id)
            .fetch_one(&db.0)
            .await?;
        Ok(count)
    }
}
