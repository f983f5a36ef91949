use crate::db::{Db, PgConnections};
use crate::domain::event::{Event, EventSort, NewEvent};
use crate::repo::{EventStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::sync::Arc;

const EVENT_COLUMNS: &str = "id, title, slug, description, overview, image, venue, location, date, time, \
    mode, audience, agenda, organizer, tags, created_at, updated_at";

pub struct PgEventStore { connections: Arc<PgConnections> }

impl PgEventStore {
    pub fn new(connections: Arc<PgConnections>) -> Self { Self { connections } }

    async fn db(&self) -> StoreResult<Db> {
        self.connections.get_connection().await.map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, new: &NewEvent) -> StoreResult<Event> {
        let db = self.db().await?;
        let sql = format!(
            "INSERT INTO events (title, slug, description, overview, image, venue, location, date, time, \
             mode, audience, agenda, organizer, tags) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14) RETURNING {EVENT_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Event>(&sql)
            .bind(&new.title).bind(&new.slug).bind(&new.description).bind(&new.overview)
            .bind(&new.image).bind(&new.venue).bind(&new.location).bind(&new.date).bind(&new.time)
            .bind(&new.mode).bind(&new.audience).bind(&new.agenda).bind(&new.organizer).bind(&new.tags)
            .fetch_one(&db.0).await?;
        Ok(rec)
    }

    async fn update(&self, id: i64, next: &NewEvent) -> StoreResult<Option<Event>> {
        let db = self.db().await?;
        let sql = format!(
            "UPDATE events SET title=$2, slug=$3, description=$4, overview=$5, image=$6, venue=$7, \
             location=$8, date=$9, time=$10, mode=$11, audience=$12, agenda=$13, organizer=$14, tags=$15, \
             updated_at=now() WHERE id=$1 RETURNING {EVENT_COLUMNS}"
        );
        let rec = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(&next.title).bind(&next.slug).bind(&next.description).bind(&next.overview)
            .bind(&next.image).bind(&next.venue).bind(&next.location).bind(&next.date).bind(&next.time)
            .bind(&next.mode).bind(&next.audience).bind(&next.agenda).bind(&next.organizer).bind(&next.tags)
            .fetch_optional(&db.0).await?;
        Ok(rec)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Event>> {
        let db = self.db().await?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id=$1");
        Ok(sqlx::query_as::<_, Event>(&sql).bind(id).fetch_optional(&db.0).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Event>> {
        let db = self.db().await?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug=$1");
        Ok(sqlx::query_as::<_, Event>(&sql).bind(slug).fetch_optional(&db.0).await?)
    }

    async fn list(&self, sort: EventSort) -> StoreResult<Vec<Event>> {
        let db = self.db().await?;
        let order = match sort {
            EventSort::Desc => "created_at DESC, id DESC",
            EventSort::Asc => "created_at ASC, id ASC",
        };
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY {order}");
        Ok(sqlx::query_as::<_, Event>(&sql).fetch_all(&db.0).await?)
    }

    async fn find_sharing_tags(&self, exclude_id: i64, tags: &[String]) -> StoreResult<Vec<Event>> {
        let db = self.db().await?;
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id <> $1 AND tags && $2 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Event>(&sql).bind(exclude_id).bind(tags).fetch_all(&db.0).await?)
    }
}
