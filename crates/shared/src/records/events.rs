use std::sync::Arc;

use crate::domain::event::{Event, EventFields, EventSort, NewEvent};
use crate::error::{RecordError, RecordResult, ValidationError};
use crate::normalize::{normalize_date, normalize_slug, normalize_time};
use crate::repo::{EventStore, StoreError};

pub const INVALID_SLUG_MESSAGE: &str = "Invalid or missing slug parameter";

#[derive(Clone)]
pub struct EventRecords {
    store: Arc<dyn EventStore>,
}

impl EventRecords {
    pub fn new(store: Arc<dyn EventStore>) -> Self { Self { store } }

    pub async fn create_event(&self, fields: EventFields) -> RecordResult<Event> {
        let new = prepare_new(fields)?;
        if self.store.find_by_slug(&new.slug).await?.is_some() {
            return Err(duplicate_slug(&new.slug));
        }
        let event = self.store.insert(&new).await.map_err(|e| write_error(e, &new.slug))?;
        tracing::info!(id = event.id, slug = %event.slug, "event created");
        Ok(event)
    }

    /// Create-time validation without touching the store. A missing `image`
    /// is tolerated since it is only known after the upload.
    pub fn validate_candidate(fields: &EventFields) -> Result<(), ValidationError> {
        let mut candidate = fields.clone();
        candidate.image.get_or_insert_with(|| "pending-upload".into());
        prepare_new(candidate).map(|_| ())
    }

    /// Applies only the supplied fields; the slug is re-derived only when a
    /// title is supplied.
    pub async fn update_event(&self, id: i64, fields: EventFields) -> RecordResult<Event> {
        let current = self.find_by_id(id).await?;
        let next = apply_changes(NewEvent::from(current), fields)?;
        if let Some(other) = self.store.find_by_slug(&next.slug).await? {
            if other.id != id {
                return Err(duplicate_slug(&next.slug));
            }
        }
        let event = self
            .store
            .update(id, &next)
            .await
            .map_err(|e| write_error(e, &next.slug))?
            .ok_or_else(|| event_id_not_found(id))?;
        tracing::info!(id, slug = %event.slug, "event updated");
        Ok(event)
    }

    pub async fn find_by_id(&self, id: i64) -> RecordResult<Event> {
        self.store.find_by_id(id).await?.ok_or_else(|| event_id_not_found(id))
    }

    pub async fn exists(&self, id: i64) -> RecordResult<bool> {
        Ok(self.store.find_by_id(id).await?.is_some())
    }

    /// Looks up by slug after trimming and lowercasing the input.
    pub async fn find_by_slug(&self, slug: &str) -> RecordResult<Event> {
        let slug = slug.trim().to_lowercase();
        if slug.is_empty() {
            return Err(ValidationError::Malformed(INVALID_SLUG_MESSAGE.into()).into());
        }
        self.store
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| RecordError::NotFound(format!("Event with slug '{slug}' not found")))
    }

    pub async fn list_events(&self, sort: EventSort) -> RecordResult<Vec<Event>> {
        Ok(self.store.list(sort).await?)
    }

    /// Events other than `slug` sharing at least one tag with it. Any
    /// failure, including an unknown slug, yields an empty list; use
    /// [`try_find_similar`](Self::try_find_similar) to tell them apart.
    pub async fn find_similar(&self, slug: &str) -> Vec<Event> {
        match self.try_find_similar(slug).await {
            Ok(events) => events,
            Err(RecordError::NotFound(_)) => Vec::new(),
            Err(err) => {
                tracing::warn!(slug, error = %err, "similar events lookup failed");
                Vec::new()
            }
        }
    }

    pub async fn try_find_similar(&self, slug: &str) -> RecordResult<Vec<Event>> {
        let source = self.find_by_slug(slug).await?;
        Ok(self.store.find_sharing_tags(source.id, &source.tags).await?)
    }
}

fn write_error(err: StoreError, slug: &str) -> RecordError {
    match err {
        StoreError::UniqueViolation { .. } => duplicate_slug(slug),
        other => other.into(),
    }
}

fn duplicate_slug(slug: &str) -> RecordError {
    RecordError::Uniqueness(format!("An event with slug '{slug}' already exists"))
}

fn event_id_not_found(id: i64) -> RecordError {
    RecordError::NotFound(format!("Event with id '{id}' not found"))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value)
}

fn required_list(values: Option<Vec<String>>, field: &'static str) -> Result<Vec<String>, ValidationError> {
    let values = values.ok_or(ValidationError::MissingField(field))?;
    let mut items: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim();
        if !v.is_empty() {
            items.push(v.to_string());
        }
    }
    if items.is_empty() {
        return Err(ValidationError::EmptyList(field));
    }
    Ok(items)
}

fn tag_list(values: Option<Vec<String>>) -> Result<Vec<String>, ValidationError> {
    let mut tags = required_list(values, "Tags")?;
    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
    Ok(tags)
}

fn slug_for(title: &str) -> Result<String, ValidationError> {
    let slug = normalize_slug(title);
    if slug.is_empty() {
        return Err(ValidationError::Malformed("Title must contain at least one letter or digit".into()));
    }
    Ok(slug)
}

fn prepare_new(f: EventFields) -> Result<NewEvent, ValidationError> {
    let title = required(f.title, "Title")?;
    let slug = slug_for(&title)?;
    Ok(NewEvent {
        slug,
        title,
        description: required(f.description, "Description")?,
        overview: required(f.overview, "Overview")?,
        image: required(f.image, "Image")?,
        venue: required(f.venue, "Venue")?,
        location: required(f.location, "Location")?,
        date: normalize_date(&required(f.date, "Date")?)?,
        time: normalize_time(&required(f.time, "Time")?)?,
        mode: required(f.mode, "Mode")?,
        audience: required(f.audience, "Audience")?,
        agenda: required_list(f.agenda, "Agenda")?,
        organizer: required(f.organizer, "Organizer")?,
        tags: tag_list(f.tags)?,
    })
}

fn apply_changes(mut e: NewEvent, f: EventFields) -> Result<NewEvent, ValidationError> {
    if f.title.is_some() {
        e.title = required(f.title, "Title")?;
        e.slug = slug_for(&e.title)?;
    }
    if f.date.is_some() {
        e.date = normalize_date(&required(f.date, "Date")?)?;
    }
    if f.time.is_some() {
        e.time = normalize_time(&required(f.time, "Time")?)?;
    }
    if f.agenda.is_some() {
        e.agenda = required_list(f.agenda, "Agenda")?;
    }
    if f.tags.is_some() {
        e.tags = tag_list(f.tags)?;
    }
    let scalars = [
        (f.description, "Description", &mut e.description),
        (f.overview, "Overview", &mut e.overview),
        (f.image, "Image", &mut e.image),
        (f.venue, "Venue", &mut e.venue),
        (f.location, "Location", &mut e.location),
        (f.mode, "Mode", &mut e.mode),
        (f.audience, "Audience", &mut e.audience),
        (f.organizer, "Organizer", &mut e.organizer),
    ];
    for (value, field, slot) in scalars {
        if value.is_some() {
            *slot = required(value, field)?;
        }
    }
    Ok(e)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::repo::{MemoryStore, StoreResult};

    pub(crate) fn fields(title: &str) -> EventFields {
        EventFields {
            title: Some(title.into()),
            description: Some("A day of talks".into()),
            overview: Some("Talks and workshops".into()),
            image: Some("https://img.example/events/a.png".into()),
            venue: Some("Main Hall".into()),
            location: Some("São Paulo, SP".into()),
            date: Some("Nov 15, 2025".into()),
            time: Some("9:00".into()),
            mode: Some("offline".into()),
            audience: Some("Developers".into()),
            agenda: Some(vec!["Opening".into(), "Keynote".into()]),
            organizer: Some("DevEvent".into()),
            tags: Some(vec!["rust".into(), "web".into()]),
        }
    }

    fn records() -> EventRecords {
        EventRecords::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_normalizes_fields() {
        let records = records();
        let event = records.create_event(fields("  Tech Summit 2025! ")).await.unwrap();
        assert_eq!(event.title, "Tech Summit 2025!");
        assert_eq!(event.slug, "tech-summit-2025");
        assert_eq!(event.date, "2025-11-15");
        assert_eq!(event.time, "09:00");
    }

    #[tokio::test]
    async fn create_rejects_missing_and_empty_fields() {
        let records = records();

        let mut f = fields("Tech Summit");
        f.agenda = Some(vec![]);
        let err = records.create_event(f).await.unwrap_err();
        assert!(matches!(err, RecordError::Validation(ValidationError::EmptyList("Agenda"))));
        assert!(err.to_string().contains("Agenda"));

        let mut f = fields("Tech Summit");
        f.tags = Some(vec!["  ".into()]);
        assert!(matches!(
            records.create_event(f).await.unwrap_err(),
            RecordError::Validation(ValidationError::EmptyList("Tags"))
        ));

        let mut f = fields("Tech Summit");
        f.venue = Some("   ".into());
        assert!(matches!(
            records.create_event(f).await.unwrap_err(),
            RecordError::Validation(ValidationError::MissingField("Venue"))
        ));

        let mut f = fields("Tech Summit");
        f.date = Some("2025-13-01".into());
        assert!(matches!(
            records.create_event(f).await.unwrap_err(),
            RecordError::Validation(ValidationError::InvalidDate(_))
        ));

        let mut f = fields("Tech Summit");
        f.time = Some("25:00".into());
        assert!(matches!(
            records.create_event(f).await.unwrap_err(),
            RecordError::Validation(ValidationError::InvalidTime(_))
        ));

        assert!(records.list_events(EventSort::Desc).await.unwrap().is_empty());
    }

    #[test]
    fn candidate_validation_skips_image() {
        let mut f = fields("Tech Summit");
        f.image = None;
        assert!(EventRecords::validate_candidate(&f).is_ok());
        f.agenda = Some(vec![]);
        assert_eq!(EventRecords::validate_candidate(&f), Err(ValidationError::EmptyList("Agenda")));
    }

    #[tokio::test]
    async fn punctuation_only_title_is_rejected() {
        let err = records().create_event(fields("?!?")).await.unwrap_err();
        assert!(matches!(err, RecordError::Validation(ValidationError::Malformed(_))));
    }

    #[tokio::test]
    async fn colliding_slug_is_rejected_and_first_event_kept() {
        let records = records();
        let first = records.create_event(fields("Tech Summit")).await.unwrap();

        let mut dup = fields("tech   summit!!");
        dup.venue = Some("Other Hall".into());
        let err = records.create_event(dup).await.unwrap_err();
        assert!(matches!(err, RecordError::Uniqueness(_)));

        let stored = records.find_by_slug("tech-summit").await.unwrap();
        assert_eq!(stored, first);
        assert_eq!(records.list_events(EventSort::Desc).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_constraint_is_final_arbiter() {
        // Bypasses the pre-check by racing two inserts straight into the store.
        let store = Arc::new(MemoryStore::new());
        let new = prepare_new(fields("Race Day")).unwrap();
        EventStore::insert(store.as_ref(), &new).await.unwrap();
        let err = write_error(EventStore::insert(store.as_ref(), &new).await.unwrap_err(), &new.slug);
        assert!(matches!(err, RecordError::Uniqueness(m) if m.contains("race-day")));
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let records = records();
        let event = records.create_event(fields("Tech Summit")).await.unwrap();

        let patch = EventFields { time: Some("18:5".into()), ..Default::default() };
        let updated = records.update_event(event.id, patch).await.unwrap();
        assert_eq!(updated.time, "18:05");
        assert_eq!(updated.slug, "tech-summit");
        assert_eq!(updated.date, event.date);

        let patch = EventFields { title: Some("Tech Summit Reloaded".into()), ..Default::default() };
        let updated = records.update_event(event.id, patch).await.unwrap();
        assert_eq!(updated.slug, "tech-summit-reloaded");
        assert_eq!(updated.created_at, event.created_at);
        assert!(records.find_by_slug("tech-summit").await.is_err());
    }

    #[tokio::test]
    async fn update_rejects_slug_taken_by_another_event() {
        let records = records();
        records.create_event(fields("Rust Day")).await.unwrap();
        let other = records.create_event(fields("Go Day")).await.unwrap();

        let patch = EventFields { title: Some("Rust  Day".into()), ..Default::default() };
        let err = records.update_event(other.id, patch).await.unwrap_err();
        assert!(matches!(err, RecordError::Uniqueness(_)));

        let patch = EventFields { agenda: Some(vec![]), ..Default::default() };
        assert!(matches!(
            records.update_event(other.id, patch).await.unwrap_err(),
            RecordError::Validation(ValidationError::EmptyList("Agenda"))
        ));
    }

    #[tokio::test]
    async fn update_of_unknown_event_is_not_found() {
        let err = records().update_event(42, EventFields::default()).await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound(_)));
    }

    #[tokio::test]
    async fn slug_lookup_ignores_case_and_whitespace() {
        let records = records();
        let event = records.create_event(fields("Tech Summit")).await.unwrap();
        assert_eq!(records.find_by_slug("  Tech-Summit  ").await.unwrap().id, event.id);

        let err = records.find_by_slug("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Event with slug 'nope' not found");
        assert!(matches!(records.find_by_slug("   ").await.unwrap_err(), RecordError::Validation(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first_by_default() {
        let records = records();
        let a = records.create_event(fields("First")).await.unwrap();
        let b = records.create_event(fields("Second")).await.unwrap();

        let ids: Vec<i64> = records.list_events(EventSort::default()).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        let ids: Vec<i64> = records.list_events(EventSort::Asc).await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn similar_events_share_a_tag() {
        let records = records();
        let mut f = fields("Rust Conf");
        f.tags = Some(vec!["rust".into()]);
        records.create_event(f).await.unwrap();

        let mut f = fields("Web Day");
        f.tags = Some(vec!["web".into(), "css".into()]);
        let web = records.create_event(f).await.unwrap();

        let mut f = fields("Cooking Class");
        f.tags = Some(vec!["food".into()]);
        records.create_event(f).await.unwrap();

        let source = records.create_event(fields("Full Stack")).await.unwrap();
        let similar = records.find_similar(&source.slug).await;
        let titles: Vec<&str> = similar.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Web Day", "Rust Conf"]);
        assert!(similar.iter().all(|e| e.id != source.id));
        assert_eq!(similar[0].id, web.id);
    }

    #[tokio::test]
    async fn similar_for_unknown_slug_is_empty_but_distinguishable() {
        let records = records();
        assert!(records.find_similar("ghost").await.is_empty());
        assert!(matches!(records.try_find_similar("ghost").await, Err(RecordError::NotFound(_))));
    }

    struct UnreachableStore;

    fn down<T>() -> StoreResult<T> {
        Err(StoreError::Connection("pool timed out".into()))
    }

    #[async_trait::async_trait]
    impl EventStore for UnreachableStore {
        async fn insert(&self, _new: &NewEvent) -> StoreResult<Event> { down() }
        async fn update(&self, _id: i64, _next: &NewEvent) -> StoreResult<Option<Event>> { down() }
        async fn find_by_id(&self, _id: i64) -> StoreResult<Option<Event>> { down() }
        async fn find_by_slug(&self, _slug: &str) -> StoreResult<Option<Event>> { down() }
        async fn list(&self, _sort: EventSort) -> StoreResult<Vec<Event>> { down() }
        async fn find_sharing_tags(&self, _exclude_id: i64, _tags: &[String]) -> StoreResult<Vec<Event>> { down() }
    }

    #[tokio::test]
    async fn similar_swallows_backend_failures() {
        let records = EventRecords::new(Arc::new(UnreachableStore));
        assert!(records.find_similar("tech-summit").await.is_empty());
        assert!(matches!(
            records.try_find_similar("tech-summit").await,
            Err(RecordError::BackendConfiguration(_))
        ));
        assert!(matches!(
            records.list_events(EventSort::Desc).await,
            Err(RecordError::BackendConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn tags_are_deduplicated() {
        let mut f = fields("Tag Soup");
        f.tags = Some(vec!["rust".into(), " rust ".into(), "web".into()]);
        let event = records().create_event(f).await.unwrap();
        assert_eq!(event.tags, vec!["rust".to_string(), "web".to_string()]);
    }
}
