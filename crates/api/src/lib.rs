use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use shared::db::{ConnectionManager, PgConnector};
use shared::records::{BookingRecords, EventRecords};
use shared::repo::{MemoryStore, PgBookingStore, PgEventStore};
use shared::upload::{CloudinaryClient, ImageHost, UnconfiguredImageHost};
use shared::{config::StoreKind, AppConfig};
use std::sync::Arc;

pub mod bookings;
pub mod events;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub struct AppState {
    pub events: EventRecords,
    pub bookings: BookingRecords,
    pub images: Arc<dyn ImageHost>,
    pub upload_folder: String,
}

impl AppState {
    pub fn new(events: EventRecords, bookings: BookingRecords, images: Arc<dyn ImageHost>, upload_folder: String) -> Self {
        Self { events, bookings, images, upload_folder }
    }

    /// Wires the stores picked by `cfg.store`. Postgres connects lazily on
    /// first use.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let (events, bookings) = match cfg.store {
            StoreKind::Postgres => {
                let connections = Arc::new(ConnectionManager::new(PgConnector::new(cfg)));
                let events = EventRecords::new(Arc::new(PgEventStore::new(connections.clone())));
                let bookings = BookingRecords::new(Arc::new(PgBookingStore::new(connections)), events.clone());
                (events, bookings)
            }
            StoreKind::Memory => {
                let store = MemoryStore::new();
                let events = EventRecords::new(Arc::new(store.clone()));
                let bookings = BookingRecords::new(Arc::new(store), events.clone());
                (events, bookings)
            }
        };
        let images: Arc<dyn ImageHost> = match CloudinaryClient::from_config(cfg) {
            Some(client) => Arc::new(client),
            None => {
                tracing::warn!("cloudinary credentials missing; event creation will fail at upload");
                Arc::new(UnconfiguredImageHost)
            }
        };
        Self::new(events, bookings, images, cfg.upload_folder.clone())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:slug", get(events::get_event).patch(events::update_event))
        .route("/events/:slug/similar", get(events::similar_events))
        .route("/events/:slug/bookings", get(bookings::count_bookings).post(bookings::book_event))
        .route("/bookings", post(bookings::create_booking))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
