use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::error::ApiError;
use std::sync::Arc;

use crate::events::{bad_json, slug_lookup_error};
use crate::AppState;

/// `eventId` may be any JSON value; anything other than a positive integer
/// (or its string form) is rejected as an invalid event id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub event_id: Value,
    #[serde(default)]
    pub email: String,
}

fn raw_event_id(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct BookEventRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body.map_err(bad_json)?;
    let booking = state.bookings.create_booking(&raw_event_id(&req.event_id), &req.email).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Booking created successfully", "booking": booking }))))
}

pub async fn book_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    body: Result<Json<BookEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body.map_err(bad_json)?;
    let booking = state.bookings.create_booking_for_slug(&slug, &req.email).await.map_err(slug_lookup_error)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Booking created successfully", "booking": booking }))))
}

pub async fn count_bookings(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = state.events.find_by_slug(&slug).await.map_err(slug_lookup_error)?;
    let count = state.bookings.count_for_event(event.id).await?;
    Ok(Json(json!({ "message": "Bookings counted successfully", "count": count })))
}
