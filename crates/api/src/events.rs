use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::domain::event::{EventFields, EventSort};
use shared::error::{ApiError, RecordError};
use shared::form::{FormObject, FormValue, UploadedFile, INVALID_JSON_MESSAGE};
use shared::records::EventRecords;
use std::sync::Arc;

use crate::AppState;

const INVALID_FORM_MESSAGE: &str = "Invalid form data format";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub sort: EventSort,
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let events = state.events.list_events(params.sort).await?;
    Ok(Json(json!({ "message": "Events fetched successfully", "events": events })))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = state.events.find_by_slug(&slug).await.map_err(slug_lookup_error)?;
    Ok(Json(json!({ "message": "Event fetched successfully", "event": event })))
}

/// Creates an event from a multipart form carrying an `image` file.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "multipart rejected");
        ApiError::BadRequest(INVALID_FORM_MESSAGE.into())
    })?;
    let form = read_form(multipart).await?;

    let mut fields = form.event_fields().map_err(RecordError::from)?;
    let image = form
        .file("image")
        .filter(|f| !f.bytes.is_empty())
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("Image file is required".into()))?;
    EventRecords::validate_candidate(&fields).map_err(RecordError::from)?;

    let url = state
        .images
        .upload(&image, &state.upload_folder)
        .await
        .map_err(|e| ApiError::internal("Event Creation Failed", format!("{e:#}")))?;
    fields.image = Some(url);

    let event = state.events.create_event(fields).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Event created successfully", "event": event }))))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Result<Json<EventFields>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = match raw_id.trim().parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(ApiError::BadRequest(format!("Invalid event id '{}'", raw_id.trim()))),
    };
    let Json(fields) = body.map_err(bad_json)?;
    let event = state.events.update_event(id, fields).await?;
    Ok(Json(json!({ "message": "Event updated successfully", "event": event })))
}

/// Always 200: an unknown slug or a failed lookup both yield an empty list.
pub async fn similar_events(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Json<Value> {
    let events = state.events.find_similar(&slug).await;
    Json(json!({ "message": "Similar events fetched successfully", "events": events }))
}

/// Slug misses are reported as 400 on the public lookup routes.
pub(crate) fn slug_lookup_error(err: RecordError) -> ApiError {
    match err {
        RecordError::NotFound(m) => ApiError::BadRequest(m),
        other => other.into(),
    }
}

async fn read_form(mut multipart: Multipart) -> Result<FormObject, ApiError> {
    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_form)?;
                FormValue::File(UploadedFile { file_name: Some(file_name), content_type, bytes: bytes.to_vec() })
            }
            None => FormValue::Text(field.text().await.map_err(bad_form)?),
        };
        pairs.push((name, value));
    }
    Ok(FormObject::from_pairs(pairs))
}

pub(crate) fn bad_json(err: JsonRejection) -> ApiError {
    tracing::debug!(error = %err, "malformed json body");
    ApiError::BadRequest(INVALID_JSON_MESSAGE.into())
}

fn bad_form(err: MultipartError) -> ApiError {
    tracing::debug!(error = %err, "malformed multipart body");
    ApiError::BadRequest(INVALID_FORM_MESSAGE.into())
}
