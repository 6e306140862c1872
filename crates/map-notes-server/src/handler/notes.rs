use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use map_notes_core::{LngLat, Note, NoteDraft, ValidationError};
use serde_json::{Map, Value};

use super::{ApiError, AppState};

const INVALID_BODY: &str = "Invalid body: need note, lng, lat.";

pub async fn list(State(state): State<AppState>) -> Json<Vec<Note>> {
    Json(state.database.list(state.list_limit))
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Json<Note>, ApiError> {
    let draft = parse_create(&body)?;
    let note = state.database.insert_async(draft).await?;
    tracing::info!(id = %note.id, "note created");
    Ok(Json(note))
}

pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Parses a create body. `note` must be a non-blank string; `lng` and `lat`
/// may be numbers or numeric strings.
fn parse_create(body: &[u8]) -> Result<NoteDraft, ApiError> {
    let invalid = || ApiError::BadRequest(INVALID_BODY.to_string());

    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
        return Err(invalid());
    };
    let Some(Value::String(text)) = fields.get("note") else {
        return Err(invalid());
    };
    if text.is_empty() {
        return Err(invalid());
    }
    let lng = coordinate(&fields, "lng").ok_or_else(invalid)?;
    let lat = coordinate(&fields, "lat").ok_or_else(invalid)?;

    NoteDraft::new(text, LngLat::new(lng, lat)).map_err(|err| match err {
        ValidationError::EmptyText => ApiError::BadRequest("note cannot be empty.".to_string()),
        other => ApiError::BadRequest(other.to_string()),
    })
}

fn coordinate(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}
