use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use tracker_api::{EventQuery, EventRecord, NewEvent};

use crate::AppState;
use crate::error::ApiError;

// ═══════════════════════════════════════════════════════════════
//  Validation
// ═══════════════════════════════════════════════════════════════

/// Разобрать тело `POST /track` в [`NewEvent`].
///
/// - тело должно быть JSON-объектом;
/// - `action` обязателен, строка, не пустая;
/// - `properties` либо отсутствует/`null`, либо объект.
///
/// Лишние поля игнорируются.
pub(crate) fn validate_track(body: Value) -> Result<NewEvent, ApiError> {
    let mut body = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(ApiError::validation("body", format!("expected a JSON object, got {}", kind(&other))));
        }
    };

    let action = match body.remove("action") {
        Some(Value::String(action)) => action,
        None | Some(Value::Null) => return Err(ApiError::validation("action", "field required")),
        Some(other) => {
            return Err(ApiError::validation("action", format!("expected a string, got {}", kind(&other))));
        }
    };

    let properties = match body.remove("properties") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(ApiError::validation("properties", format!("expected an object, got {}", kind(&other))));
        }
    };

    NewEvent::new(action, properties).map_err(|_| ApiError::validation("action", "must not be empty"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════
//  Handlers
// ═══════════════════════════════════════════════════════════════

#[derive(Serialize)]
pub(crate) struct TrackResponse {
    message: &'static str,
    event_id: Uuid,
}

#[derive(Serialize)]
pub(crate) struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    events: usize,
}

// --- POST /track ---

pub(crate) async fn handle_track(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TrackResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::validation("body", e.body_text()))?;
    let event = validate_track(body)?;

    let record = state.store.append(event).await?;
    tracing::info!(event_id = %record.id, action = %record.action, "event logged");

    Ok(Json(TrackResponse {
        message: "Event logged",
        event_id: record.id,
    }))
}

// --- GET /track?action=&offset=&limit=&order= ---

pub(crate) async fn handle_list(
    State(state): State<AppState>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation("query", e.body_text()))?;
    let records = state.store.list(&query).await?;
    Ok(Json(records))
}

// --- DELETE /track ---

pub(crate) async fn handle_clear(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.store.clear().await?;
    tracing::info!(removed, "events cleared");
    Ok(Json(MessageResponse {
        message: "All events cleared",
    }))
}

// --- GET /health ---

pub(crate) async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        events: state.store.count().await,
    })
}
