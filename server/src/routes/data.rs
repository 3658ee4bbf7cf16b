//! User data routes: per-user key/value records.
//!
//! `GET` reads one key or the whole map, `POST` upserts one record, `PUT`
//! upserts a map of records, `DELETE` removes one key. All of them require a
//! bearer session.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::services::records::encode_value;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

impl KeyQuery {
    fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Pull a non-empty string `key` out of a `POST` body.
pub(crate) fn body_key(body: &Value) -> Result<&str, ApiError> {
    body.get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(ApiError::missing_key)
}

/// `GET /data?key=` — one value as `{ value }`, or every value as a map when
/// `key` is omitted.
pub async fn get_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Value>, ApiError> {
    if let Some(key) = query.key() {
        let record = state.records.get(auth.user_id, key).await?;
        let value = record.map_or(Value::Null, |r| r.decoded());
        return Ok(Json(json!({ "value": value })));
    }

    let records = state.records.list(auth.user_id).await?;
    let map: Map<String, Value> = records
        .into_iter()
        .map(|r| {
            let value = r.decoded();
            (r.key, value)
        })
        .collect();
    Ok(Json(Value::Object(map)))
}

/// `POST /data` — upsert `{ key, value }`.
pub async fn post_data(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let key = body_key(&body)?;
    let value = body.get("value").unwrap_or(&Value::Null);

    let id = state
        .records
        .upsert(auth.user_id, key, &encode_value(value))
        .await?;
    debug!(user_id = %auth.user_id, %key, "record saved");

    Ok(Json(json!({ "success": true, "id": id })))
}

/// `PUT /data` — upsert every entry of a `{ key: value, ... }` map.
pub async fn put_data(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Value::Object(map) = json_body(body)? else {
        return Err(ApiError::BadRequest("Body must be a JSON object".into()));
    };
    if map.keys().any(String::is_empty) {
        return Err(ApiError::missing_key());
    }

    let entries: Vec<(String, String)> = map
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    let saved = state.records.upsert_many(auth.user_id, &entries).await?;
    debug!(user_id = %auth.user_id, saved, "records saved");

    Ok(Json(json!({ "success": true, "saved": saved })))
}

/// `DELETE /data?key=` — remove one record.
pub async fn delete_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = query.key().ok_or_else(ApiError::missing_key)?;
    let deleted = state.records.delete(auth.user_id, key).await?;
    debug!(user_id = %auth.user_id, %key, deleted, "record deleted");

    Ok(Json(json!({ "success": true })))
}

/// `OPTIONS /data` — empty success for clients that preflight without CORS
/// request headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "data_test.rs"]
mod tests;
