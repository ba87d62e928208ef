//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | Optional equality filters: `name`, `lastName`, `address`, `gender`, `job`, `age` |
//! | `POST`   | `/people` | Body: [`PersonInput`]; returns 201 + stored person |
//! | `GET`    | `/people/:id` | 404 if not found |
//! | `PATCH`  | `/people/:id` | Body: [`PersonPatch`]; `null` clears optional fields |
//!
//! Bodies are read as JSON objects and decoded through the schema table, so a
//! mistyped or `null` required field is a 422 with `fields`, like any other
//! rule violation.
//! | `DELETE` | `/people/:id` | Always 204, even if the person did not exist |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  Person, PersonInput, PersonPatch,
  store::{PersonFilter, PersonStore},
};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::{body::JsonBody, error::ApiError};

fn log_rejection(op: &str, e: ApiError) -> ApiError {
  if let ApiError::Validation(v) = &e {
    warn!(op, fields = ?v.fields().collect::<Vec<_>>(), "rejected invalid person");
  }
  e
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /people[?gender=...][&age=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PersonFilter>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
{
  let people = store.find(&filter).await.map_err(ApiError::from_store)?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people` — returns 201 + the stored [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let input =
    PersonInput::from_json(body).map_err(|e| log_rejection("create", e.into()))?;
  let person = store
    .create(input)
    .await
    .map_err(|e| log_rejection("create", ApiError::from_store(e)))?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let person = store
    .find_by_id(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /people/:id` — returns the updated [`Person`].
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
{
  let patch =
    PersonPatch::from_json(body).map_err(|e| log_rejection("update", e.into()))?;
  let person = store
    .update_by_id(id, patch)
    .await
    .map_err(|e| log_rejection("update", ApiError::from_store(e)))?;
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /people/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
{
  store.delete_by_id(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
