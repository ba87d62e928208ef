//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use roster_core::{PersonInput, fixture, store::PersonStore as _};
use roster_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn make_store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(
  app: Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

fn ana_json() -> Value {
  json!({
    "name": "Ana",
    "lastName": "Li",
    "address": "1 Main St",
    "gender": "female",
    "job": "Engineer",
    "age": 30
  })
}

// ── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_creates_person() {
  let store = make_store().await;
  let (status, body) =
    send(api_router(store.clone()), "POST", "/people", Some(ana_json())).await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["name"], "Ana");
  assert_eq!(body["age"], 30);
  assert_eq!(body["createdAt"], body["updatedAt"]);

  let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
  assert!(store.find_by_id(id).await.unwrap().is_some());
}

#[tokio::test]
async fn post_missing_required_fields_is_422() {
  let store = make_store().await;
  let (status, body) = send(
    api_router(store.clone()),
    "POST",
    "/people",
    Some(json!({ "lastName": "Li", "age": 40 })),
  )
  .await;

  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  let fields: Vec<&str> = body["fields"]
    .as_array()
    .unwrap()
    .iter()
    .map(|f| f["field"].as_str().unwrap())
    .collect();
  assert_eq!(fields, ["name", "address", "gender"]);
  assert_eq!(body["fields"][2]["message"], "gender is required");
  assert!(store.find(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn post_minor_is_422() {
  let store = make_store().await;
  let mut input = ana_json();
  input["age"] = json!(16);

  let (status, body) = send(api_router(store), "POST", "/people", Some(input)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"][0]["field"], "age");
  assert_eq!(body["fields"][0]["message"], "age must be adult");
}

#[tokio::test]
async fn post_null_required_field_is_422_with_fields() {
  let store = make_store().await;
  let mut input = ana_json();
  input["name"] = Value::Null;

  let (status, body) =
    send(api_router(store.clone()), "POST", "/people", Some(input)).await;

  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"], json!([{ "field": "name", "message": "name required" }]));
  assert!(body["error"].is_string());
  assert!(store.find(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn post_non_integer_age_is_422_with_fields() {
  let store = make_store().await;

  for age in [json!("thirty"), json!(30.5)] {
    let mut input = ana_json();
    input["age"] = age;

    let (status, body) =
      send(api_router(store.clone()), "POST", "/people", Some(input)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "age");
    assert_eq!(body["fields"][0]["message"], "expected an integer");
  }
  assert!(store.find(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_answers_with_json_error() {
  let store = make_store().await;
  let req = Request::builder()
    .method("POST")
    .uri("/people")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();

  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());

  // A JSON array is well-formed but not a person.
  let (status, body) =
    send(api_router(store), "POST", "/people", Some(json!(["Ana"]))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string());
}

// ── Read ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_one_and_missing() {
  let store = make_store().await;
  let created = store.create(fixture::person_input()).await.unwrap();

  let (status, body) =
    send(api_router(store.clone()), "GET", &format!("/people/{}", created.id), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], created.name.as_str());

  let (status, body) =
    send(api_router(store), "GET", &format!("/people/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn list_applies_query_filters() {
  let store = make_store().await;
  store
    .create(PersonInput::new("Ana", "1 Main St", "female").with_age(30))
    .await
    .unwrap();
  store
    .create(PersonInput::new("Bruno", "2 Oak Ave", "male").with_age(30))
    .await
    .unwrap();

  let (status, body) = send(api_router(store.clone()), "GET", "/people", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);

  let (_, body) =
    send(api_router(store), "GET", "/people?gender=male&age=30", None).await;
  let people = body.as_array().unwrap();
  assert_eq!(people.len(), 1);
  assert_eq!(people[0]["name"], "Bruno");
}

// ── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_updates_and_clears_fields() {
  let store = make_store().await;
  let (_, created) =
    send(api_router(store.clone()), "POST", "/people", Some(ana_json())).await;
  let uri = format!("/people/{}", created["id"].as_str().unwrap());

  let (status, body) = send(
    api_router(store),
    "PATCH",
    &uri,
    Some(json!({ "age": 31, "job": null })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["age"], 31);
  assert!(body.get("job").is_none());
  assert_eq!(body["lastName"], "Li");
  assert_eq!(body["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn patch_to_minor_is_422_and_record_unchanged() {
  let store = make_store().await;
  let (_, created) =
    send(api_router(store.clone()), "POST", "/people", Some(ana_json())).await;
  let uri = format!("/people/{}", created["id"].as_str().unwrap());

  let (status, body) =
    send(api_router(store.clone()), "PATCH", &uri, Some(json!({ "age": 17 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"][0]["field"], "age");

  let (_, fetched) = send(api_router(store), "GET", &uri, None).await;
  assert_eq!(fetched["age"], 30);
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn patch_mistyped_field_is_422_and_record_unchanged() {
  let store = make_store().await;
  let (_, created) =
    send(api_router(store.clone()), "POST", "/people", Some(ana_json())).await;
  let uri = format!("/people/{}", created["id"].as_str().unwrap());

  let (status, body) =
    send(api_router(store.clone()), "PATCH", &uri, Some(json!({ "age": "old" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"][0]["field"], "age");

  let (_, fetched) = send(api_router(store), "GET", &uri, None).await;
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn patch_missing_is_404() {
  let store = make_store().await;
  let (status, _) = send(
    api_router(store),
    "PATCH",
    &format!("/people/{}", Uuid::new_v4()),
    Some(json!({ "job": "Chef" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_is_idempotent() {
  let store = make_store().await;
  let created = store.create(fixture::person_input()).await.unwrap();
  let uri = format!("/people/{}", created.id);

  let (status, _) = send(api_router(store.clone()), "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(api_router(store.clone()), "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(api_router(store), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Storage failure ─────────────────────────────────────────────────────────

#[tokio::test]
async fn closed_store_is_503() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let app = api_router(Arc::new(store.clone()));
  store.close().await.unwrap();

  let (status, body) = send(app, "GET", "/people", None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(body["error"].as_str().unwrap().starts_with("storage unavailable"));
}
