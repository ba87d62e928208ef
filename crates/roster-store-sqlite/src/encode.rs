//! Mapping between [`Person`] and its stored JSON document.
//!
//! The document carries its identity as `_id` (hyphenated lowercase UUID) and
//! timestamps as RFC 3339 UTC strings with fixed nanosecond precision, so
//! they sort lexicographically. Absent optional fields are left out.

use chrono::{DateTime, Utc};
use roster_core::{Person, PersonId, store::PersonFilter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{DocFilter, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: PersonId) -> String { id.hyphenated().to_string() }

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonDocument {
  #[serde(rename = "_id")]
  id:         Uuid,
  name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  last_name:  Option<String>,
  address:    String,
  gender:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  job:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  age:        Option<i32>,
  #[serde(with = "rfc3339")]
  created_at: DateTime<Utc>,
  #[serde(with = "rfc3339")]
  updated_at: DateTime<Utc>,
}

mod rfc3339 {
  use chrono::{DateTime, SecondsFormat, Utc};
  use serde::{Deserialize, Deserializer, Serializer, de::Error};

  pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(d)?;
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(D::Error::custom)
  }
}

pub fn encode_person(p: &Person) -> Result<Value> {
  let doc = PersonDocument {
    id:         p.id,
    name:       p.name.clone(),
    last_name:  p.last_name.clone(),
    address:    p.address.clone(),
    gender:     p.gender.clone(),
    job:        p.job.clone(),
    age:        p.age,
    created_at: p.created_at,
    updated_at: p.updated_at,
  };
  Ok(serde_json::to_value(doc)?)
}

pub fn decode_person(doc: Value) -> Result<Person> {
  let d: PersonDocument = serde_json::from_value(doc)?;
  Ok(Person {
    id:         d.id,
    name:       d.name,
    last_name:  d.last_name,
    address:    d.address,
    gender:     d.gender,
    job:        d.job,
    age:        d.age,
    created_at: d.created_at,
    updated_at: d.updated_at,
  })
}

// ─── Filter ──────────────────────────────────────────────────────────────────

pub fn encode_filter(f: &PersonFilter) -> DocFilter {
  let text = [
    ("name", &f.name),
    ("lastName", &f.last_name),
    ("address", &f.address),
    ("gender", &f.gender),
    ("job", &f.job),
  ];

  let filter = text
    .into_iter()
    .filter_map(|(field, value)| value.as_ref().map(|v| (field, v.clone())))
    .fold(DocFilter::new(), |acc, (field, v)| acc.eq(field, v));

  match f.age {
    Some(age) => filter.eq("age", age),
    None => filter,
  }
}
