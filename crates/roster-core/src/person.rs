//! The `Person` entity and its create/update inputs.
//!
//! A `Person` is only ever built through [`Person::create`] or changed through
//! [`Person::apply`]; both run the schema table first, so a value of this type
//! always satisfies the rules in [`crate::schema::PERSON_SCHEMA`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  error::ValidationError,
  schema::{self, FieldValue},
};

/// Opaque identity assigned by the store at creation.
pub type PersonId = Uuid;

// ─── Stored record ───────────────────────────────────────────────────────────

/// A stored person, including identity and system timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         PersonId,
  pub name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name:  Option<String>,
  pub address:    String,
  pub gender:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub age:        Option<i32>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Person {
  /// Validate `input` and build a new record with a fresh identity.
  /// Both timestamps are set to `now`.
  pub fn create(input: PersonInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
    input.validate()?;
    Ok(Self {
      id:         Uuid::new_v4(),
      name:       input.name,
      last_name:  input.last_name,
      address:    input.address,
      gender:     input.gender,
      job:        input.job,
      age:        input.age,
      created_at: now,
      updated_at: now,
    })
  }

  /// Validate the supplied fields of `patch` and return the updated record.
  ///
  /// `updated_at` never moves backwards, even if `now` is earlier than the
  /// stored value; `created_at` is never touched.
  pub fn apply(mut self, patch: PersonPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
    patch.validate()?;

    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(last_name) = patch.last_name {
      self.last_name = last_name;
    }
    if let Some(address) = patch.address {
      self.address = address;
    }
    if let Some(gender) = patch.gender {
      self.gender = gender;
    }
    if let Some(job) = patch.job {
      self.job = job;
    }
    if let Some(age) = patch.age {
      self.age = age;
    }
    self.updated_at = now.max(self.updated_at);
    Ok(self)
  }
}

// ─── Create input ────────────────────────────────────────────────────────────

/// Caller-supplied fields for a new person.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
  /// Required fields deserialise as empty when missing or `null`, so the
  /// schema table reports them rather than the JSON decoder.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub name:      String,
  #[serde(default)]
  pub last_name: Option<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub address:   String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub gender:    String,
  #[serde(default)]
  pub job:       Option<String>,
  #[serde(default)]
  pub age:       Option<i32>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Option::<String>::deserialize(d).map(Option::unwrap_or_default)
}

impl PersonInput {
  /// Decode a request body. Schema fields of the wrong JSON type come back
  /// as a validation error naming each field.
  pub fn from_json(body: Map<String, Value>) -> crate::Result<Self> {
    schema::check_json_kinds(&body)?;
    Ok(serde_json::from_value(Value::Object(body))?)
  }

  pub fn new(
    name: impl Into<String>,
    address: impl Into<String>,
    gender: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      address: address.into(),
      gender: gender.into(),
      ..Self::default()
    }
  }

  pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
    self.last_name = Some(last_name.into());
    self
  }

  pub fn with_job(mut self, job: impl Into<String>) -> Self {
    self.job = Some(job.into());
    self
  }

  pub fn with_age(mut self, age: i32) -> Self {
    self.age = Some(age);
    self
  }

  fn field(&self, field: &str) -> FieldValue<'_> {
    match field {
      "name" => FieldValue::Text(&self.name),
      "lastName" => self.last_name.as_deref().into(),
      "address" => FieldValue::Text(&self.address),
      "gender" => FieldValue::Text(&self.gender),
      "job" => self.job.as_deref().into(),
      "age" => self.age.into(),
      _ => FieldValue::Absent,
    }
  }

  /// Check every rule of the schema against this input.
  pub fn validate(&self) -> Result<(), ValidationError> {
    schema::validate_record(|field| self.field(field))
  }
}

impl From<&Person> for PersonInput {
  fn from(p: &Person) -> Self {
    Self {
      name:      p.name.clone(),
      last_name: p.last_name.clone(),
      address:   p.address.clone(),
      gender:    p.gender.clone(),
      job:       p.job.clone(),
      age:       p.age,
    }
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// Fields to overwrite on an existing person. `None` leaves a field
/// unchanged. Optional fields take `Some(None)` (JSON `null`) to clear them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
  #[serde(default)]
  pub name:      Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub last_name: Option<Option<String>>,
  #[serde(default)]
  pub address:   Option<String>,
  #[serde(default)]
  pub gender:    Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub job:       Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub age:       Option<Option<i32>>,
}

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`).
fn present<'de, T, D>(d: D) -> Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  T::deserialize(d).map(Some)
}

impl PersonPatch {
  /// Decode a request body, reporting mistyped fields like
  /// [`PersonInput::from_json`].
  pub fn from_json(body: Map<String, Value>) -> crate::Result<Self> {
    schema::check_json_kinds(&body)?;
    Ok(serde_json::from_value(Value::Object(body))?)
  }

  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn last_name(mut self, last_name: Option<String>) -> Self {
    self.last_name = Some(last_name);
    self
  }

  pub fn address(mut self, address: impl Into<String>) -> Self {
    self.address = Some(address.into());
    self
  }

  pub fn gender(mut self, gender: impl Into<String>) -> Self {
    self.gender = Some(gender.into());
    self
  }

  pub fn job(mut self, job: Option<String>) -> Self {
    self.job = Some(job);
    self
  }

  pub fn age(mut self, age: Option<i32>) -> Self {
    self.age = Some(age);
    self
  }

  /// The fields this patch overwrites, as the validator sees them.
  fn supplied(&self) -> Vec<(&'static str, FieldValue<'_>)> {
    let mut out = Vec::new();
    if let Some(name) = &self.name {
      out.push(("name", FieldValue::Text(name)));
    }
    if let Some(last_name) = &self.last_name {
      out.push(("lastName", last_name.as_deref().into()));
    }
    if let Some(address) = &self.address {
      out.push(("address", FieldValue::Text(address)));
    }
    if let Some(gender) = &self.gender {
      out.push(("gender", FieldValue::Text(gender)));
    }
    if let Some(job) = &self.job {
      out.push(("job", job.as_deref().into()));
    }
    if let Some(age) = self.age {
      out.push(("age", age.into()));
    }
    out
  }

  /// Check the rules of every field this patch overwrites.
  pub fn validate(&self) -> Result<(), ValidationError> {
    schema::validate_fields(&self.supplied())
  }
}
