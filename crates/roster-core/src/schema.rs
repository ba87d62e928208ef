//! The declarative `Person` schema.
//!
//! Each field's constraints live in one row of [`PERSON_SCHEMA`]. Both the
//! create path and the update path consult the table before anything is
//! written; there is no per-field validation code elsewhere.

use serde_json::{Map, Value};

use crate::error::{FieldViolation, ValidationError};

/// Declared storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Integer,
}

impl FieldKind {
  /// Message for a value of the wrong type.
  pub const fn mismatch(self) -> &'static str {
    match self {
      FieldKind::Text => "expected text",
      FieldKind::Integer => "expected an integer",
    }
  }
}

/// One row of the schema table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  /// Field name as it appears in the stored document.
  pub field:    &'static str,
  pub kind:     FieldKind,
  /// `Some(message)` if the field must be present and non-blank.
  pub required: Option<&'static str>,
  /// Inclusive lower bound for integer fields, with its message.
  pub min:      Option<(i64, &'static str)>,
}

impl FieldRule {
  const fn text(field: &'static str) -> Self {
    Self { field, kind: FieldKind::Text, required: None, min: None }
  }

  const fn required_text(field: &'static str, message: &'static str) -> Self {
    Self { field, kind: FieldKind::Text, required: Some(message), min: None }
  }

  const fn integer_min(field: &'static str, min: i64, message: &'static str) -> Self {
    Self { field, kind: FieldKind::Integer, required: None, min: Some((min, message)) }
  }
}

pub const MIN_AGE: i64 = 18;

pub const PERSON_SCHEMA: &[FieldRule] = &[
  FieldRule::required_text("name", "name required"),
  FieldRule::text("lastName"),
  FieldRule::required_text("address", "address required"),
  FieldRule::required_text("gender", "gender is required"),
  FieldRule::text("job"),
  FieldRule::integer_min("age", MIN_AGE, "age must be adult"),
];

// ─── Values ──────────────────────────────────────────────────────────────────

/// A borrowed view of one field's value, as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
  Absent,
  Text(&'a str),
  Integer(i64),
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
  fn from(v: Option<&'a str>) -> Self { v.map_or(Self::Absent, Self::Text) }
}

impl From<Option<i32>> for FieldValue<'_> {
  fn from(v: Option<i32>) -> Self {
    v.map_or(Self::Absent, |n| Self::Integer(i64::from(n)))
  }
}

fn check(rule: &FieldRule, value: FieldValue<'_>) -> Option<FieldViolation> {
  let violation = |message| Some(FieldViolation { field: rule.field, message });

  match (value, rule.kind) {
    (FieldValue::Absent, _) => rule.required.and_then(violation),
    (FieldValue::Text(s), FieldKind::Text) => match rule.required {
      Some(message) if s.trim().is_empty() => violation(message),
      _ => None,
    },
    (FieldValue::Integer(n), FieldKind::Integer) => match rule.min {
      Some((min, message)) if n < min => violation(message),
      _ => None,
    },
    (FieldValue::Text(_), kind @ FieldKind::Integer)
    | (FieldValue::Integer(_), kind @ FieldKind::Text) => violation(kind.mismatch()),
  }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), ValidationError> {
  if violations.is_empty() {
    Ok(())
  } else {
    Err(ValidationError::new(violations))
  }
}

/// Validate a complete record: every rule in the table is checked against
/// the value returned by `lookup` for its field.
pub fn validate_record<'a>(
  lookup: impl Fn(&str) -> FieldValue<'a>,
) -> Result<(), ValidationError> {
  finish(
    PERSON_SCHEMA
      .iter()
      .filter_map(|rule| check(rule, lookup(rule.field)))
      .collect(),
  )
}

/// Validate only the supplied fields, as for a partial update. Fields not in
/// `supplied` are not checked, so a missing required field is only reported
/// when the update explicitly clears it.
///
/// Unknown field names are ignored.
pub fn validate_fields<'a>(
  supplied: &[(&str, FieldValue<'a>)],
) -> Result<(), ValidationError> {
  finish(
    PERSON_SCHEMA
      .iter()
      .filter_map(|rule| {
        supplied
          .iter()
          .find(|(field, _)| *field == rule.field)
          .and_then(|(_, value)| check(rule, *value))
      })
      .collect(),
  )
}

/// Check that every schema field present in a JSON object has the type its
/// rule declares. `null` passes for every field; whether a required field is
/// missing is decided later, on the decoded value. Integers must fit in 32
/// bits.
pub fn check_json_kinds(body: &Map<String, Value>) -> Result<(), ValidationError> {
  finish(
    PERSON_SCHEMA
      .iter()
      .filter_map(|rule| {
        let fits = match (rule.kind, body.get(rule.field)?) {
          (_, Value::Null) | (FieldKind::Text, Value::String(_)) => true,
          (FieldKind::Integer, Value::Number(n)) => {
            n.as_i64().is_some_and(|n| i32::try_from(n).is_ok())
          }
          _ => false,
        };
        (!fits).then(|| FieldViolation { field: rule.field, message: rule.kind.mismatch() })
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lookup_from<'a>(
    pairs: &'a [(&'a str, FieldValue<'a>)],
  ) -> impl Fn(&str) -> FieldValue<'a> {
    move |field| {
      pairs
        .iter()
        .find(|(f, _)| *f == field)
        .map_or(FieldValue::Absent, |(_, v)| *v)
    }
  }

  #[test]
  fn complete_record_passes() {
    let pairs = [
      ("name", FieldValue::Text("Ana")),
      ("address", FieldValue::Text("1 Main St")),
      ("gender", FieldValue::Text("female")),
      ("age", FieldValue::Integer(18)),
    ];
    assert!(validate_record(lookup_from(&pairs)).is_ok());
  }

  #[test]
  fn missing_required_fields_are_all_reported() {
    let err = validate_record(|_| FieldValue::Absent).unwrap_err();
    let fields: Vec<_> = err.fields().collect();
    assert_eq!(fields, ["name", "address", "gender"]);
    assert_eq!(err.violations()[2].message, "gender is required");
  }

  #[test]
  fn blank_text_counts_as_missing() {
    let pairs = [
      ("name", FieldValue::Text("   ")),
      ("address", FieldValue::Text("1 Main St")),
      ("gender", FieldValue::Text("")),
    ];
    let err = validate_record(lookup_from(&pairs)).unwrap_err();
    let fields: Vec<_> = err.fields().collect();
    assert_eq!(fields, ["name", "gender"]);
  }

  #[test]
  fn age_below_minimum_is_rejected() {
    let err = validate_fields(&[("age", FieldValue::Integer(17))]).unwrap_err();
    assert_eq!(
      err.violations(),
      &[FieldViolation { field: "age", message: "age must be adult" }]
    );
    assert!(validate_fields(&[("age", FieldValue::Integer(-3))]).is_err());
  }

  #[test]
  fn partial_validation_ignores_unsupplied_fields() {
    assert!(validate_fields(&[("job", FieldValue::Text("Engineer"))]).is_ok());
    assert!(validate_fields(&[("age", FieldValue::Absent)]).is_ok());
    assert!(validate_fields(&[]).is_ok());
  }

  #[test]
  fn kind_mismatch_is_a_violation() {
    let err = validate_fields(&[("name", FieldValue::Integer(3))]).unwrap_err();
    assert!(err.has_field("name"));
  }

  fn object(v: Value) -> Map<String, Value> {
    match v {
      Value::Object(map) => map,
      other => panic!("not an object: {other}"),
    }
  }

  #[test]
  fn json_kinds_accept_matching_types_and_null() {
    let body = object(serde_json::json!({
      "name": "Ana",
      "lastName": null,
      "age": 30,
      "nickname": 12
    }));
    assert!(check_json_kinds(&body).is_ok());
  }

  #[test]
  fn json_kinds_report_every_mismatch() {
    let body = object(serde_json::json!({
      "name": 7,
      "gender": ["f"],
      "age": "thirty"
    }));
    let err = check_json_kinds(&body).unwrap_err();
    assert_eq!(
      err.violations(),
      &[
        FieldViolation { field: "name", message: "expected text" },
        FieldViolation { field: "gender", message: "expected text" },
        FieldViolation { field: "age", message: "expected an integer" },
      ]
    );
  }

  #[test]
  fn json_age_must_be_a_32_bit_integer() {
    for age in [serde_json::json!(30.5), serde_json::json!(1_i64 << 40)] {
      let body = object(serde_json::json!({ "age": age }));
      assert!(check_json_kinds(&body).unwrap_err().has_field("age"));
    }
  }
}
