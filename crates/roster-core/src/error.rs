//! Error types for `roster-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ─── Validation ──────────────────────────────────────────────────────────────

/// A single rule broken by a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
  pub field:   &'static str,
  pub message: &'static str,
}

/// One or more field rules were violated. Nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
  violations: Vec<FieldViolation>,
}

impl ValidationError {
  pub(crate) fn new(violations: Vec<FieldViolation>) -> Self { Self { violations } }

  pub fn violations(&self) -> &[FieldViolation] { &self.violations }

  /// Names of the offending fields, in schema order.
  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.violations.iter().map(|v| v.field)
  }

  pub fn has_field(&self, field: &str) -> bool { self.fields().any(|f| f == field) }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("validation failed: ")?;
    for (i, v) in self.violations.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", v.field, v.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationError {}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

/// The error taxonomy every [`PersonStore`](crate::store::PersonStore)
/// backend error converts into.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("person not found: {0}")]
  NotFound(Uuid),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] BoxError),

  #[error("storage error: {0}")]
  Backend(#[source] BoxError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }

  pub fn is_storage_unavailable(&self) -> bool {
    matches!(self, Self::StorageUnavailable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
