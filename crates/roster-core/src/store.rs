//! The `PersonStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::Deserialize;

use crate::person::{Person, PersonId, PersonInput, PersonPatch};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Field-equality filter for [`PersonStore::find`] and
/// [`PersonStore::count`]. Every `Some` field must match exactly; the default
/// filter matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFilter {
  pub name:      Option<String>,
  pub last_name: Option<String>,
  pub address:   Option<String>,
  pub gender:    Option<String>,
  pub job:       Option<String>,
  pub age:       Option<i32>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a person record store backend.
///
/// Every write validates against the schema table before touching storage,
/// so a rejected call leaves the store unchanged.
///
/// Backend errors convert into [`crate::Error`], which keeps the
/// validation / not-found / storage-unavailable distinction intact for
/// generic callers.
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Validate `input`, assign identity and timestamps, and persist.
  fn create(
    &self,
    input: PersonInput,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by identity. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Overwrite the fields supplied in `patch` and refresh `updated_at`.
  ///
  /// Fails with a validation error if any supplied field breaks its rule, or
  /// a not-found error if `id` does not exist. Nothing is written in either
  /// case.
  fn update_by_id(
    &self,
    id: PersonId,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Remove a person. Deleting a missing identity is a successful no-op;
  /// the returned flag says whether anything was removed.
  fn delete_by_id(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All persons matching `filter`, oldest first.
  fn find<'a>(
    &'a self,
    filter: &'a PersonFilter,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Number of persons matching `filter`.
  fn count<'a>(
    &'a self,
    filter: &'a PersonFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Remove every person by dropping the backing collection.
  fn drop_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
