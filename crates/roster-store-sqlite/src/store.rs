//! [`SqliteStore`] — the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use roster_core::{
  Person, PersonId, PersonInput, PersonPatch,
  store::{PersonFilter, PersonStore},
};
use tracing::debug;

use crate::{
  Collection, Error, Result,
  encode::{decode_person, encode_filter, encode_id, encode_person},
  schema::SCHEMA,
};

/// Collection name used when none is configured.
pub const DEFAULT_COLLECTION: &str = "people";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  people: Collection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, DEFAULT_COLLECTION).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, DEFAULT_COLLECTION).await
  }

  pub(crate) async fn init(conn: tokio_rusqlite::Connection, collection: &str) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { people: Collection::new(conn, collection) })
  }

  /// The underlying document collection.
  pub fn collection(&self) -> &Collection { &self.people }

  /// Close the connection. Every clone of this store fails with
  /// [`Error::StorageUnavailable`] afterwards.
  pub async fn close(self) -> Result<()> {
    self.people.connection().clone().close().await?;
    Ok(())
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: PersonInput) -> Result<Person> {
    let person = Person::create(input, Utc::now())?;
    let doc = encode_person(&person)?;

    self.people.insert_one(encode_id(person.id), &doc).await?;
    debug!(id = %person.id, collection = self.people.name(), "person created");
    Ok(person)
  }

  async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>> {
    self
      .people
      .find_by_id(encode_id(id))
      .await?
      .map(decode_person)
      .transpose()
  }

  async fn update_by_id(&self, id: PersonId, patch: PersonPatch) -> Result<Person> {
    // Validated before the read: a bad value on a missing id reports the
    // bad value.
    patch.validate()?;

    // Read, apply and write happen in one transaction, so concurrent updates
    // to different fields of the same person both land.
    let updated = self
      .people
      .modify_one(encode_id(id), move |doc| {
        let updated = decode_person(doc)?.apply(patch, Utc::now())?;
        Ok((encode_person(&updated)?, updated))
      })
      .await?
      .ok_or(Error::NotFound(id))?;

    debug!(%id, "person updated");
    Ok(updated)
  }

  async fn delete_by_id(&self, id: PersonId) -> Result<bool> {
    let removed = self.people.delete_one(encode_id(id)).await?;
    debug!(%id, removed, "person delete");
    Ok(removed)
  }

  async fn find(&self, filter: &PersonFilter) -> Result<Vec<Person>> {
    self
      .people
      .find(&encode_filter(filter))
      .await?
      .into_iter()
      .map(decode_person)
      .collect()
  }

  async fn count(&self, filter: &PersonFilter) -> Result<u64> {
    self.people.count(&encode_filter(filter)).await
  }

  async fn drop_all(&self) -> Result<()> {
    let removed = self.people.drop().await?;
    debug!(collection = self.people.name(), removed, "collection dropped");
    Ok(())
  }
}
