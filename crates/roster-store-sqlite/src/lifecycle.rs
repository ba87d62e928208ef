//! Connection lifecycle: opening and closing a store, and a scoped handle
//! that cleans up after a test run.

use std::path::PathBuf;

use roster_core::store::PersonStore as _;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{Result, SqliteStore, store::DEFAULT_COLLECTION};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Where the store lives and which collection holds persons.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Database file; `None` opens a private in-memory database.
  #[serde(default)]
  pub path:       Option<PathBuf>,
  #[serde(default = "default_collection")]
  pub collection: String,
}

fn default_collection() -> String { DEFAULT_COLLECTION.to_owned() }

impl Default for StoreConfig {
  fn default() -> Self { Self { path: None, collection: default_collection() } }
}

impl StoreConfig {
  pub fn in_memory() -> Self { Self::default() }

  pub fn at(path: impl Into<PathBuf>) -> Self {
    Self { path: Some(path.into()), ..Self::default() }
  }

  pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
    self.collection = collection.into();
    self
  }
}

// ─── Open / close ────────────────────────────────────────────────────────────

/// Open the store described by `config` and initialise its schema.
pub async fn open_connection(config: &StoreConfig) -> Result<SqliteStore> {
  let conn = match &config.path {
    Some(path) => tokio_rusqlite::Connection::open(path).await?,
    None => tokio_rusqlite::Connection::open_in_memory().await?,
  };
  debug!(path = ?config.path, collection = %config.collection, "store opened");
  SqliteStore::init(conn, &config.collection).await
}

/// Close `store`'s connection.
pub async fn close_connection(store: SqliteStore) -> Result<()> {
  store.close().await?;
  debug!("store closed");
  Ok(())
}

// ─── Scoped handle ───────────────────────────────────────────────────────────

/// A store opened for the duration of one test run.
///
/// [`ScopedConnection::close`] drops the collection and closes the
/// connection. If the handle is dropped without `close`, the connection
/// thread still shuts down once the last clone goes away, but the collection
/// is left as it was.
pub struct ScopedConnection {
  store:  SqliteStore,
  closed: bool,
}

impl ScopedConnection {
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    Ok(Self { store: open_connection(config).await?, closed: false })
  }

  pub fn store(&self) -> &SqliteStore { &self.store }

  /// Drop the collection, then close the connection. The connection is
  /// closed even if dropping the collection fails; the first error wins.
  pub async fn close(mut self) -> Result<()> {
    self.closed = true;
    let dropped = self.store.drop_all().await;
    let closed = close_connection(self.store.clone()).await;
    dropped.and(closed)
  }
}

impl Drop for ScopedConnection {
  fn drop(&mut self) {
    if !self.closed {
      warn!("scoped connection dropped without close; collection left in place");
    }
  }
}
