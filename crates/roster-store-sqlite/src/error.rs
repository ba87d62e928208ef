//! Error type for `roster-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] roster_core::ValidationError),

  #[error("person not found: {0}")]
  NotFound(uuid::Uuid),

  /// The connection is closed or the database file cannot be reached.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] tokio_rusqlite::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// Filter field names are limited to ASCII alphanumerics and `_`.
  #[error("invalid filter field: {0:?}")]
  InvalidFilterField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whether `e` means the database cannot be reached at all, as opposed to a
/// statement failing against a live connection.
fn is_unavailable(e: &tokio_rusqlite::Error) -> bool {
  match e {
    tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => true,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)) => matches!(
      f.code,
      ErrorCode::CannotOpen
        | ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::SystemIoFailure
    ),
    _ => false,
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    if is_unavailable(&e) {
      Self::StorageUnavailable(e)
    } else {
      Self::Database(e)
    }
  }
}

impl From<Error> for roster_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Validation(v) => Self::Validation(v),
      Error::NotFound(id) => Self::NotFound(id),
      Error::StorageUnavailable(e) => Self::StorageUnavailable(Box::new(e)),
      Error::Json(e) => Self::Serialization(e),
      other => Self::Backend(Box::new(other)),
    }
  }
}
