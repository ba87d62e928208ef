//! SQLite backend for the Roster person store.
//!
//! Persons are kept as JSON documents in a named collection of a single
//! `documents` table. All database access goes through [`tokio_rusqlite`], so
//! it runs on a dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod collection;
pub mod error;
pub mod lifecycle;

pub use collection::{Collection, DocFilter};
pub use error::{Error, Result};
pub use lifecycle::{ScopedConnection, StoreConfig, close_connection, open_connection};
pub use store::SqliteStore;
