//! Core types and trait definitions for the Roster person store.
//!
//! This crate is free of HTTP and database dependencies. It owns the
//! `Person` schema, its validation rules, and the [`store::PersonStore`]
//! abstraction that backends implement.

pub mod error;
pub mod person;
pub mod schema;
pub mod store;

#[cfg(feature = "fixtures")]
pub mod fixture;

pub use error::{Error, FieldViolation, Result, ValidationError};
pub use person::{Person, PersonId, PersonInput, PersonPatch};
