//! Randomised-but-valid field values for test scenarios.
//!
//! Only compiled with the `fixtures` feature; nothing in the store itself
//! depends on it.

use rand_core::{OsRng, RngCore};

use crate::{person::PersonInput, schema::MIN_AGE};

const FIRST_NAMES: &[&str] = &[
  "Ana", "Bruno", "Chiara", "Dmitri", "Esi", "Farah", "Goran", "Hana", "Ivo",
  "Jun", "Kamala", "Lior", "Mateo", "Noor", "Oskar", "Priya",
];

const LAST_NAMES: &[&str] = &[
  "Li", "Okafor", "Silva", "Novak", "Haddad", "Kowalski", "Tanaka", "Moreau",
  "Jensen", "Costa", "Nguyen", "Schmidt",
];

const STREETS: &[&str] = &[
  "Main St", "Oak Ave", "Harbour Rd", "Elm Ct", "Station Way", "Mill Ln",
  "Church St", "Park Pl",
];

const GENDERS: &[&str] = &["female", "male", "non-binary", "agender", "genderfluid"];

const JOB_TITLES: &[&str] = &[
  "Engineer", "Nurse", "Carpenter", "Accountant", "Librarian", "Chef",
  "Pilot", "Teacher", "Data Analyst", "Electrician",
];

const MAX_AGE: i64 = 50;

fn below(n: u32) -> u32 { OsRng.next_u32() % n }

fn pick(list: &[&'static str]) -> &'static str {
  list[below(list.len() as u32) as usize]
}

pub fn first_name() -> String { pick(FIRST_NAMES).to_owned() }

pub fn last_name() -> String { pick(LAST_NAMES).to_owned() }

/// A full display name, e.g. `"Noor Haddad"`.
pub fn full_name() -> String { format!("{} {}", first_name(), last_name()) }

pub fn street_address() -> String {
  format!("{} {}", 1 + below(9_999), pick(STREETS))
}

pub fn gender() -> String { pick(GENDERS).to_owned() }

pub fn job_title() -> String { pick(JOB_TITLES).to_owned() }

/// An age in `18..=50`.
pub fn adult_age() -> i32 {
  let span = (MAX_AGE - MIN_AGE + 1) as u32;
  (MIN_AGE as u32 + below(span)) as i32
}

/// A fully populated input that passes every schema rule.
pub fn person_input() -> PersonInput {
  PersonInput::new(full_name(), street_address(), gender())
    .with_last_name(last_name())
    .with_job(job_title())
    .with_age(adult_age())
}
