//! A named collection of JSON documents inside the `documents` table.
//!
//! Documents are addressed by identity (`id` column) or by field-equality
//! [`DocFilter`]s evaluated with `json_extract`. Each call runs as one unit
//! on the connection thread, so writes are atomic per document.

use std::sync::Arc;

use rusqlite::{OptionalExtension as _, TransactionBehavior, types::Value as SqlValue};
use serde_json::Value;

use crate::{Error, Result};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Conjunction of `field == value` constraints over top-level document keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocFilter {
  clauses: Vec<(String, Value)>,
}

impl DocFilter {
  pub fn new() -> Self { Self::default() }

  /// Require `field` to equal `value`. A JSON `null` matches documents
  /// where the field is missing or null.
  pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
    self.clauses.push((field.into(), value.into()));
    self
  }

  /// Render as a SQL fragment (` AND ...` per clause) plus its parameters.
  /// Placeholders are positional and follow whatever the caller bound first.
  fn compile(&self) -> Result<(String, Vec<SqlValue>)> {
    let mut sql = String::new();
    let mut params = Vec::with_capacity(self.clauses.len() * 2);

    for (field, value) in &self.clauses {
      if field.is_empty()
        || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
      {
        return Err(Error::InvalidFilterField(field.clone()));
      }
      params.push(SqlValue::Text(format!("$.{field}")));
      match json_to_sql(value) {
        None => sql.push_str(" AND json_extract(body, ?) IS NULL"),
        Some(v) => {
          sql.push_str(" AND json_extract(body, ?) = ?");
          params.push(v);
        }
      }
    }

    Ok((sql, params))
  }
}

/// Map a JSON value to what `json_extract` yields for it. `None` for null.
fn json_to_sql(value: &Value) -> Option<SqlValue> {
  match value {
    Value::Null => None,
    Value::Bool(b) => Some(SqlValue::Integer(i64::from(*b))),
    Value::Number(n) => Some(match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
    }),
    Value::String(s) => Some(SqlValue::Text(s.clone())),
    // json_extract returns nested containers as minified JSON text.
    other => Some(SqlValue::Text(other.to_string())),
  }
}

// ─── Collection ──────────────────────────────────────────────────────────────

/// Handle to one collection. Cloning is cheap; the connection is shared.
#[derive(Clone)]
pub struct Collection {
  conn: tokio_rusqlite::Connection,
  name: Arc<str>,
}

impl Collection {
  pub(crate) fn new(conn: tokio_rusqlite::Connection, name: &str) -> Self {
    Self { conn, name: Arc::from(name) }
  }

  pub fn name(&self) -> &str { &self.name }

  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Insert a new document under `id`.
  pub async fn insert_one(&self, id: String, body: &Value) -> Result<()> {
    let name = self.name.to_string();
    let body = body.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, id, body],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch the document stored under `id`, if any.
  pub async fn find_by_id(&self, id: String) -> Result<Option<Value>> {
    let name = self.name.to_string();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
              rusqlite::params![name, id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.map(|b| serde_json::from_str(&b).map_err(Error::from)).transpose()
  }

  /// All documents matching `filter`, in insertion order.
  pub async fn find(&self, filter: &DocFilter) -> Result<Vec<Value>> {
    let (clauses, mut params) = filter.compile()?;
    params.insert(0, SqlValue::Text(self.name.to_string()));

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT body FROM documents WHERE collection = ?{clauses} ORDER BY rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies
      .iter()
      .map(|b| serde_json::from_str(b).map_err(Error::from))
      .collect()
  }

  /// Number of documents matching `filter`.
  pub async fn count(&self, filter: &DocFilter) -> Result<u64> {
    let (clauses, mut params) = filter.compile()?;
    params.insert(0, SqlValue::Text(self.name.to_string()));

    let n: i64 = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT COUNT(*) FROM documents WHERE collection = ?{clauses}");
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))?)
      })
      .await?;

    Ok(n.max(0) as u64)
  }

  /// Overwrite the document stored under `id`. Returns `false` if there was
  /// no such document; nothing is inserted in that case.
  pub async fn replace_one(&self, id: String, body: &Value) -> Result<bool> {
    let name = self.name.to_string();
    let body = body.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
          rusqlite::params![name, id, body],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  /// Read the document under `id`, rewrite it with `f`, and store the result,
  /// all inside one immediate transaction. Returns `None` without calling `f`
  /// if there is no such document. If `f` fails nothing is written.
  pub async fn modify_one<F, T>(&self, id: String, f: F) -> Result<Option<T>>
  where
    F: FnOnce(Value) -> Result<(Value, T)> + Send + 'static,
    T: Send + 'static,
  {
    let name = self.name.to_string();

    let outcome: Result<Option<T>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            rusqlite::params![name, id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(body) = body else {
          return Ok(Ok(None));
        };

        let rewritten = serde_json::from_str(&body).map_err(Error::from).and_then(f);
        let (doc, out) = match rewritten {
          Ok(pair) => pair,
          // Dropping `tx` rolls back.
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
          rusqlite::params![name, id, doc.to_string()],
        )?;
        tx.commit()?;
        Ok(Ok(Some(out)))
      })
      .await?;
    outcome
  }

  /// Remove the document stored under `id`. Returns whether one existed.
  pub async fn delete_one(&self, id: String) -> Result<bool> {
    let name = self.name.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
          rusqlite::params![name, id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  /// Remove every document in the collection. Returns how many were removed.
  pub async fn drop(&self) -> Result<u64> {
    let name = self.name.to_string();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1",
          rusqlite::params![name],
        )?)
      })
      .await?;
    Ok(removed as u64)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn compile_binds_path_and_value() {
    let (sql, params) = DocFilter::new()
      .eq("name", "Ana")
      .eq("age", 30)
      .eq("job", Value::Null)
      .compile()
      .unwrap();

    assert_eq!(
      sql,
      " AND json_extract(body, ?) = ? AND json_extract(body, ?) = ? \
       AND json_extract(body, ?) IS NULL"
    );
    assert_eq!(
      params,
      vec![
        SqlValue::Text("$.name".into()),
        SqlValue::Text("Ana".into()),
        SqlValue::Text("$.age".into()),
        SqlValue::Integer(30),
        SqlValue::Text("$.job".into()),
      ]
    );
  }

  #[test]
  fn compile_rejects_path_syntax_in_field_names() {
    for bad in ["", "a.b", "name'--", "$.name", "x[0]"] {
      let err = DocFilter::new().eq(bad, json!(1)).compile().unwrap_err();
      assert!(matches!(err, Error::InvalidFilterField(ref f) if f == bad));
    }
  }

  #[test]
  fn booleans_compare_as_integers() {
    assert_eq!(json_to_sql(&json!(true)), Some(SqlValue::Integer(1)));
    assert_eq!(json_to_sql(&json!(null)), None);
  }
}
