//! Server configuration, layered from an optional TOML file and `ROSTER_*`
//! environment variables.

use std::path::{Path, PathBuf};

use roster_store_sqlite::StoreConfig;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default = "default_collection")]
  pub collection: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

fn default_collection() -> String { StoreConfig::default().collection }

impl ServerConfig {
  /// Read `path` (if it exists), then let `ROSTER_*` variables override it.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("ROSTER")),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self, config::ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Store settings, with a leading `~/` in `store_path` expanded.
  pub fn store(&self) -> StoreConfig {
    StoreConfig::at(expand_tilde(&self.store_path)).with_collection(&self.collection)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::from_builder(
      config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("roster.db"));
    assert_eq!(cfg.collection, "people");
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 9000
        store_path = "/var/lib/roster/roster.db"
        collection = "staff"
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:9000");

    let store = cfg.store();
    assert_eq!(store.path, Some(PathBuf::from("/var/lib/roster/roster.db")));
    assert_eq!(store.collection, "staff");
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/roster/config.toml")).unwrap();
    assert_eq!(cfg.port, default_port());
  }

  #[test]
  fn relative_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("data/roster.db")), PathBuf::from("data/roster.db"));
  }
}
