//! Runtime server configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, ensure};
use feedline_core::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

/// Deserialised from `config.toml`, then overridden by `FEEDLINE_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub default_page_size: u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              8080,
      store_path:        PathBuf::from("feedline.db"),
      default_page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `FEEDLINE_*` variables.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FEEDLINE"))
      .build()
      .context("failed to read config file")?;

    let cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> anyhow::Result<()> {
    ensure!(
      (1..=MAX_PAGE_SIZE).contains(&self.default_page_size),
      "default_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
      self.default_page_size
    );
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
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
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let cfg = ServerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.address(), "127.0.0.1:8080");
  }

  #[test]
  fn page_size_out_of_range_is_rejected() {
    let cfg = ServerConfig { default_page_size: 0, ..ServerConfig::default() };
    assert!(cfg.validate().is_err());
    let cfg = ServerConfig { default_page_size: 101, ..ServerConfig::default() };
    assert!(cfg.validate().is_err());
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = ServerConfig::load(PathBuf::from("does-not-exist.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("feedline.db"));
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("data/feedline.db");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/feedline.db")),
        PathBuf::from(home).join("feedline.db")
      );
    }
  }
}
