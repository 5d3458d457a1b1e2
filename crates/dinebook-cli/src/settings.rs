//! Client configuration: defaults, then the TOML file, then `DINEBOOK_*`
//! environment variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Config, ConfigError, Environment, File};
use dinebook_sync::SyncConfig;
use serde::Deserialize;

pub const DEFAULT_ORIGIN_URL: &str = "http://localhost:1337";
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/dinebook/dinebook.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
  pub origin_url:           String,
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
  #[serde(default)]
  pub sync:                 SyncConfig,
}

impl ClientSettings {
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
  pub origin_url: Option<String>,
  pub store_path: Option<PathBuf>,
}

pub fn load(config_file: &Path, overrides: &Overrides) -> Result<ClientSettings, ConfigError> {
  let settings = Config::builder()
    .set_default("origin_url", DEFAULT_ORIGIN_URL)?
    .set_default("store_path", DEFAULT_STORE_PATH)?
    .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
    .set_default("sync.demote_failed_submissions", false)?
    .add_source(File::from(config_file).required(false))
    .add_source(
      Environment::with_prefix("DINEBOOK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .set_override_option("origin_url", overrides.origin_url.clone())?
    .set_override_option(
      "store_path",
      overrides
        .store_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned()),
    )?
    .build()?;

  let mut client: ClientSettings = settings.try_deserialize()?;
  client.store_path = expand_tilde(&client.store_path);
  Ok(client)
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
