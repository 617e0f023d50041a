use crate::automation::ConfigError;
use crate::commands::types::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{info, warn};

// Configuration management: config.json on disk, one shared in-memory copy

/// The ready check window is about 12 seconds; anything longer would never accept.
pub const MAX_ACCEPT_DELAY_MS: u32 = 12_000;

const CONFIG_FILE: &str = "config.json";

pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
  ProjectDirs::from("gg", "reveal", "Reveal")
    .map(|dirs| dirs.config_dir().to_path_buf())
    .ok_or(ConfigError::NoConfigDir)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
  if config.accept_delay > MAX_ACCEPT_DELAY_MS {
    return Err(ConfigError::Validation(format!(
      "acceptDelay must be between 0 and {}ms, got {}ms",
      MAX_ACCEPT_DELAY_MS, config.accept_delay
    )));
  }
  Ok(())
}

pub fn parse_config(json: &str) -> Result<Config, ConfigError> {
  let config: Config = serde_json::from_str(json)?;
  validate_config(&config)?;
  Ok(config)
}

/// Owns the persisted configuration. Readers get a clone; writers replace it whole.
///
/// Other processes (`reveal config set`) may rewrite `config.json` while a store is
/// running. Every read checks the file's modification stamp and reloads it when it moved.
#[derive(Debug, Clone)]
pub struct ConfigStore {
  path: PathBuf,
  current: Arc<RwLock<LoadedConfig>>,
}

#[derive(Debug)]
struct LoadedConfig {
  config: Config,
  stamp: Option<FileStamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
  modified: SystemTime,
  len: u64,
}

async fn file_stamp(path: &Path) -> Option<FileStamp> {
  let meta = tokio::fs::metadata(path).await.ok()?;
  Some(FileStamp {
    modified: meta.modified().ok()?,
    len: meta.len(),
  })
}

impl ConfigStore {
  /// Load `config.json` from `config_dir`, writing the defaults first if it does not exist.
  pub async fn load(config_dir: &Path) -> Result<Self, ConfigError> {
    tokio::fs::create_dir_all(config_dir)
      .await
      .map_err(|e| io_error(config_dir, e))?;

    let path = config_dir.join(CONFIG_FILE);
    let config = if path.exists() {
      read_config(&path).await?
    } else {
      info!("[Config] No config at {}, writing defaults", path.display());
      let config = Config::default();
      write_config(&path, &config).await?;
      config
    };

    info!("[Config] Loaded: {:?}", config);
    let stamp = file_stamp(&path).await;
    Ok(Self {
      path,
      current: Arc::new(RwLock::new(LoadedConfig { config, stamp })),
    })
  }

  /// In-memory store with no file behind it
  pub fn in_memory(config: Config) -> Self {
    Self {
      path: PathBuf::new(),
      current: Arc::new(RwLock::new(LoadedConfig {
        config,
        stamp: None,
      })),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn is_file_backed(&self) -> bool {
    !self.path.as_os_str().is_empty()
  }

  pub async fn get_config(&self) -> Config {
    if self.is_file_backed() {
      self.reload_if_changed().await;
    }
    self.current.read().await.config.clone()
  }

  /// Pick up a write made by another process. A broken file is reported once and the
  /// previous configuration stays in effect.
  async fn reload_if_changed(&self) {
    let stamp = file_stamp(&self.path).await;
    if stamp.is_none() || self.current.read().await.stamp == stamp {
      return;
    }

    let mut current = self.current.write().await;
    if current.stamp == stamp {
      return;
    }
    current.stamp = stamp;
    match read_config(&self.path).await {
      Ok(config) if config != current.config => {
        info!("[Config] Reloaded after external change: {:?}", config);
        current.config = config;
      }
      Ok(_) => {}
      Err(e) => warn!("[Config] Ignoring changed {}: {}", self.path.display(), e),
    }
  }

  /// Validate, persist, then swap in the new configuration. On any error the old one stays.
  pub async fn set_config(&self, new_config: Config) -> Result<(), ConfigError> {
    validate_config(&new_config)?;
    let mut current = self.current.write().await;
    if self.is_file_backed() {
      write_config(&self.path, &new_config).await?;
      current.stamp = file_stamp(&self.path).await;
    }
    info!("[Config] Setting config: {:?}", new_config);
    current.config = new_config;
    Ok(())
  }
}

async fn read_config(path: &Path) -> Result<Config, ConfigError> {
  let content = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| io_error(path, e))?;
  parse_config(&content)
}

async fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
  let data = serde_json::to_string_pretty(config)?;
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, data)
    .await
    .map_err(|e| io_error(&tmp, e))?;
  if let Err(e) = tokio::fs::rename(&tmp, path).await {
    warn!("[Config] Failed to move {} into place: {}", tmp.display(), e);
    return Err(io_error(path, e));
  }
  Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
  ConfigError::Io {
    path: path.display().to_string(),
    source,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::automation::LookupProvider;
  use crate::commands::types::ProviderSetting;
  use assert_matches::assert_matches;

  #[test]
  fn config_round_trip_is_lossless() {
    let json = r#"{"autoOpen":false,"autoAccept":true,"acceptDelay":3500,"multiProvider":"deeplol"}"#;
    let config = parse_config(json).unwrap();
    assert_eq!(
      config,
      Config {
        auto_open: false,
        auto_accept: true,
        accept_delay: 3500,
        provider: ProviderSetting::Provider(LookupProvider::DeepLol),
      }
    );
    assert_eq!(serde_json::to_string(&config).unwrap(), json);
  }

  #[test]
  fn missing_provider_stays_missing() {
    let json = r#"{"autoOpen":true,"autoAccept":false,"acceptDelay":2000}"#;
    let config = parse_config(json).unwrap();
    assert_eq!(config.provider, ProviderSetting::NoProviderConfigured);
    assert_eq!(config.provider.resolve(), LookupProvider::OpGg);
    assert_eq!(serde_json::to_string(&config).unwrap(), json);
  }

  #[test]
  fn rejects_bad_values() {
    assert_matches!(
      parse_config(r#"{"autoOpen":true,"autoAccept":true,"acceptDelay":-5}"#),
      Err(ConfigError::Parse(_))
    );
    assert_matches!(
      parse_config(r#"{"autoOpen":true,"autoAccept":true,"acceptDelay":60000}"#),
      Err(ConfigError::Validation(_))
    );
    assert_matches!(
      parse_config(r#"{"autoOpen":true,"autoAccept":true,"acceptDelay":0,"multiProvider":"blitz"}"#),
      Err(ConfigError::Parse(_))
    );
  }

  #[tokio::test]
  async fn load_writes_defaults_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::load(dir.path()).await.unwrap();
    assert_eq!(store.get_config().await, Config::default());

    let on_disk = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
    assert_eq!(parse_config(&on_disk).unwrap(), Config::default());
  }

  #[tokio::test]
  async fn set_config_replaces_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::load(dir.path()).await.unwrap();
    let new_config = Config {
      auto_open: false,
      auto_accept: true,
      accept_delay: 4000,
      provider: ProviderSetting::Provider(LookupProvider::Tracker),
    };

    store.set_config(new_config.clone()).await.unwrap();
    assert_eq!(store.get_config().await, new_config);

    let reloaded = ConfigStore::load(dir.path()).await.unwrap();
    assert_eq!(reloaded.get_config().await, new_config);
  }

  #[tokio::test]
  async fn invalid_update_keeps_old_config() {
    let store = ConfigStore::in_memory(Config::default());
    let bad = Config {
      accept_delay: MAX_ACCEPT_DELAY_MS + 1,
      ..Config::default()
    };
    assert_matches!(store.set_config(bad).await, Err(ConfigError::Validation(_)));
    assert_eq!(store.get_config().await, Config::default());
  }

  #[tokio::test]
  async fn running_store_sees_update_from_another_store() {
    let dir = tempfile::tempdir().unwrap();
    let running = ConfigStore::load(dir.path()).await.unwrap();
    let cli = ConfigStore::load(dir.path()).await.unwrap();
    assert!(!running.get_config().await.auto_accept);

    let mut update = cli.get_config().await;
    update.auto_accept = true;
    update.accept_delay = 3000;
    cli.set_config(update.clone()).await.unwrap();

    assert_eq!(running.get_config().await, update);
  }

  #[tokio::test]
  async fn broken_external_write_keeps_previous_config() {
    let dir = tempfile::tempdir().unwrap();
    let running = ConfigStore::load(dir.path()).await.unwrap();

    std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
    assert_eq!(running.get_config().await, Config::default());

    let fixed = r#"{"autoOpen":false,"autoAccept":true,"acceptDelay":1000,"multiProvider":"ugg"}"#;
    std::fs::write(dir.path().join(CONFIG_FILE), fixed).unwrap();
    assert_eq!(running.get_config().await, parse_config(fixed).unwrap());
  }
}
