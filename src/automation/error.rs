use std::io;
use thiserror::Error;

// Error taxonomy for the watcher, the config store and the executor

/// The client could not be reached. Recovered by retrying on the next tick.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("League client not running: {0}")]
  NotRunning(String),
  #[error("Request to {endpoint} failed: {source}")]
  Request {
    endpoint: String,
    #[source]
    source: reqwest::Error,
  },
  #[error("Request to {endpoint} returned status {status}")]
  Status { endpoint: String, status: u16 },
}

/// A payload arrived but did not have the expected shape. The snapshot is dropped.
#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("Malformed {what} payload: {source}")]
  Json {
    what: &'static str,
    #[source]
    source: serde_json::Error,
  },
  #[error("Malformed {what} payload: {reason}")]
  Shape { what: &'static str, reason: String },
}

/// Executing an intent failed downstream. Reported, never retried.
#[derive(Debug, Error)]
pub enum IntentExecutionError {
  #[error("Accept failed: {0}")]
  Accept(#[source] TransportError),
  #[error("No client connection available to send accept")]
  NotConnected,
  #[error("Failed to open {url}: {source}")]
  OpenUrl {
    url: String,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Invalid configuration: {0}")]
  Validation(String),
  #[error("Config IO error at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: io::Error,
  },
  #[error("Failed to parse config.json: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("Failed to determine config directory")]
  NoConfigDir,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
  #[error("LCU lockfile not found in {0}")]
  LockfileNotFound(String),
  #[error("Malformed lockfile at {0}")]
  MalformedLockfile(String),
  #[error("League client process not found")]
  ProcessNotFound,
  #[error("Failed to query running processes: {0}")]
  ProcessQuery(#[from] io::Error),
}
