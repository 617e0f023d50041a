// Types and constants for the LCU watcher

use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consecutive failed polls before the user is told the client is gone.
pub const DISCONNECT_STREAK_THRESHOLD: u32 = 3;

/// Capacity of the snapshot channel; the watcher waits when the consumer falls behind.
pub const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

pub const GAMEFLOW_PHASE_PATH: &str = "/lol-gameflow/v1/gameflow-phase";
pub const READY_CHECK_PATH: &str = "/lol-matchmaking/v1/ready-check";
pub const READY_CHECK_ACCEPT_PATH: &str = "/lol-matchmaking/v1/ready-check/accept";
pub const CHAT_PARTICIPANTS_PATH: &str = "/chat/v5/participants";
pub const REGION_LOCALE_PATH: &str = "/riotclient/region-locale";

/// Connection state shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WatcherStatus {
  Connecting,
  Connected,
  Disconnected,
}

#[derive(Debug, Clone)]
pub struct WatcherOptions {
  pub poll_interval: Duration,
  pub disconnect_streak: u32,
}

impl Default for WatcherOptions {
  fn default() -> Self {
    Self {
      poll_interval: DEFAULT_POLL_INTERVAL,
      disconnect_streak: DISCONNECT_STREAK_THRESHOLD,
    }
  }
}

/// Undecoded payloads from one poll round-trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawClientState {
  pub phase: serde_json::Value,
  pub ready_check: Option<serde_json::Value>,
  pub participants: Option<serde_json::Value>,
  pub region_locale: Option<serde_json::Value>,
}
