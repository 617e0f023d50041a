// LCU Watcher module - polls the League client and emits phase snapshots

pub(crate) mod types;
mod utils;
mod session;
mod source;
mod event_stream;
mod watcher;

// Re-export public types and functions
pub use types::{
  RawClientState, WatcherOptions, WatcherStatus, CHAT_PARTICIPANTS_PATH,
  DEFAULT_POLL_INTERVAL, DISCONNECT_STREAK_THRESHOLD, GAMEFLOW_PHASE_PATH,
  READY_CHECK_ACCEPT_PATH, READY_CHECK_PATH, REGION_LOCALE_PATH,
};
pub use utils::{get_json, get_lcu_client, post_empty};
pub use session::decode_snapshot;
pub use source::{LcuSnapshotSource, SnapshotSource};
pub use event_stream::{parse_lcu_ws_event, spawn_event_stream, LcuEvent};
pub use watcher::{PhaseWatcher, WatcherHandle};
