// Per-session bookkeeping owned by the automation engine

use crate::commands::types::ClientPhase;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// State for one ready-check/champ-select run. Thrown away as a whole when the client
/// goes back to a neutral phase, so the next match starts clean.
#[derive(Debug, Clone)]
pub struct SessionState {
  pub id: Uuid,
  pub phase: ClientPhase,
  pub accept_fired: bool,
  pub opened_participant_ids: HashSet<String>,
  pub ready_check_observed_at: Option<Instant>,
}

impl SessionState {
  pub fn new() -> Self {
    Self {
      id: Uuid::new_v4(),
      phase: ClientPhase::None,
      accept_fired: false,
      opened_participant_ids: HashSet::new(),
      ready_check_observed_at: None,
    }
  }

  pub fn is_active(&self) -> bool {
    self.phase.is_session_phase()
  }

  /// Records the first sighting of the ready check. Later calls keep the original time.
  pub fn observe_ready_check(&mut self, now: Instant) {
    self.ready_check_observed_at.get_or_insert(now);
  }

  pub fn ready_check_elapsed(&self, now: Instant) -> Option<Duration> {
    self
      .ready_check_observed_at
      .map(|seen| now.saturating_duration_since(seen))
  }

  /// Returns true the first time a participant key is recorded. Repeats do not allocate.
  pub fn mark_seen(&mut self, key: &str) -> bool {
    if self.opened_participant_ids.contains(key) {
      return false;
    }
    self.opened_participant_ids.insert(key.to_string());
    true
  }

  pub fn has_seen(&self, key: &str) -> bool {
    self.opened_participant_ids.contains(key)
  }
}

impl Default for SessionState {
  fn default() -> Self {
    Self::new()
  }
}
