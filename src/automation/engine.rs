use super::intent::Intent;
use super::session::SessionState;
use crate::commands::types::{ClientPhase, ClientSnapshot, Config, ReadyCheckState};
use std::time::Instant;
use tracing::{debug, info};

// Phase-aware automation engine: snapshots and config in, intents out

/// Owns the session state. Feed it every snapshot (and re-feed the last one on each
/// poll tick so the accept delay can elapse); it never performs side effects itself.
#[derive(Debug, Default)]
pub struct AutomationEngine {
  session: SessionState,
}

impl AutomationEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn session(&self) -> &SessionState {
    &self.session
  }

  /// Decide what to do for `snapshot` under `config` at time `now`.
  ///
  /// Deterministic for a given prior session state. Accept, when emitted, comes before
  /// any participant lookups; lookups follow the snapshot's participant order.
  pub fn on_snapshot(
    &mut self,
    snapshot: &ClientSnapshot,
    config: &Config,
    now: Instant,
  ) -> Vec<Intent> {
    let phase = &snapshot.phase;

    if matches!(phase, ClientPhase::Disconnected | ClientPhase::Unknown(_)) {
      debug!("[Automation] No decision for phase {}", phase);
      return Vec::new();
    }

    if phase.is_neutral() {
      if self.session.is_active() {
        self.reset(phase);
      } else {
        self.session.phase = phase.clone();
      }
      return Vec::new();
    }

    // A ready check after champ select means the previous lobby was dodged and requeued
    if *phase == ClientPhase::ReadyCheck && self.session.phase == ClientPhase::ChampSelect {
      self.reset(phase);
    }

    if self.session.phase != *phase {
      info!(
        "[Automation][{}] Phase {} -> {}",
        self.session.id, self.session.phase, phase
      );
      self.session.phase = phase.clone();
    }

    let mut intents = Vec::new();
    match phase {
      ClientPhase::ReadyCheck => {
        if let Some(intent) = self.handle_ready_check(snapshot, config, now) {
          intents.push(intent);
        }
      }
      ClientPhase::ChampSelect => self.handle_champ_select(snapshot, config, &mut intents),
      _ => {}
    }
    intents
  }

  fn handle_ready_check(
    &mut self,
    snapshot: &ClientSnapshot,
    config: &Config,
    now: Instant,
  ) -> Option<Intent> {
    self.session.observe_ready_check(now);

    if !config.auto_accept || self.session.accept_fired {
      return None;
    }

    // The user (or the queue) already settled this ready check
    if let Some(ready_check) = &snapshot.ready_check {
      if ready_check.is_answered() || ready_check.state != ReadyCheckState::InProgress {
        debug!(
          "[Automation][{}] Ready check already resolved ({:?}/{:?}), not accepting",
          self.session.id, ready_check.state, ready_check.player_response
        );
        return None;
      }
    }

    let elapsed = self.session.ready_check_elapsed(now)?;
    if elapsed < config.accept_delay() {
      return None;
    }

    self.session.accept_fired = true;
    info!(
      "[Automation][{}] Accepting ready check after {}ms (delay {}ms)",
      self.session.id,
      elapsed.as_millis(),
      config.accept_delay
    );
    Some(Intent::Accept)
  }

  fn handle_champ_select(
    &mut self,
    snapshot: &ClientSnapshot,
    config: &Config,
    intents: &mut Vec<Intent>,
  ) {
    let provider = config.provider.resolve();
    // The client's own web region beats the chat service's platform id
    let client_region = snapshot
      .champ_select
      .as_ref()
      .and_then(|cs| cs.web_region.as_deref());
    for participant in snapshot.participants() {
      // Record even when auto-open is off so enabling it later does not open a backlog
      if !self.session.mark_seen(participant.identity_key()) {
        continue;
      }

      if !config.auto_open {
        continue;
      }
      if participant.muted {
        debug!(
          "[Automation][{}] Skipping muted participant {}",
          self.session.id,
          participant.riot_id()
        );
        continue;
      }

      info!(
        "[Automation][{}] Opening {} lookup for {}",
        self.session.id,
        provider,
        participant.riot_id()
      );
      intents.push(Intent::OpenLookup {
        provider,
        region: client_region.unwrap_or(&participant.region).to_string(),
        game_name: participant.game_name.clone(),
        game_tag: participant.game_tag.clone(),
      });
    }
  }

  fn reset(&mut self, phase: &ClientPhase) {
    info!(
      "[Automation][{}] Session ended at phase {} (accepted: {}, participants seen: {})",
      self.session.id,
      phase,
      self.session.accept_fired,
      self.session.opened_participant_ids.len()
    );
    self.session = SessionState::new();
    self.session.phase = phase.clone();
  }
}
