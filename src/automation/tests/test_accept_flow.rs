// Tests for ready check auto-accept timing

use super::test_helpers::*;
use crate::automation::{AutomationEngine, Intent};
use crate::commands::types::{ClientPhase, ReadyCheckResponse, ReadyCheckState};
use std::time::Instant;

#[cfg(test)]
mod accept_flow_tests {
  use super::*;

  /// Test: Accept waits for the configured delay
  ///
  /// Scenario: Ready check observed at t=0s, t=2s and t=6s with a 5s delay.
  /// Expected: Exactly one Accept, on the t=6s cycle.
  #[test]
  fn test_accept_fires_once_after_delay() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 5000, false);
    let base = Instant::now();

    assert!(engine.on_snapshot(&ready_check(), &cfg, at(base, 0)).is_empty());
    assert!(engine.on_snapshot(&ready_check(), &cfg, at(base, 2)).is_empty());
    assert_eq!(
      engine.on_snapshot(&ready_check(), &cfg, at(base, 6)),
      vec![Intent::Accept]
    );
    assert!(engine.session().accept_fired);
  }

  /// Test: Repeated ready check snapshots after the accept
  ///
  /// Scenario: The client keeps reporting ReadyCheck for a while after we accepted.
  /// Expected: No second Accept within the same session.
  #[test]
  fn test_accept_is_idempotent() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, false);
    let base = Instant::now();

    let mut total = 0;
    for secs in 0..20 {
      total += count_accepts(&engine.on_snapshot(&ready_check(), &cfg, at(base, secs)));
    }
    assert_eq!(total, 1);
  }

  /// Test: Zero delay accepts on first sight
  #[test]
  fn test_zero_delay_accepts_immediately() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, false);
    assert_eq!(
      engine.on_snapshot(&ready_check(), &cfg, Instant::now()),
      vec![Intent::Accept]
    );
  }

  /// Test: Auto-accept disabled
  ///
  /// Scenario: Ready check lasts far longer than the delay, but auto-accept is off.
  /// Expected: Never an Accept, though the ready check time is still recorded.
  #[test]
  fn test_no_accept_when_disabled() {
    let mut engine = AutomationEngine::new();
    let cfg = config(false, 1000, false);
    let base = Instant::now();

    for secs in [0, 5, 30, 120] {
      assert!(engine.on_snapshot(&ready_check(), &cfg, at(base, secs)).is_empty());
    }
    assert!(!engine.session().accept_fired);
    assert_eq!(engine.session().ready_check_observed_at, Some(base));
  }

  /// Test: Enabling auto-accept mid ready check
  ///
  /// Scenario: User turns auto-accept on while the ready check is already running.
  /// Expected: The delay counts from the first sighting, not from the config change.
  #[test]
  fn test_delay_counts_from_first_sighting() {
    let mut engine = AutomationEngine::new();
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &config(false, 3000, false), at(base, 0));
    let intents = engine.on_snapshot(&ready_check(), &config(true, 3000, false), at(base, 4));
    assert_eq!(intents, vec![Intent::Accept]);
  }

  /// Test: Ready check ends before the delay
  ///
  /// Scenario: Someone declines at t=2s with a 5s delay; the client drops back to Matchmaking.
  /// Expected: No Accept, and the next ready check starts its own timer.
  #[test]
  fn test_ready_check_cancelled_before_delay() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 5000, false);
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &cfg, at(base, 0));
    assert!(engine
      .on_snapshot(&phase(ClientPhase::Matchmaking), &cfg, at(base, 2))
      .is_empty());
    assert!(!engine.session().accept_fired);
    assert_eq!(engine.session().ready_check_observed_at, None);

    // New ready check at t=10: must wait another full delay
    assert!(engine.on_snapshot(&ready_check(), &cfg, at(base, 10)).is_empty());
    assert!(engine.on_snapshot(&ready_check(), &cfg, at(base, 14)).is_empty());
    assert_eq!(
      engine.on_snapshot(&ready_check(), &cfg, at(base, 15)),
      vec![Intent::Accept]
    );
  }

  /// Test: Player already answered the ready check manually
  ///
  /// Scenario: The ready check detail shows the local player declined.
  /// Expected: No Accept even after the delay.
  #[test]
  fn test_no_accept_when_player_already_responded() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 1000, false);
    let base = Instant::now();

    let declined = ready_check_with(ReadyCheckState::InProgress, ReadyCheckResponse::Declined);
    assert!(engine.on_snapshot(&declined, &cfg, at(base, 0)).is_empty());
    assert!(engine.on_snapshot(&declined, &cfg, at(base, 5)).is_empty());
    assert!(!engine.session().accept_fired);

    let everyone_ready =
      ready_check_with(ReadyCheckState::EveryoneReady, ReadyCheckResponse::None);
    assert!(engine.on_snapshot(&everyone_ready, &cfg, at(base, 6)).is_empty());
  }

  /// Test: In-progress ready check detail does not block the accept
  #[test]
  fn test_accept_with_in_progress_detail() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 1000, false);
    let base = Instant::now();

    let pending = ready_check_with(ReadyCheckState::InProgress, ReadyCheckResponse::None);
    assert!(engine.on_snapshot(&pending, &cfg, at(base, 0)).is_empty());
    assert_eq!(
      engine.on_snapshot(&pending, &cfg, at(base, 1)),
      vec![Intent::Accept]
    );
  }

  /// Test: Disconnects during the ready check do not reset the timer
  ///
  /// Scenario: One poll fails in the middle of the ready check.
  /// Expected: The disconnect yields nothing; the original first-sighting time still applies.
  #[test]
  fn test_disconnect_keeps_pending_accept() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 3000, false);
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &cfg, at(base, 0));
    assert!(engine
      .on_snapshot(&phase(ClientPhase::Disconnected), &cfg, at(base, 2))
      .is_empty());
    assert_eq!(
      engine.on_snapshot(&ready_check(), &cfg, at(base, 3)),
      vec![Intent::Accept]
    );
  }
}
