// Tests for session creation, reset and phase handling

use super::test_helpers::*;
use crate::automation::{AutomationEngine, Intent};
use crate::commands::types::ClientPhase;
use std::time::Instant;

#[cfg(test)]
mod session_lifecycle_tests {
  use super::*;

  /// Test: Returning to the lobby starts a clean session
  ///
  /// Scenario: Accept fires and A is opened, then the client goes back to Lobby and a
  /// new match is found.
  /// Expected: The new session accepts again and reopens A.
  #[test]
  fn test_lobby_resets_session() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, true);
    let base = Instant::now();
    let a = participant("Alpha", false);

    assert_eq!(count_accepts(&engine.on_snapshot(&ready_check(), &cfg, at(base, 0))), 1);
    assert_eq!(
      engine
        .on_snapshot(&champ_select(vec![a.clone()]), &cfg, at(base, 5))
        .len(),
      1
    );
    let first_session = engine.session().id;

    engine.on_snapshot(&phase(ClientPhase::Lobby), &cfg, at(base, 60));
    assert_ne!(engine.session().id, first_session);
    assert!(!engine.session().accept_fired);
    assert!(engine.session().opened_participant_ids.is_empty());

    assert_eq!(count_accepts(&engine.on_snapshot(&ready_check(), &cfg, at(base, 70))), 1);
    assert_eq!(
      opened_names(&engine.on_snapshot(&champ_select(vec![a]), &cfg, at(base, 75))),
      vec!["Alpha".to_string()]
    );
  }

  /// Test: Ready check followed by champ select stays one session
  ///
  /// Expected: The accept flag survives the transition into champ select.
  #[test]
  fn test_ready_check_to_champ_select_keeps_session() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, true);
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &cfg, at(base, 0));
    let id = engine.session().id;
    engine.on_snapshot(&champ_select(vec![]), &cfg, at(base, 2));
    assert_eq!(engine.session().id, id);
    assert!(engine.session().accept_fired);
    assert_eq!(engine.session().phase, ClientPhase::ChampSelect);
  }

  /// Test: Dodge and requeue
  ///
  /// Scenario: Champ select goes straight into a new ready check.
  /// Expected: Fresh session, so the new ready check gets its own accept.
  #[test]
  fn test_ready_check_after_champ_select_is_new_session() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, false);
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &cfg, at(base, 0));
    engine.on_snapshot(&champ_select(vec![]), &cfg, at(base, 1));
    let intents = engine.on_snapshot(&ready_check(), &cfg, at(base, 30));
    assert_eq!(intents, vec![Intent::Accept]);
  }

  /// Test: Unknown phases produce nothing
  ///
  /// Expected: Zero intents and no change to the running session.
  #[test]
  fn test_unknown_phase_is_ignored() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, true);
    let base = Instant::now();

    engine.on_snapshot(&ready_check(), &cfg, at(base, 0));
    let id = engine.session().id;
    let intents = engine.on_snapshot(
      &phase(ClientPhase::Unknown("Tutorial".to_string())),
      &cfg,
      at(base, 1),
    );
    assert!(intents.is_empty());
    assert_eq!(engine.session().id, id);
    assert_eq!(engine.session().phase, ClientPhase::ReadyCheck);
  }

  /// Test: In-game phases end the session
  ///
  /// Scenario: ChampSelect -> GameStart -> InProgress -> EndOfGame.
  /// Expected: The session resets once at GameStart and nothing is emitted.
  #[test]
  fn test_game_phases_are_neutral() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, true);
    let base = Instant::now();

    engine.on_snapshot(&champ_select(vec![participant("Alpha", false)]), &cfg, at(base, 0));
    for (i, p) in [
      ClientPhase::GameStart,
      ClientPhase::InProgress,
      ClientPhase::EndOfGame,
    ]
    .into_iter()
    .enumerate()
    {
      assert!(engine.on_snapshot(&phase(p), &cfg, at(base, 10 + i as u64)).is_empty());
      assert!(engine.session().opened_participant_ids.is_empty());
    }
  }

  /// Test: Neutral phases before any session
  #[test]
  fn test_neutral_without_session_is_noop() {
    let mut engine = AutomationEngine::new();
    let cfg = config(true, 0, true);
    let id = engine.session().id;

    assert!(engine
      .on_snapshot(&phase(ClientPhase::Lobby), &cfg, Instant::now())
      .is_empty());
    assert_eq!(engine.session().id, id);
    assert_eq!(engine.session().phase, ClientPhase::Lobby);
  }
}
