// Decoding raw client payloads into typed snapshots

use serde::Deserialize;
use serde_json::Value;

use super::types::RawClientState;
use crate::automation::DecodeError;
use crate::commands::types::{
  ChampSelectSnapshot, ClientPhase, ClientSnapshot, Participant, ReadyCheckSnapshot,
};

#[derive(Deserialize)]
struct ParticipantsPayload {
  participants: Vec<Participant>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionLocale {
  web_region: String,
}

pub fn decode_phase(value: &Value) -> Result<ClientPhase, DecodeError> {
  value
    .as_str()
    .map(ClientPhase::from_lcu)
    .ok_or_else(|| DecodeError::Shape {
      what: "gameflow phase",
      reason: format!("expected a string, got {}", value),
    })
}

pub fn decode_ready_check(value: &Value) -> Result<ReadyCheckSnapshot, DecodeError> {
  ReadyCheckSnapshot::deserialize(value).map_err(|source| DecodeError::Json {
    what: "ready check",
    source,
  })
}

/// The chat service lists every conversation the player is in; only the champ select
/// room matters here.
pub fn decode_participants(value: &Value) -> Result<ChampSelectSnapshot, DecodeError> {
  let payload = ParticipantsPayload::deserialize(value).map_err(|source| DecodeError::Json {
    what: "chat participants",
    source,
  })?;

  let participants = payload
    .participants
    .into_iter()
    .filter(|p| p.client_id.contains("champ-select"))
    .collect();
  Ok(ChampSelectSnapshot {
    participants,
    web_region: None,
  })
}

pub fn decode_web_region(value: &Value) -> Result<String, DecodeError> {
  RegionLocale::deserialize(value)
    .map(|locale| locale.web_region)
    .map_err(|source| DecodeError::Json {
      what: "region locale",
      source,
    })
}

/// Any malformed part rejects the whole snapshot; the engine only ever sees valid ones.
pub fn decode_snapshot(raw: &RawClientState) -> Result<ClientSnapshot, DecodeError> {
  let phase = decode_phase(&raw.phase)?;

  let ready_check = match (&phase, &raw.ready_check) {
    (ClientPhase::ReadyCheck, Some(value)) => Some(decode_ready_check(value)?),
    _ => None,
  };

  let champ_select = match (&phase, &raw.participants) {
    (ClientPhase::ChampSelect, Some(value)) => Some(decode_participants(value)?),
    (ClientPhase::ChampSelect, None) => Some(ChampSelectSnapshot::default()),
    _ => None,
  };
  let champ_select = match (champ_select, &raw.region_locale) {
    (Some(mut cs), Some(value)) => {
      cs.web_region = Some(decode_web_region(value)?);
      Some(cs)
    }
    (cs, _) => cs,
  };

  Ok(ClientSnapshot {
    phase,
    ready_check,
    champ_select,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::types::{ReadyCheckResponse, ReadyCheckState};
  use assert_matches::assert_matches;
  use serde_json::json;

  fn participants_json() -> Value {
    json!({
      "participants": [
        {
          "cid": "abc@champ-select.eu1.pvp.net",
          "game_name": "Alpha",
          "game_tag": "EUW",
          "muted": false,
          "name": "Alpha",
          "pid": "p1@eu1.pvp.net",
          "puuid": "puuid-a",
          "region": "euw1"
        },
        {
          "cid": "def@champ-select.eu1.pvp.net",
          "game_name": "Bravo",
          "game_tag": "1234",
          "muted": true,
          "pid": "p2@eu1.pvp.net",
          "puuid": "puuid-b",
          "region": "euw1"
        },
        {
          "cid": "lobby-room@sec.eu1.pvp.net",
          "game_name": "Friend",
          "game_tag": "EUW",
          "muted": false,
          "pid": "p3@eu1.pvp.net",
          "puuid": "puuid-c",
          "region": "euw1"
        }
      ]
    })
  }

  #[test]
  fn decodes_champ_select_participants() {
    let raw = RawClientState {
      phase: json!("ChampSelect"),
      participants: Some(participants_json()),
      ..Default::default()
    };
    let snapshot = decode_snapshot(&raw).unwrap();
    assert_eq!(snapshot.phase, ClientPhase::ChampSelect);
    let names: Vec<_> = snapshot.participants().iter().map(|p| p.riot_id()).collect();
    assert_eq!(names, vec!["Alpha#EUW", "Bravo#1234"]);
    assert_eq!(snapshot.participants()[0].display_name.as_deref(), Some("Alpha"));
    assert_eq!(snapshot.participants()[1].display_name, None);
    assert!(snapshot.participants()[1].muted);
  }

  #[test]
  fn missing_required_field_rejects_snapshot() {
    let raw = RawClientState {
      phase: json!("ChampSelect"),
      participants: Some(json!({
        "participants": [{ "cid": "x@champ-select", "game_name": "NoTag", "muted": false }]
      })),
      ..Default::default()
    };
    assert_matches!(decode_snapshot(&raw), Err(DecodeError::Json { .. }));
  }

  #[test]
  fn decodes_ready_check_detail() {
    let raw = RawClientState {
      phase: json!("ReadyCheck"),
      ready_check: Some(json!({
        "declinerIds": [],
        "dodgeWarning": "None",
        "playerResponse": "Accepted",
        "state": "InProgress",
        "suppressUx": false,
        "timer": 4.0
      })),
      ..Default::default()
    };
    let snapshot = decode_snapshot(&raw).unwrap();
    assert_eq!(
      snapshot.ready_check,
      Some(ReadyCheckSnapshot {
        state: ReadyCheckState::InProgress,
        player_response: ReadyCheckResponse::Accepted,
      })
    );
    assert!(snapshot.champ_select.is_none());
  }

  #[test]
  fn phase_must_be_a_string() {
    let raw = RawClientState {
      phase: json!(42),
      ..Default::default()
    };
    assert_matches!(decode_snapshot(&raw), Err(DecodeError::Shape { .. }));
  }

  #[test]
  fn unknown_phase_is_kept_verbatim() {
    let raw = RawClientState {
      phase: json!("SomethingNew"),
      ..Default::default()
    };
    assert_eq!(
      decode_snapshot(&raw).unwrap().phase,
      ClientPhase::Unknown("SomethingNew".to_string())
    );
  }

  #[test]
  fn champ_select_without_chat_has_empty_list() {
    let raw = RawClientState {
      phase: json!("ChampSelect"),
      ..Default::default()
    };
    let snapshot = decode_snapshot(&raw).unwrap();
    assert_eq!(snapshot.champ_select, Some(ChampSelectSnapshot::default()));
  }

  #[test]
  fn champ_select_carries_client_web_region() {
    let raw = RawClientState {
      phase: json!("ChampSelect"),
      participants: Some(participants_json()),
      region_locale: Some(json!({
        "locale": "en_GB",
        "region": "EUNE",
        "webLanguage": "en",
        "webRegion": "eune"
      })),
      ..Default::default()
    };
    let snapshot = decode_snapshot(&raw).unwrap();
    assert_eq!(
      snapshot.champ_select.unwrap().web_region.as_deref(),
      Some("eune")
    );
  }

  #[test]
  fn malformed_region_locale_rejects_snapshot() {
    let raw = RawClientState {
      phase: json!("ChampSelect"),
      region_locale: Some(json!({ "region": "EUW" })),
      ..Default::default()
    };
    assert_matches!(decode_snapshot(&raw), Err(DecodeError::Json { what: "region locale", .. }));
  }
}
