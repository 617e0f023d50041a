use crate::automation::LookupProvider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

// Data structures shared by the watcher, the engine and the host commands

pub const DEFAULT_ACCEPT_DELAY_MS: u32 = 2000;

/// User-chosen automation behavior. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  pub auto_open: bool,
  pub auto_accept: bool,
  /// Milliseconds to wait after the ready check is first seen.
  pub accept_delay: u32,
  #[serde(
    rename = "multiProvider",
    default,
    skip_serializing_if = "ProviderSetting::is_unset"
  )]
  pub provider: ProviderSetting,
}

impl Config {
  pub fn accept_delay(&self) -> Duration {
    Duration::from_millis(self.accept_delay as u64)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      auto_open: true,
      auto_accept: false,
      accept_delay: DEFAULT_ACCEPT_DELAY_MS,
      provider: ProviderSetting::Provider(LookupProvider::OpGg),
    }
  }
}

/// Older config files have no provider field at all. That case is kept apart from an
/// explicit choice so it survives a load/save cycle untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<LookupProvider>", into = "Option<LookupProvider>")]
pub enum ProviderSetting {
  #[default]
  NoProviderConfigured,
  Provider(LookupProvider),
}

impl ProviderSetting {
  pub fn is_unset(&self) -> bool {
    matches!(self, Self::NoProviderConfigured)
  }

  /// Absent provider falls back to OP.GG, the one site every revision supported.
  pub fn resolve(&self) -> LookupProvider {
    match self {
      Self::NoProviderConfigured => LookupProvider::OpGg,
      Self::Provider(provider) => *provider,
    }
  }
}

impl From<Option<LookupProvider>> for ProviderSetting {
  fn from(value: Option<LookupProvider>) -> Self {
    value.map_or(Self::NoProviderConfigured, Self::Provider)
  }
}

impl From<ProviderSetting> for Option<LookupProvider> {
  fn from(value: ProviderSetting) -> Self {
    match value {
      ProviderSetting::NoProviderConfigured => None,
      ProviderSetting::Provider(provider) => Some(provider),
    }
  }
}

// Champ select participant as reported by the Riot client chat service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  #[serde(rename = "cid")]
  pub client_id: String,
  pub game_name: String,
  pub game_tag: String,
  #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(rename = "pid")]
  pub player_id: String,
  #[serde(rename = "puuid")]
  pub player_unique_id: String,
  pub region: String,
  pub muted: bool,
}

impl Participant {
  /// puuid is stable for the whole session, cid is reassigned on reconnect.
  pub fn identity_key(&self) -> &str {
    if self.player_unique_id.is_empty() {
      &self.client_id
    } else {
      &self.player_unique_id
    }
  }

  pub fn riot_id(&self) -> String {
    format!("{}#{}", self.game_name, self.game_tag)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChampSelectSnapshot {
  pub participants: Vec<Participant>,
  /// Region as the client's own web links spell it, when the client reported one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub web_region: Option<String>,
}

impl ChampSelectSnapshot {
  /// Identity key -> muted. Order-insensitive, used to decide whether a poll changed anything.
  pub fn fingerprint(&self) -> BTreeMap<&str, bool> {
    self
      .participants
      .iter()
      .map(|p| (p.identity_key(), p.muted))
      .collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyCheckState {
  InProgress,
  EveryoneReady,
  StrangerNotReady,
  PartyNotReady,
  Error,
  Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyCheckResponse {
  None,
  Accepted,
  Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyCheckSnapshot {
  pub state: ReadyCheckState,
  pub player_response: ReadyCheckResponse,
}

impl ReadyCheckSnapshot {
  pub fn is_answered(&self) -> bool {
    self.player_response != ReadyCheckResponse::None
  }
}

/// Gameflow phase of the client, plus the two states the watcher adds itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientPhase {
  None,
  Lobby,
  Matchmaking,
  CheckedIntoTournament,
  ReadyCheck,
  ChampSelect,
  GameStart,
  FailedToLaunch,
  InProgress,
  Reconnect,
  WaitingForStats,
  PreEndOfGame,
  EndOfGame,
  TerminatedInError,
  Disconnected,
  Unknown(String),
}

impl ClientPhase {
  pub fn from_lcu(raw: &str) -> Self {
    match raw.trim().trim_matches('"') {
      "None" => Self::None,
      "Lobby" => Self::Lobby,
      "Matchmaking" => Self::Matchmaking,
      "CheckedIntoTournament" => Self::CheckedIntoTournament,
      "ReadyCheck" => Self::ReadyCheck,
      "ChampSelect" => Self::ChampSelect,
      "GameStart" => Self::GameStart,
      "FailedToLaunch" => Self::FailedToLaunch,
      "InProgress" => Self::InProgress,
      "Reconnect" => Self::Reconnect,
      "WaitingForStats" => Self::WaitingForStats,
      "PreEndOfGame" => Self::PreEndOfGame,
      "EndOfGame" => Self::EndOfGame,
      "TerminatedInError" => Self::TerminatedInError,
      other => Self::Unknown(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::None => "None",
      Self::Lobby => "Lobby",
      Self::Matchmaking => "Matchmaking",
      Self::CheckedIntoTournament => "CheckedIntoTournament",
      Self::ReadyCheck => "ReadyCheck",
      Self::ChampSelect => "ChampSelect",
      Self::GameStart => "GameStart",
      Self::FailedToLaunch => "FailedToLaunch",
      Self::InProgress => "InProgress",
      Self::Reconnect => "Reconnect",
      Self::WaitingForStats => "WaitingForStats",
      Self::PreEndOfGame => "PreEndOfGame",
      Self::EndOfGame => "EndOfGame",
      Self::TerminatedInError => "TerminatedInError",
      Self::Disconnected => "Disconnected",
      Self::Unknown(raw) => raw,
    }
  }

  /// Phases during which an automation session is alive.
  pub fn is_session_phase(&self) -> bool {
    matches!(self, Self::ReadyCheck | Self::ChampSelect)
  }

  /// Phases that end a session. Disconnected and unrecognized phases are not neutral:
  /// they say nothing about whether the match is still on.
  pub fn is_neutral(&self) -> bool {
    !self.is_session_phase() && !matches!(self, Self::Disconnected | Self::Unknown(_))
  }
}

impl std::fmt::Display for ClientPhase {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Point-in-time view of the client. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
  pub phase: ClientPhase,
  pub ready_check: Option<ReadyCheckSnapshot>,
  pub champ_select: Option<ChampSelectSnapshot>,
}

impl ClientSnapshot {
  pub fn phase_only(phase: ClientPhase) -> Self {
    Self {
      phase,
      ready_check: None,
      champ_select: None,
    }
  }

  pub fn disconnected() -> Self {
    Self::phase_only(ClientPhase::Disconnected)
  }

  pub fn participants(&self) -> &[Participant] {
    self
      .champ_select
      .as_ref()
      .map(|cs| cs.participants.as_slice())
      .unwrap_or(&[])
  }

  /// True when `other` differs in a way the engine cares about: phase, ready check
  /// detail, the participant identity set and mute flags, or the client region.
  pub fn materially_differs(&self, other: &ClientSnapshot) -> bool {
    if self.phase != other.phase || self.ready_check != other.ready_check {
      return true;
    }
    let mine = self.champ_select.as_ref().map(|cs| (cs.fingerprint(), &cs.web_region));
    let theirs = other.champ_select.as_ref().map(|cs| (cs.fingerprint(), &cs.web_region));
    mine != theirs
  }
}
