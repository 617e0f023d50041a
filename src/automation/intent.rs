use super::lookup::LookupProvider;
use serde::Serialize;

/// A side effect the engine wants performed. Executing it is someone else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
  Accept,
  OpenLookup {
    provider: LookupProvider,
    region: String,
    game_name: String,
    game_tag: String,
  },
}

impl Intent {
  pub fn label(&self) -> String {
    match self {
      Self::Accept => "Accept".to_string(),
      Self::OpenLookup {
        provider,
        game_name,
        game_tag,
        ..
      } => format!("OpenLookup({}#{} on {})", game_name, game_tag, provider),
    }
  }
}
