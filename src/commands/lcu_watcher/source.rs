// Where snapshots come from: one fetch per poll tick

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::watch;
use tracing::{info, warn};

use super::types::{
  RawClientState, CHAT_PARTICIPANTS_PATH, GAMEFLOW_PHASE_PATH, READY_CHECK_PATH,
  REGION_LOCALE_PATH,
};
use super::utils::{get_json, get_lcu_client};
use crate::automation::TransportError;
use crate::commands::league_detection::{discover_credentials, ClientCredentials};

/// A client-state source the watcher can poll. One call is one round-trip.
pub trait SnapshotSource {
  fn fetch(&mut self) -> impl Future<Output = Result<RawClientState, TransportError>> + Send;
}

/// Polls the real client over its local HTTPS APIs.
///
/// Credentials are discovered lazily and dropped after any failed poll, so a restarted
/// client (new port, new token) is picked up on the next tick. The current credentials
/// are published on a watch channel for the executor and the event stream. The client's
/// region is fetched once per connection, the first time champ select comes around.
pub struct LcuSnapshotSource {
  http: reqwest::Client,
  league_path: Option<PathBuf>,
  credentials: watch::Sender<Option<ClientCredentials>>,
  region_locale: Option<serde_json::Value>,
  warned_no_chat: bool,
}

impl LcuSnapshotSource {
  pub fn new(league_path: Option<PathBuf>) -> Self {
    let (credentials, _) = watch::channel(None);
    Self {
      http: get_lcu_client(),
      league_path,
      credentials,
      region_locale: None,
      warned_no_chat: false,
    }
  }

  pub fn credentials(&self) -> watch::Receiver<Option<ClientCredentials>> {
    self.credentials.subscribe()
  }

  async fn ensure_credentials(&mut self) -> Result<ClientCredentials, TransportError> {
    let cached = self.credentials.borrow().clone();
    if let Some(creds) = cached {
      return Ok(creds);
    }

    let league_path = self.league_path.clone();
    let found = tokio::task::spawn_blocking(move || discover_credentials(league_path.as_deref()))
      .await
      .map_err(|e| TransportError::NotRunning(e.to_string()))?
      .map_err(|e| TransportError::NotRunning(e.to_string()))?;

    info!(
      "[LCU Watcher] Found client on port {} (chat endpoint: {})",
      found.lcu.port,
      found
        .riot_client
        .as_ref()
        .map_or("unavailable".to_string(), |rc| rc.port.to_string())
    );
    self.warned_no_chat = false;
    self.region_locale = None;
    self.credentials.send_replace(Some(found.clone()));
    Ok(found)
  }

  async fn fetch_with(&mut self, creds: &ClientCredentials) -> Result<RawClientState, TransportError> {
    let phase = get_json(&self.http, &creds.lcu, GAMEFLOW_PHASE_PATH)
      .await?
      .unwrap_or(serde_json::Value::Null);

    let mut raw = RawClientState {
      phase,
      ..Default::default()
    };

    match raw.phase.as_str() {
      Some("ReadyCheck") => {
        raw.ready_check = get_json(&self.http, &creds.lcu, READY_CHECK_PATH).await?;
      }
      Some("ChampSelect") => {
        if self.region_locale.is_none() {
          self.region_locale = get_json(&self.http, &creds.lcu, REGION_LOCALE_PATH).await?;
        }
        raw.region_locale = self.region_locale.clone();

        match &creds.riot_client {
          Some(riot_client) => {
            raw.participants = get_json(&self.http, riot_client, CHAT_PARTICIPANTS_PATH).await?;
          }
          None if !self.warned_no_chat => {
            warn!("[LCU Watcher] No Riot client credentials; champ select participants unavailable");
            self.warned_no_chat = true;
          }
          None => {}
        }
      }
      _ => {}
    }

    Ok(raw)
  }
}

impl SnapshotSource for LcuSnapshotSource {
  async fn fetch(&mut self) -> Result<RawClientState, TransportError> {
    let creds = self.ensure_credentials().await?;
    let result = self.fetch_with(&creds).await;
    if result.is_err() {
      self.credentials.send_replace(None);
    }
    result
  }
}
