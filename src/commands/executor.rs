use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::automation::{Intent, IntentExecutionError, LookupProvider};
use crate::commands::lcu_watcher::{post_empty, get_lcu_client, READY_CHECK_ACCEPT_PATH};
use crate::commands::league_detection::ClientCredentials;
use crate::commands::types::ClientSnapshot;

// Turns intents into real actions: the accept call and browser windows

/// Performs one intent. Deduplication is the engine's job, not the executor's.
pub trait IntentExecutor: Send + Sync + 'static {
  fn execute(&self, intent: Intent) -> impl Future<Output = Result<(), IntentExecutionError>> + Send;
}

type UrlOpener = Arc<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

pub struct ClientIntentExecutor {
  http: reqwest::Client,
  credentials: watch::Receiver<Option<ClientCredentials>>,
  opener: UrlOpener,
}

impl ClientIntentExecutor {
  /// Accepts through whatever client the watcher currently sees; opens URLs in the
  /// default browser.
  pub fn new(credentials: watch::Receiver<Option<ClientCredentials>>) -> Self {
    Self::with_opener(
      credentials,
      Arc::new(|url: &str| webbrowser::open(url).map(|_| ())),
    )
  }

  pub fn with_opener(
    credentials: watch::Receiver<Option<ClientCredentials>>,
    opener: UrlOpener,
  ) -> Self {
    Self {
      http: get_lcu_client(),
      credentials,
      opener,
    }
  }

  async fn accept(&self) -> Result<(), IntentExecutionError> {
    let creds = self
      .credentials
      .borrow()
      .clone()
      .ok_or(IntentExecutionError::NotConnected)?;
    post_empty(&self.http, &creds.lcu, READY_CHECK_ACCEPT_PATH)
      .await
      .map_err(IntentExecutionError::Accept)?;
    info!("[Executor] Ready check accepted");
    Ok(())
  }

  async fn open(&self, url: String) -> Result<(), IntentExecutionError> {
    let opener = self.opener.clone();
    let target = url.clone();
    let opened = tokio::task::spawn_blocking(move || opener(&target))
      .await
      .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
    opened.map_err(|source| IntentExecutionError::OpenUrl {
      url: url.clone(),
      source,
    })?;
    info!("[Executor] Opened {}", url);
    Ok(())
  }
}

impl IntentExecutor for ClientIntentExecutor {
  async fn execute(&self, intent: Intent) -> Result<(), IntentExecutionError> {
    match intent {
      Intent::Accept => self.accept().await,
      Intent::OpenLookup {
        provider,
        region,
        game_name,
        game_tag,
      } => {
        self
          .open(provider.lookup_url(&region, &game_name, &game_tag))
          .await
      }
    }
  }
}

/// One multisearch page for everyone in the current champ select, muted players
/// included. `None` outside champ select or when the participant list is empty.
pub fn team_lookup_url(snapshot: &ClientSnapshot, provider: LookupProvider) -> Option<String> {
  let champ_select = snapshot.champ_select.as_ref()?;
  let first = champ_select.participants.first()?;
  let region = champ_select.web_region.as_deref().unwrap_or(&first.region);
  let players: Vec<(&str, &str)> = champ_select
    .participants
    .iter()
    .map(|p| (p.game_name.as_str(), p.game_tag.as_str()))
    .collect();
  Some(provider.multisearch_url(region, &players))
}
