// LCU WebSocket event stream, used only to wake the poll loop early

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use native_tls::TlsConnector;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::commands::league_detection::{ClientCredentials, LcuEndpoint};

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub const SUBSCRIBED_EVENTS: [&str; 3] = [
  "OnJsonApiEvent_lol-gameflow_v1_gameflow-phase",
  "OnJsonApiEvent_lol-matchmaking_v1_ready-check",
  "OnJsonApiEvent_lol-champ-select_v1_session",
];

type LcuSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum EventStreamError {
  #[error("TLS setup failed: {0}")]
  Tls(#[from] native_tls::Error),
  #[error("WebSocket error: {0}")]
  WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
  #[error("Invalid auth header")]
  Header,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LcuEvent {
  pub uri: String,
  pub event_type: String,
}

enum PumpExit {
  Reconnect,
  Stop,
}

/// Expect an array like `[8, "OnJsonApiEvent_...", { uri, eventType, data }]`
pub fn parse_lcu_ws_event(text: &str) -> Option<LcuEvent> {
  let val: serde_json::Value = serde_json::from_str(text).ok()?;
  let arr = val.as_array()?;
  if arr.len() < 3 || arr[0].as_i64() != Some(8) {
    return None;
  }
  let obj = arr[2].as_object()?;
  Some(LcuEvent {
    uri: obj.get("uri")?.as_str()?.to_string(),
    event_type: obj
      .get("eventType")
      .and_then(|v| v.as_str())
      .unwrap_or("")
      .to_string(),
  })
}

/// Keep a subscription open against whatever client the poller last found, and poke
/// `wake` on every relevant event. Snapshot contents still come from polling.
pub fn spawn_event_stream(
  credentials: watch::Receiver<Option<ClientCredentials>>,
  wake: Arc<Notify>,
  cancel: CancellationToken,
) -> JoinHandle<()> {
  tokio::spawn(run_event_stream(credentials, wake, cancel))
}

async fn run_event_stream(
  mut credentials: watch::Receiver<Option<ClientCredentials>>,
  wake: Arc<Notify>,
  cancel: CancellationToken,
) {
  loop {
    let current = credentials.borrow_and_update().clone();
    let Some(creds) = current else {
      tokio::select! {
        _ = cancel.cancelled() => return,
        changed = credentials.changed() => {
          if changed.is_err() {
            return;
          }
        }
      }
      continue;
    };

    match connect(&creds.lcu).await {
      Ok(socket) => {
        info!("[LCU Watcher] Event stream connected on port {}", creds.lcu.port);
        if let PumpExit::Stop = pump(socket, &mut credentials, &wake, &cancel).await {
          return;
        }
      }
      Err(e) => debug!("[LCU Watcher] Event stream connect failed: {}", e),
    }

    tokio::select! {
      _ = cancel.cancelled() => return,
      _ = tokio::time::sleep(RECONNECT_DELAY) => {}
    }
  }
}

async fn connect(endpoint: &LcuEndpoint) -> Result<LcuSocket, EventStreamError> {
  let tls = TlsConnector::builder()
    .danger_accept_invalid_certs(true)
    .build()?;

  let mut request = endpoint.ws_url().into_client_request()?;
  let auth: HeaderValue = endpoint
    .auth_header()
    .parse()
    .map_err(|_| EventStreamError::Header)?;
  request.headers_mut().insert("Authorization", auth);
  request
    .headers_mut()
    .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("wamp"));

  let (mut socket, _response) = tokio_tungstenite::connect_async_tls_with_config(
    request,
    None,
    false,
    Some(Connector::NativeTls(tls)),
  )
  .await?;

  for event in SUBSCRIBED_EVENTS {
    socket
      .send(Message::Text(format!("[5,\"{}\"]", event).into()))
      .await?;
  }
  Ok(socket)
}

async fn pump(
  mut socket: LcuSocket,
  credentials: &mut watch::Receiver<Option<ClientCredentials>>,
  wake: &Notify,
  cancel: &CancellationToken,
) -> PumpExit {
  loop {
    tokio::select! {
      _ = cancel.cancelled() => return PumpExit::Stop,
      changed = credentials.changed() => {
        // The poller lost or replaced the client; follow it
        return if changed.is_err() { PumpExit::Stop } else { PumpExit::Reconnect };
      }
      msg = socket.next() => match msg {
        Some(Ok(Message::Text(text))) => {
          if let Some(event) = parse_lcu_ws_event(&text) {
            debug!("[LCU Watcher] Event {} {}", event.event_type, event.uri);
            wake.notify_one();
          }
        }
        Some(Ok(Message::Close(_))) | None => {
          info!("[LCU Watcher] Event stream closed");
          return PumpExit::Reconnect;
        }
        Some(Ok(_)) => {}
        Some(Err(e)) => {
          debug!("[LCU Watcher] Event stream error: {}", e);
          return PumpExit::Reconnect;
        }
      }
    }
  }
}
