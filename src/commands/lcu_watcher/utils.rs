// HTTP helpers for talking to the local client APIs

use std::sync::OnceLock;
use std::time::Duration;

use crate::automation::TransportError;
use crate::commands::league_detection::LcuEndpoint;

/// Shared client for the local APIs. They use a self-signed certificate.
pub fn get_lcu_client() -> reqwest::Client {
  static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

  CLIENT
    .get_or_init(|| {
      reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(2))
        .pool_max_idle_per_host(2)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
    })
    .clone()
}

/// GET a JSON resource. A 404 means "not available right now" and maps to `None`.
pub async fn get_json(
  client: &reqwest::Client,
  endpoint: &LcuEndpoint,
  path: &str,
) -> Result<Option<serde_json::Value>, TransportError> {
  let url = format!("{}{}", endpoint.base_url(), path);
  let resp = client
    .get(&url)
    .header("Authorization", endpoint.auth_header())
    .send()
    .await
    .map_err(|source| TransportError::Request {
      endpoint: path.to_string(),
      source,
    })?;

  let status = resp.status();
  if status == reqwest::StatusCode::NOT_FOUND {
    return Ok(None);
  }
  if !status.is_success() {
    return Err(TransportError::Status {
      endpoint: path.to_string(),
      status: status.as_u16(),
    });
  }

  resp
    .json::<serde_json::Value>()
    .await
    .map(Some)
    .map_err(|source| TransportError::Request {
      endpoint: path.to_string(),
      source,
    })
}

pub async fn post_empty(
  client: &reqwest::Client,
  endpoint: &LcuEndpoint,
  path: &str,
) -> Result<(), TransportError> {
  let url = format!("{}{}", endpoint.base_url(), path);
  let resp = client
    .post(&url)
    .header("Authorization", endpoint.auth_header())
    .json(&serde_json::json!({}))
    .send()
    .await
    .map_err(|source| TransportError::Request {
      endpoint: path.to_string(),
      source,
    })?;

  if !resp.status().is_success() {
    return Err(TransportError::Status {
      endpoint: path.to_string(),
      status: resp.status().as_u16(),
    });
  }
  Ok(())
}
