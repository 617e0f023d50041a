#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use base64::{engine::general_purpose, Engine};
use tracing::debug;

use crate::automation::DiscoveryError;

// League client discovery: install directory, lockfile and process arguments

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

const LOCKFILE_NAMES: [&str; 3] = ["lockfile", "LeagueClientUx.lockfile", "LeagueClient.lockfile"];

/// One local HTTPS API (the LCU itself, or the Riot client) with its Basic auth token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcuEndpoint {
  pub port: u16,
  pub token: String,
}

impl LcuEndpoint {
  pub fn base_url(&self) -> String {
    format!("https://127.0.0.1:{}", self.port)
  }

  pub fn ws_url(&self) -> String {
    format!("wss://127.0.0.1:{}/", self.port)
  }

  pub fn auth_header(&self) -> String {
    let auth = general_purpose::STANDARD.encode(format!("riot:{}", self.token));
    format!("Basic {}", auth)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
  pub lcu: LcuEndpoint,
  /// Needed for the chat participant list. Only the process arguments carry it.
  pub riot_client: Option<LcuEndpoint>,
}

/// Lockfile format: `name:pid:port:password:protocol`
pub fn parse_lockfile(content: &str) -> Option<LcuEndpoint> {
  let parts: Vec<&str> = content.trim().split(':').collect();
  if parts.len() < 5 {
    return None;
  }
  let port = parts[2].parse().ok()?;
  Some(LcuEndpoint {
    port,
    token: parts[3].to_string(),
  })
}

pub fn read_lockfile(league_path: &Path) -> Result<(LcuEndpoint, PathBuf), DiscoveryError> {
  for name in LOCKFILE_NAMES {
    let path = league_path.join(name);
    if let Ok(content) = fs::read_to_string(&path) {
      return match parse_lockfile(&content) {
        Some(endpoint) => Ok((endpoint, path)),
        None => Err(DiscoveryError::MalformedLockfile(path.display().to_string())),
      };
    }
  }
  Err(DiscoveryError::LockfileNotFound(
    league_path.display().to_string(),
  ))
}

fn arg_value<'a>(cmdline: &'a str, key: &str) -> Option<&'a str> {
  let needle = format!("--{}=", key);
  let start = cmdline.find(&needle)? + needle.len();
  let rest = &cmdline[start..];
  let end = rest
    .find(|c: char| c == '"' || c.is_whitespace())
    .unwrap_or(rest.len());
  let value = &rest[..end];
  (!value.is_empty()).then_some(value)
}

fn endpoint_from_args(cmdline: &str, port_key: &str, token_key: &str) -> Option<LcuEndpoint> {
  Some(LcuEndpoint {
    port: arg_value(cmdline, port_key)?.parse().ok()?,
    token: arg_value(cmdline, token_key)?.to_string(),
  })
}

/// Credentials from the LeagueClientUx command line.
pub fn parse_process_args(cmdline: &str) -> Option<ClientCredentials> {
  let lcu = endpoint_from_args(cmdline, "app-port", "remoting-auth-token")?;
  let riot_client = endpoint_from_args(cmdline, "riotclient-app-port", "riotclient-auth-token");
  Some(ClientCredentials { lcu, riot_client })
}

/// Raw command line of the running LeagueClientUx process.
pub fn find_client_process_args() -> Result<String, DiscoveryError> {
  #[cfg(target_os = "windows")]
  let output = {
    let mut command = Command::new("wmic");
    command
      .args([
        "process",
        "where",
        "name='LeagueClientUx.exe'",
        "get",
        "CommandLine",
      ])
      .creation_flags(CREATE_NO_WINDOW);
    command.output()?
  };

  #[cfg(not(target_os = "windows"))]
  let output = Command::new("ps").args(["-A", "-o", "args"]).output()?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  stdout
    .lines()
    .map(str::trim)
    .find(|line| line.contains("LeagueClientUx") && line.contains("--app-port="))
    .map(str::to_string)
    .ok_or(DiscoveryError::ProcessNotFound)
}

/// First existing install directory out of the usual locations
pub fn auto_detect_league() -> Option<PathBuf> {
  let common_paths = [
    r"C:\Riot Games\League of Legends",
    r"C:\Program Files\Riot Games\League of Legends",
    r"C:\Program Files (x86)\Riot Games\League of Legends",
    "/Applications/League of Legends.app/Contents/LoL",
  ];

  common_paths
    .iter()
    .map(PathBuf::from)
    .find(|path| path.exists())
}

/// Prefer the process arguments (they carry the Riot client credentials too), then fall
/// back to the lockfile in `league_path` or a detected install directory.
pub fn discover_credentials(league_path: Option<&Path>) -> Result<ClientCredentials, DiscoveryError> {
  match find_client_process_args() {
    Ok(cmdline) => {
      if let Some(creds) = parse_process_args(&cmdline) {
        return Ok(creds);
      }
      debug!("[LCU Watcher] Client process found but arguments were incomplete");
    }
    Err(e) => debug!("[LCU Watcher] Process lookup failed: {}", e),
  }

  let dir = league_path
    .map(Path::to_path_buf)
    .or_else(auto_detect_league)
    .ok_or(DiscoveryError::ProcessNotFound)?;
  let (lcu, _) = read_lockfile(&dir)?;
  Ok(ClientCredentials {
    lcu,
    riot_client: None,
  })
}
