// Logging setup: stderr, a daily live log on disk, and a bounded in-memory buffer

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LIVE_LOG_PREFIX: &str = "reveal-live.log";
const LOG_BUFFER_LINES: usize = 2000;

// Global in-memory log buffer
pub static LOG_BUFFER: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Keeps the file writer flushing; drop it only at shutdown.
pub struct LoggingGuard {
  _file: Option<WorkerGuard>,
}

pub fn default_logs_dir() -> PathBuf {
  ProjectDirs::from("gg", "reveal", "Reveal")
    .map(|dirs| dirs.data_dir().join("logs"))
    .unwrap_or_else(|| PathBuf::from(".").join("logs"))
}

pub fn append_global_log(line: String) {
  if let Ok(mut buf) = LOG_BUFFER.lock() {
    buf.push(line);
    if buf.len() > LOG_BUFFER_LINES {
      let excess = buf.len() - LOG_BUFFER_LINES;
      buf.drain(0..excess);
    }
  }
}

#[derive(Default)]
struct MessageVisitor {
  message: String,
  fields: String,
}

impl Visit for MessageVisitor {
  fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
    if field.name() == "message" {
      let _ = write!(self.message, "{:?}", value);
    } else {
      let _ = write!(self.fields, " {}={:?}", field.name(), value);
    }
  }

  fn record_str(&mut self, field: &Field, value: &str) {
    if field.name() == "message" {
      self.message.push_str(value);
    } else {
      let _ = write!(self.fields, " {}={}", field.name(), value);
    }
  }
}

/// Mirrors every event into `LOG_BUFFER`.
struct BufferLayer;

impl<S: Subscriber> Layer<S> for BufferLayer {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);
    append_global_log(format!(
      "{} {:>5} {}{}",
      Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
      event.metadata().level(),
      visitor.message,
      visitor.fields
    ));
  }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
/// When the logs directory cannot be created, logging continues without the file.
pub fn init_logging(logs_dir: Option<&Path>) -> LoggingGuard {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let stderr = tracing_subscriber::fmt::layer()
    .with_writer(io::stderr)
    .with_target(false);

  let (file_layer, guard) = match logs_dir.map(|dir| (dir, fs::create_dir_all(dir))) {
    Some((dir, Ok(()))) => {
      let appender = tracing_appender::rolling::daily(dir, LIVE_LOG_PREFIX);
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);
      (Some(layer), Some(guard))
    }
    Some((dir, Err(e))) => {
      eprintln!("Failed to create logs dir {}: {}", dir.display(), e);
      (None, None)
    }
    None => (None, None),
  };

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(stderr)
    .with(file_layer)
    .with(BufferLayer)
    .try_init();

  LoggingGuard { _file: guard }
}

/// Write the collected logs to a timestamped file in `out_dir`. Prefers the on-disk live
/// logs (they cover earlier runs too) and falls back to the in-memory buffer.
pub fn export_logs(logs_dir: &Path, out_dir: &Path) -> io::Result<PathBuf> {
  let mut contents = read_live_logs(logs_dir).unwrap_or_default();
  if contents.is_empty() {
    let buf = LOG_BUFFER
      .lock()
      .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Lock error: {}", e)))?;
    contents = buf.join("\n");
  }
  if contents.is_empty() {
    return Err(io::Error::new(io::ErrorKind::NotFound, "No logs available"));
  }

  fs::create_dir_all(out_dir)?;
  let filename = format!("reveal-logs-{}.txt", Utc::now().format("%Y%m%d-%H%M%S"));
  let out_path = out_dir.join(filename);
  fs::write(&out_path, contents)?;
  Ok(out_path)
}

fn read_live_logs(logs_dir: &Path) -> io::Result<String> {
  let mut files: Vec<PathBuf> = fs::read_dir(logs_dir)?
    .filter_map(|entry| entry.ok().map(|e| e.path()))
    .filter(|path| {
      path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(LIVE_LOG_PREFIX))
    })
    .collect();
  // Daily suffixes are ISO dates, so name order is chronological
  files.sort();

  let mut contents = String::new();
  for file in files {
    contents.push_str(&fs::read_to_string(&file)?);
  }
  Ok(contents)
}
