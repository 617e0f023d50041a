use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use reveal_lib::automation::LookupProvider;
use reveal_lib::commands::config::{default_config_dir, ConfigStore};
use reveal_lib::commands::executor::{team_lookup_url, ClientIntentExecutor};
use reveal_lib::commands::lcu_watcher::{
  decode_snapshot, spawn_event_stream, LcuSnapshotSource, PhaseWatcher, SnapshotSource,
  WatcherOptions, DEFAULT_POLL_INTERVAL,
};
use reveal_lib::commands::league_detection::auto_detect_league;
use reveal_lib::commands::logging::{default_logs_dir, export_logs, init_logging};
use reveal_lib::commands::runtime::{spawn_failure_reporter, AutomationRuntime};
use reveal_lib::commands::types::{ClientPhase, ProviderSetting};

/// Auto-accept ready checks and open lookups for your champ select lobby
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
  /// directory holding config.json (defaults to the platform config dir)
  #[clap(long, global = true)]
  config_dir: Option<PathBuf>,

  #[clap(subcommand)]
  command: Option<Command>,

  #[clap(flatten)]
  run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// watch the client and automate (default)
  Run(RunArgs),
  /// inspect or change the configuration
  #[clap(subcommand)]
  Config(ConfigCommand),
  /// open one lookup page for your whole champ select team
  Lookup {
    /// League install directory, used for the lockfile fallback
    #[clap(long)]
    league_path: Option<PathBuf>,
    /// override the configured provider for this lookup
    #[clap(long, value_parser = parse_provider)]
    provider: Option<LookupProvider>,
  },
  /// log utilities
  #[clap(subcommand)]
  Logs(LogsCommand),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
  /// League install directory, used for the lockfile fallback
  #[clap(long)]
  league_path: Option<PathBuf>,

  /// milliseconds between client polls
  #[clap(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
  poll_interval_ms: u64,

  /// poll only; do not subscribe to client push events
  #[clap(long)]
  no_event_stream: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
  /// print the current configuration
  Show,
  /// change one or more settings; the rest keep their current values
  Set {
    #[clap(long)]
    auto_open: Option<bool>,
    #[clap(long)]
    auto_accept: Option<bool>,
    /// milliseconds to wait before accepting
    #[clap(long)]
    accept_delay: Option<u32>,
    /// one of: opgg, deeplol, ugg, tracker
    #[clap(long, value_parser = parse_provider)]
    provider: Option<LookupProvider>,
  },
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
  /// write collected logs to a timestamped file
  Export {
    /// output directory (defaults to the current directory)
    #[clap(long)]
    out: Option<PathBuf>,
  },
}

fn parse_provider(value: &str) -> Result<LookupProvider, String> {
  LookupProvider::from_id(value).ok_or_else(|| {
    let known: Vec<&str> = LookupProvider::ALL.iter().map(|p| p.id()).collect();
    format!("unknown provider '{}' (expected one of {})", value, known.join(", "))
  })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let config_dir = match cli.config_dir {
    Some(dir) => dir,
    None => default_config_dir().context("Could not determine the config directory")?,
  };
  let logs_dir = default_logs_dir();

  match cli.command {
    None => {
      let _guard = init_logging(Some(&logs_dir));
      run(cli.run, config_dir).await
    }
    Some(Command::Run(args)) => {
      let _guard = init_logging(Some(&logs_dir));
      run(args, config_dir).await
    }
    Some(Command::Config(cmd)) => {
      let _guard = init_logging(None);
      config_command(cmd, config_dir).await
    }
    Some(Command::Lookup {
      league_path,
      provider,
    }) => {
      let _guard = init_logging(None);
      team_lookup(league_path, provider, config_dir).await
    }
    Some(Command::Logs(LogsCommand::Export { out })) => {
      let out_dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir().context("Could not read the current directory")?,
      };
      let path = export_logs(&logs_dir, &out_dir).context("Failed to export logs")?;
      println!("{}", path.display());
      Ok(())
    }
  }
}

async fn run(args: RunArgs, config_dir: PathBuf) -> anyhow::Result<()> {
  if args.poll_interval_ms == 0 {
    bail!("--poll-interval-ms must be greater than zero");
  }
  let poll_interval = Duration::from_millis(args.poll_interval_ms);

  let store = ConfigStore::load(&config_dir)
    .await
    .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
  info!("[Config] Using {}", store.path().display());

  let league_path = args.league_path.or_else(auto_detect_league);
  match &league_path {
    Some(path) => info!("[LCU Watcher] League path: {}", path.display()),
    None => warn!("[LCU Watcher] League path unknown; relying on the client process only"),
  }

  let source = LcuSnapshotSource::new(league_path);
  let credentials = source.credentials();
  let cancel = CancellationToken::new();

  let mut watcher = PhaseWatcher::new(WatcherOptions {
    poll_interval,
    ..Default::default()
  });
  let events = if args.no_event_stream {
    None
  } else {
    let wake = Arc::new(Notify::new());
    watcher = watcher.with_wakeup(wake.clone());
    Some(spawn_event_stream(credentials.clone(), wake, cancel.clone()))
  };

  let mut handle = watcher.start(source);
  let runtime = AutomationRuntime::new(store, ClientIntentExecutor::new(credentials), poll_interval);
  let reporter = spawn_failure_reporter(runtime.subscribe_failures(), |failure| {
    warn!("{}", failure.user_message());
  });
  let runtime_task = tokio::spawn(runtime.run(handle.take_snapshots(), cancel.clone()));

  info!("Reveal is running. Press Ctrl+C to stop.");
  tokio::signal::ctrl_c()
    .await
    .context("Failed to listen for Ctrl+C")?;

  info!("Shutting down");
  cancel.cancel();
  handle.stop().await;
  if let Err(e) = runtime_task.await {
    warn!("[Automation] Runtime task ended abnormally: {}", e);
  }
  if let Some(events) = events {
    let _ = events.await;
  }
  reporter.abort();
  Ok(())
}

async fn team_lookup(
  league_path: Option<PathBuf>,
  provider: Option<LookupProvider>,
  config_dir: PathBuf,
) -> anyhow::Result<()> {
  let provider = match provider {
    Some(provider) => provider,
    None => {
      let store = ConfigStore::load(&config_dir)
        .await
        .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;
      store.get_config().await.provider.resolve()
    }
  };

  let mut source = LcuSnapshotSource::new(league_path.or_else(auto_detect_league));
  let raw = source
    .fetch()
    .await
    .context("Could not reach the League client")?;
  let snapshot = decode_snapshot(&raw).context("Unexpected reply from the League client")?;
  if snapshot.phase != ClientPhase::ChampSelect {
    bail!("Not in champ select (client phase: {})", snapshot.phase);
  }

  let Some(url) = team_lookup_url(&snapshot, provider) else {
    bail!("No champ select participants available yet");
  };
  println!("{}", url);
  webbrowser::open(&url).with_context(|| format!("Failed to open {}", url))?;
  Ok(())
}

async fn config_command(cmd: ConfigCommand, config_dir: PathBuf) -> anyhow::Result<()> {
  let store = ConfigStore::load(&config_dir)
    .await
    .with_context(|| format!("Failed to load config from {}", config_dir.display()))?;

  match cmd {
    ConfigCommand::Show => {
      let config = store.get_config().await;
      println!("{}", serde_json::to_string_pretty(&config)?);
      if config.provider.is_unset() {
        println!("(no provider set; using {})", config.provider.resolve());
      }
    }
    ConfigCommand::Set {
      auto_open,
      auto_accept,
      accept_delay,
      provider,
    } => {
      let mut next = store.get_config().await;
      if let Some(value) = auto_open {
        next.auto_open = value;
      }
      if let Some(value) = auto_accept {
        next.auto_accept = value;
      }
      if let Some(value) = accept_delay {
        next.accept_delay = value;
      }
      if let Some(value) = provider {
        next.provider = ProviderSetting::Provider(value);
      }
      store
        .set_config(next)
        .await
        .context("Config was not changed")?;
      println!("Saved {}", store.path().display());
    }
  }
  Ok(())
}
