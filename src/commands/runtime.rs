// Glue between the watcher, the engine and the executor

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::automation::{AutomationEngine, Intent};
use crate::commands::config::ConfigStore;
use crate::commands::executor::IntentExecutor;
use crate::commands::types::ClientSnapshot;

const FAILURE_CHANNEL_CAPACITY: usize = 32;

/// An intent the executor could not carry out. Reported, never retried.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionFailure {
  pub intent: Intent,
  pub error: String,
}

impl ExecutionFailure {
  /// Short notice telling the user what to do by hand.
  pub fn user_message(&self) -> String {
    match &self.intent {
      Intent::Accept => format!(
        "Auto-accept failed ({}). Accept the match in the client yourself.",
        self.error
      ),
      Intent::OpenLookup {
        game_name,
        game_tag,
        ..
      } => format!(
        "Could not open the lookup for {}#{} ({}).",
        game_name, game_tag, self.error
      ),
    }
  }
}

/// Hand every failed intent to `report` until the runtime and its in-flight intents
/// are gone.
pub fn spawn_failure_reporter<F>(
  mut failures: broadcast::Receiver<ExecutionFailure>,
  report: F,
) -> JoinHandle<()>
where
  F: Fn(&ExecutionFailure) + Send + 'static,
{
  tokio::spawn(async move {
    loop {
      match failures.recv().await {
        Ok(failure) => report(&failure),
        Err(RecvError::Lagged(missed)) => {
          warn!("[Automation] {} failure reports were dropped", missed)
        }
        Err(RecvError::Closed) => break,
      }
    }
  })
}

/// Single consumer of the snapshot stream. Decisions run one at a time on this task;
/// intents are dispatched to their own tasks and never awaited.
pub struct AutomationRuntime<E: IntentExecutor> {
  engine: AutomationEngine,
  config: ConfigStore,
  executor: Arc<E>,
  failures: broadcast::Sender<ExecutionFailure>,
  tick: Duration,
}

impl<E: IntentExecutor> AutomationRuntime<E> {
  /// `tick` is how often the last snapshot is re-evaluated so a pending accept delay
  /// can run out while the client state stays unchanged.
  pub fn new(config: ConfigStore, executor: E, tick: Duration) -> Self {
    let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
    Self {
      engine: AutomationEngine::new(),
      config,
      executor: Arc::new(executor),
      failures,
      tick,
    }
  }

  pub fn subscribe_failures(&self) -> broadcast::Receiver<ExecutionFailure> {
    self.failures.subscribe()
  }

  pub fn engine(&self) -> &AutomationEngine {
    &self.engine
  }

  /// Evaluate one snapshot against the config as it is right now and dispatch the
  /// resulting intents. Returns what was dispatched.
  pub async fn decide(&mut self, snapshot: &ClientSnapshot, now: Instant) -> Vec<Intent> {
    let config = self.config.get_config().await;
    let intents = self.engine.on_snapshot(snapshot, &config, now.into_std());
    for intent in &intents {
      self.dispatch(intent.clone());
    }
    intents
  }

  fn dispatch(&self, intent: Intent) {
    let executor = self.executor.clone();
    let failures = self.failures.clone();
    tokio::spawn(async move {
      let label = intent.label();
      debug!("[Executor] Running {}", label);
      if let Err(e) = executor.execute(intent.clone()).await {
        error!("[Executor] {} failed: {}", label, e);
        let _ = failures.send(ExecutionFailure {
          intent,
          error: e.to_string(),
        });
      }
    });
  }

  pub async fn run(mut self, mut snapshots: mpsc::Receiver<ClientSnapshot>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(self.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<ClientSnapshot> = None;

    info!("[Automation] Runtime started");
    loop {
      tokio::select! {
        _ = cancel.cancelled() => break,
        received = snapshots.recv() => match received {
          Some(snapshot) => {
            self.decide(&snapshot, Instant::now()).await;
            last = Some(snapshot);
          }
          None => {
            info!("[Automation] Snapshot stream closed");
            break;
          }
        },
        _ = ticker.tick() => {
          if let Some(snapshot) = &last {
            self.decide(snapshot, Instant::now()).await;
          }
        }
      }
    }
    info!("[Automation] Runtime stopped");
  }
}
