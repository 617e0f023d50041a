// Phase watcher: poll the client, decode, suppress duplicates, emit

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::session::decode_snapshot;
use super::source::SnapshotSource;
use super::types::{WatcherOptions, WatcherStatus, SNAPSHOT_CHANNEL_CAPACITY};
use crate::commands::types::ClientSnapshot;

/// Starts polling loops. Each `start` is an independent run with its own channel and
/// cancellation token, so a stopped watcher can simply be started again.
#[derive(Debug, Clone, Default)]
pub struct PhaseWatcher {
  options: WatcherOptions,
  wake: Option<Arc<Notify>>,
}

/// A running watcher. Snapshots arrive only when something material changed.
pub struct WatcherHandle {
  pub snapshots: mpsc::Receiver<ClientSnapshot>,
  pub status: watch::Receiver<WatcherStatus>,
  cancel: CancellationToken,
  task: JoinHandle<()>,
}

impl WatcherHandle {
  /// Move the snapshot stream to its consumer. The handle keeps control of the poll
  /// task; later calls get an already-closed receiver.
  pub fn take_snapshots(&mut self) -> mpsc::Receiver<ClientSnapshot> {
    let (_, closed) = mpsc::channel(1);
    std::mem::replace(&mut self.snapshots, closed)
  }

  pub async fn stop(self) {
    self.cancel.cancel();
    if let Err(e) = self.task.await {
      warn!("[LCU Watcher] Poll task ended abnormally: {}", e);
    }
  }
}

impl PhaseWatcher {
  pub fn new(options: WatcherOptions) -> Self {
    Self {
      options,
      wake: None,
    }
  }

  /// Poll immediately whenever `wake` is notified, in addition to the fixed interval.
  pub fn with_wakeup(mut self, wake: Arc<Notify>) -> Self {
    self.wake = Some(wake);
    self
  }

  pub fn start<S>(&self, source: S) -> WatcherHandle
  where
    S: SnapshotSource + Send + 'static,
  {
    let (tx, snapshots) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
    let (status_tx, status) = watch::channel(WatcherStatus::Connecting);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_poll_loop(
      source,
      self.options.clone(),
      self.wake.clone(),
      tx,
      status_tx,
      cancel.clone(),
    ));

    WatcherHandle {
      snapshots,
      status,
      cancel,
      task,
    }
  }
}

async fn wait_for_wake(wake: &Option<Arc<Notify>>) {
  match wake {
    Some(notify) => notify.notified().await,
    None => std::future::pending().await,
  }
}

async fn run_poll_loop<S>(
  mut source: S,
  options: WatcherOptions,
  wake: Option<Arc<Notify>>,
  tx: mpsc::Sender<ClientSnapshot>,
  status: watch::Sender<WatcherStatus>,
  cancel: CancellationToken,
) where
  S: SnapshotSource + Send,
{
  let mut interval = tokio::time::interval(options.poll_interval);
  interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

  let mut last: Option<ClientSnapshot> = None;
  let mut failure_streak: u32 = 0;

  info!(
    "[LCU Watcher] Polling every {}ms",
    options.poll_interval.as_millis()
  );

  loop {
    tokio::select! {
      _ = cancel.cancelled() => break,
      _ = interval.tick() => {}
      _ = wait_for_wake(&wake) => debug!("[LCU Watcher] Woken by client event"),
    }

    let fetched = tokio::select! {
      _ = cancel.cancelled() => break,
      fetched = source.fetch() => fetched,
    };

    let next = match fetched {
      Ok(raw) => {
        if failure_streak > 0 {
          info!("[LCU Watcher] Client reachable again after {} failed polls", failure_streak);
        }
        failure_streak = 0;
        status.send_if_modified(|s| replace_status(s, WatcherStatus::Connected));

        match decode_snapshot(&raw) {
          Ok(snapshot) => snapshot,
          Err(e) => {
            warn!("[LCU Watcher] Dropping snapshot: {}", e);
            continue;
          }
        }
      }
      Err(e) => {
        failure_streak = failure_streak.saturating_add(1);
        if failure_streak == 1 {
          warn!("[LCU Watcher] Poll failed: {}", e);
        } else {
          debug!("[LCU Watcher] Poll failed ({} in a row): {}", failure_streak, e);
        }
        if failure_streak >= options.disconnect_streak
          && status.send_if_modified(|s| replace_status(s, WatcherStatus::Disconnected))
        {
          warn!("[LCU Watcher] League client disconnected. Waiting for it to come back...");
        }
        ClientSnapshot::disconnected()
      }
    };

    let changed = last
      .as_ref()
      .map_or(true, |prev| prev.materially_differs(&next));
    if !changed {
      continue;
    }

    debug!("[LCU Watcher] Phase {} ({} participants)", next.phase, next.participants().len());
    last = Some(next.clone());
    if tx.send(next).await.is_err() {
      info!("[LCU Watcher] Snapshot consumer gone, stopping");
      break;
    }
  }
}

fn replace_status(current: &mut WatcherStatus, next: WatcherStatus) -> bool {
  if *current == next {
    return false;
  }
  *current = next;
  true
}
