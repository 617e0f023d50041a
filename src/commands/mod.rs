// Commands module - host-side services around the automation engine
pub mod config;
pub mod executor;
pub mod lcu_watcher;
pub mod league_detection;
pub mod logging;
pub mod runtime;
pub mod types;

// Re-export the pieces a host wires together
pub use config::{default_config_dir, ConfigStore, MAX_ACCEPT_DELAY_MS};
pub use executor::{team_lookup_url, ClientIntentExecutor, IntentExecutor};
pub use lcu_watcher::{LcuSnapshotSource, PhaseWatcher, SnapshotSource, WatcherHandle, WatcherOptions, WatcherStatus};
pub use league_detection::{discover_credentials, ClientCredentials, LcuEndpoint};
pub use logging::{default_logs_dir, export_logs, init_logging, LoggingGuard};
pub use runtime::{spawn_failure_reporter, AutomationRuntime, ExecutionFailure};
pub use types::{ClientPhase, ClientSnapshot, Config, ProviderSetting};
