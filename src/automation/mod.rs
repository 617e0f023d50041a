// Matchmaking automation core: session state machine, intents and lookup URLs
mod engine;
mod error;
mod intent;
mod lookup;
mod session;

#[cfg(test)]
mod tests;

pub use engine::AutomationEngine;
pub use error::{ConfigError, DecodeError, DiscoveryError, IntentExecutionError, TransportError};
pub use intent::Intent;
pub use lookup::{web_region, LookupProvider};
pub use session::SessionState;
