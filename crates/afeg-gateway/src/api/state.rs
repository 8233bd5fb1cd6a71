//! Application state shared by API handlers.

use crate::config::GatewayConfig;
use crate::session::AuditorSession;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state.
///
/// The session sits behind an async mutex: gateway submissions and surge runs
/// mutate it, and a surge run may hold the lock across its pacing awaits, so
/// ledger appends are strictly serialized.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<AuditorSession>>,
    pub config: Arc<GatewayConfig>,
    pub version: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(AuditorSession::new())),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Uptime in whole seconds. Callers wanting a wall-clock reference use
    /// `started_at` directly.
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
