//! Health and status handlers.

use crate::api::state::AppState;
use afeg_ledger::RunningTotals;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Gateway status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub compliant: LedgerStats,
    pub risk: LedgerStats,
}

/// Per-ledger statistics.
#[derive(Debug, Serialize)]
pub struct LedgerStats {
    pub entries: usize,
    pub totals: RunningTotals,
}

/// Gateway status endpoint.
pub async fn gateway_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let session = state.session.lock().await;

    Json(StatusResponse {
        status: "operational".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        started_at: state.started_at,
        compliant: LedgerStats {
            entries: session.compliant().len(),
            totals: session.compliant().totals(),
        },
        risk: LedgerStats {
            entries: session.risk().len(),
            totals: session.risk().totals(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use afeg_valuation::ValuationMode;

    #[tokio::test]
    async fn health_reports_version() {
        let state = AppState::new(GatewayConfig::default());
        let response = health_check(State(state)).await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
        assert!(response.uptime_secs >= 0);
    }

    #[tokio::test]
    async fn status_reports_ledger_sizes() {
        let state = AppState::new(GatewayConfig::default());
        {
            let mut session = state.session.lock().await;
            session
                .submit("Node_Sync_500", ValuationMode::Intent, 1.0)
                .expect("submit");
        }

        let response = gateway_status(State(state)).await;
        assert_eq!(response.compliant.entries, 1);
        assert_eq!(response.risk.entries, 0);
        assert_eq!(response.compliant.totals.total_value, 0.689);
    }
}
