//! Surge synthesis handler.

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use afeg_ledger::RunningTotals;
use afeg_valuation::{NoopPacer, Pacer, SurgePlan, SurgeReport, TokioPacer, ValuationMode};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Surge request body; omitted fields fall back to configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SurgeRequest {
    pub iterations: Option<u32>,
    pub scale_factor: Option<f64>,
    pub mode: Option<ValuationMode>,
}

/// Surge response: the run report plus the post-run compliant rollup.
#[derive(Debug, Serialize)]
pub struct SurgeResponse {
    pub report: SurgeReport,
    pub compliant_totals: RunningTotals,
}

/// `POST /api/v1/surge`
///
/// Runs inline while holding the session lock, so interactive submissions
/// queue behind the run instead of interleaving with it.
pub async fn run_surge(
    State(state): State<AppState>,
    Json(request): Json<SurgeRequest>,
) -> ApiResult<Json<SurgeResponse>> {
    let defaults = &state.config.surge;
    let plan = SurgePlan {
        iterations: request.iterations.unwrap_or(defaults.iterations),
        scale_factor: request.scale_factor.unwrap_or(defaults.scale_factor),
        mode: request.mode.unwrap_or_default(),
    };

    if plan.iterations > defaults.max_iterations {
        return Err(ApiError::Validation(format!(
            "iterations {} exceeds the configured cap of {}",
            plan.iterations, defaults.max_iterations
        )));
    }
    if !plan.scale_factor.is_finite() || plan.scale_factor < 0.0 {
        return Err(ApiError::Validation(
            "scale_factor must be a non-negative number".to_string(),
        ));
    }

    let pacer: Box<dyn Pacer> = if defaults.pace_ms == 0 {
        Box::new(NoopPacer)
    } else {
        Box::new(TokioPacer::new(Duration::from_millis(defaults.pace_ms)))
    };

    tracing::info!(
        iterations = plan.iterations,
        scale_factor = plan.scale_factor,
        "surge run starting"
    );

    let mut session = state.session.lock().await;
    let report = session.surge(&plan, pacer.as_ref()).await?;
    let compliant_totals = session.compliant().totals();

    Ok(Json(SurgeResponse {
        report,
        compliant_totals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    #[tokio::test]
    async fn surge_uses_configured_defaults() {
        let mut config = GatewayConfig::default();
        config.surge.iterations = 5;
        config.surge.scale_factor = 10.0;
        let state = AppState::new(config);

        let response = run_surge(State(state.clone()), Json(SurgeRequest::default()))
            .await
            .expect("surge");

        assert_eq!(response.report.iterations, 5);
        assert_eq!(response.compliant_totals.records, 5);
    }

    #[tokio::test]
    async fn request_overrides_win() {
        let state = AppState::new(GatewayConfig::default());
        let response = run_surge(
            State(state),
            Json(SurgeRequest {
                iterations: Some(3),
                scale_factor: Some(1.0),
                mode: Some(ValuationMode::Stochastic { seed: 9 }),
            }),
        )
        .await
        .expect("surge");

        assert_eq!(response.report.iterations, 3);
    }

    #[tokio::test]
    async fn iteration_cap_is_enforced() {
        let mut config = GatewayConfig::default();
        config.surge.max_iterations = 10;
        let state = AppState::new(config);

        let result = run_surge(
            State(state),
            Json(SurgeRequest {
                iterations: Some(11),
                scale_factor: None,
                mode: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn bad_scale_factor_is_rejected() {
        let state = AppState::new(GatewayConfig::default());
        let result = run_surge(
            State(state),
            Json(SurgeRequest {
                iterations: Some(1),
                scale_factor: Some(f64::NAN),
                mode: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
