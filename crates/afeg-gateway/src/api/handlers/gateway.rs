//! The valuation gateway endpoint.

use crate::api::state::AppState;
use crate::error::ApiResult;
use afeg_types::{Heat, RecordStatus};
use afeg_valuation::ValuationMode;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Gateway submission body.
#[derive(Debug, Deserialize)]
pub struct GatewayRequest {
    pub query: String,

    /// Valuation formula; defaults to the canonical intent split.
    #[serde(default)]
    pub mode: Option<ValuationMode>,

    /// Batch-scale multiplier applied to the formula base.
    #[serde(default)]
    pub scale_factor: Option<f64>,
}

/// Per-category figures echoed to the caller.
#[derive(Debug, Serialize)]
pub struct GatewayMetrics {
    pub inf: f64,
    pub res: f64,
    pub mem: f64,
}

/// Gateway response.
#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    pub status: &'static str,
    /// Billable KVU total; zero for blocked queries.
    pub kvu: f64,
    pub metrics: GatewayMetrics,
    pub complexity: String,
    pub heat: Heat,
    /// First 12 hex chars of the record's integrity stamp.
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

/// `POST /api/v1/gateway`
pub async fn submit_query(
    State(state): State<AppState>,
    Json(request): Json<GatewayRequest>,
) -> ApiResult<Json<GatewayResponse>> {
    let mode = request.mode.unwrap_or_default();
    let scale_factor = request.scale_factor.unwrap_or(1.0);

    let mut session = state.session.lock().await;
    let submission = session.submit(&request.query, mode, scale_factor)?;
    drop(session);

    let record = &submission.entry.record;
    let status = match record.status {
        RecordStatus::Compliant => "approved",
        RecordStatus::Intercepted => "intercepted",
        RecordStatus::Blocked => "blocked",
    };

    Ok(Json(GatewayResponse {
        status,
        kvu: record.billable_units(),
        metrics: GatewayMetrics {
            inf: record.categories.inference,
            res: record.categories.reasoning,
            mem: record.categories.memory,
        },
        complexity: record.complexity.to_string(),
        heat: record.heat,
        hash: record.short_hash().to_string(),
        matched_keyword: submission.decision.matched_keyword,
    }))
}
