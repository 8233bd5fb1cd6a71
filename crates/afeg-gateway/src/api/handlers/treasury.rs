//! The digest-gated treasury view.

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use afeg_types::{round_dp, VAT_RATE};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

/// Header carrying the treasury access key.
pub const ACCESS_KEY_HEADER: &str = "x-afeg-access-key";

/// Annualized projection from the session revenue at national scale
/// (365 days, 1000x deployment multiplier).
#[derive(Debug, Serialize)]
pub struct AnnualForecast {
    pub value: f64,
    pub vat: f64,
}

/// Treasury response: validated (compliant) revenue only.
#[derive(Debug, Serialize)]
pub struct TreasuryResponse {
    pub gross_revenue: f64,
    pub vat_capture: f64,
    pub validated_kvus: f64,
    pub records: usize,
    pub annual_forecast: AnnualForecast,
}

/// `GET /api/v1/treasury`
pub async fn treasury_view(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<TreasuryResponse>> {
    let presented = headers
        .get(ACCESS_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::AccessDenied)?;

    if !state.config.treasury.key_matches(presented) {
        tracing::warn!("treasury access denied");
        return Err(ApiError::AccessDenied);
    }

    let session = state.session.lock().await;
    let totals = session.compliant().totals();

    let annual_value = totals.total_value * 365.0 * 1000.0;
    Ok(Json(TreasuryResponse {
        gross_revenue: round_dp(totals.total_value, 4),
        vat_capture: round_dp(totals.total_tax, 4),
        validated_kvus: round_dp(totals.total_units, 2),
        records: totals.records,
        annual_forecast: AnnualForecast {
            value: round_dp(annual_value, 2),
            vat: round_dp(annual_value * VAT_RATE, 2),
        },
    }))
}
