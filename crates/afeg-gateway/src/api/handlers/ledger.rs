//! Ledger query, clear, and export handlers.

use crate::api::state::AppState;
use crate::error::ApiResult;
use afeg_ledger::export::ExportBundle;
use afeg_ledger::{LedgerEntry, RunningTotals};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Which session ledger a query addresses.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerView {
    #[default]
    Compliant,
    Risk,
}

/// Query parameters for `GET /ledger`.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQueryParams {
    #[serde(default)]
    pub view: LedgerView,

    /// Case-insensitive substring filter over serialized records.
    pub find: Option<String>,

    /// Display window: only the last `limit` matches are returned.
    pub limit: Option<usize>,
}

/// Ledger listing response.
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub view: LedgerView,
    pub totals: RunningTotals,
    pub matched: usize,
    pub entries: Vec<LedgerEntry>,
}

/// `GET /api/v1/ledger`
pub async fn query_ledger(
    State(state): State<AppState>,
    Query(params): Query<LedgerQueryParams>,
) -> ApiResult<Json<LedgerResponse>> {
    let session = state.session.lock().await;
    let ledger = match params.view {
        LedgerView::Compliant => session.compliant(),
        LedgerView::Risk => session.risk(),
    };

    let matches = ledger.search(params.find.as_deref().unwrap_or(""));
    let matched = matches.len();
    let start = params
        .limit
        .map(|limit| matched.saturating_sub(limit))
        .unwrap_or(0);
    let entries = matches[start..].iter().map(|e| (*e).clone()).collect();

    Ok(Json(LedgerResponse {
        view: params.view,
        totals: ledger.totals(),
        matched,
        entries,
    }))
}

/// Clear acknowledgement.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// `DELETE /api/v1/ledger` — the explicit whole-session reset.
pub async fn clear_ledgers(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut session = state.session.lock().await;
    session.clear();
    Json(ClearResponse { cleared: true })
}

/// `GET /api/v1/ledger/export` — full dump of both ledgers as tar.gz bytes.
pub async fn export_ledgers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let session = state.session.lock().await;
    let bytes = ExportBundle::new()
        .with_ledger("compliant", session.compliant())
        .with_ledger("risk", session.risk())
        .finish()?;

    tracing::info!(bytes = bytes.len(), "audit ledger exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/gzip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"AFEG_AUDIT_LEDGER.tar.gz\"",
            ),
        ],
        bytes,
    ))
}
