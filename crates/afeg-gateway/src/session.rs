//! The auditor session: the explicit context object owning all mutable state.
//!
//! One session per daemon instance. Every handler borrows the session through
//! the shared state lock; nothing here is reachable as a global.

use afeg_governance::{GateDecision, GovernanceGate};
use afeg_ledger::{LedgerEntry, LedgerError, RunningTotals, SessionLedger};
use afeg_types::RecordStatus;
use afeg_valuation::{Pacer, SurgePlan, SurgeReport, ValuationEngine, ValuationMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session-level errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Empty input is filtered before the formula runs, matching the caller
    /// contract of the valuation function.
    #[error("query must not be empty")]
    EmptyQuery,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Outcome of one gateway submission.
#[derive(Clone, Debug)]
pub struct Submission {
    pub entry: LedgerEntry,
    pub decision: GateDecision,
}

/// Session-wide rollup for the status and treasury views.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub started_at: DateTime<Utc>,
    pub compliant: RunningTotals,
    pub risk: RunningTotals,
}

/// The session context: engine, gate, and the two ledgers.
pub struct AuditorSession {
    engine: ValuationEngine,
    gate: GovernanceGate,
    compliant: SessionLedger,
    risk: SessionLedger,
    started_at: DateTime<Utc>,
}

impl Default for AuditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditorSession {
    pub fn new() -> Self {
        Self {
            engine: ValuationEngine::new(),
            gate: GovernanceGate::new(),
            compliant: SessionLedger::new(),
            risk: SessionLedger::new(),
            started_at: Utc::now(),
        }
    }

    pub fn compliant(&self) -> &SessionLedger {
        &self.compliant
    }

    pub fn risk(&self) -> &SessionLedger {
        &self.risk
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Value a query, classify it, and append it to the matching ledger.
    ///
    /// Blocked and intercepted records land in the risk ledger; only blocked
    /// records lose their monetary value.
    pub fn submit(
        &mut self,
        query: &str,
        mode: ValuationMode,
        scale_factor: f64,
    ) -> Result<Submission, SessionError> {
        if query.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let record = self.engine.value_of(query, mode, scale_factor);

        // No model sits behind the simulator, so the output-risk pass scans
        // a synthesized completion instead.
        let response = format!("AFEG simulated response: {query}");
        let decision = self.gate.classify(query, &response);
        let record = record.with_status(decision.status);

        tracing::info!(
            status = ?decision.status,
            matched = decision.matched_keyword.as_deref().unwrap_or("-"),
            kvu = record.billable_units(),
            "gateway submission"
        );

        let entry = match decision.status {
            RecordStatus::Compliant => self.compliant.append(record)?,
            RecordStatus::Intercepted | RecordStatus::Blocked => self.risk.append(record)?,
        };

        Ok(Submission { entry, decision })
    }

    /// Run a surge plan inline, appending every synthesized record to the
    /// compliant ledger.
    pub async fn surge(
        &mut self,
        plan: &SurgePlan,
        pacer: &dyn Pacer,
    ) -> Result<SurgeReport, SessionError> {
        let mut append_error = None;
        let report = plan
            .run(&self.engine, pacer, |record| {
                if append_error.is_none() {
                    if let Err(err) = self.compliant.append(record) {
                        append_error = Some(err);
                    }
                }
            })
            .await;

        match append_error {
            Some(err) => Err(SessionError::Ledger(err)),
            None => Ok(report),
        }
    }

    /// The explicit reset action: clears both ledgers.
    pub fn clear(&mut self) {
        self.compliant.clear();
        self.risk.clear();
        tracing::info!("session ledgers cleared");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            started_at: self.started_at,
            compliant: self.compliant.totals(),
            risk: self.risk.totals(),
        }
    }
}
