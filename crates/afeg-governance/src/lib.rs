//! Keyword governance gate.
//!
//! Two independent case-insensitive substring passes: one over the incoming
//! query (input risk) and one over the simulated response text (output risk).
//! An input hit blocks the record outright; an output hit intercepts it. This
//! is deliberately a toy filter with a fixed keyword list, not a policy or
//! classification engine.

#![deny(unsafe_code)]

use afeg_types::RecordStatus;
use serde::{Deserialize, Serialize};

/// Input-risk keywords. A match anywhere in the query blocks it.
pub const INPUT_RISK_KEYWORDS: [&str; 5] = ["hack", "bypass", "exploit", "illegal", "steal"];

/// Output-risk keywords checked against the simulated response.
pub const OUTPUT_RISK_KEYWORDS: [&str; 3] = ["leak", "weapon", "untraceable"];

/// A named set of risk keywords.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeywordSet {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn input_risk() -> Self {
        Self::new("input_risk", &INPUT_RISK_KEYWORDS)
    }

    pub fn output_risk() -> Self {
        Self::new("output_risk", &OUTPUT_RISK_KEYWORDS)
    }

    /// Case-insensitive substring scan. Returns the first matched keyword.
    pub fn scan(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(|keyword| keyword.as_str())
    }
}

/// Outcome of a gate pass over one query/response pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateDecision {
    pub status: RecordStatus,
    /// The keyword that triggered the decision, when one did.
    pub matched_keyword: Option<String>,
    /// Which pass produced the match.
    pub matched_set: Option<String>,
}

impl GateDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self.status, RecordStatus::Blocked)
    }
}

/// The governance gate: both keyword passes plus routing semantics.
#[derive(Clone, Debug)]
pub struct GovernanceGate {
    input_risk: KeywordSet,
    output_risk: KeywordSet,
}

impl Default for GovernanceGate {
    fn default() -> Self {
        Self {
            input_risk: KeywordSet::input_risk(),
            output_risk: KeywordSet::output_risk(),
        }
    }
}

impl GovernanceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate with custom keyword sets, used by tests and future policy packs.
    pub fn with_sets(input_risk: KeywordSet, output_risk: KeywordSet) -> Self {
        Self {
            input_risk,
            output_risk,
        }
    }

    /// Classify a query and its (simulated) response.
    ///
    /// Input risk wins over output risk: a blocked query never reaches the
    /// response pass.
    pub fn classify(&self, query: &str, response: &str) -> GateDecision {
        if let Some(keyword) = self.input_risk.scan(query) {
            return GateDecision {
                status: RecordStatus::Blocked,
                matched_keyword: Some(keyword.to_string()),
                matched_set: Some(self.input_risk.name.clone()),
            };
        }

        if let Some(keyword) = self.output_risk.scan(response) {
            return GateDecision {
                status: RecordStatus::Intercepted,
                matched_keyword: Some(keyword.to_string()),
                matched_set: Some(self.output_risk.name.clone()),
            };
        }

        GateDecision {
            status: RecordStatus::Compliant,
            matched_keyword: None,
            matched_set: None,
        }
    }
}
