//! Core data model for the AFEG KVU auditor.
//!
//! A Knowledge Value Unit (KVU) is the billing unit assigned to a processed
//! query. This crate defines the valuation record produced per query, the
//! fixed category split (inference / reasoning / memory), the monetary
//! constants, and the per-record integrity stamp.

#![deny(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Monetary value of one KVU, in pounds.
pub const KVU_UNIT_VALUE: f64 = 0.001;

/// Normalization constant applied by the stochastic valuation formula.
pub const NORMALIZATION_FACTOR: f64 = 0.01;

/// VAT rate applied to every monetary value.
pub const VAT_RATE: f64 = 0.20;

/// Round to `dp` decimal places. All displayed figures go through this.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (value * scale).round() / scale
}

/// Per-category KVU amounts for a single query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmounts {
    pub inference: f64,
    pub reasoning: f64,
    pub memory: f64,
}

impl CategoryAmounts {
    pub fn new(inference: f64, reasoning: f64, memory: f64) -> Self {
        Self {
            inference,
            reasoning,
            memory,
        }
    }

    /// Exact sum of the three categories.
    pub fn total(&self) -> f64 {
        self.inference + self.reasoning + self.memory
    }

    /// Each category rounded to two decimal places for display parity.
    pub fn rounded(&self) -> Self {
        Self {
            inference: round_dp(self.inference, 2),
            reasoning: round_dp(self.reasoning, 2),
            memory: round_dp(self.memory, 2),
        }
    }
}

/// Intent classification reported alongside a valuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLabel {
    #[serde(rename = "Deep Reasoning")]
    DeepReasoning,
    #[serde(rename = "Factual Lookup")]
    FactualLookup,
    #[serde(rename = "Standard Inference")]
    StandardInference,
}

impl std::fmt::Display for ComplexityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DeepReasoning => "Deep Reasoning",
            Self::FactualLookup => "Factual Lookup",
            Self::StandardInference => "Standard Inference",
        };
        write!(f, "{}", label)
    }
}

/// Compute-heat indicator derived from the intent classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heat {
    High,
    Low,
}

/// Governance outcome attached to a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Passed both governance passes.
    Compliant,
    /// Output-risk keyword matched; record retained for audit.
    Intercepted,
    /// Input-risk keyword matched; no revenue is generated.
    Blocked,
}

impl RecordStatus {
    pub fn is_billable(&self) -> bool {
        !matches!(self, RecordStatus::Blocked)
    }
}

/// One valuation record per processed query.
///
/// Numeric fields are fixed at construction: `raw_total` is the exact category
/// sum and the monetary fields are pure functions of the billing basis. The
/// integrity stamp covers the numeric fields via a canonical sorted-key JSON
/// serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub query: String,
    pub categories: CategoryAmounts,
    pub raw_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_total: Option<f64>,
    pub monetary_value: f64,
    pub tax: f64,
    pub complexity: ComplexityLabel,
    pub heat: Heat,
    pub status: RecordStatus,
    pub timestamp: DateTime<Utc>,
    pub integrity_hash: String,
}

impl ValuationRecord {
    /// Build a record from category amounts.
    ///
    /// When `normalize` is set the billing basis is
    /// `raw_total * NORMALIZATION_FACTOR` (the stochastic formula); otherwise
    /// the raw total is billed directly.
    pub fn new(
        query: impl Into<String>,
        categories: CategoryAmounts,
        normalize: bool,
        complexity: ComplexityLabel,
        heat: Heat,
        status: RecordStatus,
    ) -> Self {
        let categories = categories.rounded();
        let raw_total = categories.total();
        let normalized_total = normalize.then(|| round_dp(raw_total * NORMALIZATION_FACTOR, 4));
        let basis = normalized_total.unwrap_or(raw_total);
        let monetary_value = round_dp(basis * KVU_UNIT_VALUE, 4);
        let tax = round_dp(monetary_value * VAT_RATE, 4);
        let integrity_hash = integrity_stamp(
            &categories,
            raw_total,
            normalized_total,
            monetary_value,
            tax,
        );

        Self {
            query: query.into(),
            categories,
            raw_total,
            normalized_total,
            monetary_value,
            tax,
            complexity,
            heat,
            status,
            timestamp: Utc::now(),
            integrity_hash,
        }
    }

    /// Construction-time status override, applied before the record is
    /// appended anywhere. The integrity stamp covers numeric fields only, so
    /// it is unaffected.
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }

    /// Monetary value that actually bills. Blocked records generate no revenue.
    pub fn billable_value(&self) -> f64 {
        if self.status.is_billable() {
            self.monetary_value
        } else {
            0.0
        }
    }

    /// VAT that actually bills.
    pub fn billable_tax(&self) -> f64 {
        if self.status.is_billable() {
            self.tax
        } else {
            0.0
        }
    }

    /// Billable KVU total (raw units), zero for blocked records.
    pub fn billable_units(&self) -> f64 {
        if self.status.is_billable() {
            self.raw_total
        } else {
            0.0
        }
    }

    /// First 12 hex characters of the integrity stamp, for display surfaces.
    pub fn short_hash(&self) -> &str {
        &self.integrity_hash[..12]
    }
}

/// SHA-256 over the canonical sorted-key JSON of a record's numeric fields.
///
/// This is a per-record fingerprint only. Chain-level tamper evidence lives in
/// the ledger, which hashes each entry together with its predecessor.
pub fn integrity_stamp(
    categories: &CategoryAmounts,
    raw_total: f64,
    normalized_total: Option<f64>,
    monetary_value: f64,
    tax: f64,
) -> String {
    // serde_json maps are BTree-backed, so key order here is canonical.
    let material = serde_json::json!({
        "inference": categories.inference,
        "reasoning": categories.reasoning,
        "memory": categories.memory,
        "raw_total": raw_total,
        "normalized_total": normalized_total,
        "monetary_value": monetary_value,
        "tax": tax,
    });

    let mut hasher = Sha256::new();
    hasher.update(material.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
