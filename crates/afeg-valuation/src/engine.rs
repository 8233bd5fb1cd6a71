//! The valuation formulas.

use afeg_types::{CategoryAmounts, ComplexityLabel, Heat, RecordStatus, ValuationRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Intent keywords that mark a query as deep reasoning work.
const DEEP_REASONING_KEYWORDS: [&str; 3] = ["why", "how", "explain"];

/// Intent keywords that mark a query as a factual lookup.
const FACTUAL_KEYWORDS: [&str; 4] = ["what", "who", "where", "when"];

/// Proportion triples (inference, reasoning, memory) applied to the base.
const DEEP_REASONING_SPLIT: (f64, f64, f64) = (0.8, 1.2, 0.1);
const FACTUAL_SPLIT: (f64, f64, f64) = (1.2, 0.4, 0.3);
const DEFAULT_SPLIT: (f64, f64, f64) = (1.0, 0.1, 0.2);

/// Per-category sampling ranges for the stochastic formula.
const INFERENCE_RANGE: (f64, f64) = (2.3, 2.7);
const MEMORY_RANGE: (f64, f64) = (1.7, 1.9);
const REASONING_RANGE: (f64, f64) = (2.1, 2.3);

/// Which valuation formula to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMode {
    /// Deterministic intent-keyword split. `base = 400 + 10 * len(query)`,
    /// proportion triple selected by intent keywords, raw total billed
    /// directly. This is the canonical formula.
    Intent,
    /// Length-based random split with a caller-provided seed.
    /// `base = max(len(query), 10)`, per-category uniform multipliers, and a
    /// normalization step before billing.
    Stochastic { seed: u64 },
}

impl Default for ValuationMode {
    fn default() -> Self {
        ValuationMode::Intent
    }
}

/// Stateless valuation engine.
///
/// All state lives in the arguments: the engine is a pure function of
/// `(query, mode, scale_factor)`, which keeps surge synthesis and tests
/// trivially reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Value a query. `scale_factor` multiplies the base before the category
    /// split and exists to synthesize batch-scale figures from the per-query
    /// formula.
    ///
    /// Empty queries are the caller's concern; the engine itself is total over
    /// strings.
    pub fn value_of(&self, query: &str, mode: ValuationMode, scale_factor: f64) -> ValuationRecord {
        match mode {
            ValuationMode::Intent => self.intent_split(query, scale_factor),
            ValuationMode::Stochastic { seed } => self.stochastic_split(query, scale_factor, seed),
        }
    }

    fn intent_split(&self, query: &str, scale_factor: f64) -> ValuationRecord {
        let base = (400.0 + query.len() as f64 * 10.0) * scale_factor;
        let lowered = query.to_lowercase();

        let (split, complexity, heat) = if contains_any(&lowered, &DEEP_REASONING_KEYWORDS) {
            (DEEP_REASONING_SPLIT, ComplexityLabel::DeepReasoning, Heat::High)
        } else if contains_any(&lowered, &FACTUAL_KEYWORDS) {
            (FACTUAL_SPLIT, ComplexityLabel::FactualLookup, Heat::Low)
        } else {
            (DEFAULT_SPLIT, ComplexityLabel::StandardInference, Heat::Low)
        };

        let categories =
            CategoryAmounts::new(base * split.0, base * split.1, base * split.2);

        ValuationRecord::new(
            query,
            categories,
            false,
            complexity,
            heat,
            RecordStatus::Compliant,
        )
    }

    fn stochastic_split(&self, query: &str, scale_factor: f64, seed: u64) -> ValuationRecord {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = (query.len().max(10) as f64) * scale_factor;

        let inference = base * rng.gen_range(INFERENCE_RANGE.0..INFERENCE_RANGE.1);
        let memory = base * rng.gen_range(MEMORY_RANGE.0..MEMORY_RANGE.1);
        let reasoning = base * rng.gen_range(REASONING_RANGE.0..REASONING_RANGE.1);

        ValuationRecord::new(
            query,
            CategoryAmounts::new(inference, reasoning, memory),
            true,
            ComplexityLabel::StandardInference,
            Heat::Low,
            RecordStatus::Compliant,
        )
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
