//! KVU valuation engine for the AFEG auditor.
//!
//! Maps a query string to a [`afeg_types::ValuationRecord`] under one of two
//! formulas. The intent-keyword split is the canonical deterministic formula;
//! the stochastic length split is an explicitly selected mode that requires a
//! caller-provided seed, so every output is reproducible.

#![deny(unsafe_code)]

pub mod engine;
pub mod surge;

pub use engine::{ValuationEngine, ValuationMode};
pub use surge::{NoopPacer, Pacer, SurgePlan, SurgeReport, TokioPacer};
