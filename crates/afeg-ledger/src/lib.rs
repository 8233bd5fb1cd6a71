//! Session ledger for the AFEG auditor.
//!
//! An ordered, append-only collection of valuation records, exclusively owned
//! by one session. Entries are hash-chained: every entry hash covers the
//! previous entry's hash, so in-place tampering anywhere in the chain is
//! detectable by [`SessionLedger::verify_chain`]. Running billing totals are
//! maintained on append in O(1).
//!
//! No in-place mutation APIs are exposed; the only destructive operation is
//! the explicit whole-ledger [`SessionLedger::clear`].

#![deny(unsafe_code)]

pub mod export;

use afeg_types::ValuationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("chain verification failed at index {0}")]
    BrokenChain(u64),
}

/// A hash-chained ledger entry wrapping one valuation record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub entry_id: String,
    pub index: u64,
    pub record: ValuationRecord,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

/// Billing rollups maintained on append.
///
/// These sum *billable* figures: blocked records contribute their presence to
/// `records` but nothing to the monetary fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningTotals {
    pub records: usize,
    pub total_units: f64,
    pub total_value: f64,
    pub total_tax: f64,
}

/// Numeric record fields available to [`SessionLedger::aggregate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateField {
    RawTotal,
    NormalizedTotal,
    MonetaryValue,
    Tax,
}

/// The append-only session ledger.
#[derive(Clone, Debug, Default)]
pub struct SessionLedger {
    entries: Vec<LedgerEntry>,
    totals: RunningTotals,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, chaining it onto the current head.
    pub fn append(&mut self, record: ValuationRecord) -> Result<LedgerEntry, LedgerError> {
        let index = self.entries.len() as u64;
        let previous_hash = self.entries.last().map(|entry| entry.entry_hash.clone());
        let entry_hash = compute_entry_hash(index, &record, previous_hash.as_deref())?;

        self.totals.records += 1;
        self.totals.total_units += record.billable_units();
        self.totals.total_value += record.billable_value();
        self.totals.total_tax += record.billable_tax();

        let entry = LedgerEntry {
            entry_id: Uuid::new_v4().to_string(),
            index,
            record,
            previous_hash,
            entry_hash,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The O(1) running billing totals.
    pub fn totals(&self) -> RunningTotals {
        self.totals
    }

    /// Display-only view of the last `n` entries. Storage is never truncated.
    pub fn recent(&self, n: usize) -> &[LedgerEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Case-insensitive substring search over each record's serialized form.
    /// Chain metadata (entry ids, hashes) is not searched. An empty needle
    /// matches everything.
    pub fn search(&self, needle: &str) -> Vec<&LedgerEntry> {
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                serde_json::to_string(&entry.record)
                    .map(|serialized| serialized.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Sum of a named numeric field across all records, blocked included.
    pub fn aggregate(&self, field: AggregateField) -> f64 {
        self.entries
            .iter()
            .map(|entry| match field {
                AggregateField::RawTotal => entry.record.raw_total,
                AggregateField::NormalizedTotal => entry.record.normalized_total.unwrap_or(0.0),
                AggregateField::MonetaryValue => entry.record.monetary_value,
                AggregateField::Tax => entry.record.tax,
            })
            .sum()
    }

    /// Drop every entry and reset the running totals.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.totals = RunningTotals::default();
    }

    /// Recompute every entry hash and chain link.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let mut previous_hash: Option<String> = None;
        for entry in &self.entries {
            let expected =
                compute_entry_hash(entry.index, &entry.record, previous_hash.as_deref())?;
            if entry.entry_hash != expected || entry.previous_hash != previous_hash {
                return Err(LedgerError::BrokenChain(entry.index));
            }
            previous_hash = Some(entry.entry_hash.clone());
        }
        Ok(())
    }
}

fn compute_entry_hash(
    index: u64,
    record: &ValuationRecord,
    previous_hash: Option<&str>,
) -> Result<String, LedgerError> {
    let record_value: Value = serde_json::to_value(record)
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    let material = serde_json::json!({
        "index": index,
        "record": record_value,
        "previous_hash": previous_hash,
    });
    let bytes =
        serde_json::to_vec(&material).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
