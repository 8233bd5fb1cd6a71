//! Export serializer.
//!
//! Flattens one or more named session ledgers to JSON-lines files bundled in
//! an in-memory gzipped tar archive, alongside a manifest describing what was
//! dumped. Exports are always full dumps.

use crate::{LedgerError, SessionLedger};
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("archive error: {0}")]
    Archive(#[from] std::io::Error),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Manifest written into every archive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportManifest {
    pub exported_at: DateTime<Utc>,
    pub ledgers: Vec<LedgerSummary>,
}

/// Per-ledger summary in the manifest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub name: String,
    pub entries: usize,
    pub total_value: f64,
    pub total_tax: f64,
}

/// Builder for an audit archive.
pub struct ExportBundle<'a> {
    ledgers: Vec<(&'a str, &'a SessionLedger)>,
}

impl<'a> ExportBundle<'a> {
    pub fn new() -> Self {
        Self {
            ledgers: Vec::new(),
        }
    }

    /// Include a named ledger in the dump. The name becomes the file stem
    /// inside the archive (e.g. `compliant` -> `compliant.jsonl`).
    pub fn with_ledger(mut self, name: &'a str, ledger: &'a SessionLedger) -> Self {
        self.ledgers.push((name, ledger));
        self
    }

    /// Verify every chain, then produce the tar.gz bytes.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut manifest = ExportManifest {
            exported_at: Utc::now(),
            ledgers: Vec::with_capacity(self.ledgers.len()),
        };

        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut archive = tar::Builder::new(encoder);

        for (name, ledger) in &self.ledgers {
            ledger.verify_chain()?;

            let mut body = Vec::new();
            for entry in ledger.entries() {
                serde_json::to_writer(&mut body, entry)?;
                body.push(b'\n');
            }
            append_file(&mut archive, &format!("{name}.jsonl"), &body)?;

            let totals = ledger.totals();
            manifest.ledgers.push(LedgerSummary {
                name: name.to_string(),
                entries: ledger.len(),
                total_value: totals.total_value,
                total_tax: totals.total_tax,
            });
        }

        let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
        append_file(&mut archive, "MANIFEST.json", &manifest_bytes)?;

        let encoder = archive.into_inner()?;
        Ok(encoder.finish()?)
    }
}

impl Default for ExportBundle<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn append_file<W: Write>(
    archive: &mut tar::Builder<W>,
    path: &str,
    data: &[u8],
) -> Result<(), std::io::Error> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(Utc::now().timestamp().max(0) as u64);
    header.set_cksum();
    archive.append_data(&mut header, path, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afeg_valuation::{ValuationEngine, ValuationMode};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn ledger_with(queries: &[&str]) -> SessionLedger {
        let engine = ValuationEngine::new();
        let mut ledger = SessionLedger::new();
        for query in queries {
            ledger
                .append(engine.value_of(query, ValuationMode::Intent, 1.0))
                .expect("append");
        }
        ledger
    }

    fn unpack(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        let mut files = Vec::new();
        for entry in archive.entries().expect("entries") {
            let mut entry = entry.expect("entry");
            let path = entry.path().expect("path").to_string_lossy().to_string();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).expect("read");
            files.push((path, body));
        }
        files
    }

    #[test]
    fn export_is_a_full_dump_of_each_ledger() {
        let compliant = ledger_with(&["Explain the trade model.", "Node_Sync_500"]);
        let risk = ledger_with(&["another query"]);

        let bytes = ExportBundle::new()
            .with_ledger("compliant", &compliant)
            .with_ledger("risk", &risk)
            .finish()
            .expect("export");

        let files = unpack(&bytes);
        let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["compliant.jsonl", "risk.jsonl", "MANIFEST.json"]);

        let compliant_body = String::from_utf8(files[0].1.clone()).expect("utf8");
        assert_eq!(compliant_body.lines().count(), 2);
        for line in compliant_body.lines() {
            let entry: crate::LedgerEntry = serde_json::from_str(line).expect("round trip");
            assert!(!entry.entry_hash.is_empty());
        }

        let manifest: ExportManifest = serde_json::from_slice(&files[2].1).expect("manifest");
        assert_eq!(manifest.ledgers.len(), 2);
        assert_eq!(manifest.ledgers[0].entries, 2);
        assert_eq!(manifest.ledgers[0].total_value, compliant.totals().total_value);
    }

    #[test]
    fn export_of_empty_ledger_still_produces_a_manifest() {
        let empty = SessionLedger::new();
        let bytes = ExportBundle::new()
            .with_ledger("compliant", &empty)
            .finish()
            .expect("export");

        let files = unpack(&bytes);
        assert_eq!(files.len(), 2);
        assert!(files[0].1.is_empty());
    }

    #[test]
    fn tampered_ledger_refuses_to_export() {
        let mut ledger = ledger_with(&["Node_Sync_500"]);
        ledger.entries[0].record.monetary_value = 999.0;

        let result = ExportBundle::new().with_ledger("compliant", &ledger).finish();
        assert!(matches!(result, Err(ExportError::Ledger(_))));
    }
}
