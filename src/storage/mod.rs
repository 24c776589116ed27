//! Pattern catalog source.
//!
//! Loads the ordered pattern list from a JSON file once at startup.
//! A missing or malformed file yields an empty catalog and a warning;
//! the monitor keeps running and simply never signals.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{ActionCode, Pattern, Symbol};

/// Default catalog file path.
pub const DEFAULT_CATALOG_FILE: &str = "patterns.json";

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// Pattern ids appear both as strings and bare numbers in catalog files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Text(s) => s,
            RecordId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatternRecord {
    id: RecordId,
    #[serde(alias = "sequencia")]
    sequence: Vec<String>,
    #[serde(alias = "acao")]
    action: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable, priority-ordered pattern list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    patterns: Vec<Pattern>,
    max_len: usize,
}

impl Catalog {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        let max_len = patterns.iter().map(Pattern::len).max().unwrap_or(0);
        Self { patterns, max_len }
    }

    /// Longest sequence in the catalog; bounds how much history is inspected.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Parse a catalog from JSON text. Records with an empty or unparseable
    /// sequence are skipped; records with an unknown action are kept.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<PatternRecord> =
            serde_json::from_str(json).context("Failed to parse pattern catalog")?;

        let mut patterns = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id.into_string();

            let sequence: Result<Vec<Symbol>> = record.sequence.iter().map(|s| s.parse()).collect();
            let sequence = match sequence {
                Ok(seq) => seq,
                Err(e) => {
                    warn!(pattern_id = %id, error = %e, "Skipping pattern with unknown symbol");
                    continue;
                }
            };

            let action = ActionCode::from(record.action.as_str());
            match &action {
                ActionCode::Unrecognized(code) => {
                    warn!(pattern_id = %id, action = %code, "Pattern references an unrecognized action; it will never signal");
                }
                ActionCode::Known(a) if a.needs_two_symbols() && sequence.len() < 2 => {
                    warn!(pattern_id = %id, action = %a, "Action needs two symbols but sequence is shorter; it will never signal");
                }
                ActionCode::Known(_) => {}
            }

            match Pattern::new(id.clone(), sequence, action) {
                Some(p) => patterns.push(p),
                None => warn!(pattern_id = %id, "Skipping pattern with empty sequence"),
            }
        }

        Ok(Self::new(patterns))
    }
}

/// Load the catalog from disk, falling back to an empty catalog.
pub fn load_catalog(path: Option<&str>) -> Catalog {
    let path = path.unwrap_or(DEFAULT_CATALOG_FILE);

    let catalog = match read_catalog(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path, error = format!("{e:#}"), "Pattern catalog unavailable, continuing with no patterns");
            return Catalog::default();
        }
    };

    if catalog.is_empty() {
        warn!(path, "Pattern catalog is empty; no signals will be emitted");
    } else {
        info!(path, patterns = catalog.len(), max_len = catalog.max_len(), "Pattern catalog loaded");
    }
    catalog
}

fn read_catalog(path: &str) -> Result<Catalog> {
    if !Path::new(path).exists() {
        anyhow::bail!("Catalog file not found: {path}");
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog from {path}"))?;
    Catalog::from_json(&json).with_context(|| format!("Invalid catalog in {path}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
