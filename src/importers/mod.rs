// Import module - broker CSV export pipeline

pub mod classify;
pub mod clean;
pub mod csv_reader;

use anyhow::Result;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::ledger::Transaction;

pub use csv_reader::RawRow;

/// Import a broker CSV export into the canonical ledger.
///
/// Pipeline: raw rows → classified records → cleaned, date-sorted
/// transactions. Every row must classify or the batch fails.
pub fn import_transactions<P: AsRef<Path>>(file_path: P) -> Result<Vec<Transaction>> {
    let raw_rows = csv_reader::read_raw_rows(&file_path)?;
    let records = classify::normalize_rows(&raw_rows)?;
    let ledger = clean::clean_records(records)?;

    info!("Successfully processed {} transactions", ledger.len());
    Ok(ledger)
}

/// Summary statistics of an imported ledger
#[derive(Debug, Clone, serde::Serialize)]
pub struct LedgerSummary {
    pub total_transactions: usize,
    pub unique_symbols: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub action_counts: BTreeMap<String, usize>,
    pub symbols: Vec<String>,
}

/// Summarize a ledger for preview display; `None` when it is empty
pub fn summarize(ledger: &[Transaction]) -> Option<LedgerSummary> {
    let first_date = ledger.iter().map(|t| t.date).min()?;
    let last_date = ledger.iter().map(|t| t.date).max()?;

    let mut action_counts = BTreeMap::new();
    for tx in ledger {
        *action_counts.entry(tx.action.as_str().to_string()).or_insert(0) += 1;
    }

    let symbols: Vec<String> = ledger
        .iter()
        .map(|t| t.symbol.clone())
        .unique()
        .sorted()
        .collect();

    Some(LedgerSummary {
        total_transactions: ledger.len(),
        unique_symbols: symbols.len(),
        first_date,
        last_date,
        action_counts,
        symbols,
    })
}
