//! Ledger validator/cleaner
//!
//! Runs after normalization: parses date strings into calendar dates,
//! upper-cases and trims symbols, and sorts the ledger ascending by date.
//! Field presence was already enforced by the classifier; an unparseable
//! date fails the whole batch, never a partial success.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::{NormalizedRecord, Transaction};

/// Convert normalized records into the final typed ledger
pub fn clean_records(records: Vec<NormalizedRecord>) -> Result<Vec<Transaction>> {
    let mut ledger = Vec::with_capacity(records.len());

    for record in records {
        let date = parse_row_date(&record.date).map_err(|_| {
            LedgerError::parse(
                record.row,
                format!("Could not parse date: {}", record.date),
            )
        })?;

        ledger.push(Transaction {
            date,
            symbol: record.symbol.trim().to_uppercase(),
            action: record.action,
            quantity: record.quantity,
            price: record.price,
        });
    }

    // Stable sort keeps same-day rows in original export order
    ledger.sort_by_key(|t| t.date);
    debug!("Cleaned ledger of {} transactions", ledger.len());

    Ok(ledger)
}

fn parse_row_date(date_str: &str) -> Result<NaiveDate, ()> {
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%y", "%d-%m-%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(date);
        }
    }
    Err(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Action;
    use rust_decimal_macros::dec;

    fn record(row: usize, date: &str, symbol: &str) -> NormalizedRecord {
        NormalizedRecord {
            row,
            date: date.to_string(),
            symbol: symbol.to_string(),
            action: Action::Buy,
            quantity: dec!(10),
            price: dec!(2.50),
        }
    }

    #[test]
    fn test_parses_common_broker_date_formats() {
        for date in ["02/09/2021", "02-09-2021", "2021-09-02", "02/09/21"] {
            let ledger = clean_records(vec![record(1, date, "QAN")]).unwrap();
            assert_eq!(ledger[0].date, NaiveDate::from_ymd_opt(2021, 9, 2).unwrap());
        }
    }

    #[test]
    fn test_symbols_are_uppercased_and_trimmed() {
        let ledger = clean_records(vec![record(1, "02/09/2021", " Qantas Airways Ltd ")]).unwrap();
        assert_eq!(ledger[0].symbol, "QANTAS AIRWAYS LTD");
    }

    #[test]
    fn test_one_bad_date_fails_the_whole_batch() {
        let records = vec![
            record(1, "02/09/2021", "QAN"),
            record(2, "not a date", "PNV"),
        ];
        let err = clean_records(records).unwrap_err().to_string();
        assert!(err.contains("row 2"));
        assert!(err.contains("not a date"));
    }

    #[test]
    fn test_ledger_is_sorted_by_date_stable_within_a_day() {
        let records = vec![
            record(1, "03/09/2021", "LATER"),
            record(2, "01/09/2021", "FIRST"),
            record(3, "01/09/2021", "SECOND"),
        ];
        let ledger = clean_records(records).unwrap();
        let symbols: Vec<_> = ledger.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["FIRST", "SECOND", "LATER"]);
    }
}
