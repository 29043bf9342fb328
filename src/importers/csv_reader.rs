use anyhow::{Context, Result};
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::path::Path;
use tracing::{debug, info};

use crate::error::LedgerError;

/// Required export columns, in canonical order
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "TextDate",
    "Summary",
    "MarketName",
    "Transaction type",
    "PL Amount",
];

/// One untyped export row, consumed once by the classifier.
///
/// Fields hold the trimmed cell text; an absent cell is an empty string.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based data row number, for diagnostics
    pub row: usize,
    pub text_date: String,
    pub summary: String,
    pub market_name: String,
    pub transaction_type: String,
    pub pl_amount: String,
}

#[derive(Debug)]
struct ColumnMapping {
    text_date: usize,
    summary: usize,
    market_name: usize,
    transaction_type: usize,
    pl_amount: usize,
}

/// Read a broker CSV export and extract the raw rows
pub fn read_raw_rows<P: AsRef<Path>>(file_path: P) -> Result<Vec<RawRow>> {
    let path = file_path.as_ref();
    info!("Reading broker CSV file: {:?}", path);

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let content = decode_export(&bytes);

    let mut reader = ReaderBuilder::new()
        .flexible(true) // Allow variable number of columns
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let mapping = resolve_columns(&headers)?;
    debug!("Column mapping: {:?}", mapping);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        let cell = |col: usize| record.get(col).unwrap_or("").trim().to_string();

        rows.push(RawRow {
            row: idx + 1,
            text_date: cell(mapping.text_date),
            summary: cell(mapping.summary),
            market_name: cell(mapping.market_name),
            transaction_type: cell(mapping.transaction_type),
            pl_amount: cell(mapping.pl_amount),
        });
    }

    if rows.is_empty() {
        return Err(LedgerError::Structural("empty CSV file".to_string()).into());
    }

    info!("Read {} raw rows from CSV", rows.len());
    Ok(rows)
}

/// Decode export bytes, falling back to Windows-1252 for legacy exports
fn decode_export(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("Export is not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Resolve required columns against the header row.
///
/// An exact header name wins; otherwise the first header containing the
/// required name case-insensitively is used in its place. Columns still
/// missing after the fallback are reported together.
fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMapping> {
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let mut missing = Vec::new();
    let mut resolved = Vec::with_capacity(REQUIRED_COLUMNS.len());

    for required in REQUIRED_COLUMNS {
        match find_column(&names, required) {
            Some(idx) => resolved.push(idx),
            None => missing.push(required),
        }
    }

    if !missing.is_empty() {
        return Err(LedgerError::Structural(format!(
            "missing required columns: {}",
            missing.join(", ")
        ))
        .into());
    }

    Ok(ColumnMapping {
        text_date: resolved[0],
        summary: resolved[1],
        market_name: resolved[2],
        transaction_type: resolved[3],
        pl_amount: resolved[4],
    })
}

fn find_column(names: &[String], required: &str) -> Option<usize> {
    if let Some(idx) = names.iter().position(|n| n == required) {
        return Some(idx);
    }
    let needle = required.to_lowercase();
    names
        .iter()
        .position(|n| n.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_rows_with_exact_headers() {
        let file = write_temp_csv(
            b"TextDate,Summary,MarketName,Transaction type,PL Amount\n\
              02/09/2021,Client Consideration,Qantas Airways Ltd CONS 143@527.5 ref,WITH,-754.33\n",
        );
        let rows = read_raw_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].transaction_type, "WITH");
        assert_eq!(rows[0].pl_amount, "-754.33");
    }

    #[test]
    fn test_substring_fallback_resolves_renamed_columns() {
        let file = write_temp_csv(
            b"My TextDate,Summary,The MarketName col,Transaction type,PL Amount (AUD)\n\
              01/01/2022,Dividend,ACME DIVIDEND,DEPO,12.50\n",
        );
        let rows = read_raw_rows(file.path()).unwrap();
        assert_eq!(rows[0].market_name, "ACME DIVIDEND");
        assert_eq!(rows[0].pl_amount, "12.50");
    }

    #[test]
    fn test_missing_columns_are_listed_together() {
        let file = write_temp_csv(b"TextDate,Summary\n01/01/2022,Dividend\n");
        let err = read_raw_rows(file.path()).unwrap_err().to_string();
        assert!(err.contains("MarketName"));
        assert!(err.contains("Transaction type"));
        assert!(err.contains("PL Amount"));
    }

    #[test]
    fn test_empty_file_is_a_structural_error() {
        let file = write_temp_csv(b"TextDate,Summary,MarketName,Transaction type,PL Amount\n");
        let err = read_raw_rows(file.path()).unwrap_err().to_string();
        assert!(err.contains("empty CSV file"));
    }

    #[test]
    fn test_windows_1252_export_is_decoded() {
        // 0xE9 is "é" in Windows-1252 and invalid alone in UTF-8
        let mut content: Vec<u8> = Vec::new();
        content.extend_from_slice(b"TextDate,Summary,MarketName,Transaction type,PL Amount\n");
        content.extend_from_slice(b"01/01/2022,Dividend,Soci\xe9t\xe9 DIVIDEND,DEPO,10.00\n");
        let file = write_temp_csv(&content);
        let rows = read_raw_rows(file.path()).unwrap();
        assert_eq!(rows[0].market_name, "Société DIVIDEND");
    }
}
