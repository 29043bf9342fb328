//! Error handling for shareledger
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A required column or field is absent. Fatal for the whole batch.
    #[error("structural error: {0}")]
    Structural(String),

    /// A single row could not be classified or numerically parsed.
    /// Row numbers are 1-based as shown in the source file.
    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("pricing error: {0}")]
    Pricing(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn parse(row: usize, message: impl Into<String>) -> Self {
        LedgerError::Parse {
            row,
            message: message.into(),
        }
    }
}

/// Result type alias for ledger operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = LedgerError::Structural("missing required columns: PL Amount".to_string());
        assert_eq!(
            err.to_string(),
            "structural error: missing required columns: PL Amount"
        );
    }

    #[test]
    fn test_parse_error_carries_row_number() {
        let err = LedgerError::parse(17, "unknown MarketName format");
        assert_eq!(err.to_string(), "row 17: unknown MarketName format");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to process transaction");
        match result {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("failed to process transaction"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error") || msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
