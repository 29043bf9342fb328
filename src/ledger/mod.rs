//! Canonical transaction ledger model
//!
//! A broker export row is normalized into exactly one [`Transaction`].
//! Transactions are immutable once created and ordered by date for
//! downstream FIFO processing.

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sentinel symbol for commission rows
pub const COMMISSION: &str = "COMMISSION";
/// Sentinel symbol for card deposits
pub const CASH_DEPOSIT: &str = "CASH_DEPOSIT";
/// Sentinel symbol for card withdrawals
pub const CASH_WITHDRAWAL: &str = "CASH_WITHDRAWAL";
/// Sentinel symbol when a dividend withdrawal row carries no market name
pub const UNKNOWN_STOCK: &str = "UNKNOWN_STOCK";

/// Non-equity placeholders excluded from position math
pub const SENTINEL_SYMBOLS: [&str; 3] = [COMMISSION, CASH_DEPOSIT, CASH_WITHDRAWAL];

pub fn is_sentinel(symbol: &str) -> bool {
    SENTINEL_SYMBOLS.contains(&symbol)
}

/// Canonical transaction action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
    Dividend,
    DividendWithdrawal,
    Commission,
    CashIn,
    CashOut,
}

impl Action {
    /// Title-case form used in exports and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
            Action::Dividend => "Dividend",
            Action::DividendWithdrawal => "Dividend_Withdrawal",
            Action::Commission => "Commission",
            Action::CashIn => "Cash_In",
            Action::CashOut => "Cash_Out",
        }
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "DIVIDEND" => Ok(Action::Dividend),
            "DIVIDEND_WITHDRAWAL" => Ok(Action::DividendWithdrawal),
            "COMMISSION" => Ok(Action::Commission),
            "CASH_IN" => Ok(Action::CashIn),
            "CASH_OUT" => Ok(Action::CashOut),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized ledger entry.
///
/// `price` is the unit price for Buy/Sell and the absolute amount for
/// every other action; `quantity` is 1 for non-trade actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: Action,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl Transaction {
    /// Whether this row participates in equity position math
    pub fn is_equity_trade(&self) -> bool {
        matches!(self.action, Action::Buy | Action::Sell) && !is_sentinel(&self.symbol)
    }
}

/// Classifier output before the cleaning stage has parsed the date.
///
/// Carries the source row number so cleaning failures stay row-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub row: usize,
    pub date: String,
    pub symbol: String,
    pub action: Action,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Unique non-sentinel symbols with Buy/Sell activity, in first-seen order
pub fn equity_symbols(transactions: &[Transaction]) -> Vec<String> {
    transactions
        .iter()
        .filter(|t| t.is_equity_trade())
        .map(|t| t.symbol.clone())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(symbol: &str, action: Action) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            symbol: symbol.to_string(),
            action,
            quantity: dec!(1),
            price: dec!(10),
        }
    }

    #[test]
    fn test_action_round_trips_through_strings() {
        for action in [
            Action::Buy,
            Action::Sell,
            Action::Dividend,
            Action::DividendWithdrawal,
            Action::Commission,
            Action::CashIn,
            Action::CashOut,
        ] {
            assert_eq!(Action::from_str(action.as_str()), Ok(action));
        }
    }

    #[test]
    fn test_sentinels_are_not_equity_trades() {
        assert!(tx("QAN", Action::Buy).is_equity_trade());
        assert!(!tx(COMMISSION, Action::Buy).is_equity_trade());
        assert!(!tx("QAN", Action::Dividend).is_equity_trade());
    }

    #[test]
    fn test_equity_symbols_skip_sentinels_and_dividends() {
        let ledger = vec![
            tx("QAN", Action::Buy),
            tx(CASH_DEPOSIT, Action::CashIn),
            tx("PNV", Action::Sell),
            tx("QAN", Action::Sell),
            tx("WEB", Action::Dividend),
        ];
        assert_eq!(equity_symbols(&ledger), vec!["QAN", "PNV"]);
    }
}
