use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{Action, Transaction};

/// One dividend event, signed: positive for payments, negative for
/// withdrawals
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub symbol: String,
    pub amount: Decimal,
}

/// Net dividend income over the ledger
#[derive(Debug, Clone, Serialize)]
pub struct DividendSummary {
    pub total_dividends: Decimal,
    pub dividend_count: usize,
    pub history: Vec<DividendEvent>,
}

/// Net dividend payments against withdrawals.
///
/// The count covers payments only; withdrawals reduce the total but are
/// not counted. History is sorted by date descending.
pub fn dividend_summary(ledger: &[Transaction]) -> DividendSummary {
    let mut payments = Decimal::ZERO;
    let mut withdrawals = Decimal::ZERO;
    let mut dividend_count = 0;
    let mut history = Vec::new();

    for tx in ledger {
        let amount = match tx.action {
            Action::Dividend => {
                payments += tx.price;
                dividend_count += 1;
                tx.price
            }
            Action::DividendWithdrawal => {
                withdrawals += tx.price;
                -tx.price
            }
            _ => continue,
        };
        history.push(DividendEvent {
            date: tx.date,
            symbol: tx.symbol.clone(),
            amount,
        });
    }

    history.sort_by(|a, b| b.date.cmp(&a.date));

    DividendSummary {
        total_dividends: payments - withdrawals,
        dividend_count,
        history,
    }
}
