use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{Action, Transaction};

/// One point on the invested-capital timeline
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub cumulative_investment: Decimal,
    pub portfolio_value: Decimal,
}

/// Cumulative invested capital over time, one point per equity trade.
///
/// Buys add quantity×price, sells subtract it. Without current prices the
/// portfolio value is the invested capital itself.
pub fn investment_over_time(ledger: &[Transaction]) -> Vec<PerformancePoint> {
    let mut points = Vec::new();
    let mut cumulative = Decimal::ZERO;

    for tx in ledger.iter().filter(|t| t.is_equity_trade()) {
        let value = tx.quantity * tx.price;
        match tx.action {
            Action::Buy => cumulative += value,
            Action::Sell => cumulative -= value,
            _ => {}
        }
        points.push(PerformancePoint {
            date: tx.date,
            cumulative_investment: cumulative,
            portfolio_value: cumulative,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(day: u32, symbol: &str, action: Action, qty: Decimal, price: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            symbol: symbol.to_string(),
            action,
            quantity: qty,
            price,
        }
    }

    #[test]
    fn test_buys_accumulate_and_sells_reduce() {
        let ledger = vec![
            trade(1, "QAN", Action::Buy, dec!(10), dec!(100)),
            trade(2, "PNV", Action::Buy, dec!(20), dec!(50)),
            trade(3, "QAN", Action::Sell, dec!(5), dec!(120)),
        ];
        let points = investment_over_time(&ledger);
        let series: Vec<_> = points.iter().map(|p| p.cumulative_investment).collect();
        assert_eq!(series, vec![dec!(1000), dec!(2000), dec!(1400)]);
    }

    #[test]
    fn test_non_equity_rows_produce_no_points() {
        let ledger = vec![
            trade(1, "COMMISSION", Action::Commission, dec!(1), dec!(8)),
            trade(2, "QAN", Action::Dividend, dec!(1), dec!(30)),
        ];
        assert!(investment_over_time(&ledger).is_empty());
    }
}
