//! FIFO lot accounting
//!
//! Realized gains are computed by matching each sale against the oldest
//! open purchase lots of the same symbol.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::collections::VecDeque;

use crate::ledger::{Action, Transaction};

/// An unconsumed (or partially consumed) purchase tranche
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Ordered queue of open lots for a single symbol.
///
/// Owned exclusively by the per-symbol accounting pass; lots are never
/// shared across symbols.
#[derive(Debug, Default)]
pub struct LotQueue {
    lots: VecDeque<Lot>,
}

impl LotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase as a new lot at the back of the queue
    pub fn buy(&mut self, quantity: Decimal, unit_cost: Decimal) {
        self.lots.push_back(Lot {
            quantity,
            unit_cost,
        });
    }

    /// Match a sale against the queue head, returning the realized gain.
    ///
    /// Selling more than is currently held empties the queue; the excess
    /// accrues no further gain and is not an error.
    pub fn sell(&mut self, quantity: Decimal, sale_price: Decimal) -> Decimal {
        let mut remaining = quantity;
        let mut gain = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            if lot.quantity <= remaining {
                gain += lot.quantity * (sale_price - lot.unit_cost);
                remaining -= lot.quantity;
                self.lots.pop_front();
            } else {
                gain += remaining * (sale_price - lot.unit_cost);
                lot.quantity -= remaining;
                remaining = Decimal::ZERO;
            }
        }

        gain
    }

    pub fn open_quantity(&self) -> Decimal {
        self.lots.iter().map(|l| l.quantity).sum()
    }

    #[cfg(test)]
    fn open_lots(&self) -> usize {
        self.lots.len()
    }
}

/// Total realized gain/loss across the ledger, FIFO per symbol.
///
/// Expects the ledger in date order; only Buy/Sell rows of non-sentinel
/// symbols participate.
pub fn realized_gains(ledger: &[Transaction]) -> Decimal {
    let mut queues: HashMap<&str, LotQueue> = HashMap::new();
    let mut total = Decimal::ZERO;

    for tx in ledger.iter().filter(|t| t.is_equity_trade()) {
        let queue = queues.entry(tx.symbol.as_str()).or_default();
        match tx.action {
            Action::Buy => queue.buy(tx.quantity, tx.price),
            Action::Sell => total += queue.sell(tx.quantity, tx.price),
            _ => unreachable!("equity trade filter admits only Buy/Sell"),
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn trade(day: u32, symbol: &str, action: Action, qty: Decimal, price: Decimal) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            symbol: symbol.to_string(),
            action,
            quantity: qty,
            price,
        }
    }

    #[test]
    fn test_full_lot_sale_realizes_exact_gain() {
        let ledger = vec![
            trade(1, "QAN", Action::Buy, dec!(10), dec!(100)),
            trade(2, "QAN", Action::Sell, dec!(10), dec!(150)),
        ];
        assert_eq!(realized_gains(&ledger), dec!(500));
    }

    #[test]
    fn test_partial_lot_consumes_oldest_first() {
        // 10 from lot1 (gain 500) + 2 from lot2 (gain -100) = 400
        let ledger = vec![
            trade(1, "QAN", Action::Buy, dec!(10), dec!(100)),
            trade(2, "QAN", Action::Buy, dec!(5), dec!(200)),
            trade(3, "QAN", Action::Sell, dec!(12), dec!(150)),
        ];
        assert_eq!(realized_gains(&ledger), dec!(400));
    }

    #[test]
    fn test_partially_consumed_lot_is_reduced_in_place() {
        let mut queue = LotQueue::new();
        queue.buy(dec!(10), dec!(100));
        queue.buy(dec!(5), dec!(200));

        let gain = queue.sell(dec!(12), dec!(150));
        assert_eq!(gain, dec!(400));
        assert_eq!(queue.open_lots(), 1);
        assert_eq!(queue.open_quantity(), dec!(3));
    }

    #[test]
    fn test_oversell_stops_accruing_without_error() {
        let mut queue = LotQueue::new();
        queue.buy(dec!(10), dec!(100));

        // 15 sold against 10 held: only the matched 10 accrue gain
        let gain = queue.sell(dec!(15), dec!(150));
        assert_eq!(gain, dec!(500));
        assert_eq!(queue.open_quantity(), dec!(0));
    }

    #[test]
    fn test_sale_with_no_open_lots_accrues_nothing() {
        let mut queue = LotQueue::new();
        assert_eq!(queue.sell(dec!(5), dec!(150)), dec!(0));
    }

    #[test]
    fn test_symbols_are_accounted_independently() {
        let ledger = vec![
            trade(1, "QAN", Action::Buy, dec!(10), dec!(100)),
            trade(1, "PNV", Action::Buy, dec!(10), dec!(50)),
            trade(2, "QAN", Action::Sell, dec!(10), dec!(150)),
            trade(3, "PNV", Action::Sell, dec!(10), dec!(40)),
        ];
        assert_eq!(realized_gains(&ledger), dec!(500) + dec!(-100));
    }

    #[test]
    fn test_sentinel_and_dividend_rows_do_not_participate() {
        let ledger = vec![
            trade(1, "QAN", Action::Buy, dec!(10), dec!(100)),
            trade(2, "COMMISSION", Action::Commission, dec!(1), dec!(8)),
            trade(3, "QAN", Action::Dividend, dec!(1), dec!(30)),
            trade(4, "QAN", Action::Sell, dec!(10), dec!(150)),
        ];
        assert_eq!(realized_gains(&ledger), dec!(500));
    }
}
