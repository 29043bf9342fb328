use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::ledger::{equity_symbols, Action, Transaction};
use crate::reports::fifo;

/// Current state of one position, derived from the ledger on demand
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub total_invested: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_pct: Decimal,
    pub allocation_pct: Decimal,
}

/// A symbol left out of priced holdings, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Aggregate portfolio figures
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub realized_gain_loss: Decimal,
    pub unrealized_gain_loss: Decimal,
    pub total_gain_loss: Decimal,
    pub num_positions: usize,
}

/// Running position for one symbol while replaying its trades
struct OpenPosition {
    symbol: String,
    shares: Decimal,
    cost: Decimal,
}

impl OpenPosition {
    fn avg_cost(&self) -> Decimal {
        if self.shares > Decimal::ZERO {
            self.cost / self.shares
        } else {
            Decimal::ZERO
        }
    }
}

/// Replay the ledger into open positions using a running average cost.
///
/// Each Buy adds quantity×price to cost; each Sell removes a proportional
/// share of cost at the average cost immediately before the sell. A
/// position whose resulting quantity is zero or negative is dropped.
fn open_positions(ledger: &[Transaction]) -> Vec<OpenPosition> {
    let mut positions = Vec::new();

    for symbol in equity_symbols(ledger) {
        let mut shares = Decimal::ZERO;
        let mut cost = Decimal::ZERO;

        for tx in ledger
            .iter()
            .filter(|t| t.is_equity_trade() && t.symbol == symbol)
        {
            match tx.action {
                Action::Buy => {
                    shares += tx.quantity;
                    cost += tx.quantity * tx.price;
                }
                Action::Sell => {
                    let shares_before = shares;
                    shares -= tx.quantity;
                    if shares > Decimal::ZERO {
                        let avg_cost = if shares_before > Decimal::ZERO {
                            cost / shares_before
                        } else {
                            Decimal::ZERO
                        };
                        cost -= tx.quantity * avg_cost;
                    }
                }
                _ => {}
            }
        }

        if shares > Decimal::ZERO {
            positions.push(OpenPosition {
                symbol,
                shares,
                cost,
            });
        }
    }

    positions
}

/// Holdings valued at average cost (no external prices).
///
/// Without a price source, current price and value default to the average
/// cost, so unrealized gain is zero by construction.
pub fn calculate_holdings(ledger: &[Transaction]) -> Vec<Holding> {
    let mut holdings: Vec<Holding> = open_positions(ledger)
        .into_iter()
        .map(|p| {
            let avg_cost = p.avg_cost();
            Holding {
                symbol: p.symbol,
                quantity: p.shares,
                avg_cost,
                total_invested: p.cost,
                current_price: avg_cost,
                current_value: p.cost,
                gain_loss: Decimal::ZERO,
                gain_loss_pct: Decimal::ZERO,
                allocation_pct: Decimal::ZERO,
            }
        })
        .collect();

    apply_allocation(&mut holdings);
    holdings
}

/// Holdings valued against an external price map.
///
/// A symbol whose lookup failed (absent from the map, or mapped to zero
/// per the price-source contract) is excluded and recorded in the skip
/// list; it never aborts the batch.
pub fn calculate_holdings_with_prices(
    ledger: &[Transaction],
    prices: &HashMap<String, Decimal>,
) -> (Vec<Holding>, Vec<SkippedSymbol>) {
    let mut holdings = Vec::new();
    let mut skipped = Vec::new();

    for position in open_positions(ledger) {
        let current_price = match prices.get(&position.symbol) {
            Some(price) if *price > Decimal::ZERO => *price,
            Some(_) => {
                skipped.push(SkippedSymbol {
                    symbol: position.symbol,
                    reason: "price lookup returned no data".to_string(),
                });
                continue;
            }
            None => {
                skipped.push(SkippedSymbol {
                    symbol: position.symbol,
                    reason: "symbol missing from price map".to_string(),
                });
                continue;
            }
        };

        let avg_cost = position.avg_cost();
        let current_value = position.shares * current_price;
        let gain_loss = position.shares * (current_price - avg_cost);
        let cost_basis = position.shares * avg_cost;
        let gain_loss_pct = if cost_basis > Decimal::ZERO {
            gain_loss / cost_basis * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        holdings.push(Holding {
            symbol: position.symbol,
            quantity: position.shares,
            avg_cost,
            total_invested: position.cost,
            current_price,
            current_value,
            gain_loss,
            gain_loss_pct,
            allocation_pct: Decimal::ZERO,
        });
    }

    apply_allocation(&mut holdings);
    (holdings, skipped)
}

/// Allocation percentage per holding; zero when total value is zero
fn apply_allocation(holdings: &mut [Holding]) {
    let total_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
    if total_value > Decimal::ZERO {
        for holding in holdings.iter_mut() {
            holding.allocation_pct = holding.current_value / total_value * Decimal::ONE_HUNDRED;
        }
    }
}

/// Aggregate summary over a holdings table and the full ledger
pub fn portfolio_summary(ledger: &[Transaction], holdings: &[Holding]) -> PortfolioSummary {
    let total_invested: Decimal = holdings.iter().map(|h| h.total_invested).sum();
    let current_value: Decimal = holdings.iter().map(|h| h.current_value).sum();
    let realized_gain_loss = fifo::realized_gains(ledger);
    let unrealized_gain_loss: Decimal = holdings.iter().map(|h| h.gain_loss).sum();

    PortfolioSummary {
        total_invested,
        current_value,
        realized_gain_loss,
        unrealized_gain_loss,
        total_gain_loss: realized_gain_loss + unrealized_gain_loss,
        num_positions: holdings.len(),
    }
}
