//! Row classifier and transaction normalizer
//!
//! Maps one raw export row to exactly one [`NormalizedRecord`] through an
//! ordered chain of textual pattern rules over the MarketName field. The
//! rules are not fully disjoint in theory (a MarketName could contain
//! both "COMM" and "CONS"), so first match wins and the order here is
//! load-bearing.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::error::LedgerError;
use crate::importers::csv_reader::RawRow;
use crate::ledger::{
    Action, NormalizedRecord, CASH_DEPOSIT, CASH_WITHDRAWAL, COMMISSION, UNKNOWN_STOCK,
};

/// Allowed discrepancy between a parsed quantity×price and the source
/// PL Amount before the PL Amount is trusted instead: 0.02
fn reconcile_tolerance() -> Decimal {
    Decimal::new(2, 2)
}

/// Currency symbols and thousands separators stripped before numeric parsing
static CURRENCY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$,]").unwrap());

const SHARE_DEALING_COMMISSIONS: &str = "Share Dealing Commissions";

/// Normalize every raw row, failing the batch on the first bad row
pub fn normalize_rows(rows: &[RawRow]) -> Result<Vec<NormalizedRecord>> {
    rows.iter().map(normalize_row).collect()
}

/// Classify one raw row into a normalized record.
///
/// All required fields must be present and non-empty; absence is a hard
/// failure carrying the 1-based row number, never a default.
pub fn normalize_row(raw: &RawRow) -> Result<NormalizedRecord> {
    let row = raw.row;

    if raw.transaction_type.is_empty() {
        return Err(parse_err(row, "Transaction type column cannot be null or empty"));
    }
    if raw.market_name.is_empty() {
        return Err(parse_err(row, "MarketName column cannot be null or empty"));
    }
    if raw.pl_amount.is_empty() {
        return Err(parse_err(row, "PL Amount column cannot be null"));
    }
    if raw.text_date.is_empty() {
        return Err(parse_err(row, "TextDate column cannot be null or empty"));
    }

    let pl_amount = parse_amount(&raw.pl_amount).map_err(|_| {
        parse_err(
            row,
            format!("Cannot convert PL Amount ('{}') to number", raw.pl_amount),
        )
    })?;

    let transaction_type = raw.transaction_type.as_str();
    if transaction_type != "DEPO" && transaction_type != "WITH" {
        return Err(parse_err(
            row,
            format!(
                "Transaction type must be 'DEPO' or 'WITH', found '{}'",
                transaction_type
            ),
        ));
    }

    // Empty Summary on a WITH transaction with negative PL Amount means a
    // commission fee row; the commission rule below relies on this default.
    let summary = if raw.summary.is_empty() {
        if transaction_type == "WITH" && pl_amount < Decimal::ZERO {
            SHARE_DEALING_COMMISSIONS.to_string()
        } else {
            String::new()
        }
    } else {
        raw.summary.clone()
    };

    let market_name = raw.market_name.as_str();

    let (symbol, action, quantity, price) = if market_name.contains("Card payment") {
        // Cash flow into the account, not a stock trade
        (
            CASH_DEPOSIT.to_string(),
            Action::CashIn,
            Decimal::ONE,
            pl_amount.abs(),
        )
    } else if market_name.contains("Returned to card") {
        (
            CASH_WITHDRAWAL.to_string(),
            Action::CashOut,
            Decimal::ONE,
            pl_amount.abs(),
        )
    } else if market_name.contains("DIVIDEND") {
        let stock_name = market_name.split("DIVIDEND").next().unwrap_or("").trim();
        if stock_name.is_empty() {
            return Err(parse_err(
                row,
                format!(
                    "Cannot extract stock name from dividend transaction: {}",
                    market_name
                ),
            ));
        }
        let action = if pl_amount < Decimal::ZERO {
            Action::DividendWithdrawal
        } else {
            Action::Dividend
        };
        (stock_name.to_string(), action, Decimal::ONE, pl_amount.abs())
    } else if market_name.contains("COMM") {
        (
            COMMISSION.to_string(),
            Action::Commission,
            Decimal::ONE,
            pl_amount.abs(),
        )
    } else if market_name.contains("CONS") {
        let trade = parse_cons_trade(market_name, row, pl_amount)?;
        let action = if transaction_type == "WITH" {
            Action::Buy
        } else {
            Action::Sell
        };
        (trade.stock_name, action, trade.quantity, trade.unit_price)
    } else if summary == SHARE_DEALING_COMMISSIONS
        || (market_name.is_empty() && transaction_type == "WITH" && pl_amount < Decimal::ZERO)
    {
        (
            COMMISSION.to_string(),
            Action::Commission,
            Decimal::ONE,
            pl_amount.abs(),
        )
    } else if pl_amount < Decimal::ZERO && summary.eq_ignore_ascii_case("DIVIDEND") {
        let symbol = if market_name.is_empty() {
            UNKNOWN_STOCK.to_string()
        } else {
            market_name.to_string()
        };
        (
            symbol,
            Action::DividendWithdrawal,
            Decimal::ONE,
            pl_amount.abs(),
        )
    } else {
        return Err(parse_err(
            row,
            format!(
                "Unknown MarketName format: {}, Summary: {}",
                market_name, summary
            ),
        ));
    };

    Ok(NormalizedRecord {
        row,
        date: raw.text_date.clone(),
        symbol,
        action,
        quantity,
        price,
    })
}

/// A parsed CONS stock trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsTrade {
    pub stock_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Parse a `<StockName>CONS <qty>@<scaled_price> <brokerRef>` MarketName.
///
/// The broker encodes the unit price ×100, so the parsed price is always
/// divided by 100 ("527.5" → 5.275, "229" → 2.29) regardless of magnitude.
/// When quantity×price disagrees with |PL Amount| beyond the tolerance,
/// the PL Amount is trusted as ground truth: the unit price is recomputed
/// from it and a warning is emitted instead of failing the row.
pub fn parse_cons_trade(
    market_name: &str,
    row: usize,
    pl_amount: Decimal,
) -> Result<ConsTrade> {
    let parts: Vec<&str> = market_name.split("CONS").collect();
    if parts.len() != 2 {
        return Err(parse_err(
            row,
            format!(
                "Invalid CONS format - must contain exactly one 'CONS': {}",
                market_name
            ),
        ));
    }

    let stock_name = parts[0].trim();
    let details = parts[1].trim();

    if stock_name.is_empty() {
        return Err(parse_err(
            row,
            format!("Stock name cannot be empty in: {}", market_name),
        ));
    }

    if !details.contains('@') {
        return Err(parse_err(
            row,
            format!("Missing @ symbol in transaction details: {}", details),
        ));
    }

    // First whitespace-delimited token is the qty@price field; anything
    // after it is the broker reference.
    let quantity_price = details.split_whitespace().next().unwrap_or(details);

    let (quantity_str, price_str) = quantity_price.split_once('@').ok_or_else(|| {
        parse_err(
            row,
            format!("Invalid quantity@price format: {}", quantity_price),
        )
    })?;

    let quantity: i64 = quantity_str
        .trim()
        .parse()
        .map_err(|_| parse_err(row, format!("Invalid quantity '{}'", quantity_str)))?;
    if quantity <= 0 {
        return Err(parse_err(
            row,
            format!("Quantity must be positive: {}", quantity),
        ));
    }
    let quantity = Decimal::from(quantity);

    let price_value = Decimal::from_str(price_str.trim())
        .map_err(|_| parse_err(row, format!("Invalid price '{}'", price_str)))?;
    let mut unit_price = price_value / Decimal::ONE_HUNDRED;
    if unit_price <= Decimal::ZERO {
        return Err(parse_err(
            row,
            format!("Price must be positive: {}", unit_price),
        ));
    }

    let calculated_total = quantity * unit_price;
    let pl_amount_abs = pl_amount.abs();
    if (calculated_total - pl_amount_abs).abs() > reconcile_tolerance() {
        warn!(
            "row {}: calculated total ({}) doesn't match PL Amount ({}) - using PL Amount for accuracy",
            row,
            calculated_total.round_dp(2),
            pl_amount_abs.round_dp(2)
        );
        unit_price = pl_amount_abs / quantity;
    }

    Ok(ConsTrade {
        stock_name: stock_name.to_string(),
        quantity,
        unit_price,
    })
}

/// Parse a numeric amount, dropping stray currency symbols and separators
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let cleaned = CURRENCY_NOISE.replace_all(text.trim(), "");
    Decimal::from_str(&cleaned).map_err(|e| anyhow::anyhow!(e))
}

fn parse_err(row: usize, message: impl Into<String>) -> anyhow::Error {
    LedgerError::parse(row, message).into()
}
