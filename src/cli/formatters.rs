//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::importers::LedgerSummary;
use crate::ledger::Transaction;
use crate::reports::dividends::DividendSummary;
use crate::reports::performance::PerformancePoint;
use crate::reports::portfolio::{Holding, PortfolioSummary, SkippedSymbol};
use crate::reports::sectors::SectorAllocation;
use crate::utils::{format_currency, format_percent};

fn signed_currency(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_currency(value).green().to_string()
    } else {
        format_currency(value).red().to_string()
    }
}

fn signed_percent(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_percent(value).green().to_string()
    } else {
        format_percent(value).red().to_string()
    }
}

/// Format a preview of normalized transactions
pub fn format_transactions_table(ledger: &[Transaction], limit: Option<usize>) -> String {
    #[derive(Tabled)]
    struct TransactionRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Action")]
        action: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Price")]
        price: String,
    }

    let shown = limit.unwrap_or(ledger.len()).min(ledger.len());
    let rows: Vec<TransactionRow> = ledger
        .iter()
        .take(shown)
        .map(|tx| TransactionRow {
            date: tx.date.format("%d/%m/%Y").to_string(),
            symbol: tx.symbol.clone(),
            action: tx.action.as_str().to_string(),
            quantity: tx.quantity.to_string(),
            price: format_currency(tx.price),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(3..), Alignment::right());

    let mut output = table.to_string();
    if ledger.len() > shown {
        output.push_str(&format!(
            "\n... and {} more transactions",
            ledger.len() - shown
        ));
    }
    output
}

/// Format ledger summary statistics
pub fn format_ledger_summary(summary: &LedgerSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{:<22} {}",
        "Total transactions:".bold(),
        summary.total_transactions
    ));
    output.push_str(&format!(
        "\n{:<22} {}",
        "Unique symbols:".bold(),
        summary.unique_symbols
    ));
    output.push_str(&format!(
        "\n{:<22} {} to {}",
        "Date range:".bold(),
        summary.first_date.format("%d/%m/%Y"),
        summary.last_date.format("%d/%m/%Y")
    ));
    output.push_str(&format!("\n{}", "Actions:".bold()));
    for (action, count) in &summary.action_counts {
        output.push_str(&format!("\n  {:<20} {}", action, count));
    }
    output.push('\n');
    output
}

/// Format a holdings table with P&L coloring
pub fn format_holdings_table(holdings: &[Holding]) -> String {
    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Avg Cost")]
        avg_cost: String,
        #[tabled(rename = "Invested")]
        invested: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "P&L")]
        pl: String,
        #[tabled(rename = "Return %")]
        return_pct: String,
        #[tabled(rename = "Alloc %")]
        allocation: String,
    }

    let rows: Vec<HoldingRow> = holdings
        .iter()
        .map(|h| HoldingRow {
            symbol: h.symbol.clone(),
            quantity: h.quantity.to_string(),
            avg_cost: format_currency(h.avg_cost.round_dp(4)),
            invested: format_currency(h.total_invested),
            price: format_currency(h.current_price.round_dp(4)),
            value: format_currency(h.current_value),
            pl: signed_currency(h.gain_loss),
            return_pct: signed_percent(h.gain_loss_pct),
            allocation: format_percent(h.allocation_pct),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format empty holdings message
pub fn format_empty_holdings() -> String {
    format!("{} No holdings found\n", "ℹ".blue().bold())
}

/// Format the aggregate portfolio summary
pub fn format_portfolio_summary(summary: &PortfolioSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{:<22} {}",
        "Total Invested:".bold(),
        format_currency(summary.total_invested)
    ));
    output.push_str(&format!(
        "\n{:<22} {}",
        "Current Value:".bold(),
        format_currency(summary.current_value)
    ));
    output.push_str(&format!(
        "\n{:<22} {}",
        "Realized P&L:".bold(),
        signed_currency(summary.realized_gain_loss)
    ));
    output.push_str(&format!(
        "\n{:<22} {}",
        "Unrealized P&L:".bold(),
        signed_currency(summary.unrealized_gain_loss)
    ));
    output.push_str(&format!(
        "\n{:<22} {}",
        "Total P&L:".bold(),
        signed_currency(summary.total_gain_loss)
    ));
    output.push_str(&format!(
        "\n{:<22} {}\n",
        "Open Positions:".bold(),
        summary.num_positions
    ));
    output
}

/// Format dividend totals and history
pub fn format_dividends(summary: &DividendSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{:<22} {}",
        "Total Dividends:".bold(),
        signed_currency(summary.total_dividends)
    ));
    output.push_str(&format!(
        "\n{:<22} {}\n",
        "Dividend Count:".bold(),
        summary.dividend_count
    ));

    if summary.history.is_empty() {
        output.push_str(&format!("\n{} No dividend history found\n", "ℹ".blue().bold()));
        return output;
    }

    #[derive(Tabled)]
    struct DividendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Amount")]
        amount: String,
    }

    let rows: Vec<DividendRow> = summary
        .history
        .iter()
        .map(|e| DividendRow {
            date: e.date.format("%d/%m/%Y").to_string(),
            symbol: e.symbol.clone(),
            amount: signed_currency(e.amount),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..), Alignment::right());
    output.push('\n');
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format the invested-capital timeline
pub fn format_performance(points: &[PerformancePoint]) -> String {
    #[derive(Tabled)]
    struct PerformanceRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Invested")]
        invested: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<PerformanceRow> = points
        .iter()
        .map(|p| PerformanceRow {
            date: p.date.format("%d/%m/%Y").to_string(),
            invested: format_currency(p.cumulative_investment),
            value: format_currency(p.portfolio_value),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format sector allocations
pub fn format_sectors(allocations: &[SectorAllocation]) -> String {
    #[derive(Tabled)]
    struct SectorRow {
        #[tabled(rename = "Sector")]
        sector: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Alloc %")]
        allocation: String,
    }

    let rows: Vec<SectorRow> = allocations
        .iter()
        .map(|a| SectorRow {
            sector: a.sector.clone(),
            value: format_currency(a.value),
            allocation: format_percent(a.allocation_pct),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format symbols excluded from priced holdings
pub fn format_skipped(skipped: &[SkippedSymbol]) -> String {
    let mut output = format!(
        "\n{} Skipped {} symbol(s) with failed price lookups:",
        "⚠".yellow().bold(),
        skipped.len()
    );
    for skip in skipped {
        output.push_str(&format!("\n  {} - {}", skip.symbol, skip.reason));
    }
    output.push('\n');
    output
}
