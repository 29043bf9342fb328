use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::info;

use shareledger::cli::{formatters, Cli, Commands};
use shareledger::config::Config;
use shareledger::importers;
use shareledger::ledger::{equity_symbols, Transaction};
use shareledger::pricing::{tickers::TickerMap, CachedPriceSource, YahooSource};
use shareledger::reports::{
    calculate_holdings, calculate_holdings_with_prices, dividend_summary, performance,
    portfolio_summary, sectors, Holding, SkippedSymbol,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref().map(Path::new))?;

    match cli.command {
        Commands::Report { file, offline } => handle_report(&file, offline, &config, cli.json).await,
        Commands::Holdings { file, offline } => {
            handle_holdings(&file, offline, &config, cli.json).await
        }
        Commands::Summary { file, offline } => {
            handle_summary(&file, offline, &config, cli.json).await
        }
        Commands::Dividends { file } => handle_dividends(&file, cli.json),
        Commands::Performance { file } => handle_performance(&file, cli.json),
        Commands::Sectors { file } => handle_sectors(&file, &config, cli.json).await,
        Commands::Inspect { file, full } => handle_inspect(&file, full, cli.json),
    }
}

/// Build the price source and value holdings against live lookups
async fn priced_holdings(
    ledger: &[Transaction],
    config: &Config,
) -> (Vec<Holding>, Vec<SkippedSymbol>) {
    let tickers = TickerMap::with_overrides(&config.tickers);
    let source = CachedPriceSource::new(YahooSource::new(tickers), &config.pricing);

    let symbols = equity_symbols(ledger);
    info!("Fetching current prices for {} symbols", symbols.len());
    let prices = source.get_current_prices(&symbols).await;

    calculate_holdings_with_prices(ledger, &prices)
}

async fn resolve_holdings(
    ledger: &[Transaction],
    offline: bool,
    config: &Config,
) -> (Vec<Holding>, Vec<SkippedSymbol>) {
    if offline {
        (calculate_holdings(ledger), Vec::new())
    } else {
        priced_holdings(ledger, config).await
    }
}

async fn handle_report(file: &str, offline: bool, config: &Config, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let (holdings, skipped) = resolve_holdings(&ledger, offline, config).await;
    let summary = portfolio_summary(&ledger, &holdings);
    let dividends = dividend_summary(&ledger);

    if json {
        let report = serde_json::json!({
            "summary": summary,
            "holdings": holdings,
            "skipped": skipped,
            "dividends": dividends,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n{} Found {} transactions",
        "✓".green().bold(),
        ledger.len()
    );

    println!("\n{} Portfolio Summary", "📊".cyan().bold());
    print!("{}", formatters::format_portfolio_summary(&summary));

    println!("\n{} Holdings", "📈".cyan().bold());
    if holdings.is_empty() {
        print!("{}", formatters::format_empty_holdings());
    } else {
        println!("{}", formatters::format_holdings_table(&holdings));
    }
    if !skipped.is_empty() {
        print!("{}", formatters::format_skipped(&skipped));
    }

    println!("\n{} Dividends", "💰".cyan().bold());
    print!("{}", formatters::format_dividends(&dividends));

    Ok(())
}

async fn handle_holdings(file: &str, offline: bool, config: &Config, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let (holdings, skipped) = resolve_holdings(&ledger, offline, config).await;

    if json {
        let report = serde_json::json!({ "holdings": holdings, "skipped": skipped });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if holdings.is_empty() {
        print!("{}", formatters::format_empty_holdings());
    } else {
        println!("{}", formatters::format_holdings_table(&holdings));
    }
    if !skipped.is_empty() {
        print!("{}", formatters::format_skipped(&skipped));
    }

    Ok(())
}

async fn handle_summary(file: &str, offline: bool, config: &Config, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let (holdings, _) = resolve_holdings(&ledger, offline, config).await;
    let summary = portfolio_summary(&ledger, &holdings);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print!("{}", formatters::format_portfolio_summary(&summary));
    Ok(())
}

fn handle_dividends(file: &str, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let dividends = dividend_summary(&ledger);

    if json {
        println!("{}", serde_json::to_string_pretty(&dividends)?);
        return Ok(());
    }

    print!("{}", formatters::format_dividends(&dividends));
    Ok(())
}

fn handle_performance(file: &str, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let points = performance::investment_over_time(&ledger);

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    if points.is_empty() {
        println!("{} No equity trades found", "ℹ".blue().bold());
    } else {
        println!("{}", formatters::format_performance(&points));
    }
    Ok(())
}

async fn handle_sectors(file: &str, config: &Config, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let (holdings, skipped) = priced_holdings(&ledger, config).await;

    let tickers = TickerMap::with_overrides(&config.tickers);
    let source = CachedPriceSource::new(YahooSource::new(tickers), &config.pricing);
    let mut sector_map = HashMap::new();
    for holding in &holdings {
        let sector = source.get_stock_sector(&holding.symbol).await;
        sector_map.insert(holding.symbol.clone(), sector);
    }

    let allocations = sectors::sector_allocation(&holdings, &sector_map);

    if json {
        let report = serde_json::json!({ "sectors": allocations, "skipped": skipped });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if allocations.is_empty() {
        print!("{}", formatters::format_empty_holdings());
    } else {
        println!("{}", formatters::format_sectors(&allocations));
    }
    if !skipped.is_empty() {
        print!("{}", formatters::format_skipped(&skipped));
    }
    Ok(())
}

fn handle_inspect(file: &str, full: bool, json: bool) -> Result<()> {
    let ledger = importers::import_transactions(file)?;
    let summary = importers::summarize(&ledger);

    if json {
        let report = serde_json::json!({ "summary": summary, "transactions": ledger });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n{} Found {} transactions\n",
        "✓".green().bold(),
        ledger.len()
    );

    let limit = if full { None } else { Some(10) };
    println!("{}", formatters::format_transactions_table(&ledger, limit));

    if let Some(summary) = summary {
        print!("{}", formatters::format_ledger_summary(&summary));
    }

    Ok(())
}
