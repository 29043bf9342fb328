use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ShareledgerBot/1.0)";

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    currency: Option<String>,
    #[allow(dead_code)]
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Yahoo Finance quoteSummary response (assetProfile module)
#[derive(Debug, Deserialize)]
struct YahooSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryData,
}

#[derive(Debug, Deserialize)]
struct SummaryData {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(rename = "assetProfile")]
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
}

/// Fetched price data
#[derive(Debug, Clone)]
pub struct PriceData {
    pub ticker: String,
    pub price: Decimal,
    pub currency: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Fetch the current price for a full Yahoo ticker (e.g. "QAN.AX").
///
/// Falls back to the latest close from the chart indicators when the
/// regular market price is absent, as it is for some ETFs.
pub async fn fetch_current_price(ticker: &str) -> Result<PriceData> {
    info!("Fetching current price for {} from Yahoo Finance", ticker);

    let client = Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}",
        ticker
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to send request to Yahoo Finance")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Yahoo Finance returned error status: {}",
            response.status()
        ));
    }

    let data: YahooChartResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance response")?;

    if let Some(error) = data.chart.error {
        return Err(anyhow!(
            "Yahoo Finance API error: {} - {}",
            error.code,
            error.description
        ));
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("No data returned from Yahoo Finance"))?;

    let price = match result.meta.regular_market_price {
        Some(price) => price,
        None => {
            debug!("No regular market price for {}, trying last close", ticker);
            last_close(&result).ok_or_else(|| anyhow!("No price data available"))?
        }
    };

    let currency = result.meta.currency.unwrap_or_else(|| "AUD".to_string());

    Ok(PriceData {
        ticker: ticker.to_string(),
        price: Decimal::from_f64_retain(price).ok_or_else(|| anyhow!("Invalid price value"))?,
        currency,
        timestamp: chrono::Utc::now(),
    })
}

fn last_close(result: &ChartResult) -> Option<f64> {
    result
        .indicators
        .as_ref()?
        .quote
        .first()?
        .close
        .as_ref()?
        .iter()
        .rev()
        .find_map(|c| *c)
}

/// Fetch the sector for a full Yahoo ticker
pub async fn fetch_sector(ticker: &str) -> Result<String> {
    debug!("Fetching sector for {} from Yahoo Finance", ticker);

    let client = Client::builder().user_agent(USER_AGENT).build()?;
    let url = format!(
        "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=assetProfile",
        ticker
    );

    let response = client
        .get(&url)
        .send()
        .await
        .context("Failed to send request to Yahoo Finance")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Yahoo Finance returned error status: {}",
            response.status()
        ));
    }

    let data: YahooSummaryResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance response")?;

    if let Some(error) = data.quote_summary.error {
        return Err(anyhow!(
            "Yahoo Finance API error: {} - {}",
            error.code,
            error.description
        ));
    }

    let sector = data
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.asset_profile)
        .and_then(|p| p.sector)
        .ok_or_else(|| anyhow!("No sector data for {}", ticker))?;

    Ok(sector)
}
