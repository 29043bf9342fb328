// Reports module - holdings, gains, dividend and performance figures

pub mod dividends;
pub mod fifo;
pub mod performance;
pub mod portfolio;
pub mod sectors;

pub use dividends::{dividend_summary, DividendSummary};
pub use fifo::realized_gains;
pub use portfolio::{
    calculate_holdings, calculate_holdings_with_prices, portfolio_summary, Holding,
    PortfolioSummary, SkippedSymbol,
};
