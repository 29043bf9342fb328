//! Display-name to Yahoo ticker resolution
//!
//! The broker export names markets by company/fund name, not ticker.
//! The compiled-in map covers the known universe; config overrides win.

use std::collections::HashMap;

/// Known market-name → Yahoo ticker pairs, keys matched case-insensitively
const BUILTIN_TICKERS: &[(&str, &str)] = &[
    ("Afterpay Limited", "APT.AX"),
    ("Altium Limited", "ALU.AX"),
    ("Appen Limited", "APX.AX"),
    ("Arcadium Lithium Plc", "ACY"),
    ("A2 Milk Co Ltd", "A2M.AX"),
    ("Bapcor Ltd", "BAP.AX"),
    ("Betashares Crude Oil Index Etf", "OOO.AX"),
    ("Betashares Global Sustainability Leaders Etf", "ETHI.AX"),
    ("Betashares Nasdaq 100 Etf", "NDX.AX"),
    ("Betashares S&P 500 Yield Maximiser Fund", "UMAX.AX"),
    ("Betashares Asia Technology Tigers Etf", "ASIA.AX"),
    ("Betashares Crypto Innovators Etf", "CRYP.AX"),
    ("Betashares India Quality Etf", "IIND.AX"),
    ("Blackmores Ltd", "BKL.AX"),
    ("Block Inc (Au)", "XYZ.AX"),
    ("Bwx Limited", "BWX.AX"),
    ("Commonwealth Bank Of Australia", "CBA.AX"),
    ("Flight Centre Travel Group Ltd", "FLT.AX"),
    ("Invesco Qqq Trust Series 1 (All Sessions)", "QQQ"),
    ("Jumbo Interactive Ltd", "JIN.AX"),
    ("Nearmap Ltd", "NEA.AX"),
    ("Orocobre Ltd", "ORE.AX"),
    ("Polynovo Limited", "PNV.AX"),
    ("Pushpay Holdings Limited", "PPH.AX"),
    ("Qantas Airways Ltd", "QAN.AX"),
    ("Santos Ltd", "STO.AX"),
    ("Spdr S&P/Asx 200 Fund", "STW.AX"),
    ("Transurban Group", "TCL.AX"),
    ("Treasury Wine Estates Ltd", "TWE.AX"),
    ("Vanguard Australian Shares High Yield Etf", "VHY.AX"),
    ("Vanguard Australian Shares Index Etf", "VAS.AX"),
    ("Vanguard Diversified Growth Index Etf", "VDGR.AX"),
    ("Vanguard Msci Index International Shares Etf", "VGS.AX"),
    ("Vanguard Total Stock Market Index Fund Etf", "VTI"),
    ("Vanguard Total Stock Market Index Fund Etf Sh Ae - Vti", "VTI"),
    ("Webjet Ltd", "WEB.AX"),
    ("Woodside Energy Group Limited", "WDS.AX"),
];

/// Resolves ledger symbols (uppercased market names) to Yahoo tickers
#[derive(Debug, Clone)]
pub struct TickerMap {
    map: HashMap<String, String>,
}

impl TickerMap {
    /// The compiled-in map alone
    pub fn builtin() -> Self {
        Self::with_overrides(&HashMap::new())
    }

    /// Compiled-in map plus config overrides; overrides win on conflict
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut map: HashMap<String, String> = BUILTIN_TICKERS
            .iter()
            .map(|(name, ticker)| (name.to_uppercase(), ticker.to_string()))
            .collect();
        for (name, ticker) in overrides {
            map.insert(name.trim().to_uppercase(), ticker.clone());
        }
        Self { map }
    }

    /// Resolve a ledger symbol; unknown symbols pass through unchanged
    pub fn resolve(&self, symbol: &str) -> String {
        self.map
            .get(&symbol.trim().to_uppercase())
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }
}

impl Default for TickerMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_uppercased_ledger_symbols() {
        let tickers = TickerMap::builtin();
        assert_eq!(tickers.resolve("QANTAS AIRWAYS LTD"), "QAN.AX");
        assert_eq!(tickers.resolve("Polynovo Limited"), "PNV.AX");
    }

    #[test]
    fn test_unknown_symbol_passes_through() {
        let tickers = TickerMap::builtin();
        assert_eq!(tickers.resolve("SOME NEW FUND"), "SOME NEW FUND");
    }

    #[test]
    fn test_overrides_win_over_builtin() {
        let overrides = HashMap::from([
            ("Qantas Airways Ltd".to_string(), "QAN2.AX".to_string()),
            ("My Custom Fund".to_string(), "MCF.AX".to_string()),
        ]);
        let tickers = TickerMap::with_overrides(&overrides);
        assert_eq!(tickers.resolve("QANTAS AIRWAYS LTD"), "QAN2.AX");
        assert_eq!(tickers.resolve("MY CUSTOM FUND"), "MCF.AX");
    }
}
