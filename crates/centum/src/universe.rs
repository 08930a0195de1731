//! Symbol lists used to bootstrap the ticker registry.
//!
//! The index itself is re-ranked from market data every day; this list only
//! decides which symbols are registered and fetched.

/// Trait for symbol universes.
pub trait Universe {
    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().iter().any(|s| s == symbol)
    }

    /// Get the number of symbols.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

/// Large-cap US stocks, in Yahoo Finance notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUniverse {
    symbols: Vec<String>,
}

impl Default for SeedUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedUniverse {
    /// Create the default large-cap universe.
    pub fn new() -> Self {
        Self::from_symbols(DEFAULT_SYMBOLS.iter().copied())
    }

    /// Create a universe from explicit symbols. Symbols are trimmed,
    /// upper-cased and de-duplicated; blanks are dropped.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = std::collections::HashSet::new();
        let symbols = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();

        Self { symbols }
    }
}

impl Universe for SeedUniverse {
    fn symbols(&self) -> Vec<String> {
        self.symbols.clone()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    fn size(&self) -> usize {
        self.symbols.len()
    }
}

const DEFAULT_SYMBOLS: &[&str] = &[
    // Information Technology
    "AAPL", "MSFT", "NVDA", "AVGO", "ORCL", "CSCO", "ACN", "AMD", "IBM", "INTC", "TXN", "QCOM",
    "ADBE", "CRM", "NOW", "INTU", "AMAT", "MU", "LRCX", "ADI", "KLAC", "PANW", "ANET",
    // Health Care
    "LLY", "UNH", "JNJ", "ABBV", "MRK", "TMO", "ABT", "DHR", "PFE", "BMY", "AMGN", "GILD", "ISRG",
    "VRTX", "SYK", "MDT", "ELV", "CVS", "REGN", "BSX", "CI", "ZTS",
    // Financials
    "BRK-B", "JPM", "V", "MA", "BAC", "WFC", "MS", "GS", "BLK", "C", "AXP", "SCHW", "SPGI", "PGR",
    "CB", "MMC", "BX", "KKR", "PYPL", "USB", "PNC", "ICE", "CME",
    // Consumer Discretionary
    "AMZN", "TSLA", "HD", "MCD", "NKE", "SBUX", "LOW", "TJX", "BKNG", "CMG", "F", "GM", "ABNB",
    "ORLY", "MAR",
    // Communication Services
    "GOOGL", "GOOG", "META", "NFLX", "DIS", "CMCSA", "T", "VZ", "TMUS", "EA",
    // Industrials
    "CAT", "UNP", "RTX", "HON", "UPS", "BA", "DE", "LMT", "GE", "MMM", "FDX", "NSC", "ETN", "ADP",
    "WM", "GD", "NOC", "ITW", "CSX", "EMR",
    // Consumer Staples
    "WMT", "PG", "COST", "KO", "PEP", "PM", "MO", "CL", "MDLZ", "KHC", "TGT",
    // Energy
    "XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "OXY", "HAL",
    // Utilities
    "NEE", "SO", "DUK", "CEG", "AEP", "EXC", "XEL", "D",
    // Real Estate
    "PLD", "AMT", "EQIX", "CCI", "PSA", "SPG", "O", "WELL",
    // Materials
    "LIN", "APD", "SHW", "FCX", "NEM", "ECL", "DD", "DOW", "PPG", "NUE",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_universe() {
        let universe = SeedUniverse::new();

        assert!(universe.contains("AAPL"));
        assert!(universe.contains("BRK-B"));
        assert!(!universe.contains("NOTREAL"));
        // Enough candidates for a full index
        assert!(universe.size() > 100);
    }

    #[test]
    fn test_no_duplicates() {
        let symbols = SeedUniverse::new().symbols();
        let unique: std::collections::HashSet<_> = symbols.iter().collect();
        assert_eq!(unique.len(), symbols.len());
    }

    #[test]
    fn test_from_symbols_normalizes() {
        let universe = SeedUniverse::from_symbols([" aapl", "MSFT", "", "msft"]);
        assert_eq!(universe.symbols(), vec!["AAPL", "MSFT"]);
    }
}
