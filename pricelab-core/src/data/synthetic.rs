//! Synthetic provider for offline runs and tests.
//!
//! Produces a deterministic daily random walk per symbol (seeded from the
//! symbol name) over every calendar day of the requested range. Symbols in
//! the `unknown` set behave like delisted tickers and fail with
//! `SymbolNotFound`. Results are clearly fake and tagged `Synthetic`.

use super::provider::{DataError, DataProvider, RawBar};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    unknown: HashSet<String>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `symbols` as not listed.
    pub fn with_unknown<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unknown.extend(symbols.into_iter().map(Into::into));
        self
    }

    fn seed(symbol: &str) -> u64 {
        // FNV-1a: stable across runs and platforms
        symbol.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
            (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

/// Random walk bars over `[start, end)`, starting at 100.0.
pub fn generate_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    let mut rng = StdRng::seed_from_u64(SyntheticProvider::seed(symbol));

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current < end {
        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
            adj_close: close,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        if self.unknown.contains(symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(generate_bars(symbol, start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn generates_one_bar_per_calendar_day_excluding_end() {
        let bars = generate_bars("BTC-USD", d("2024-01-01"), d("2024-01-11"));
        assert_eq!(bars.len(), 10);
        assert_eq!(bars[0].date, d("2024-01-01"));
        assert_eq!(bars[9].date, d("2024-01-10"));
        assert!(bars.iter().all(|b| b.low <= b.high && b.adj_close > 0.0));
    }

    #[test]
    fn same_symbol_same_walk() {
        let a = generate_bars("ETH-USD", d("2024-01-01"), d("2024-02-01"));
        let b = generate_bars("ETH-USD", d("2024-01-01"), d("2024-02-01"));
        let c = generate_bars("BTC-USD", d("2024-01-01"), d("2024-02-01"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unknown_symbols_are_not_found() {
        let provider = SyntheticProvider::new().with_unknown(["NOTAREALSYMBOL"]);
        let err = provider
            .fetch("NOTAREALSYMBOL", d("2024-01-01"), d("2024-01-05"))
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
        assert!(provider.fetch("BTC-USD", d("2024-01-01"), d("2024-01-05")).is_ok());
    }
}
