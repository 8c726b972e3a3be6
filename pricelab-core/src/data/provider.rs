//! Data provider trait, raw provider bars and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, the
//! synthetic random walk) so the aggregation fold never knows where a series
//! came from, and tests can script outcomes per symbol.

use super::series::PriceField;
use super::table::PriceTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a data provider, before the designated field is extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Why a single symbol could not be fetched or shaped.
///
/// Every variant is a per-symbol fetch failure: the aggregation fold records
/// it in the failure list and moves on to the next symbol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no '{field}' values for {symbol}")]
    MissingField { symbol: String, field: PriceField },

    #[error("provider refused the request: {0}")]
    Blocked(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for daily price providers.
///
/// Calls are blocking; the fetch loop runs one symbol at a time.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over `[start, end)`. One attempt per call.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError>;
}

/// Progress callback for the multi-symbol fetch loop.
pub trait DownloadProgress {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes, successfully or not.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called after a fetched series has been merged into the accumulating table.
    fn on_merged(&self, _symbol: &str, _table: &PriceTable) {}

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout, including a tail preview of the
/// resampled table after every merge.
pub struct StdoutProgress {
    pub preview_rows: usize,
}

impl Default for StdoutProgress {
    fn default() -> Self {
        Self { preview_rows: 5 }
    }
}

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_merged(&self, _symbol: &str, table: &PriceTable) {
        println!(
            "\nHistorical data, resampled (tail preview):\n{}",
            table.preview(self.preview_rows)
        );
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
