//! Multi-symbol fetch and aggregation.
//!
//! Each symbol is fetched independently and turned into an explicit
//! [`SymbolOutcome`]. The outcomes are folded into one outer-joined table
//! plus an append-only failure list; a failing symbol never aborts the loop
//! and never rolls back earlier merges. The merged daily table is resampled
//! once, after the last symbol.

use super::period::Period;
use super::provider::{DataError, DataProvider, DownloadProgress};
use super::series::{PriceField, PriceSeries};
use super::table::PriceTable;
use crate::analysis::returns::Returns;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// What to request for every symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// First day requested (inclusive).
    pub start: NaiveDate,
    /// Day the range stops at (exclusive); normally today.
    pub end: NaiveDate,
    /// Bar field kept as the symbol's price.
    pub field: PriceField,
}

/// Outcome of fetching one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Fetched(PriceSeries),
    Failed { symbol: String, error: DataError },
}

/// A symbol that could not be fetched and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Ordered record of failed symbols. Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureList {
    entries: Vec<FailedSymbol>,
}

impl FailureList {
    pub fn push(&mut self, symbol: impl Into<String>, reason: impl Into<String>) {
        self.entries.push(FailedSymbol {
            symbol: symbol.into(),
            reason: reason.into(),
        });
    }

    pub fn extend(&mut self, other: FailureList) {
        self.entries.extend(other.entries);
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedSymbol> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resampled price table plus the symbols that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub table: PriceTable,
    pub failures: FailureList,
}

/// Fetch one symbol and extract its designated price field.
pub fn fetch_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    request: &FetchRequest,
) -> SymbolOutcome {
    let result = provider
        .fetch(symbol, request.start, request.end)
        .and_then(|bars| PriceSeries::from_bars(symbol, &bars, request.field));

    match result {
        Ok(series) => SymbolOutcome::Fetched(series),
        Err(error) => SymbolOutcome::Failed {
            symbol: symbol.to_string(),
            error,
        },
    }
}

/// Fetch every symbol in order and fold the outcomes into one table.
pub fn aggregate(
    provider: &dyn DataProvider,
    symbols: &[&str],
    period: Period,
    request: &FetchRequest,
    progress: Option<&dyn DownloadProgress>,
) -> Aggregation {
    let total = symbols.len();
    info!(
        provider = provider.name(),
        total,
        %period,
        start = %request.start,
        end = %request.end,
        field = %request.field,
        "fetching historical data"
    );

    let (daily, failures) = symbols.iter().enumerate().fold(
        (PriceTable::new(), FailureList::default()),
        |(table, mut failures), (i, symbol)| {
            if table.column(symbol).is_some() {
                debug!(symbol, "already merged, skipping duplicate");
                return (table, failures);
            }

            if let Some(p) = progress {
                p.on_start(symbol, i, total);
            }

            match fetch_symbol(provider, symbol, request) {
                SymbolOutcome::Fetched(series) => {
                    debug!(symbol, points = series.len(), "fetched");
                    let merged = table.outer_join(&PriceTable::from_series(&series));
                    if let Some(p) = progress {
                        p.on_complete(symbol, i, total, &Ok(()));
                        p.on_merged(symbol, &merged.resample_last(period));
                    }
                    (merged, failures)
                }
                SymbolOutcome::Failed { symbol, error } => {
                    failures.push(symbol.clone(), error.to_string());
                    warn!(
                        symbol = %symbol,
                        error = %error,
                        failed = ?failures.symbols(),
                        "could not download data"
                    );
                    if let Some(p) = progress {
                        p.on_complete(&symbol, i, total, &Err(error));
                    }
                    (table, failures)
                }
            }
        },
    );

    let table = daily.resample_last(period);

    if let Some(p) = progress {
        p.on_batch_complete(table.width(), failures.len(), total);
    }
    info!(
        columns = table.width(),
        rows = table.len(),
        failed = failures.len(),
        "aggregation complete"
    );

    Aggregation { table, failures }
}

/// Session owning the price table, the failure list and the derived returns.
///
/// Repeated [`Aggregator::historical_data`] calls outer-join new symbols into
/// the existing table and keep appending to the same failure list.
pub struct Aggregator<'a> {
    provider: &'a dyn DataProvider,
    request: FetchRequest,
    progress: Option<&'a dyn DownloadProgress>,
    prices: PriceTable,
    failures: FailureList,
    returns: Option<Returns>,
}

impl<'a> Aggregator<'a> {
    pub fn new(provider: &'a dyn DataProvider, request: FetchRequest) -> Self {
        Self {
            provider,
            request,
            progress: None,
            prices: PriceTable::new(),
            failures: FailureList::default(),
            returns: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn DownloadProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fetch `symbols`, merge them into the session table and resample to `period`.
    pub fn historical_data(&mut self, symbols: &[&str], period: Period) -> &PriceTable {
        let Aggregation { table, failures } =
            aggregate(self.provider, symbols, period, &self.request, self.progress);
        self.prices = self.prices.outer_join(&table).resample_last(period);
        self.failures.extend(failures);
        &self.prices
    }

    /// Derive simple and cumulative returns from the current table,
    /// replacing any earlier result.
    pub fn compute_returns(&mut self) -> &Returns {
        self.returns.insert(Returns::compute(&self.prices))
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn failures(&self) -> &FailureList {
        &self.failures
    }

    pub fn returns(&self) -> Option<&Returns> {
        self.returns.as_ref()
    }
}
