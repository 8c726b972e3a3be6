//! Price data: providers, per-symbol series, the aligned table and the
//! multi-symbol aggregation fold.

pub mod aggregate;
pub mod period;
pub mod provider;
pub mod series;
pub mod synthetic;
pub mod table;
pub mod yahoo;

pub use aggregate::{
    aggregate, fetch_symbol, Aggregation, Aggregator, FailedSymbol, FailureList, FetchRequest,
    SymbolOutcome,
};
pub use period::{Period, PeriodParseError};
pub use provider::{DataError, DataProvider, DownloadProgress, RawBar, StdoutProgress};
pub use series::{PriceField, PriceSeries};
pub use synthetic::SyntheticProvider;
pub use table::{PriceTable, TableColumn, TableError};
pub use yahoo::YahooProvider;
