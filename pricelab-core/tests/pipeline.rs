//! End-to-end tests for fetch → aggregate → returns → correlation, using a
//! scripted provider and the synthetic random walk.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::cell::RefCell;
use std::collections::HashMap;
use pricelab_core::analysis::{CorrelationMatrix, Returns};
use pricelab_core::data::{
    aggregate, Aggregator, DataError, DataProvider, DownloadProgress, FetchRequest, Period,
    PriceField, PriceTable, RawBar, SyntheticProvider,
};
use pricelab_core::export::{export_table, ExportOptions};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn request(start: &str, end: &str) -> FetchRequest {
    FetchRequest {
        start: d(start),
        end: d(end),
        field: PriceField::AdjClose,
    }
}

/// One bar per calendar day from `start`, adjusted close taken from `closes`.
fn daily_bars(start: &str, closes: &[f64]) -> Vec<RawBar> {
    let start = d(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| RawBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
            adj_close: close,
        })
        .collect()
}

/// Provider returning a fixed outcome per symbol and recording every request.
struct ScriptedProvider {
    outcomes: HashMap<String, Result<Vec<RawBar>, DataError>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn with(mut self, symbol: &str, outcome: Result<Vec<RawBar>, DataError>) -> Self {
        self.outcomes.insert(symbol.to_string(), outcome);
        self
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(&self, symbol: &str, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        self.calls.borrow_mut().push(symbol.to_string());
        match self.outcomes.get(symbol) {
            Some(outcome) => outcome.clone(),
            None => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }
}

/// Records every callback so tests can assert on the reporting order.
#[derive(Default)]
struct RecordingProgress {
    events: RefCell<Vec<String>>,
}

impl DownloadProgress for RecordingProgress {
    fn on_start(&self, symbol: &str, _index: usize, _total: usize) {
        self.events.borrow_mut().push(format!("start {symbol}"));
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, result: &Result<(), DataError>) {
        let tag = if result.is_ok() { "ok" } else { "err" };
        self.events.borrow_mut().push(format!("{tag} {symbol}"));
    }

    fn on_merged(&self, symbol: &str, table: &PriceTable) {
        self.events
            .borrow_mut()
            .push(format!("merged {symbol} width={} rows={}", table.width(), table.len()));
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        self.events
            .borrow_mut()
            .push(format!("done {succeeded}/{failed}/{total}"));
    }
}

#[test]
fn all_valid_symbols_produce_one_column_each() {
    let provider = SyntheticProvider::new();
    let agg = aggregate(
        &provider,
        &["BTC-USD", "ETH-USD", "USDT-USD"],
        Period::Weekly,
        &request("2024-01-01", "2024-03-01"),
        None,
    );

    assert!(agg.failures.is_empty());
    assert_eq!(agg.table.symbols(), vec!["BTC-USD", "ETH-USD", "USDT-USD"]);

    // 2024-01-01 (Mon) .. 2024-02-29 (Thu): weeks ending Jan 7 .. Mar 3
    assert_eq!(agg.table.len(), 9);
    assert_eq!(agg.table.dates()[0], d("2024-01-07"));
    assert_eq!(agg.table.dates()[8], d("2024-03-03"));
    assert!(agg.table.dates().iter().all(|d| d.weekday() == Weekday::Sun));
    assert!(agg.table.dates().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unknown_symbol_is_recorded_and_skipped() {
    let provider = SyntheticProvider::new().with_unknown(["NOTAREALSYMBOL"]);
    let agg = aggregate(
        &provider,
        &["BTC-USD", "NOTAREALSYMBOL"],
        Period::Weekly,
        &request("2024-01-01", "2024-03-01"),
        None,
    );

    assert_eq!(agg.failures.symbols(), vec!["NOTAREALSYMBOL"]);
    assert_eq!(agg.table.symbols(), vec!["BTC-USD"]);
    assert!(agg.table.column("NOTAREALSYMBOL").is_none());
}

#[test]
fn failures_keep_input_order_and_never_roll_back_merges() {
    let provider = ScriptedProvider::new()
        .with("A", Ok(daily_bars("2024-01-01", &[1.0, 2.0, 3.0])))
        .with("B", Err(DataError::NetworkUnreachable("timeout".into())))
        .with("C", Ok(daily_bars("2024-01-02", &[5.0, 6.0])))
        .with("D", Err(DataError::ResponseFormatChanged("no chart".into())));

    let agg = aggregate(
        &provider,
        &["A", "B", "C", "D", "E"],
        Period::Daily,
        &request("2024-01-01", "2024-01-10"),
        None,
    );

    assert_eq!(agg.failures.symbols(), vec!["B", "D", "E"]);
    assert_eq!(agg.table.symbols(), vec!["A", "C"]);
    assert_eq!(agg.table.len(), 3);
    assert_eq!(agg.table.value(0, "C"), None);
    assert_eq!(agg.table.value(2, "C"), Some(6.0));
    assert!(agg
        .failures
        .iter()
        .any(|f| f.symbol == "B" && f.reason.contains("timeout")));
}

#[test]
fn missing_price_field_counts_as_failure() {
    let mut bars = daily_bars("2024-01-01", &[1.0, 2.0]);
    for bar in &mut bars {
        bar.adj_close = f64::NAN;
    }
    let provider = ScriptedProvider::new()
        .with("NOADJ", Ok(bars))
        .with("OK", Ok(daily_bars("2024-01-01", &[1.0, 2.0])));

    let agg = aggregate(
        &provider,
        &["NOADJ", "OK"],
        Period::Daily,
        &request("2024-01-01", "2024-01-03"),
        None,
    );

    assert_eq!(agg.failures.symbols(), vec!["NOADJ"]);
    assert!(agg.failures.iter().next().unwrap().reason.contains("adj_close"));
    assert_eq!(agg.table.symbols(), vec!["OK"]);
}

#[test]
fn failing_symbol_never_blocks_later_symbols() {
    let provider = ScriptedProvider::new()
        .with("A", Ok(daily_bars("2024-01-01", &[1.0, 2.0])))
        .with("B", Err(DataError::NetworkUnreachable("operation timed out".into())))
        .with("C", Err(DataError::Blocked("HTTP 403 Forbidden for C".into())))
        .with("D", Err(DataError::RateLimited { retry_after_secs: 60 }))
        .with("E", Ok(daily_bars("2024-01-01", &[3.0, 4.0])));

    let agg = aggregate(
        &provider,
        &["A", "B", "C", "D", "E"],
        Period::Daily,
        &request("2024-01-01", "2024-01-03"),
        None,
    );

    // One request per symbol, nothing skipped and nothing repeated
    assert_eq!(*provider.calls.borrow(), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(agg.table.symbols(), vec!["A", "E"]);
    assert_eq!(agg.table.value(1, "E"), Some(4.0));
    assert_eq!(agg.failures.symbols(), vec!["B", "C", "D"]);

    let reasons: Vec<&str> = agg.failures.iter().map(|f| f.reason.as_str()).collect();
    assert_eq!(reasons[0], "network unreachable: operation timed out");
    assert!(reasons[1].contains("403"));
    assert!(reasons[2].contains("retry after 60s"));
}

#[test]
fn weekly_value_is_last_observation_of_the_week() {
    // Mon 2024-01-01 .. Sun 2024-01-14, close = day number
    let closes: Vec<f64> = (1..=14).map(f64::from).collect();
    let provider = ScriptedProvider::new().with("X", Ok(daily_bars("2024-01-01", &closes)));

    let agg = aggregate(
        &provider,
        &["X"],
        Period::Weekly,
        &request("2024-01-01", "2024-01-15"),
        None,
    );

    assert_eq!(agg.table.dates(), &[d("2024-01-07"), d("2024-01-14")]);
    assert_eq!(agg.table.value(0, "X"), Some(7.0));
    assert_eq!(agg.table.value(1, "X"), Some(14.0));
}

#[test]
fn returns_and_correlation_follow_the_weekly_table() {
    let provider = SyntheticProvider::new();
    let mut session = Aggregator::new(&provider, request("2023-01-01", "2024-01-01"));
    session.historical_data(&["BTC-USD", "ETH-USD", "USDT-USD"], Period::Weekly);

    let returns = session.compute_returns().clone();
    let prices = session.prices();

    assert_eq!(returns.simple.dates(), prices.dates());
    assert_eq!(returns.cumulative.dates(), prices.dates());
    for symbol in prices.symbols() {
        assert_eq!(returns.simple.value(0, symbol), None);
        assert_eq!(returns.cumulative.value(0, symbol), None);
        let p0 = prices.value(0, symbol).unwrap();
        let p1 = prices.value(1, symbol).unwrap();
        let r1 = returns.simple.value(1, symbol).unwrap();
        assert!((r1 - (p1 - p0) / p0).abs() < 1e-12);
        assert!((returns.cumulative.value(1, symbol).unwrap() - r1).abs() < 1e-12);
    }

    let corr = CorrelationMatrix::pearson(prices);
    assert_eq!(corr.size(), prices.width());
    for i in 0..3 {
        assert_eq!(corr.get(i, i), Some(1.0));
        for j in 0..3 {
            assert_eq!(corr.get(i, j), corr.get(j, i));
            assert!((-1.0..=1.0).contains(&corr.get(i, j).unwrap()));
        }
    }
}

#[test]
fn all_failures_yield_empty_but_usable_outputs() {
    let provider = SyntheticProvider::new().with_unknown(["X", "Y"]);
    let agg = aggregate(
        &provider,
        &["X", "Y"],
        Period::Weekly,
        &request("2024-01-01", "2024-03-01"),
        None,
    );

    assert_eq!(agg.failures.len(), 2);
    assert!(agg.table.is_empty());
    assert_eq!(agg.table.width(), 0);

    let returns = Returns::compute(&agg.table);
    assert!(returns.simple.is_empty());
    assert!(returns.totals().is_empty());
    assert_eq!(CorrelationMatrix::pearson(&returns.cumulative).size(), 0);
    assert_eq!(agg.table.preview(5), "<empty table>");
}

#[test]
fn progress_sees_every_symbol_in_order() {
    let provider = SyntheticProvider::new().with_unknown(["BAD"]);
    let progress = RecordingProgress::default();
    aggregate(
        &provider,
        &["BTC-USD", "BAD", "ETH-USD"],
        Period::Weekly,
        &request("2024-01-01", "2024-02-01"),
        Some(&progress),
    );

    assert_eq!(
        *progress.events.borrow(),
        vec![
            "start BTC-USD",
            "ok BTC-USD",
            "merged BTC-USD width=1 rows=5",
            "start BAD",
            "err BAD",
            "start ETH-USD",
            "ok ETH-USD",
            "merged ETH-USD width=2 rows=5",
            "done 2/1/3",
        ]
    );
}

#[test]
fn aggregated_table_exports_with_header() {
    let provider = SyntheticProvider::new();
    let agg = aggregate(
        &provider,
        &["BTC-USD", "ETH-USD"],
        Period::Monthly,
        &request("2024-01-01", "2024-04-01"),
        None,
    );

    let out = export_table(&agg.table, &ExportOptions::default()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Date;BTC-USD;ETH-USD");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("2024-01-31;"));
    assert!(lines[3].starts_with("2024-03-31;"));
}

#[test]
fn dataframe_view_has_date_and_symbol_columns() {
    let provider = SyntheticProvider::new();
    let agg = aggregate(
        &provider,
        &["BTC-USD", "ETH-USD"],
        Period::Weekly,
        &request("2024-01-01", "2024-02-01"),
        None,
    );

    let df = agg.table.to_dataframe().unwrap();
    assert_eq!(df.height(), agg.table.len());
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["Date", "BTC-USD", "ETH-USD"]);
}
