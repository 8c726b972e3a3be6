//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API, one request per symbol.
//! Any failure is reported for that symbol alone; nothing is retried.
//! Crypto pairs such as `BTC-USD` trade every calendar day, so their series
//! have no weekend gaps.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, DataProvider, RawBar};
use chrono::{NaiveDate, NaiveTime};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Blocking chart API client.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Build the chart API URL for `[start, end)`; `end` is exclusive, so a
    /// range ending today stops at the last completed day. The symbol is
    /// percent-encoded as a single path segment.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, DataError> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let mut url = Url::parse(CHART_ENDPOINT)
            .map_err(|e| DataError::Other(format!("invalid chart endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other("chart endpoint cannot take a path".into()))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &start_ts.to_string())
            .append_pair("period2", &end_ts.to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true")
            .append_pair("events", "div,split");
        Ok(url)
    }

    /// Error for a non-success HTTP status, `None` when the body should be parsed.
    fn status_error(symbol: &str, status: StatusCode, retry_after: Option<&str>) -> Option<DataError> {
        if status.is_success() {
            return None;
        }
        Some(match status {
            StatusCode::FORBIDDEN => DataError::Blocked(format!("HTTP {status} for {symbol}")),
            StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
                retry_after_secs: retry_after.and_then(|v| v.parse().ok()).unwrap_or(60),
            },
            StatusCode::UNAUTHORIZED => {
                DataError::AuthenticationRequired("Yahoo Finance requires authentication".into())
            }
            // Unknown symbols come back as 404 with a chart error body
            StatusCode::NOT_FOUND => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            _ => DataError::Other(format!("HTTP {status} for {symbol}")),
        })
    }

    /// Parse the chart API response into RawBars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A listed symbol with no trades in the range comes back without timestamps.
        let timestamps = data.timestamp.ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Placeholder rows (all fields null) carry no observation
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && adj_close.is_none()
            {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
                adj_close: adj_close.unwrap_or(f64::NAN),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    fn fetch_once(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let url = Self::chart_url(symbol, start, end)?;
        debug!(symbol, %url, "requesting chart");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok());
        if let Some(err) = Self::status_error(symbol, resp.status(), retry_after) {
            warn!(symbol, status = %resp.status(), "chart request rejected");
            return Err(err);
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, chart)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        self.fetch_once(symbol, start, end)
    }
}
