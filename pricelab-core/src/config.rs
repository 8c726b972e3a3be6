//! Pipeline configuration (TOML).
//!
//! Every field has a default, so an empty file reproduces the stock run:
//! BTC-USD, ETH-USD and USDT-USD from 2015-01-01 to today, weekly, on the
//! adjusted close.

use crate::data::aggregate::FetchRequest;
use crate::data::period::Period;
use crate::data::series::PriceField;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SYMBOLS: [&str; 3] = ["BTC-USD", "ETH-USD", "USDT-USD"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no symbols requested")]
    NoSymbols,

    #[error("start date {start} is not before end date {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
}

/// 2015-01-01, the first day requested by default.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Symbols fetched in order.
    pub symbols: Vec<String>,
    /// Resampling period label (`D`, `W`, `M`, `Q`, `Y`).
    pub period: Period,
    /// First day requested.
    pub start_date: NaiveDate,
    /// Exclusive end of the range; today when unset.
    pub end_date: Option<NaiveDate>,
    /// Bar field kept as the price.
    pub field: PriceField,
    /// Write the resampled price table here when set.
    pub export: Option<PathBuf>,
    /// Rows shown in console previews.
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            period: Period::Weekly,
            start_date: default_start_date(),
            end_date: None,
            field: PriceField::AdjClose,
            export: None,
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn symbol_refs(&self) -> Vec<&str> {
        self.symbols.iter().map(String::as_str).collect()
    }

    /// Resolve the fetch request, taking `today` as the end when none is set.
    pub fn fetch_request(&self, today: NaiveDate) -> Result<FetchRequest, ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        let end = self.end_date.unwrap_or(today);
        if self.start_date >= end {
            return Err(ConfigError::EmptyRange {
                start: self.start_date,
                end,
            });
        }
        Ok(FetchRequest {
            start: self.start_date,
            end,
            field: self.field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_file_is_the_stock_run() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.symbol_refs(), vec!["BTC-USD", "ETH-USD", "USDT-USD"]);
        assert_eq!(config.period, Period::Weekly);
        assert_eq!(config.start_date, d("2015-01-01"));
    }

    #[test]
    fn parses_overrides() {
        let config = PipelineConfig::from_toml(
            r#"
symbols = ["BTC-USD", "NOTAREALSYMBOL"]
period = "M"
start_date = "2020-01-01"
end_date = "2021-01-01"
field = "close"
export = "prices.csv"
"#,
        )
        .unwrap();

        assert_eq!(config.symbols, vec!["BTC-USD", "NOTAREALSYMBOL"]);
        assert_eq!(config.period, Period::Monthly);
        assert_eq!(config.field, PriceField::Close);
        assert_eq!(config.export, Some(PathBuf::from("prices.csv")));

        let request = config.fetch_request(d("2030-01-01")).unwrap();
        assert_eq!(request.start, d("2020-01-01"));
        assert_eq!(request.end, d("2021-01-01"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(PipelineConfig::from_toml(r#"period = "fortnight""#).is_err());
        assert!(PipelineConfig::from_toml(r#"colour = "red""#).is_err());
    }

    #[test]
    fn end_defaults_to_today_and_must_follow_start() {
        let config = PipelineConfig::default();
        let request = config.fetch_request(d("2026-10-17")).unwrap();
        assert_eq!(request.end, d("2026-10-17"));
        assert!(matches!(
            config.fetch_request(d("2014-06-01")),
            Err(ConfigError::EmptyRange { .. })
        ));

        let empty = PipelineConfig {
            symbols: vec![],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            empty.fetch_request(d("2026-10-17")),
            Err(ConfigError::NoSymbols)
        ));
    }
}
