//! Single-symbol price series and the designated price field.

use super::provider::{DataError, RawBar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which bar field is kept as the symbol's price; the rest are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    AdjClose,
    Close,
    Open,
    High,
    Low,
}

impl PriceField {
    pub fn name(&self) -> &'static str {
        match self {
            PriceField::AdjClose => "adj_close",
            PriceField::Close => "close",
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
        }
    }

    pub fn value(&self, bar: &RawBar) -> f64 {
        match self {
            PriceField::AdjClose => bar.adj_close,
            PriceField::Close => bar.close,
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "adjclose" => Ok(PriceField::AdjClose),
            "close" => Ok(PriceField::Close),
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            _ => Err(format!(
                "unknown price field '{s}'. Valid: adj_close, close, open, high, low"
            )),
        }
    }
}

/// Daily observations of one symbol's designated price field, named after the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    /// Sorted ascending by date, one point per date.
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    /// Extract `field` from provider bars.
    ///
    /// No bars is a missing symbol; bars without a single finite `field`
    /// value is a missing field. Both are fetch failures for the symbol.
    /// Duplicate dates keep the last bar.
    pub fn from_bars(symbol: &str, bars: &[RawBar], field: PriceField) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut points: Vec<(NaiveDate, f64)> = bars
            .iter()
            .map(|bar| (bar.date, field.value(bar)))
            .filter(|(_, v)| v.is_finite())
            .collect();

        if points.is_empty() {
            return Err(DataError::MissingField {
                symbol: symbol.to_string(),
                field,
            });
        }

        points.sort_by_key(|(date, _)| *date);
        // dedup_by keeps the first of a run; reverse so the last bar wins
        points.reverse();
        points.dedup_by_key(|(date, _)| *date);
        points.reverse();

        Ok(Self {
            symbol: symbol.to_string(),
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
