//! Period-over-period and cumulative returns.

use crate::data::table::PriceTable;

/// Fractional change of each cell against the row before it.
///
/// Row 0 is always `None`. A row is also `None` when either price is
/// missing or the previous price is zero.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    out.extend(values.first().map(|_| None));
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(curr)) if prev != 0.0 => Some((curr - prev) / prev),
        _ => None,
    }));
    out
}

/// Running sum that skips missing cells: they stay `None` and the sum
/// carries on from the last defined total.
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .iter()
        .scan(0.0_f64, |total, value| {
            Some(value.map(|v| {
                *total += v;
                *total
            }))
        })
        .collect()
}

/// Simple and cumulative returns, both shaped like the price table.
#[derive(Debug, Clone, PartialEq)]
pub struct Returns {
    pub simple: PriceTable,
    pub cumulative: PriceTable,
}

impl Returns {
    pub fn compute(prices: &PriceTable) -> Self {
        let simple = prices.map_columns(pct_change);
        let cumulative = simple.map_columns(cumulative_sum);
        Self { simple, cumulative }
    }

    /// Last cumulative value per symbol, the non-compounded total return.
    pub fn totals(&self) -> Vec<(&str, Option<f64>)> {
        self.cumulative
            .columns()
            .iter()
            .map(|c| (c.name.as_str(), c.values.iter().rev().find_map(|v| *v)))
            .collect()
    }
}
