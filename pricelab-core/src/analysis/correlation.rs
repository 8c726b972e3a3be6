//! Pairwise Pearson correlation across the columns of a table.

use crate::data::table::PriceTable;

/// Symmetric correlation matrix labelled by column name.
///
/// A cell is `None` when the pair has fewer than two common observations or
/// either side has zero variance over them.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    labels: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Pearson correlation over pairwise-complete rows.
    pub fn pearson(table: &PriceTable) -> Self {
        let columns = table.columns();
        let n = columns.len();
        let mut values = vec![vec![None; n]; n];

        for i in 0..n {
            values[i][i] = pearson(&columns[i].values, &columns[i].values).map(|_| 1.0);
            for j in (i + 1)..n {
                let r = pearson(&columns[i].values, &columns[j].values);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            labels: columns.iter().map(|c| c.name.clone()).collect(),
            values,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }
}

/// Pearson coefficient over the rows where both sides are defined.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
