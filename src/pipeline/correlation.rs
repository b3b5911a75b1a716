//! Pearson correlation matrix over numeric columns

use anyhow::Result;
use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;

use super::columns::numeric_values;

/// Square correlation matrix with its column names
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Mat<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[(i, j)])
    }

    /// Row-major copy, for serialization and display
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let n = self.names.len();
        (0..n)
            .map(|i| (0..n).map(|j| self.values[(i, j)]).collect())
            .collect()
    }
}

/// Compute the Pearson correlation matrix of the given numeric columns.
///
/// Each pair is correlated over the rows where both values are present.
/// With `P` the presence mask, `X` the centered values (0 where missing) and
/// `X2` their squares, all pairwise sums come from the products `PᵀP`,
/// `XᵀP`, `X2ᵀP` and `XᵀX`. Pairs with zero variance on either side are NaN;
/// the diagonal is always 1.
pub fn compute_correlation_matrix(df: &DataFrame, columns: &[String]) -> Result<CorrelationMatrix> {
    let n_cols = columns.len();
    let n_rows = df.height();

    // Read and center each column in parallel
    let centered: Vec<Vec<Option<f64>>> = columns
        .par_iter()
        .map(|name| {
            let values = numeric_values(df, name)?;
            let (sum, count) = values
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            let mean = if count > 0 { sum / count as f64 } else { 0.0 };
            Ok(values.into_iter().map(|v| v.map(|x| x - mean)).collect())
        })
        .collect::<Result<_>>()?;

    let mut presence = Mat::<f64>::zeros(n_rows, n_cols);
    let mut x = Mat::<f64>::zeros(n_rows, n_cols);
    let mut x2 = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, col_data) in centered.iter().enumerate() {
        for (row_idx, val) in col_data.iter().enumerate() {
            if let Some(v) = val {
                presence[(row_idx, col_idx)] = 1.0;
                x[(row_idx, col_idx)] = *v;
                x2[(row_idx, col_idx)] = v * v;
            }
        }
    }

    let n = presence.transpose() * &presence;
    let sum_x = x.transpose() * &presence;
    let sum_x2 = x2.transpose() * &presence;
    let sum_xy = x.transpose() * &x;

    let mut values = Mat::<f64>::zeros(n_cols, n_cols);
    for i in 0..n_cols {
        for j in 0..n_cols {
            if i == j {
                values[(i, j)] = 1.0;
                continue;
            }
            // Row i of sum_x holds sums of column i over rows where j is present
            let count = n[(i, j)];
            let sx = sum_x[(i, j)];
            let sy = sum_x[(j, i)];
            let sxx = sum_x2[(i, j)];
            let syy = sum_x2[(j, i)];
            let sxy = sum_xy[(i, j)];

            let cov = count * sxy - sx * sy;
            let var_x = count * sxx - sx * sx;
            let var_y = count * syy - sy * sy;

            values[(i, j)] = if count < 2.0 || var_x <= 0.0 || var_y <= 0.0 {
                f64::NAN
            } else {
                (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
            };
        }
    }

    Ok(CorrelationMatrix {
        names: columns.to_vec(),
        values,
    })
}
