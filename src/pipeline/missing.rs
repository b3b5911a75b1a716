//! Mean imputation of designated columns

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::columns::numeric_values;
use super::PipelineError;

/// Outcome of imputing one column
#[derive(Debug, Clone, Serialize)]
pub struct ImputedColumn {
    pub name: String,
    /// Mean of the observed values, used as the fill value
    pub mean: f64,
    /// Number of cells that were filled
    pub filled: usize,
}

/// Replace missing cells of each listed column with that column's mean.
///
/// Means are computed from the input snapshot before any column is filled.
/// Null and NaN both count as missing. Imputed columns come back as Float64;
/// string columns are parsed first and unparseable cells are treated as
/// missing. Fails if a column does not exist or has no observed values.
pub fn impute_mean(df: &DataFrame, columns: &[String]) -> Result<(DataFrame, Vec<ImputedColumn>)> {
    let mut filled_columns = Vec::with_capacity(columns.len());
    let mut results = Vec::with_capacity(columns.len());

    for name in columns {
        let values = numeric_values(df, name)?;
        let (sum, count) = values
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));

        if count == 0 {
            return Err(PipelineError::UndefinedMean {
                column: name.clone(),
            }
            .into());
        }

        let mean = sum / count as f64;
        let filled = values.len() - count;
        let imputed: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(mean)).collect();

        filled_columns.push(Column::new(name.as_str().into(), imputed));
        results.push(ImputedColumn {
            name: name.clone(),
            mean,
            filled,
        });
    }

    let mut out = df.clone();
    for column in filled_columns {
        out.with_column(column)?;
    }

    Ok((out, results))
}
