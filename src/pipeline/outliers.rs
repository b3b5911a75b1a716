//! Outlier row removal on an upper-bound sanity check

use anyhow::Result;
use polars::prelude::*;

use super::columns::numeric_values;

/// Rows whose value in `column` exceeds `threshold`
pub fn find_outliers(df: &DataFrame, column: &str, threshold: f64) -> Result<DataFrame> {
    let values = numeric_values(df, column)?;
    let mask: BooleanChunked = values
        .iter()
        .map(|v| Some(matches!(v, Some(x) if *x > threshold)))
        .collect();

    Ok(df.filter(&mask)?)
}

/// Keep only rows whose value in `column` is at most `threshold`.
///
/// Rows with a missing value fail the check and are dropped too. Returns the
/// filtered frame and the number of dropped rows.
pub fn filter_outliers(df: &DataFrame, column: &str, threshold: f64) -> Result<(DataFrame, usize)> {
    let values = numeric_values(df, column)?;
    let mask: BooleanChunked = values
        .iter()
        .map(|v| Some(matches!(v, Some(x) if *x <= threshold)))
        .collect();

    let kept = df.filter(&mask)?;
    let dropped = df.height() - kept.height();
    Ok((kept, dropped))
}
