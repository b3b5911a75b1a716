//! Descriptive analysis of the raw table
//!
//! Column type partition, null counts, per-column statistics, category
//! frequencies, two-way group counts and histograms.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::columns::{get_column, numeric_values, string_values, ColumnPartition};

/// Summary statistics of one numeric column over its non-missing values
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN when fewer than two values
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count of rows sharing one `(group, subgroup)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: String,
    pub subgroup: String,
    pub count: usize,
}

/// Equal-width histogram
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub name: String,
    /// `counts.len() + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Split columns into numeric and categorical sets by storage type
pub fn partition_columns(df: &DataFrame) -> ColumnPartition {
    let mut partition = ColumnPartition::default();

    for column in df.get_columns() {
        let dtype = column.dtype();
        let name = column.name().to_string();
        if dtype.is_primitive_numeric() {
            partition.numeric.push(name);
        } else if matches!(
            dtype,
            DataType::String | DataType::Boolean | DataType::Categorical(_, _)
        ) {
            partition.categorical.push(name);
        }
    }

    partition
}

/// Null count per column in column order. NaN counts as missing.
pub fn count_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
    let mut counts = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let name = column.name().to_string();
        let missing = if column.dtype().is_float() {
            numeric_values(df, &name)?
                .iter()
                .filter(|v| v.is_none())
                .count()
        } else {
            column.null_count()
        };
        counts.push((name, missing));
    }

    Ok(counts)
}

/// Describe a numeric column the way a dataframe `describe()` would
pub fn describe_column(df: &DataFrame, name: &str) -> Result<ColumnStats> {
    let column = get_column(df, name)?;
    if !column.dtype().is_primitive_numeric() {
        return Err(super::PipelineError::NonNumericColumn {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        }
        .into());
    }

    let raw = numeric_values(df, name)?;
    let missing = raw.iter().filter(|v| v.is_none()).count();
    let mut values: Vec<f64> = raw.into_iter().flatten().collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    if count == 0 {
        return Ok(ColumnStats {
            name: name.to_string(),
            count,
            missing,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        });
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Ok(ColumnStats {
        name: name.to_string(),
        count,
        missing,
        mean,
        std,
        min: values[0],
        q25: quantile_sorted(&values, 0.25),
        median: quantile_sorted(&values, 0.5),
        q75: quantile_sorted(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linearly interpolated quantile of an ascending, non-empty slice
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Frequency of every value in a column, most frequent first.
///
/// Ties are ordered alphabetically; missing values are reported as `"null"`.
pub fn value_counts(df: &DataFrame, name: &str) -> Result<Vec<(String, usize)>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in string_values(df, name)? {
        *counts
            .entry(value.unwrap_or_else(|| "null".to_string()))
            .or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    // BTreeMap order is alphabetical and the sort is stable
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(sorted)
}

/// Row counts for every observed `(by, within)` value pair, e.g. churn per
/// contract type. Sorted by group then subgroup.
pub fn group_counts(df: &DataFrame, by: &str, within: &str) -> Result<Vec<GroupCount>> {
    let groups = string_values(df, by)?;
    let subgroups = string_values(df, within)?;

    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for (group, subgroup) in groups.into_iter().zip(subgroups) {
        let key = (
            group.unwrap_or_else(|| "null".to_string()),
            subgroup.unwrap_or_else(|| "null".to_string()),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((group, subgroup), count)| GroupCount {
            group,
            subgroup,
            count,
        })
        .collect())
}

/// Equal-width histogram over `[min, max]` of the non-missing values.
///
/// The last bin is closed so that the maximum is counted. A constant column
/// yields a single bin holding every value.
pub fn histogram(name: &str, values: &[Option<f64>], bins: usize) -> Histogram {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() || bins == 0 {
        return Histogram {
            name: name.to_string(),
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }

    let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
    let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Histogram {
            name: name.to_string(),
            edges: vec![min, max],
            counts: vec![observed.len()],
        };
    }

    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in observed {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        name: name.to_string(),
        edges,
        counts,
    }
}
