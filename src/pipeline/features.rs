//! Feature preparation: string indexing, standard scaling and vector assembly
//!
//! Encoders are fit once on the cleaned table and then applied to it, so every
//! row ends with a feature vector of the same width:
//! `[categorical codes..., scaled numerics...]`.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::columns::{numeric_values, string_values, ColumnPartition};
use super::PipelineError;

/// Suffix appended to indexed categorical feature names
pub const INDEXED_SUFFIX: &str = "_Indexed";

/// Frequency-ranked string encoder.
///
/// Code 0 is the most frequent category; ties go to the smaller string.
#[derive(Debug, Clone, Serialize)]
pub struct StringIndexer {
    pub column: String,
    /// Categories in code order
    pub labels: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl StringIndexer {
    /// Fit on a column's values. Missing values are an error.
    pub fn fit(column: &str, values: &[Option<String>]) -> Result<Self> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(v) => *counts.entry(v.as_str()).or_insert(0) += 1,
                None => {
                    return Err(PipelineError::UnknownCategory {
                        column: column.to_string(),
                        row,
                        value: None,
                    }
                    .into())
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        // Stable sort keeps the alphabetical BTreeMap order within equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let labels: Vec<String> = ranked.into_iter().map(|(s, _)| s.to_string()).collect();
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();

        Ok(Self {
            column: column.to_string(),
            labels,
            index,
        })
    }

    pub fn code(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn num_categories(&self) -> usize {
        self.labels.len()
    }

    /// Encode every value; missing or unseen values are an error
    pub fn transform(&self, values: &[Option<String>]) -> Result<Vec<usize>> {
        values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .as_deref()
                    .and_then(|v| self.code(v))
                    .ok_or_else(|| {
                        anyhow::Error::from(PipelineError::UnknownCategory {
                            column: self.column.clone(),
                            row,
                            value: value.clone(),
                        })
                    })
            })
            .collect()
    }
}

/// Per-column standardization to zero mean and unit variance
#[derive(Debug, Clone, Serialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub means: Vec<f64>,
    /// Sample standard deviations (n - 1)
    pub stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit on column-major values, ignoring missing cells
    pub fn fit(columns: &[String], values: &[Vec<Option<f64>>]) -> Self {
        let mut means = Vec::with_capacity(values.len());
        let mut stds = Vec::with_capacity(values.len());

        for column in values {
            let observed: Vec<f64> = column.iter().flatten().copied().collect();
            let n = observed.len();
            let mean = if n > 0 {
                observed.iter().sum::<f64>() / n as f64
            } else {
                0.0
            };
            let std = if n > 1 {
                (observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
            } else {
                0.0
            };
            means.push(mean);
            stds.push(std);
        }

        Self {
            columns: columns.to_vec(),
            means,
            stds,
        }
    }

    /// Scale one value of column `idx`. Missing stays NaN; a zero-variance
    /// column maps to 0.
    pub fn scale(&self, idx: usize, value: Option<f64>) -> f64 {
        match value {
            None => f64::NAN,
            Some(_) if self.stds[idx] == 0.0 => 0.0,
            Some(v) => (v - self.means[idx]) / self.stds[idx],
        }
    }
}

/// Dense, row-major feature matrix with binary labels
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    values: Vec<f64>,
    pub labels: Vec<u8>,
}

impl FeatureMatrix {
    /// Build from row-major values. `values.len()` must equal
    /// `labels.len() * feature_names.len()`.
    pub fn new(feature_names: Vec<String>, values: Vec<f64>, labels: Vec<u8>) -> Result<Self> {
        if values.len() != labels.len() * feature_names.len() {
            anyhow::bail!(
                "Feature matrix shape mismatch: {} values for {} rows x {} features",
                values.len(),
                labels.len(),
                feature_names.len()
            );
        }
        Ok(Self {
            feature_names,
            values,
            labels,
        })
    }

    pub fn from_rows(feature_names: Vec<String>, rows: &[Vec<f64>], labels: Vec<u8>) -> Result<Self> {
        let values = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(feature_names, values, labels)
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let width = self.n_features();
        &self.values[idx * width..(idx + 1) * width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    pub fn value(&self, row: usize, feature: usize) -> f64 {
        self.values[row * self.n_features() + feature]
    }

    /// Copy the given rows, in the given order, into a new matrix
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.n_features());
        let mut labels = Vec::with_capacity(indices.len());
        for &i in indices {
            values.extend_from_slice(self.row(i));
            labels.push(self.labels[i]);
        }
        Self {
            feature_names: self.feature_names.clone(),
            values,
            labels,
        }
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

/// Fitted encoders that turn the cleaned table into a `FeatureMatrix`
#[derive(Debug, Clone, Serialize)]
pub struct FeatureAssembler {
    pub categorical: Vec<StringIndexer>,
    pub scaler: StandardScaler,
    pub label: StringIndexer,
}

impl FeatureAssembler {
    /// Fit indexers on every categorical column except the excluded ones, a
    /// scaler on every numeric column and a separate indexer on the label.
    pub fn fit(
        df: &DataFrame,
        partition: &ColumnPartition,
        label: &str,
        excluded: &[String],
    ) -> Result<Self> {
        let categorical = partition
            .categorical
            .iter()
            .filter(|name| name.as_str() != label && !excluded.contains(name))
            .map(|name| StringIndexer::fit(name, &string_values(df, name)?))
            .collect::<Result<Vec<_>>>()?;

        let numeric_columns: Vec<String> = partition
            .numeric
            .iter()
            .filter(|name| name.as_str() != label && !excluded.contains(name))
            .cloned()
            .collect();
        let numeric_data = numeric_columns
            .iter()
            .map(|name| numeric_values(df, name))
            .collect::<Result<Vec<_>>>()?;
        let scaler = StandardScaler::fit(&numeric_columns, &numeric_data);

        let label_indexer = StringIndexer::fit(label, &string_values(df, label)?)?;
        if label_indexer.num_categories() != 2 {
            return Err(PipelineError::LabelNotBinary {
                column: label.to_string(),
                found: label_indexer.num_categories(),
                values: label_indexer.labels.clone(),
            }
            .into());
        }

        Ok(Self {
            categorical,
            scaler,
            label: label_indexer,
        })
    }

    /// Feature names in vector order
    pub fn feature_names(&self) -> Vec<String> {
        self.categorical
            .iter()
            .map(|indexer| format!("{}{}", indexer.column, INDEXED_SUFFIX))
            .chain(self.scaler.columns.iter().cloned())
            .collect()
    }

    /// The label value encoded as the positive class (code 1)
    pub fn positive_label(&self) -> &str {
        &self.label.labels[1]
    }

    /// Encode the table. Missing numeric cells become NaN.
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let n_rows = df.height();
        let width = self.categorical.len() + self.scaler.columns.len();

        let codes = self
            .categorical
            .iter()
            .map(|indexer| indexer.transform(&string_values(df, &indexer.column)?))
            .collect::<Result<Vec<_>>>()?;
        let numerics = self
            .scaler
            .columns
            .iter()
            .map(|name| numeric_values(df, name))
            .collect::<Result<Vec<_>>>()?;
        let labels: Vec<u8> = self
            .label
            .transform(&string_values(df, &self.label.column)?)?
            .into_iter()
            .map(|code| code as u8)
            .collect();

        let mut values = Vec::with_capacity(n_rows * width);
        for row in 0..n_rows {
            values.extend(codes.iter().map(|column| column[row] as f64));
            values.extend(
                numerics
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| self.scaler.scale(idx, column[row])),
            );
        }

        FeatureMatrix::new(self.feature_names(), values, labels)
    }
}
