//! Typed column access and column roles
//!
//! Polars columns are dynamically typed. The pipeline reads them through the
//! helpers here so that every stage sees plain `Option<f64>` or
//! `Option<String>` values, and records each column's role in a schema.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::PipelineError;

/// Semantic role of a column in the churn table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Label,
    Identifier,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Numeric => write!(f, "numeric"),
            ColumnRole::Categorical => write!(f, "categorical"),
            ColumnRole::Label => write!(f, "label"),
            ColumnRole::Identifier => write!(f, "identifier"),
        }
    }
}

/// Columns split by storage type, fixed after schema inspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

/// Per-column roles once the label and identifier are known
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSchema {
    pub columns: Vec<(String, ColumnRole)>,
}

impl FeatureSchema {
    /// Assign roles from a partition. The label and identifier override the
    /// storage-type role.
    pub fn new(partition: &ColumnPartition, label: &str, identifier: Option<&str>) -> Self {
        let role_of = |name: &str, default: ColumnRole| {
            if name == label {
                ColumnRole::Label
            } else if Some(name) == identifier {
                ColumnRole::Identifier
            } else {
                default
            }
        };

        let columns = partition
            .categorical
            .iter()
            .map(|name| (name.clone(), role_of(name, ColumnRole::Categorical)))
            .chain(
                partition
                    .numeric
                    .iter()
                    .map(|name| (name.clone(), role_of(name, ColumnRole::Numeric))),
            )
            .collect();

        Self { columns }
    }

    pub fn role(&self, name: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, role)| *role)
    }

    /// Names of the columns holding the given role, in schema order
    pub fn columns_with_role(&self, role: ColumnRole) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, r)| *r == role)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Look up a column, reporting the available names when it is missing
pub fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| {
        anyhow::Error::from(PipelineError::ColumnNotFound {
            column: name.to_string(),
            available: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
    })
}

/// Read a column as floats. Nulls and NaN both come back as `None`.
///
/// String columns are parsed; cells that do not parse become `None`.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = get_column(df, name)?;

    let supported = column.dtype().is_primitive_numeric()
        || matches!(column.dtype(), DataType::String | DataType::Boolean);
    if !supported {
        return Err(PipelineError::NonNumericColumn {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        }
        .into());
    }

    let float_col = column
        .cast(&DataType::Float64)
        .with_context(|| format!("Failed to cast column '{}' to Float64", name))?;

    let values = float_col
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    Ok(values)
}

/// Read a column as strings, whatever its storage type
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = get_column(df, name)?;

    let values: Vec<Option<String>> = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = column
                .cast(&DataType::String)
                .with_context(|| format!("Failed to cast column '{}' to String", name))?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
