//! Contract violations raised by the churn pipeline.
//!
//! Every variant is fatal: the pipeline has no retry or partial-result policy,
//! so these propagate through `anyhow` up to `main` and abort the run.

use thiserror::Error;

/// Errors that indicate an upstream contract was broken.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configured column does not exist in the table.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// A column designated for mean imputation has no observed values.
    #[error("Cannot impute column '{column}': every value is missing, mean is undefined")]
    UndefinedMean { column: String },

    /// A column was expected to hold numbers.
    #[error("Column '{column}' has type {dtype}, expected a numeric column")]
    NonNumericColumn { column: String, dtype: String },

    /// The label column must hold exactly two classes.
    #[error("Label column '{column}' must have exactly 2 distinct values, found {found}: {values:?}")]
    LabelNotBinary {
        column: String,
        found: usize,
        values: Vec<String>,
    },

    /// A categorical value is missing or was not seen when the indexer was fit.
    #[error("Column '{column}' row {row}: category {value:?} has no index")]
    UnknownCategory {
        column: String,
        row: usize,
        value: Option<String>,
    },

    /// The tree builder received a NaN or infinite feature value.
    #[error("Feature '{feature}' row {row} is not finite ({value}); missing values must be imputed before training")]
    NonFiniteFeature {
        feature: String,
        row: usize,
        value: f64,
    },

    /// Split weights must be finite, non-negative and sum to more than zero.
    #[error("Invalid split weights {weights:?}: {reason}")]
    InvalidSplitWeights { weights: Vec<f64>, reason: String },

    /// Decision tree hyperparameters are out of range.
    #[error("Invalid decision tree parameters: {0}")]
    InvalidTreeParams(String),

    /// Fitting needs at least one row.
    #[error("Cannot fit a decision tree on an empty training set")]
    EmptyTrainingSet,
}
