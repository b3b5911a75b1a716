//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::pipeline::{PipelineConfig, MAX_TREE_DEPTH};

/// churntree - Profile a churn dataset and model it with decision trees
#[derive(Parser, Debug)]
#[command(name = "churntree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Binary label column to predict
    #[arg(short, long, default_value = "Churn")]
    pub target: String,

    /// Row identifier column, excluded from the features.
    /// Pass an empty string if the data has none.
    #[arg(long, default_value = "customerID")]
    pub id_column: String,

    /// Numeric columns whose missing values are replaced by the column mean
    /// (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "TotalCharges")]
    pub impute: Vec<String>,

    /// Column checked for outliers
    #[arg(long, default_value = "tenure")]
    pub outlier_column: String,

    /// Rows whose outlier column exceeds this value are dropped
    #[arg(long, default_value = "100")]
    pub outlier_threshold: f64,

    /// Categorical column used to group label counts in the bar chart
    #[arg(long, default_value = "Contract")]
    pub group_by: String,

    /// Fraction of rows assigned to the training set (0 < ratio < 1)
    #[arg(long, default_value = "0.7", value_parser = validate_ratio)]
    pub train_ratio: f64,

    /// Seed for the train/test split
    #[arg(long, default_value = "100")]
    pub seed: u64,

    /// Smallest depth in the sweep
    #[arg(long, default_value = "2", value_parser = validate_depth)]
    pub min_depth: usize,

    /// Largest depth in the sweep
    #[arg(long, default_value = "20", value_parser = validate_depth)]
    pub max_depth: usize,

    /// Depth of the model whose feature importances are reported
    #[arg(long, default_value = "3", value_parser = validate_depth)]
    pub final_depth: usize,

    /// Report importances from the depth with the best test AUC instead of
    /// --final-depth
    #[arg(long, default_value = "false")]
    pub importance_from_best: bool,

    /// Maximum number of bins used to choose split thresholds
    #[arg(long, default_value = "32", value_parser = validate_max_bins)]
    pub max_bins: usize,

    /// Minimum rows in each child of a split
    #[arg(long, default_value = "1")]
    pub min_instances_per_node: usize,

    /// Minimum impurity decrease for a split
    #[arg(long, default_value = "0.0")]
    pub min_info_gain: f64,

    /// Number of bins in the numeric histograms
    #[arg(long, default_value = "20")]
    pub histogram_bins: usize,

    /// Output directory for charts and the report.
    /// Defaults to '<input stem>_churn_report' next to the input file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long, default_value = "false")]
    pub no_charts: bool,

    /// Bundle the report and charts into a zip archive
    #[arg(long, default_value = "false")]
    pub bundle: bool,

    /// Skip interactive confirmation prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Output directory, deriving from input if not explicitly provided
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let parent = self.input.parent().unwrap_or_else(|| Path::new("."));
            let stem = self
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("churn");
            parent.join(format!("{}_churn_report", stem))
        })
    }

    /// Pipeline settings described by the arguments
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            label: self.target.clone(),
            identifier: Some(self.id_column.clone()).filter(|id| !id.is_empty()),
            impute_columns: self
                .impute
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            outlier_column: self.outlier_column.clone(),
            outlier_threshold: self.outlier_threshold,
            train_ratio: self.train_ratio,
            seed: self.seed,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            final_depth: self.final_depth,
            importance_from_best: self.importance_from_best,
            max_bins: self.max_bins,
            min_instances_per_node: self.min_instances_per_node,
            min_info_gain: self.min_info_gain,
            histogram_bins: self.histogram_bins,
        }
    }
}

/// Validator for train_ratio parameter
fn validate_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("train_ratio must be between 0 and 1 (exclusive), got {}", value))
    }
}

/// Validator for depth parameters
fn validate_depth(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid depth", s))?;

    if value > MAX_TREE_DEPTH {
        Err(format!("depth must be at most {}, got {}", MAX_TREE_DEPTH, value))
    } else {
        Ok(value)
    }
}

/// Validator for max_bins parameter
fn validate_max_bins(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < 2 {
        Err(format!("max_bins must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}
