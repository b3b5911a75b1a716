//! JSON run report and zip bundling
//!
//! The report records the settings of a run, row counts at each stage, the
//! imputation results, the depth sweep and the final model's importances.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ImputedColumn, MetricCurve, MetricPoint, PipelineConfig};
use crate::report::RunSummary;

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub churntree_version: String,
    pub input_file: String,
    pub settings: PipelineConfig,
}

/// Rows remaining after each stage
#[derive(Debug, Clone, Serialize)]
pub struct RowCounts {
    pub loaded: usize,
    pub after_outlier_filter: usize,
    pub dropped_outliers: usize,
    pub train: usize,
    pub test: usize,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub profile_ms: u64,
    pub clean_ms: u64,
    pub features_ms: u64,
    pub train_ms: u64,
    pub total_ms: u64,
}

/// One feature's importance in the final model
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceEntry {
    pub feature: String,
    pub importance: f64,
}

/// The model whose importances are reported
#[derive(Debug, Clone, Serialize)]
pub struct FinalModelEntry {
    pub depth: usize,
    pub train_auc: f64,
    pub test_auc: f64,
    pub num_nodes: usize,
    pub positive_label: String,
    pub importances: Vec<ImportanceEntry>,
}

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    pub rows: RowCounts,
    pub features: Vec<String>,
    pub imputation: Vec<ImputedColumn>,
    pub sweep: Vec<MetricPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_depth: Option<usize>,
    pub final_model: FinalModelEntry,
    pub timing: TimingInfo,
}

/// Inputs for assembling a `RunReport`
pub struct RunReportParams<'a> {
    pub input_file: &'a Path,
    pub config: &'a PipelineConfig,
    pub summary: &'a RunSummary,
    pub features: Vec<String>,
    pub imputation: &'a [ImputedColumn],
    pub curve: &'a MetricCurve,
    pub final_model: FinalModelEntry,
}

impl RunReport {
    pub fn new(params: RunReportParams<'_>) -> Self {
        let summary = params.summary;

        let mut final_model = params.final_model;
        final_model
            .importances
            .sort_by(|a, b| b.importance.total_cmp(&a.importance).then_with(|| a.feature.cmp(&b.feature)));

        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                churntree_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.display().to_string(),
                settings: params.config.clone(),
            },
            rows: RowCounts {
                loaded: summary.rows_loaded,
                after_outlier_filter: summary.rows_after_filter,
                dropped_outliers: summary.dropped_rows(),
                train: summary.train_rows,
                test: summary.test_rows,
            },
            features: params.features,
            imputation: params.imputation.to_vec(),
            sweep: params.curve.points.clone(),
            best_depth: params.curve.best().map(|p| p.depth),
            final_model,
            timing: TimingInfo {
                load_ms: summary.load_time.as_millis() as u64,
                profile_ms: summary.profile_time.as_millis() as u64,
                clean_ms: summary.clean_time.as_millis() as u64,
                features_ms: summary.feature_time.as_millis() as u64,
                train_ms: summary.train_time.as_millis() as u64,
                total_ms: summary.total_time().as_millis() as u64,
            },
        }
    }
}

/// Export the run report to a JSON file
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}

/// Package the report and charts into a single zip archive.
///
/// Files are stored under their own file names; the originals stay in place.
pub fn package_run_outputs(files: &[PathBuf], zip_path: &Path) -> Result<()> {
    use std::io::{Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;
        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
    }

    zip.finish().context("Failed to finalize zip file")?;

    Ok(())
}
