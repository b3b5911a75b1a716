//! churntree: Customer Churn CLI Tool
//!
//! Loads a churn dataset, profiles and cleans it, encodes the features,
//! sweeps decision-tree depth and reports AUC and feature importances.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use churntree::cli::{confirm_drop_rows, Cli};
use churntree::pipeline::{
    compute_correlation_matrix, count_nulls, describe_column, evaluate_depths, filter_outliers,
    find_outliers, fit_final_model, group_counts, histogram, impute_mean, load_dataset_with_progress,
    numeric_values, partition_columns, require_columns, train_test_split, value_counts,
    ColumnRole, FeatureAssembler, FeatureSchema,
};
use churntree::report::{
    export_run_report, package_run_outputs, print_correlation_matrix, print_describe_table,
    print_group_counts, print_importances, print_imputation, print_metric_curve, print_null_counts,
    print_value_counts, render_charts, ChartData, FinalModelEntry, ImportanceEntry, RunReport,
    RunReportParams, RunSummary,
};
use churntree::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config, print_count,
    print_info, print_step_header, print_step_time, print_subheading, print_success, print_warning,
};

/// Categorical columns with more distinct values than this are not listed
const MAX_LISTED_CATEGORIES: usize = 12;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();
    config.validate()?;

    let input = &cli.input;
    let output_dir = cli.output_dir();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(input, &output_dir, &config);

    // Step 1: Load dataset
    let step_start = Instant::now();
    println!();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    print_success("Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut required: Vec<&str> = vec![config.label.as_str(), config.outlier_column.as_str()];
    required.extend(config.impute_columns.iter().map(|s| s.as_str()));
    if let Some(id) = &config.identifier {
        required.push(id);
    }
    require_columns(&df, &required)?;

    let mut summary = RunSummary::new(rows);
    summary.load_time = step_start.elapsed();
    print_step_time(summary.load_time);

    // Step 2: Profile
    print_step_header(1, "Profile");
    let step_start = Instant::now();

    let partition = partition_columns(&df);
    let schema = FeatureSchema::new(&partition, &config.label, config.identifier.as_deref());
    print_info(&format!(
        "{} numeric and {} categorical feature column(s)",
        schema.columns_with_role(ColumnRole::Numeric).len(),
        schema.columns_with_role(ColumnRole::Categorical).len()
    ));

    print_subheading("Summary statistics");
    let stats = partition
        .numeric
        .iter()
        .map(|name| describe_column(&df, name))
        .collect::<Result<Vec<_>>>()?;
    print_describe_table(&stats);

    print_subheading("Null counts");
    let nulls = count_nulls(&df)?;
    if nulls.iter().all(|(_, n)| *n == 0) {
        print_info("No missing values");
    } else {
        print_null_counts(&nulls, false);
    }

    if partition.numeric.len() >= 2 {
        print_subheading("Correlation matrix");
        let spinner = create_spinner("Calculating correlations...");
        let matrix = compute_correlation_matrix(&df, &partition.numeric)?;
        finish_with_success(&spinner, "Correlation matrix complete");
        print_correlation_matrix(&matrix);
    }

    for name in schema.columns_with_role(ColumnRole::Categorical).iter().chain([&config.label]) {
        let counts = value_counts(&df, name)?;
        if counts.len() <= MAX_LISTED_CATEGORIES {
            print_subheading(&format!("Values of {}", name));
            print_value_counts(name, &counts);
        }
    }

    let contract_counts = if df.column(&cli.group_by).is_ok() {
        let counts = group_counts(&df, &cli.group_by, &config.label)?;
        print_subheading(&format!("{} by {}", config.label, cli.group_by));
        print_group_counts(&cli.group_by, &config.label, &counts);
        counts
    } else {
        print_warning(&format!(
            "Column '{}' not found, skipping grouped counts",
            cli.group_by
        ));
        Vec::new()
    };

    let histograms = partition
        .numeric
        .iter()
        .map(|name| {
            numeric_values(&df, name).map(|values| histogram(name, &values, config.histogram_bins))
        })
        .collect::<Result<Vec<_>>>()?;

    summary.profile_time = step_start.elapsed();
    print_step_time(summary.profile_time);

    // Step 3: Clean
    print_step_header(2, "Clean");
    let step_start = Instant::now();

    let (df, imputed) = impute_mean(&df, &config.impute_columns)?;
    if imputed.is_empty() {
        print_info("No columns designated for imputation");
    } else {
        print_imputation(&imputed);
        print_success("Missing values replaced with column means");
    }

    let outliers = find_outliers(&df, &config.outlier_column, config.outlier_threshold)?;
    let df = if outliers.height() == 0 {
        print_info(&format!(
            "No rows with {} > {}",
            config.outlier_column, config.outlier_threshold
        ));
        // Rows with a missing outlier value are still dropped
        filter_outliers(&df, &config.outlier_column, config.outlier_threshold)?.0
    } else {
        print_count(
            "outlier row(s)",
            outliers.height(),
            Some(&format!("({} > {})", config.outlier_column, config.outlier_threshold)),
        );
        let confirmed = cli.no_confirm
            || confirm_drop_rows(outliers.height(), &config.outlier_column, config.outlier_threshold)?;
        if confirmed {
            let (filtered, dropped) =
                filter_outliers(&df, &config.outlier_column, config.outlier_threshold)?;
            print_success(&format!("Dropped {} row(s)", dropped));
            filtered
        } else {
            print_warning("Keeping outlier rows");
            df
        }
    };
    summary.rows_after_filter = df.height();

    summary.clean_time = step_start.elapsed();
    print_step_time(summary.clean_time);

    // Step 4: Features and split
    print_step_header(3, "Features");
    let step_start = Instant::now();

    let spinner = create_spinner("Encoding features...");
    let cleaned_partition = partition_columns(&df);
    let assembler = FeatureAssembler::fit(
        &df,
        &cleaned_partition,
        &config.label,
        &config.excluded_columns(),
    )?;
    let features = assembler.transform(&df)?;
    finish_with_success(&spinner, "Features encoded");
    print_info(&format!(
        "{} feature(s); positive class '{}' ({} of {} rows)",
        features.n_features(),
        assembler.positive_label(),
        features.positive_count(),
        features.n_rows()
    ));

    let split = train_test_split(features.n_rows(), config.train_ratio, config.seed)?;
    let train = features.subset(&split.train);
    let test = features.subset(&split.test);
    summary.train_rows = train.n_rows();
    summary.test_rows = test.n_rows();
    summary.num_features = features.n_features();
    print_info(&format!(
        "Train: {} rows, Test: {} rows (seed {})",
        train.n_rows(),
        test.n_rows(),
        config.seed
    ));

    summary.feature_time = step_start.elapsed();
    print_step_time(summary.feature_time);

    // Step 5: Train and evaluate
    print_step_header(4, "Train & Evaluate");
    let step_start = Instant::now();

    let base_params = config.tree_params();
    let curve = evaluate_depths(&train, &test, &config.depths(), &base_params)?;
    print_metric_curve(&curve);

    let best = curve.best().copied();
    if let Some(best) = best {
        summary.best_depth = Some(best.depth);
        summary.best_test_auc = Some(best.test_auc);
    }

    let final_depth = match (config.importance_from_best, best) {
        (true, Some(best)) => best.depth,
        _ => config.final_depth,
    };
    let model = fit_final_model(&train, &test, &base_params.max_depth(final_depth))?;
    summary.final_depth = final_depth;
    summary.final_train_auc = model.train_auc;
    summary.final_test_auc = model.test_auc;

    print_subheading(&format!(
        "Feature importances (depth {}, {} nodes)",
        model.tree.depth(),
        model.tree.num_nodes()
    ));
    let importances = model.tree.named_importances();
    print_importances(&importances);

    summary.train_time = step_start.elapsed();
    print_step_time(summary.train_time);

    // Step 6: Report
    print_step_header(5, "Report");
    let step_start = Instant::now();

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let mut outputs = Vec::new();
    if cli.no_charts {
        print_info("Chart rendering skipped");
    } else {
        let spinner = create_spinner("Rendering charts...");
        let charts = render_charts(
            &output_dir,
            &ChartData {
                histograms: &histograms,
                group_counts: &contract_counts,
                group_by: &cli.group_by,
                group_within: &config.label,
                curve: &curve,
                importances: &importances,
            },
        )?;
        finish_with_success(&spinner, &format!("Rendered {} chart(s)", charts.len()));
        outputs.extend(charts);
    }

    summary.report_time = step_start.elapsed();

    let report = RunReport::new(RunReportParams {
        input_file: input,
        config: &config,
        summary: &summary,
        features: features.feature_names.clone(),
        imputation: &imputed,
        curve: &curve,
        final_model: FinalModelEntry {
            depth: final_depth,
            train_auc: model.train_auc,
            test_auc: model.test_auc,
            num_nodes: model.tree.num_nodes(),
            positive_label: assembler.positive_label().to_string(),
            importances: importances
                .iter()
                .map(|(feature, importance)| ImportanceEntry {
                    feature: feature.clone(),
                    importance: *importance,
                })
                .collect(),
        },
    });
    let report_path = output_dir.join("churn_report.json");
    export_run_report(&report, &report_path)?;
    outputs.push(report_path.clone());
    print_success(&format!("Report saved to {}", report_path.display()));

    if cli.bundle {
        let zip_path = output_dir.join("churn_report.zip");
        package_run_outputs(&outputs, &zip_path)?;
        print_success(&format!("Bundle saved to {}", zip_path.display()));
    }

    print_step_time(step_start.elapsed());

    summary.display();
    print_completion();

    Ok(())
}
