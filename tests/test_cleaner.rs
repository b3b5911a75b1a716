//! Tests for mean imputation and outlier removal

use churntree::pipeline::*;
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_impute_total_charges_from_text() {
    let df = create_churn_dataframe();

    let (imputed, results) = impute_mean(&df, &["TotalCharges".to_string()]).unwrap();

    assert_no_missing(&imputed, "TotalCharges");
    assert_eq!(imputed.column("TotalCharges").unwrap().dtype(), &DataType::Float64);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].filled, 1);

    let observed = [
        29.85, 1889.5, 108.15, 1840.75, 820.5, 1949.4, 301.9, 3046.05, 3487.95,
    ];
    let expected_mean = observed.iter().sum::<f64>() / observed.len() as f64;
    assert!((results[0].mean - expected_mean).abs() < 1e-9);

    let filled = imputed.column("TotalCharges").unwrap().f64().unwrap().get(4).unwrap();
    assert!((filled - expected_mean).abs() < 1e-9);
}

#[test]
fn test_impute_leaves_other_columns_untouched() {
    let df = create_churn_dataframe();
    let (imputed, _) = impute_mean(&df, &["tenure".to_string()]).unwrap();

    assert_no_missing(&imputed, "tenure");
    let before: Vec<Option<String>> = string_values(&df, "Contract").unwrap();
    let after: Vec<Option<String>> = string_values(&imputed, "Contract").unwrap();
    assert_eq!(before, after);
    // The input frame is not modified
    assert_eq!(df.column("tenure").unwrap().null_count(), 1);
}

#[test]
fn test_impute_treats_nan_as_missing() {
    let df = df! {
        "x" => [Some(1.0f64), Some(f64::NAN), None, Some(3.0)],
    }
    .unwrap();

    let (imputed, results) = impute_mean(&df, &["x".to_string()]).unwrap();
    let values: Vec<Option<f64>> = imputed.column("x").unwrap().f64().unwrap().into_iter().collect();

    assert_eq!(results[0].filled, 2);
    assert_eq!(values, vec![Some(1.0), Some(2.0), Some(2.0), Some(3.0)]);
}

#[test]
fn test_impute_all_missing_fails() {
    let df = df! {
        "x" => [None::<f64>, None, None],
    }
    .unwrap();

    let err = impute_mean(&df, &["x".to_string()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::UndefinedMean { column }) if column == "x"
    ));
}

#[test]
fn test_impute_unknown_column_fails() {
    let err = impute_mean(&create_churn_dataframe(), &["Nope".to_string()]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::ColumnNotFound { .. })
    ));
}

#[test]
fn test_filter_outliers_on_churn_table() {
    let df = create_churn_dataframe();

    let outliers = find_outliers(&df, "tenure", 100.0).unwrap();
    assert_eq!(outliers.height(), 1);

    let (kept, dropped) = filter_outliers(&df, "tenure", 100.0).unwrap();
    // One outlier and one row with missing tenure
    assert_eq!(dropped, 2);
    assert_eq!(kept.height(), 8);

    let max = kept.column("tenure").unwrap().i64().unwrap().max().unwrap();
    assert!(max <= 100);
}

#[test]
fn test_impute_then_filter_synthetic_table() {
    let df = create_synthetic_churn_dataframe();
    let above: usize = numeric_values(&df, "tenure")
        .unwrap()
        .iter()
        .filter(|v| matches!(v, Some(x) if *x > 100.0))
        .count();
    assert!(above > 0, "fixture should contain outliers");

    let (imputed, results) = impute_mean(&df, &["tenure".to_string()]).unwrap();
    assert_eq!(results[0].filled, 5);
    assert!(results[0].mean <= 100.0);

    let (filtered, dropped) = filter_outliers(&imputed, "tenure", 100.0).unwrap();

    assert_no_missing(&filtered, "tenure");
    assert_eq!(dropped, above);
    assert_eq!(filtered.height(), 100 - above);
    assert!(numeric_values(&filtered, "tenure")
        .unwrap()
        .iter()
        .all(|v| matches!(v, Some(x) if *x <= 100.0)));
}

#[test]
fn test_null_counts_before_and_after_imputation() {
    let df = create_synthetic_churn_dataframe();
    let before = count_nulls(&df).unwrap();
    assert_eq!(before[1], ("tenure".to_string(), 5));

    let (imputed, _) = impute_mean(&df, &["tenure".to_string()]).unwrap();
    assert!(count_nulls(&imputed).unwrap().iter().all(|(_, n)| *n == 0));
}
