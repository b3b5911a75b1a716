//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

pub const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];

/// Small churn table with the columns of the telco dataset
///
/// - `customerID`: unique identifier
/// - `tenure`: one missing value, one value above 100
/// - `MonthlyCharges`: complete
/// - `TotalCharges`: string column with a blank cell, as in the raw export
/// - `Contract`, `PaymentMethod`: categorical
/// - `Churn`: "Yes"/"No" label
pub fn create_churn_dataframe() -> DataFrame {
    df! {
        "customerID" => ["0001", "0002", "0003", "0004", "0005", "0006", "0007", "0008", "0009", "0010"],
        "tenure" => [Some(1i64), Some(34), Some(2), Some(45), None, Some(8), Some(22), Some(10), Some(28), Some(120)],
        "MonthlyCharges" => [29.85f64, 56.95, 53.85, 42.30, 70.70, 99.65, 89.10, 29.75, 104.80, 56.15],
        "TotalCharges" => ["29.85", "1889.5", "108.15", "1840.75", " ", "820.5", "1949.4", "301.9", "3046.05", "3487.95"],
        "Contract" => ["Month-to-month", "One year", "Month-to-month", "One year", "Month-to-month",
                       "Month-to-month", "Month-to-month", "Month-to-month", "Month-to-month", "Two year"],
        "PaymentMethod" => ["Electronic check", "Mailed check", "Mailed check", "Bank transfer", "Electronic check",
                            "Electronic check", "Credit card", "Mailed check", "Electronic check", "Bank transfer"],
        "Churn" => ["No", "No", "Yes", "No", "Yes", "Yes", "No", "No", "Yes", "No"],
    }
    .unwrap()
}

/// Synthetic 100-row table: `tenure` spans 0-150 with 5 missing values,
/// three contract types and a Yes/No label
pub fn create_synthetic_churn_dataframe() -> DataFrame {
    let n = 100;
    let ids: Vec<String> = (0..n).map(|i| format!("C{:04}", i)).collect();
    let tenure: Vec<Option<i64>> = (0..n)
        .map(|i| if i % 20 == 7 { None } else { Some((i * 37 % 151) as i64) })
        .collect();
    let contract: Vec<&str> = (0..n).map(|i| CONTRACTS[i % 3]).collect();
    let monthly: Vec<f64> = (0..n).map(|i| 20.0 + (i * 13 % 90) as f64).collect();
    let churn: Vec<&str> = (0..n)
        .map(|i| if i % 3 == 0 && i % 2 == 0 { "Yes" } else if i % 7 == 0 { "Yes" } else { "No" })
        .collect();

    df! {
        "customerID" => ids,
        "tenure" => tenure,
        "MonthlyCharges" => monthly,
        "Contract" => contract,
        "Churn" => churn,
    }
    .unwrap()
}

/// Table whose label is a threshold of `score`: churn when score > 50.
/// `noise` is unrelated to the label.
pub fn create_threshold_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let score: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect();
    let noise: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>()).collect();
    let contract: Vec<&str> = (0..rows).map(|_| CONTRACTS[rng.gen_range(0..3)]).collect();
    let churn: Vec<&str> = score.iter().map(|&s| if s > 50.0 { "Yes" } else { "No" }).collect();

    df! {
        "score" => score,
        "noise" => noise,
        "Contract" => contract,
        "Churn" => churn,
    }
    .unwrap()
}

/// Create a larger random churn table for performance tests
pub fn create_large_churn_dataframe(rows: usize, numeric_cols: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(7);

    let mut columns: Vec<Column> = Vec::with_capacity(numeric_cols + 2);
    let churn: Vec<&str> = (0..rows)
        .map(|_| if rng.gen_bool(0.27) { "Yes" } else { "No" })
        .collect();
    columns.push(Column::new("Churn".into(), churn));

    let contract: Vec<&str> = (0..rows).map(|_| CONTRACTS[rng.gen_range(0..3)]).collect();
    columns.push(Column::new("Contract".into(), contract));

    for i in 0..numeric_cols {
        let values: Vec<f64> = (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a column holds no nulls
pub fn assert_no_missing(df: &DataFrame, column: &str) {
    let nulls = df.column(column).unwrap().null_count();
    assert_eq!(nulls, 0, "Column '{}' still has {} missing value(s)", column, nulls);
}
