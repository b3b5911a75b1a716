//! Confirmation prompt before rows are removed

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

/// Ask before removing outlier rows. Answering no keeps them in the table.
pub fn confirm_drop_rows(row_count: usize, column: &str, threshold: f64) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Remove {} row(s) where {} exceeds {}?",
            row_count, column, threshold
        ))
        .default(true)
        .wait_for_newline(true)
        .interact()
        .context("Failed to read outlier confirmation")
}
