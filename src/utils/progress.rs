//! Spinners and the depth sweep progress bar

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Spinner for steps with no natural unit of progress (loading, encoding, rendering)
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner().with_message(message.to_string());
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    pb.enable_steady_tick(SPINNER_TICK);
    pb
}

/// Bar advanced once per fitted tree
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len).with_message(message.to_string());
    pb.set_style(
        ProgressStyle::with_template("  {msg:<22} {bar:36.green/white} tree {pos}/{len} [{elapsed_precise}]")
            .unwrap()
            .progress_chars("━╸─"),
    );
    pb
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}
