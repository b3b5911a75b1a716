//! Terminal tables for profiling and model results

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{ColumnStats, CorrelationMatrix, GroupCount, ImputedColumn, MetricCurve};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn num_cell(value: f64, precision: usize) -> Cell {
    let text = if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", precision, value)
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Describe-style statistics, one row per numeric column
pub fn print_describe_table(stats: &[ColumnStats]) {
    let mut table = new_table(&[
        "Column", "Count", "Missing", "Mean", "Std", "Min", "25%", "50%", "75%", "Max",
    ]);
    for s in stats {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.count).set_alignment(CellAlignment::Right),
            Cell::new(s.missing)
                .set_alignment(CellAlignment::Right)
                .fg(if s.missing > 0 { Color::Yellow } else { Color::White }),
            num_cell(s.mean, 3),
            num_cell(s.std, 3),
            num_cell(s.min, 2),
            num_cell(s.q25, 2),
            num_cell(s.median, 2),
            num_cell(s.q75, 2),
            num_cell(s.max, 2),
        ]);
    }
    print_indented(&table);
}

/// Null counts; columns without nulls are listed only when `show_complete`
pub fn print_null_counts(counts: &[(String, usize)], show_complete: bool) {
    let mut table = new_table(&["Column", "Nulls"]);
    for (name, count) in counts {
        if *count == 0 && !show_complete {
            continue;
        }
        table.add_row(vec![
            Cell::new(name),
            Cell::new(count).fg(if *count > 0 { Color::Red } else { Color::Green }),
        ]);
    }
    print_indented(&table);
}

pub fn print_correlation_matrix(matrix: &CorrelationMatrix) {
    let mut header: Vec<&str> = vec![""];
    header.extend(matrix.names.iter().map(|s| s.as_str()));
    let mut table = new_table(&header);

    for (name, row) in matrix.names.iter().zip(matrix.to_rows()) {
        let mut cells = vec![Cell::new(name).add_attribute(Attribute::Bold)];
        cells.extend(row.into_iter().map(|r| {
            let color = if r.abs() >= 0.7 { Color::Yellow } else { Color::White };
            num_cell(r, 3).fg(color)
        }));
        table.add_row(cells);
    }
    print_indented(&table);
}

/// Category frequencies of one column
pub fn print_value_counts(column: &str, counts: &[(String, usize)]) {
    let mut table = new_table(&[column, "Count"]);
    for (value, count) in counts {
        table.add_row(vec![
            Cell::new(value),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

pub fn print_group_counts(by: &str, within: &str, counts: &[GroupCount]) {
    let mut table = new_table(&[by, within, "Count"]);
    for g in counts {
        table.add_row(vec![
            Cell::new(&g.group),
            Cell::new(&g.subgroup),
            Cell::new(g.count).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

pub fn print_imputation(results: &[ImputedColumn]) {
    let mut table = new_table(&["Column", "Fill Value", "Cells Filled"]);
    for r in results {
        table.add_row(vec![
            Cell::new(&r.name),
            num_cell(r.mean, 4),
            Cell::new(r.filled).fg(if r.filled > 0 { Color::Yellow } else { Color::White }),
        ]);
    }
    print_indented(&table);
}

/// Train/test AUC per depth, highlighting the best test AUC
pub fn print_metric_curve(curve: &MetricCurve) {
    let best_depth = curve.best().map(|p| p.depth);
    let mut table = new_table(&["Depth", "Train AUC", "Test AUC"]);
    for point in &curve.points {
        let is_best = Some(point.depth) == best_depth;
        let mut test_cell = num_cell(point.test_auc, 4);
        if is_best {
            test_cell = test_cell.fg(Color::Green).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(point.depth).set_alignment(CellAlignment::Right),
            num_cell(point.train_auc, 4),
            test_cell,
        ]);
    }
    print_indented(&table);
}

/// Feature importances sorted descending; zero-importance features are folded
/// into a single count line
pub fn print_importances(importances: &[(String, f64)]) {
    let mut sorted: Vec<&(String, f64)> = importances.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut table = new_table(&["Feature", "Importance", ""]);
    let mut unused = 0;
    for (name, value) in sorted {
        if *value <= 0.0 {
            unused += 1;
            continue;
        }
        let bar = "█".repeat((value * 30.0).round() as usize);
        table.add_row(vec![
            Cell::new(name),
            num_cell(*value, 4),
            Cell::new(bar).fg(Color::Cyan),
        ]);
    }
    print_indented(&table);

    if unused > 0 {
        println!(
            "      {}",
            style(format!("{} features were not used by any split", unused)).dim()
        );
    }
}

/// End-of-run overview
#[derive(Debug, Default)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub rows_after_filter: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub num_features: usize,
    pub best_depth: Option<usize>,
    pub best_test_auc: Option<f64>,
    pub final_depth: usize,
    pub final_train_auc: f64,
    pub final_test_auc: f64,
    pub load_time: Duration,
    pub profile_time: Duration,
    pub clean_time: Duration,
    pub feature_time: Duration,
    pub train_time: Duration,
    pub report_time: Duration,
}

impl RunSummary {
    pub fn new(rows_loaded: usize) -> Self {
        Self {
            rows_loaded,
            ..Default::default()
        }
    }

    pub fn total_time(&self) -> Duration {
        self.load_time
            + self.profile_time
            + self.clean_time
            + self.feature_time
            + self.train_time
            + self.report_time
    }

    pub fn dropped_rows(&self) -> usize {
        self.rows_loaded.saturating_sub(self.rows_after_filter)
    }

    pub fn display(&self) {
        print_section("📋", "RUN SUMMARY");

        let mut table = new_table(&["Metric", "Value"]);
        table.add_row(vec![Cell::new("📁 Rows Loaded"), Cell::new(self.rows_loaded)]);
        table.add_row(vec![
            Cell::new("🗑️  Rows Dropped (Outliers)"),
            Cell::new(self.dropped_rows()).fg(if self.dropped_rows() > 0 {
                Color::Red
            } else {
                Color::White
            }),
        ]);
        table.add_row(vec![
            Cell::new("✂️  Train / Test Rows"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![Cell::new("🧮 Features"), Cell::new(self.num_features)]);

        if let (Some(depth), Some(auc)) = (self.best_depth, self.best_test_auc) {
            table.add_row(vec![
                Cell::new("🏆 Best Depth (Test AUC)"),
                Cell::new(format!("{} ({:.4})", depth, auc))
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
            ]);
        }

        let auc_color = if self.final_test_auc >= 0.8 {
            Color::Green
        } else if self.final_test_auc >= 0.7 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new(format!("🌳 Final Model (depth {})", self.final_depth)),
            Cell::new(format!(
                "train {:.4} / test {:.4}",
                self.final_train_auc, self.final_test_auc
            ))
            .fg(auc_color)
            .add_attribute(Attribute::Bold),
        ]);
        print_indented(&table);

        print_section("⏱️", "TIMING");
        let mut timing = new_table(&["Step", "Time"]);
        for (step, duration) in [
            ("Load", self.load_time),
            ("Profile", self.profile_time),
            ("Clean", self.clean_time),
            ("Features", self.feature_time),
            ("Train", self.train_time),
            ("Report", self.report_time),
        ] {
            timing.add_row(vec![Cell::new(step), Cell::new(format_duration(duration))]);
        }
        timing.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(format_duration(self.total_time())).add_attribute(Attribute::Bold),
        ]);
        print_indented(&timing);
    }
}

/// `1.23s` or `45ms`
pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
