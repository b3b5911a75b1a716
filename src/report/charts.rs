//! SVG chart rendering
//!
//! Four charts are produced per run: a grid of numeric histograms, grouped
//! bars of churn per contract type, train/test AUC against tree depth, and
//! feature importances.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::pipeline::{GroupCount, Histogram, MetricCurve};

const FONT: &str = "sans-serif";

/// File names of the charts written by `render_charts`
pub const HISTOGRAMS_FILE: &str = "numeric_histograms.svg";
pub const GROUP_BARS_FILE: &str = "churn_by_contract.svg";
pub const AUC_CURVE_FILE: &str = "auc_vs_depth.svg";
pub const IMPORTANCES_FILE: &str = "feature_importances.svg";

/// Data for every chart of a run
pub struct ChartData<'a> {
    pub histograms: &'a [Histogram],
    pub group_counts: &'a [GroupCount],
    pub group_by: &'a str,
    pub group_within: &'a str,
    pub curve: &'a MetricCurve,
    pub importances: &'a [(String, f64)],
}

/// Render every chart into `output_dir`, returning the written paths
pub fn render_charts(output_dir: &Path, data: &ChartData<'_>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(4);

    if !data.histograms.is_empty() {
        let path = output_dir.join(HISTOGRAMS_FILE);
        render_histograms(&path, data.histograms)?;
        written.push(path);
    }

    if !data.group_counts.is_empty() {
        let path = output_dir.join(GROUP_BARS_FILE);
        let title = format!("{} by {}", data.group_within, data.group_by);
        render_group_bars(&path, &title, data.group_counts)?;
        written.push(path);
    }

    if !data.curve.is_empty() {
        let path = output_dir.join(AUC_CURVE_FILE);
        render_metric_curve(&path, data.curve)?;
        written.push(path);
    }

    let path = output_dir.join(IMPORTANCES_FILE);
    render_importances(&path, data.importances)?;
    written.push(path);

    Ok(written)
}

/// Grid of histograms, one panel per column
pub fn render_histograms(path: &Path, histograms: &[Histogram]) -> Result<()> {
    let cols = histograms.len().clamp(1, 3);
    let rows = histograms.len().div_ceil(cols).max(1);

    let root = SVGBackend::new(path, (420 * cols as u32, 300 * rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((rows, cols));
    for (panel, hist) in panels.iter().zip(histograms) {
        let lo = hist.edges.first().copied().unwrap_or(0.0);
        let mut hi = hist.edges.last().copied().unwrap_or(1.0);
        if hi <= lo {
            hi = lo + 1.0;
        }
        let max_count = hist.counts.iter().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(panel)
            .caption(&hist.name, (FONT, 18))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(lo..hi, 0f64..max_count * 1.05)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(6)
            .y_labels(5)
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
            let left = hist.edges[i];
            let right = if hist.edges[i + 1] > left { hist.edges[i + 1] } else { hi };
            Rectangle::new([(left, 0.0), (right, count as f64)], BLUE.mix(0.6).filled())
        }))?;
    }

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    Ok(())
}

/// Grouped bars: one cluster per group, one bar per subgroup
pub fn render_group_bars(path: &Path, title: &str, counts: &[GroupCount]) -> Result<()> {
    let groups = distinct(counts.iter().map(|c| c.group.as_str()));
    let subgroups = distinct(counts.iter().map(|c| c.subgroup.as_str()));
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1) as f64;

    let root = SVGBackend::new(path, (900, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..groups.len() as f64 - 0.5, 0f64..max_count * 1.1)?;

    let label_for = |x: &f64| category_label(&groups, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&label_for)
        .y_desc("Count")
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    let bar_width = 0.8 / subgroups.len().max(1) as f64;
    for (s, subgroup) in subgroups.iter().enumerate() {
        let color = Palette99::pick(s).mix(0.85);
        let bars = counts.iter().filter(|c| &c.subgroup == subgroup).filter_map(|c| {
            let g = groups.iter().position(|name| *name == c.group)?;
            let left = g as f64 - 0.4 + s as f64 * bar_width;
            Some(Rectangle::new(
                [(left, 0.0), (left + bar_width, c.count as f64)],
                color.filled(),
            ))
        });
        chart
            .draw_series(bars)?
            .label(subgroup.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    Ok(())
}

/// Train and test AUC against maximum depth
pub fn render_metric_curve(path: &Path, curve: &MetricCurve) -> Result<()> {
    let depths = curve.depths();
    let x_lo = depths.iter().copied().min().unwrap_or(0) as f64 - 0.5;
    let x_hi = depths.iter().copied().max().unwrap_or(1) as f64 + 0.5;
    let lowest = curve
        .points
        .iter()
        .flat_map(|p| [p.train_auc, p.test_auc])
        .fold(1.0f64, f64::min);
    let y_lo = ((lowest - 0.05) * 10.0).floor().max(0.0) / 10.0;

    let root = SVGBackend::new(path, (900, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("AUC vs tree depth", (FONT, 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..1.0f64)?;
    chart
        .configure_mesh()
        .x_desc("Max depth")
        .y_desc("AUC")
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    let series: [(&str, RGBColor, fn(&crate::pipeline::MetricPoint) -> f64); 2] = [
        ("train", BLUE, |p| p.train_auc),
        ("test", RED, |p| p.test_auc),
    ];
    for (label, color, value) in series {
        let points: Vec<(f64, f64)> = curve
            .points
            .iter()
            .map(|p| (p.depth as f64, value(p)))
            .collect();
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(points.into_iter().map(|pt| Circle::new(pt, 3, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    Ok(())
}

/// Horizontal importance bars, largest at the top
pub fn render_importances(path: &Path, importances: &[(String, f64)]) -> Result<()> {
    let mut sorted: Vec<&(String, f64)> = importances.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    // Bottom-to-top order along the y axis
    let names: Vec<&str> = sorted.iter().rev().map(|(name, _)| name.as_str()).collect();
    let n = names.len().max(1);
    let max_value = sorted.first().map(|(_, v)| *v).unwrap_or(0.0).max(1e-9);

    let root = SVGBackend::new(path, (900, 120 + 28 * n as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Feature importances", (FONT, 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..max_value * 1.1, -0.5f64..n as f64 - 0.5)?;

    let label_for = |y: &f64| category_label(&names, *y);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&label_for)
        .x_desc("Importance")
        .draw()?;

    chart.draw_series(sorted.iter().rev().enumerate().map(|(i, (_, value))| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.35), (*value, y + 0.35)], GREEN.mix(0.7).filled())
    }))?;

    root.present()
        .with_context(|| format!("Failed to write chart {}", path.display()))?;
    Ok(())
}

/// Unique values in first-seen order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Axis label for a category placed at integer position `i`
fn category_label(names: &[&str], position: f64) -> String {
    let idx = position.round();
    if (position - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
}
