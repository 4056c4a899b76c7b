//! HTML chart adapter implementing ChartWriter.
//!
//! Writes a standalone page with the inline SVG chart and a per-series
//! summary table. Opening the file in a browser gives hover tooltips on
//! every point.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::chart_svg::{format_timestamp, format_value, generate_chart_svg};
use crate::domain::chart::{Axis, Chart, ChartSeries};
use crate::domain::error::RealPricesError;
use crate::ports::chart_port::ChartWriter;

struct SeriesSummary {
    name: String,
    axis: &'static str,
    points: usize,
    first: String,
    last: String,
}

impl SeriesSummary {
    fn from_series(series: &ChartSeries, chart: &Chart) -> Self {
        let describe = |p: Option<&(i64, f64)>| {
            p.map(|&(t, v)| format!("{} @ {}", format_value(v), format_timestamp(t)))
                .unwrap_or_else(|| "-".to_string())
        };
        let (axis, axis_title) = match series.axis {
            Axis::Left => ("left", &chart.left_title),
            Axis::Right => ("right", &chart.right_title),
        };
        Self {
            name: format!("{} ({})", series.name, axis_title),
            axis,
            points: series.points.len(),
            first: describe(series.points.first()),
            last: describe(series.points.last()),
        }
    }
}

#[derive(Template)]
#[template(path = "chart.html")]
struct ChartTemplate<'a> {
    title: &'a str,
    svg: String,
    summary: Vec<SeriesSummary>,
}

pub fn render_chart_html(chart: &Chart) -> Result<String, RealPricesError> {
    let template = ChartTemplate {
        title: &chart.title,
        svg: generate_chart_svg(chart),
        summary: chart
            .series
            .iter()
            .map(|s| SeriesSummary::from_series(s, chart))
            .collect(),
    };
    template
        .render()
        .map_err(|e| RealPricesError::Io(std::io::Error::other(e.to_string())))
}

pub struct HtmlChartAdapter;

impl HtmlChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartWriter for HtmlChartAdapter {
    fn write_chart(&self, chart: &Chart, output_path: &Path) -> Result<(), RealPricesError> {
        let html = render_chart_html(chart)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        Ok(())
    }
}
