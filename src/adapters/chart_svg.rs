//! Dual-axis SVG rendering for time-series charts.

use chrono::DateTime;

use crate::domain::chart::{Axis, Chart, ChartSeries};

const CHART_WIDTH: f64 = 960.0;
const CHART_HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;

const PALETTE: [&str; 6] = [
    "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#ca8a04",
];
const ETH_COLOR: &str = "#2563eb";

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None::<Range>, |acc, v| match acc {
            None => Some(Range { min: v, max: v }),
            Some(r) => Some(Range {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    fn span(&self) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 { span } else { 1.0 }
    }

    fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

fn axis_range(chart: &Chart, axis: Axis) -> Option<Range> {
    Range::of(
        chart
            .series_on(axis)
            .flat_map(|s| s.points.iter().map(|p| p.1)),
    )
}

pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn format_value(v: f64) -> String {
    if v.abs() >= 100.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.4}", v)
    }
}

fn series_color(series: &ChartSeries, index: usize) -> &'static str {
    match series.axis {
        Axis::Right => ETH_COLOR,
        Axis::Left => PALETTE[index % PALETTE.len()],
    }
}

/// Render every series of the chart into one SVG. Left-axis series and
/// right-axis series are scaled independently over a shared time axis.
/// Returns an empty string when no series has any points.
pub fn generate_chart_svg(chart: &Chart) -> String {
    let Some(x_range) = Range::of(
        chart
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.0 as f64)),
    ) else {
        return String::new();
    };
    let left = axis_range(chart, Axis::Left);
    let right = axis_range(chart, Axis::Right);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = CHART_HEIGHT - MARGIN_BOTTOM;

    let x_scale =
        |t: i64| -> f64 { MARGIN_LEFT + ((t as f64 - x_range.min) / x_range.span()) * plot_width };
    let y_scale =
        |v: f64, r: Range| -> f64 { bottom - ((v - r.min) / r.span()) * plot_height };

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    // frame
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        MARGIN_TOP,
        CHART_WIDTH - MARGIN_RIGHT,
        bottom
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        bottom,
        CHART_WIDTH - MARGIN_RIGHT,
        bottom
    ));

    // value labels
    for (range, x, anchor) in [
        (left, MARGIN_LEFT - 5.0, "end"),
        (right, CHART_WIDTH - MARGIN_RIGHT + 5.0, "start"),
    ] {
        let Some(range) = range else { continue };
        for (value, y) in [
            (range.max, MARGIN_TOP + 5.0),
            (range.mid(), MARGIN_TOP + plot_height / 2.0),
            (range.min, bottom - 5.0),
        ] {
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>\n",
                x,
                y,
                anchor,
                format_value(value)
            ));
        }
    }

    // axis titles
    svg.push_str(&format!(
        "  <text x=\"15\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#444\" transform=\"rotate(-90 15 {})\">{}</text>\n",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0,
        chart.left_title
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#444\" transform=\"rotate(90 {} {})\">{}</text>\n",
        CHART_WIDTH - 15.0,
        MARGIN_TOP + plot_height / 2.0,
        CHART_WIDTH - 15.0,
        MARGIN_TOP + plot_height / 2.0,
        chart.right_title
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#444\">{}</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 5.0,
        chart.x_title
    ));

    // time labels
    for (t, x) in [
        (x_range.min, MARGIN_LEFT),
        (x_range.min + x_range.span() / 2.0, MARGIN_LEFT + plot_width / 2.0),
        (x_range.max, CHART_WIDTH - MARGIN_RIGHT),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x,
            bottom + 15.0,
            format_timestamp(t as i64)
        ));
    }

    // series
    let mut legend_x = MARGIN_LEFT;
    for (i, series) in chart.series.iter().enumerate() {
        let range = match series.axis {
            Axis::Left => left,
            Axis::Right => right,
        };
        let Some(range) = range else { continue };
        let color = series_color(series, i);

        let mut path_data = String::new();
        for (j, &(t, v)) in series.points.iter().enumerate() {
            let cmd = if j == 0 { "M" } else { " L" };
            path_data.push_str(&format!("{} {:.1} {:.1}", cmd, x_scale(t), y_scale(v, range)));
        }
        svg.push_str(&format!(
            "  <g class=\"series\" data-name=\"{}\">\n    <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>\n",
            series.name, path_data, color
        ));
        for &(t, v) in &series.points {
            svg.push_str(&format!(
                "    <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2\" fill=\"{}\"><title>{} {}: {}</title></circle>\n",
                x_scale(t),
                y_scale(v, range),
                color,
                series.name,
                format_timestamp(t),
                format_value(v)
            ));
        }
        svg.push_str("  </g>\n");

        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"12\" width=\"12\" height=\"3\" fill=\"{}\"/>\n  <text x=\"{:.1}\" y=\"17\" font-size=\"11\" fill=\"#333\">{}</text>\n",
            legend_x,
            color,
            legend_x + 16.0,
            series.name
        ));
        legend_x += 24.0 + series.name.len() as f64 * 7.0;
    }

    svg.push_str("</svg>");
    svg
}
