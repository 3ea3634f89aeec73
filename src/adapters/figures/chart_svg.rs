//! Diff bars with a percent-change line on a secondary axis.

use super::{FONT_FAMILY, escape_xml, text_width};
use crate::domain::metrics::CompanyMetrics;

const BAR_COLORS: [&str; 3] = ["#1f77b4", "#ff7f0e", "#2ca02c"];
const BAR_LABELS: [&str; 3] = ["Diff1", "Diff2", "Diff3"];
const LINE_COLOR: &str = "#d62728";
const LINE_LABEL: &str = "Percent Change (%)";
const AXIS_COLOR: &str = "#333";

#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub font_size: f64,
    pub title: String,
    pub value_axis_label: String,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            margin_left: 80.0,
            margin_right: 80.0,
            margin_top: 80.0,
            margin_bottom: 130.0,
            font_size: 12.0,
            title: "Recent 3-Day Diff (Close - Previous Open) for Top 10 TSE Companies by Percent Change"
                .to_string(),
            value_axis_label: "Price Difference (JPY)".to_string(),
        }
    }
}

/// Linear mapping of a value range onto a vertical pixel span.
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    max: f64,
    top: f64,
    bottom: f64,
}

impl Axis {
    /// Range covering `values` with 5% headroom, optionally forced to
    /// include zero. A flat range is widened to ±1 around its value.
    fn fit(values: impl Iterator<Item = f64>, include_zero: bool, top: f64, bottom: f64) -> Self {
        let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            min = 0.0;
            max = 0.0;
        }
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if max - min < f64::EPSILON {
            min -= 1.0;
            max += 1.0;
        }
        let pad = (max - min) * 0.05;
        Self {
            min: min - pad,
            max: max + pad,
            top,
            bottom,
        }
    }

    fn y(&self, v: f64) -> f64 {
        self.bottom - (v - self.min) / (self.max - self.min) * (self.bottom - self.top)
    }

    fn ticks(&self) -> Vec<f64> {
        let step = nice_step((self.max - self.min) / 5.0);
        let first = (self.min / step).ceil() as i64;
        let last = (self.max / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Rounds a raw tick spacing to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn fmt_tick(v: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };
    format!("{:.*}", decimals, if v == 0.0 { 0.0 } else { v })
}

pub fn chart_svg(rows: &[CompanyMetrics], layout: &ChartLayout) -> String {
    let plot_left = layout.margin_left;
    let plot_right = layout.width - layout.margin_right;
    let plot_top = layout.margin_top;
    let plot_bottom = layout.height - layout.margin_bottom;
    let fs = layout.font_size;

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        layout.width, layout.height, layout.width, layout.height
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <g font-family=\"{}\" font-size=\"{}\" fill=\"{}\">\n",
        FONT_FAMILY, fs, AXIS_COLOR
    ));
    svg.push_str(&format!(
        "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"{}\">{}</text>\n",
        layout.width / 2.0,
        fs * 2.0,
        fs * 1.2,
        escape_xml(&layout.title)
    ));

    // Frame
    svg.push_str(&format!(
        "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>\n",
        plot_left,
        plot_top,
        plot_right - plot_left,
        plot_bottom - plot_top,
        AXIS_COLOR
    ));

    if rows.is_empty() {
        svg.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">No data</text>\n",
            (plot_left + plot_right) / 2.0,
            (plot_top + plot_bottom) / 2.0
        ));
        svg.push_str("  </g>\n</svg>");
        return svg;
    }

    let diffs = Axis::fit(
        rows.iter().flat_map(|m| m.diffs()),
        true,
        plot_top,
        plot_bottom,
    );
    let percent = Axis::fit(
        rows.iter().map(|m| m.percent_change),
        false,
        plot_top,
        plot_bottom,
    );

    // Primary axis: ticks, grid and label
    let step = nice_step((diffs.max - diffs.min) / 5.0);
    for v in diffs.ticks() {
        let y = diffs.y(v);
        svg.push_str(&format!(
            "    <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e5e5e5\" stroke-width=\"1\"/>\n",
            plot_left, y, plot_right, y
        ));
        svg.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            plot_left - 6.0,
            y + fs * 0.35,
            fmt_tick(v, step)
        ));
    }
    svg.push_str(&format!(
        "    <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
        plot_left,
        diffs.y(0.0),
        plot_right,
        diffs.y(0.0),
        AXIS_COLOR
    ));
    let mid_y = (plot_top + plot_bottom) / 2.0;
    svg.push_str(&format!(
        "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 {:.1} {:.1})\">{}</text>\n",
        fs * 1.5,
        mid_y,
        fs * 1.5,
        mid_y,
        escape_xml(&layout.value_axis_label)
    ));

    // Secondary axis in the line colour
    let pct_step = nice_step((percent.max - percent.min) / 5.0);
    for v in percent.ticks() {
        svg.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\">{}</text>\n",
            plot_right + 6.0,
            percent.y(v) + fs * 0.35,
            LINE_COLOR,
            fmt_tick(v, pct_step)
        ));
    }
    let right_x = layout.width - fs * 1.5;
    svg.push_str(&format!(
        "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" transform=\"rotate(90 {:.1} {:.1})\">{}</text>\n",
        right_x, mid_y, LINE_COLOR, right_x, mid_y, LINE_LABEL
    ));

    // Bars, grouped per company
    let slot = (plot_right - plot_left) / rows.len() as f64;
    let bar_width = slot * 0.8 / BAR_COLORS.len() as f64;
    let centers: Vec<f64> = (0..rows.len())
        .map(|i| plot_left + slot * (i as f64 + 0.5))
        .collect();
    let zero_y = diffs.y(0.0);

    for (m, &cx) in rows.iter().zip(&centers) {
        let group_left = cx - slot * 0.4;
        for (k, (value, color)) in m.diffs().iter().zip(BAR_COLORS).enumerate() {
            let y = diffs.y(*value);
            svg.push_str(&format!(
                "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
                group_left + k as f64 * bar_width,
                y.min(zero_y),
                bar_width,
                (y - zero_y).abs(),
                color
            ));
        }

        let label_y = plot_bottom + fs;
        svg.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" transform=\"rotate(-45 {:.1} {:.1})\">{}</text>\n",
            cx,
            label_y,
            cx,
            label_y,
            escape_xml(&m.short_label())
        ));
    }
    svg.push_str(&format!(
        "    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">Company (Code + Name)</text>\n",
        (plot_left + plot_right) / 2.0,
        layout.height - fs * 0.5
    ));

    // Percent change line with markers
    let points: Vec<String> = rows
        .iter()
        .zip(&centers)
        .map(|(m, cx)| format!("{:.1},{:.1}", cx, percent.y(m.percent_change)))
        .collect();
    svg.push_str(&format!(
        "    <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        points.join(" "),
        LINE_COLOR
    ));
    for (m, cx) in rows.iter().zip(&centers) {
        svg.push_str(&format!(
            "    <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"/>\n",
            cx,
            percent.y(m.percent_change),
            LINE_COLOR
        ));
    }

    svg.push_str(&legend(plot_left, plot_top - fs * 1.5, fs));
    svg.push_str("  </g>\n</svg>");
    svg
}

/// One legend for both axes, laid out in a row above the plot's upper-left
/// corner so it never covers bars or markers.
fn legend(x: f64, y: f64, fs: f64) -> String {
    let mut out = String::new();
    let mut cursor = x;
    for (label, color) in BAR_LABELS.iter().zip(BAR_COLORS) {
        out.push_str(&format!(
            "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            cursor,
            y - fs * 0.8,
            fs,
            fs * 0.8,
            color
        ));
        out.push_str(&format!(
            "    <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            cursor + fs * 1.4,
            y,
            label
        ));
        cursor += fs * 2.4 + text_width(label, fs);
    }
    let line_y = y - fs * 0.4;
    out.push_str(&format!(
        "    <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        cursor,
        line_y,
        cursor + fs * 2.0,
        line_y,
        LINE_COLOR
    ));
    out.push_str(&format!(
        "    <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"/>\n",
        cursor + fs,
        line_y,
        LINE_COLOR
    ));
    out.push_str(&format!(
        "    <text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
        cursor + fs * 2.4,
        y,
        LINE_LABEL
    ));
    out
}
