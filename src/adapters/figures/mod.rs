//! Report figures: the top-N table and the diff/percent chart.
//!
//! Figures are laid out as SVG by [`table_svg`] and [`chart_svg`] and then
//! rasterized to PNG by a [`Rasterizer`]. Layouts and the rasterizer are
//! plain values handed to each call; nothing here keeps global state.

pub mod chart_svg;
pub mod table_svg;

use crate::domain::error::MoversError;
use crate::domain::metrics::CompanyMetrics;
use log::{info, warn};
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::Path;
use std::process::Command;

pub use chart_svg::{ChartLayout, chart_svg};
pub use table_svg::{TABLE_COLUMNS, TableColumn, TableLayout, table_svg};

pub(crate) const FONT_FAMILY: &str =
    "Noto Sans CJK JP, IPAexGothic, IPAGothic, Hiragino Sans, Yu Gothic, Meiryo, sans-serif";

/// Rough advance width of `text` at `font_size`; full-width characters
/// count as one em, everything else as 0.6 em.
pub(crate) fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars()
        .map(|c| if is_wide(c) { 1.0 } else { 0.6 })
        .sum::<f64>()
        * font_size
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6)
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Turns SVG documents into PNG files.
pub struct Rasterizer {
    options: usvg::Options<'static>,
    scale: f32,
}

impl Rasterizer {
    /// A rasterizer using the fonts installed on this machine.
    pub fn with_system_fonts() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self {
            options,
            scale: 2.0,
        }
    }

    pub fn save_png(&self, svg: &str, path: &Path) -> Result<(), MoversError> {
        let render_error = |reason: String| MoversError::Render {
            path: path.display().to_string(),
            reason,
        };

        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| render_error(format!("invalid SVG: {e}")))?;
        let size = tree.size().to_int_size();
        let width = (size.width() as f32 * self.scale).ceil() as u32;
        let height = (size.height() as f32 * self.scale).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| render_error(format!("cannot allocate {width}x{height} image")))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| render_error(e.to_string()))?;
        }
        pixmap
            .save_png(path)
            .map_err(|e| render_error(e.to_string()))
    }
}

pub fn render_table(
    rasterizer: &Rasterizer,
    rows: &[CompanyMetrics],
    columns: &[TableColumn],
    layout: &TableLayout,
    path: &Path,
) -> Result<(), MoversError> {
    rasterizer.save_png(&table_svg(rows, columns, layout), path)?;
    info!("table written to {}", path.display());
    Ok(())
}

pub fn render_chart(
    rasterizer: &Rasterizer,
    rows: &[CompanyMetrics],
    layout: &ChartLayout,
    path: &Path,
) -> Result<(), MoversError> {
    rasterizer.save_png(&chart_svg(rows, layout), path)?;
    info!("chart written to {}", path.display());
    Ok(())
}

/// Whether a desktop session is available to show images in.
pub fn display_available() -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

/// Opens `path` in the platform image viewer without waiting for it.
pub fn show_image(path: &Path) {
    if !display_available() {
        info!("no display available, not showing {}", path.display());
        return;
    }

    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    if let Err(e) = cmd.arg(path).spawn() {
        warn!("could not open {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_count_double() {
        assert!((text_width("abcd", 10.0) - 24.0).abs() < 1e-9);
        assert!((text_width("トヨタ", 10.0) - 30.0).abs() < 1e-9);
        assert!((text_width("7203 トヨタ", 10.0) - (5.0 * 6.0 + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("A&B <Holdings>"), "A&amp;B &lt;Holdings&gt;");
    }
}
