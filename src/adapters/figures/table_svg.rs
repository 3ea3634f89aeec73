//! Top-N table figure.

use super::{FONT_FAMILY, escape_xml, text_width};
use crate::adapters::results_csv_adapter::RESULT_HEADERS;
use crate::domain::metrics::CompanyMetrics;
use crate::domain::ranking::format_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    StockCode,
    CompanyName,
    TodayOpen,
    YesterdayClose,
    Diff1,
    Diff2,
    Diff3,
    PercentChange,
    Diff1Dates,
    Diff2Dates,
    Diff3Dates,
}

/// Every column, in results-file order.
pub const TABLE_COLUMNS: [TableColumn; 11] = [
    TableColumn::StockCode,
    TableColumn::CompanyName,
    TableColumn::TodayOpen,
    TableColumn::YesterdayClose,
    TableColumn::Diff1,
    TableColumn::Diff2,
    TableColumn::Diff3,
    TableColumn::PercentChange,
    TableColumn::Diff1Dates,
    TableColumn::Diff2Dates,
    TableColumn::Diff3Dates,
];

impl TableColumn {
    pub fn header(self) -> &'static str {
        RESULT_HEADERS[self as usize]
    }

    pub fn cell(self, m: &CompanyMetrics) -> String {
        match self {
            TableColumn::StockCode => m.ticker.clone(),
            TableColumn::CompanyName => m.name.clone(),
            TableColumn::TodayOpen => format!("{:.2}", m.today_open),
            TableColumn::YesterdayClose => format!("{:.2}", m.yesterday_close),
            TableColumn::Diff1 => format!("{:.2}", m.diff1),
            TableColumn::Diff2 => format!("{:.2}", m.diff2),
            TableColumn::Diff3 => format!("{:.2}", m.diff3),
            TableColumn::PercentChange => format_percent(m.percent_change),
            TableColumn::Diff1Dates => m.diff1_dates.to_string(),
            TableColumn::Diff2Dates => m.diff2_dates.to_string(),
            TableColumn::Diff3Dates => m.diff3_dates.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub font_size: f64,
    pub cell_padding: f64,
    pub row_height: f64,
    pub margin: f64,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            cell_padding: 8.0,
            row_height: 22.0,
            margin: 8.0,
        }
    }
}

/// Grid with a header row and one row per company. Columns are as wide as
/// their widest cell; text is centered.
pub fn table_svg(rows: &[CompanyMetrics], columns: &[TableColumn], layout: &TableLayout) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|m| columns.iter().map(|c| c.cell(m)).collect())
        .collect();

    let widths: Vec<f64> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let widest = cells
                .iter()
                .map(|r| text_width(&r[i], layout.font_size))
                .fold(text_width(col.header(), layout.font_size), f64::max);
            widest + 2.0 * layout.cell_padding
        })
        .collect();

    let width = widths.iter().sum::<f64>() + 2.0 * layout.margin;
    let height = (rows.len() + 1) as f64 * layout.row_height + 2.0 * layout.margin;

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" xmlns="http://www.w3.org/2000/svg">"##,
        width.ceil(),
        height.ceil(),
        width.ceil(),
        height.ceil()
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <g font-family=\"{}\" font-size=\"{}\" text-anchor=\"middle\">\n",
        FONT_FAMILY, layout.font_size
    ));

    let headers: Vec<String> = columns.iter().map(|c| c.header().to_string()).collect();
    let all_rows = std::iter::once((&headers, true)).chain(cells.iter().map(|r| (r, false)));

    for (row_idx, (row, is_header)) in all_rows.enumerate() {
        let y = layout.margin + row_idx as f64 * layout.row_height;
        let fill = if is_header { "#f0f0f0" } else { "white" };
        let weight = if is_header { " font-weight=\"bold\"" } else { "" };
        let mut x = layout.margin;
        for (text, w) in row.iter().zip(&widths) {
            svg.push_str(&format!(
                "    <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"black\" stroke-width=\"0.5\"/>\n",
                x, y, w, layout.row_height, fill
            ));
            svg.push_str(&format!(
                "    <text x=\"{:.1}\" y=\"{:.1}\"{}>{}</text>\n",
                x + w / 2.0,
                y + layout.row_height / 2.0 + layout.font_size * 0.35,
                weight,
                escape_xml(text)
            ));
            x += w;
        }
    }

    svg.push_str("  </g>\n</svg>");
    svg
}
