//! Result set CSV persistence.
//!
//! Files carry a UTF-8 byte-order marker so spreadsheet tools pick up the
//! Japanese company names. Numbers are written in shortest round-trip form,
//! so reading a file back reproduces the values exactly.

use crate::domain::error::MoversError;
use crate::domain::metrics::{CompanyMetrics, DiffSpan};
use std::fs;
use std::io::Write;
use std::path::Path;

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const RESULT_HEADERS: [&str; 11] = [
    "Stock Code",
    "Company Name",
    "today open price",
    "yesterday close price",
    "Diff1",
    "Diff2",
    "Diff3",
    "Percent Change (last close vs first open)",
    "Diff1_dates",
    "Diff2_dates",
    "Diff3_dates",
];

fn results_error(path: &Path, reason: impl Into<String>) -> MoversError {
    MoversError::ResultsFile {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

pub fn write_results(path: &Path, rows: &[CompanyMetrics]) -> Result<(), MoversError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| results_error(path, e.to_string()))?;
    }

    let mut file = fs::File::create(path).map_err(|e| results_error(path, e.to_string()))?;
    file.write_all(BOM)
        .map_err(|e| results_error(path, e.to_string()))?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(RESULT_HEADERS)
        .map_err(|e| results_error(path, e.to_string()))?;
    for m in rows {
        wtr.write_record([
            m.ticker.clone(),
            m.name.clone(),
            m.today_open.to_string(),
            m.yesterday_close.to_string(),
            m.diff1.to_string(),
            m.diff2.to_string(),
            m.diff3.to_string(),
            m.percent_change.to_string(),
            m.diff1_dates.to_string(),
            m.diff2_dates.to_string(),
            m.diff3_dates.to_string(),
        ])
        .map_err(|e| results_error(path, e.to_string()))?;
    }
    wtr.flush().map_err(|e| results_error(path, e.to_string()))?;
    Ok(())
}

/// Reads a file written by [`write_results`]. Columns are located by header
/// name, so extra columns are ignored.
pub fn read_results(path: &Path) -> Result<Vec<CompanyMetrics>, MoversError> {
    let bytes = fs::read(path).map_err(|e| results_error(path, e.to_string()))?;
    let content = bytes.strip_prefix(BOM).unwrap_or(&bytes);

    let mut rdr = csv::Reader::from_reader(content);
    let headers = rdr
        .headers()
        .map_err(|e| results_error(path, format!("CSV header error: {e}")))?
        .clone();

    let mut idx = [0usize; RESULT_HEADERS.len()];
    for (slot, name) in idx.iter_mut().zip(RESULT_HEADERS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| results_error(path, format!("missing column '{name}'")))?;
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| results_error(path, format!("CSV parse error: {e}")))?;
        let field = |col: usize| record.get(idx[col]).unwrap_or("");
        let number = |col: usize| -> Result<f64, MoversError> {
            field(col).trim().parse::<f64>().map_err(|e| {
                results_error(
                    path,
                    format!("invalid {} value '{}': {e}", RESULT_HEADERS[col], field(col)),
                )
            })
        };
        let span = |col: usize| -> Result<DiffSpan, MoversError> {
            field(col).parse::<DiffSpan>().map_err(|e| results_error(path, e))
        };

        rows.push(CompanyMetrics {
            ticker: field(0).to_string(),
            name: field(1).to_string(),
            today_open: number(2)?,
            yesterday_close: number(3)?,
            diff1: number(4)?,
            diff2: number(5)?,
            diff3: number(6)?,
            percent_change: number(7)?,
            diff1_dates: span(8)?,
            diff2_dates: span(9)?,
            diff3_dates: span(10)?,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample(ticker: &str, name: &str, percent_change: f64) -> CompanyMetrics {
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        CompanyMetrics {
            ticker: ticker.into(),
            name: name.into(),
            today_open: 2_710.5,
            yesterday_close: 2_698.0,
            diff1: 1.0 / 3.0,
            diff2: -12.5,
            diff3: 0.1 + 0.2,
            percent_change,
            diff1_dates: DiffSpan { close: d(5), open: d(4) },
            diff2_dates: DiffSpan { close: d(4), open: d(3) },
            diff3_dates: DiffSpan { close: d(3), open: d(2) },
        }
    }

    #[test]
    fn written_file_starts_with_bom_and_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.csv");
        write_results(&path, &[sample("7203.T", "トヨタ自動車", 1.5)]).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.starts_with("Stock Code,Company Name,today open price"));
        assert!(text.contains("7203.T,トヨタ自動車,2710.5,2698"));
        assert!(text.contains("close 2025-06-05 - open 2025-06-04"));
    }

    #[test]
    fn values_survive_a_reload_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.csv");
        let rows = vec![
            sample("7203.T", "トヨタ自動車", 0.012_345_678_901_234_5),
            sample("6758.T", "ソニーグループ, Inc.", -3.3),
        ];
        write_results(&path, &rows).unwrap();
        assert_eq!(read_results(&path).unwrap(), rows);
    }

    #[test]
    fn empty_result_set_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_results(&path, &[]).unwrap();
        assert!(read_results(&path).unwrap().is_empty());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("top.csv");
        write_results(&path, &[sample("7203.T", "Toyota", 1.0)]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_rejects_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Stock Code,Company Name\n7203.T,Toyota\n").unwrap();
        let err = read_results(&path).unwrap_err();
        assert!(matches!(err, MoversError::ResultsFile { .. }));
    }

    #[test]
    fn read_rejects_non_numeric_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.csv");
        write_results(&path, &[sample("7203.T", "Toyota", 1.0)]).unwrap();
        let text = fs::read_to_string(&path).unwrap().replace("2710.5", "n/a");
        fs::write(&path, text).unwrap();
        assert!(read_results(&path).is_err());
    }
}
