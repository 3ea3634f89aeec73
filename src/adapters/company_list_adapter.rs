//! Company list CSV loader.

use crate::domain::company::CompanyRecord;
use crate::domain::error::MoversError;
use crate::domain::run_config::CompanyColumns;
use log::{info, warn};
use std::fs;
use std::path::Path;

const BOM: &str = "\u{feff}";

pub fn load_companies(
    path: &Path,
    columns: &CompanyColumns,
) -> Result<Vec<CompanyRecord>, MoversError> {
    let content = fs::read_to_string(path).map_err(|e| MoversError::CompanyFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let companies = parse_companies(&content, columns).map_err(|e| match e {
        MoversError::CompanyFile { reason, .. } => MoversError::CompanyFile {
            path: path.display().to_string(),
            reason,
        },
        MoversError::MissingColumn { column, .. } => MoversError::MissingColumn {
            path: path.display().to_string(),
            column,
        },
        other => other,
    })?;

    info!("loaded {} companies from {}", companies.len(), path.display());
    Ok(companies)
}

/// Parses company rows from CSV text. A leading byte-order marker is
/// ignored; columns are located by header name.
pub fn parse_companies(
    content: &str,
    columns: &CompanyColumns,
) -> Result<Vec<CompanyRecord>, MoversError> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| MoversError::CompanyFile {
        path: String::new(),
        reason: format!("CSV header error: {}", e),
    })?;
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| MoversError::MissingColumn {
                path: String::new(),
                column: name.to_string(),
            })
    };
    let code_idx = column_index(&columns.code)?;
    let name_idx = column_index(&columns.name)?;

    let mut companies = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| MoversError::CompanyFile {
            path: String::new(),
            reason: format!("CSV parse error: {}", e),
        })?;

        let code = record.get(code_idx).unwrap_or("").trim();
        if code.is_empty() {
            warn!("company list row {} has no code, ignoring", line + 2);
            continue;
        }
        let name = record.get(name_idx).unwrap_or("");
        companies.push(CompanyRecord::new(code, name));
    }

    Ok(companies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LISTING: &str = "\u{feff}日付,コード,銘柄名,市場・商品区分\n\
        20250530,1301,極洋,プライム（内国株式）\n\
        20250530,7203,トヨタ自動車,プライム（内国株式）\n\
        20250530,130A,Veritas In Silico,グロース（内国株式）\n\
        20250530,25,テスト,スタンダード（内国株式）\n";

    #[test]
    fn parses_with_bom_and_pads_codes() {
        let companies = parse_companies(LISTING, &CompanyColumns::default()).unwrap();
        let codes: Vec<_> = companies.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["1301", "7203", "130A", "0025"]);
        assert_eq!(companies[1].name, "トヨタ自動車");
    }

    #[test]
    fn parses_without_bom() {
        let content = "code,name\n7203,Toyota\n";
        let columns = CompanyColumns {
            code: "code".into(),
            name: "name".into(),
        };
        let companies = parse_companies(content, &columns).unwrap();
        assert_eq!(companies, vec![CompanyRecord::new("7203", "Toyota")]);
    }

    #[test]
    fn missing_name_column() {
        let content = "コード,名前\n7203,Toyota\n";
        let err = parse_companies(content, &CompanyColumns::default()).unwrap_err();
        assert!(matches!(err, MoversError::MissingColumn { ref column, .. } if column == "銘柄名"));
    }

    #[test]
    fn rows_without_code_are_skipped() {
        let content = "コード,銘柄名\n,Nameless\n7203,Toyota\n";
        let companies = parse_companies(content, &CompanyColumns::default()).unwrap();
        assert_eq!(companies.len(), 1);
    }

    #[test]
    fn load_missing_file_is_company_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        let err = load_companies(&path, &CompanyColumns::default()).unwrap_err();
        assert!(matches!(err, MoversError::CompanyFile { .. }));
    }

    #[test]
    fn load_reports_path_for_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "コード\n7203\n").unwrap();
        let err = load_companies(&path, &CompanyColumns::default()).unwrap_err();
        match err {
            MoversError::MissingColumn { path: p, column } => {
                assert!(p.ends_with("data.csv"));
                assert_eq!(column, "銘柄名");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
