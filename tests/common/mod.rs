#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use tsemovers::domain::error::MoversError;
pub use tsemovers::domain::price_bar::PriceBar;
use tsemovers::domain::run_config::{OutputPaths, RunConfig};
use tsemovers::ports::market_data_port::MarketDataPort;

pub struct MockMarketData {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, identifier: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(identifier.to_string(), bars);
        self
    }

    pub fn with_error(mut self, identifier: &str, reason: &str) -> Self {
        self.errors
            .insert(identifier.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_daily_bars(
        &self,
        identifier: &str,
        _lookback_days: u32,
    ) -> Result<Vec<PriceBar>, MoversError> {
        self.requests.borrow_mut().push(identifier.to_string());
        if let Some(reason) = self.errors.get(identifier) {
            return Err(MoversError::Provider {
                identifier: identifier.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(identifier).cloned().unwrap_or_default())
    }
}

pub fn make_bar(date: &str, open: f64, close: f64, volume: u64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open,
        close,
        volume,
    }
}

/// Four consecutive trading days, 2025-06-02..05, with a constant open so
/// the latest diff and the percent change are both `gain`.
pub fn bars_with_percent_change(gain: f64) -> Vec<PriceBar> {
    vec![
        make_bar("2025-06-02", 100.0, 100.0, 1_000),
        make_bar("2025-06-03", 100.0, 100.0, 1_000),
        make_bar("2025-06-04", 100.0, 100.0, 1_000),
        make_bar("2025-06-05", 100.0, 100.0 + gain, 1_000),
    ]
}

/// Writes a BOM-prefixed company list with the standard JPX headers.
pub fn write_company_list(path: &Path, companies: &[(&str, &str)]) {
    let mut content = String::from("\u{feff}日付,コード,銘柄名,市場・商品区分\n");
    for (code, name) in companies {
        content.push_str(&format!("20250530,{code},{name},プライム（内国株式）\n"));
    }
    std::fs::write(path, content).unwrap();
}

/// Run configuration with every input and output under `dir`.
pub fn config_in(dir: &Path) -> RunConfig {
    RunConfig {
        companies: dir.join("data.csv"),
        outputs: OutputPaths {
            all_results: dir.join("tse_all_results.csv"),
            top_results: dir.join("tse_top10_results.csv"),
            table_image: dir.join("top10_tse_table.png"),
            chart_image: dir.join("top10_tse_diff.png"),
        },
        show: false,
        ..RunConfig::default()
    }
}
