//! Best-effort metrics collection over the company list.
//!
//! Each company is fetched and evaluated on its own; a failure is logged,
//! recorded as a [`SkippedCompany`] and the loop moves on.

use crate::domain::company::CompanyRecord;
use crate::domain::error::MoversError;
use crate::domain::metrics::CompanyMetrics;
use crate::domain::price_bar::select_window;
use crate::ports::market_data_port::MarketDataPort;
use log::{info, warn};

pub const DEFAULT_MARKET_SUFFIX: &str = ".T";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub market_suffix: String,
    pub lookback_days: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            market_suffix: DEFAULT_MARKET_SUFFIX.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug)]
pub struct SkippedCompany {
    pub identifier: String,
    pub error: MoversError,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// One row per company that produced metrics, in company-list order.
    pub results: Vec<CompanyMetrics>,
    pub skipped: Vec<SkippedCompany>,
}

/// Fetches one company's bars and derives its metrics.
pub fn fetch_company_metrics(
    market: &dyn MarketDataPort,
    company: &CompanyRecord,
    settings: &FetchSettings,
) -> Result<CompanyMetrics, MoversError> {
    let identifier = company.identifier(&settings.market_suffix);
    let bars = market.fetch_daily_bars(&identifier, settings.lookback_days)?;
    let window = select_window(&identifier, bars)?;
    CompanyMetrics::from_window(&identifier, &company.name, &window)
}

/// Runs every company through [`fetch_company_metrics`]. A failure only
/// skips that company.
pub fn collect_metrics(
    market: &dyn MarketDataPort,
    companies: &[CompanyRecord],
    settings: &FetchSettings,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    for company in companies {
        match fetch_company_metrics(market, company, settings) {
            Ok(metrics) => outcome.results.push(metrics),
            Err(error) => {
                let identifier = company.identifier(&settings.market_suffix);
                warn!("skipping {identifier} ({error})");
                outcome.skipped.push(SkippedCompany { identifier, error });
            }
        }
    }

    info!(
        "fetched {} of {} companies ({} skipped)",
        outcome.results.len(),
        companies.len(),
        outcome.skipped.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_bar::PriceBar;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct StubMarket {
        bars: HashMap<String, Vec<PriceBar>>,
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl MarketDataPort for StubMarket {
        fn fetch_daily_bars(
            &self,
            identifier: &str,
            lookback_days: u32,
        ) -> Result<Vec<PriceBar>, MoversError> {
            self.calls
                .borrow_mut()
                .push((identifier.to_string(), lookback_days));
            self.bars
                .get(identifier)
                .cloned()
                .ok_or_else(|| MoversError::Provider {
                    identifier: identifier.to_string(),
                    reason: "unknown ticker".into(),
                })
        }
    }

    fn bars() -> Vec<PriceBar> {
        (2..=5)
            .map(|day| PriceBar {
                date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
                open: 100.0,
                close: 101.0,
                volume: 500,
            })
            .collect()
    }

    #[test]
    fn requests_identifier_with_suffix_and_lookback() {
        let market = StubMarket {
            bars: HashMap::from([("7203.T".to_string(), bars())]),
            calls: RefCell::new(Vec::new()),
        };
        let company = CompanyRecord::new("7203", "Toyota");
        let m = fetch_company_metrics(&market, &company, &FetchSettings::default()).unwrap();

        assert_eq!(m.ticker, "7203.T");
        assert_eq!(market.calls.borrow().as_slice(), &[("7203.T".to_string(), 7)]);
    }

    #[test]
    fn unknown_ticker_is_skipped_not_fatal() {
        let market = StubMarket {
            bars: HashMap::from([("7203.T".to_string(), bars())]),
            calls: RefCell::new(Vec::new()),
        };
        let companies = vec![
            CompanyRecord::new("9999", "Missing"),
            CompanyRecord::new("7203", "Toyota"),
        ];
        let outcome = collect_metrics(&market, &companies, &FetchSettings::default());

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].identifier, "9999.T");
        assert!(matches!(outcome.skipped[0].error, MoversError::Provider { .. }));
        assert_eq!(market.calls.borrow().len(), 2);
    }

    struct BrokenMarket;

    impl MarketDataPort for BrokenMarket {
        fn fetch_daily_bars(&self, _: &str, _: u32) -> Result<Vec<PriceBar>, MoversError> {
            Err(MoversError::Io(std::io::Error::other("disk cache unreadable")))
        }
    }

    #[test]
    fn any_port_error_only_skips_the_company() {
        let companies = vec![
            CompanyRecord::new("7203", "Toyota"),
            CompanyRecord::new("6758", "Sony"),
        ];
        let outcome = collect_metrics(&BrokenMarket, &companies, &FetchSettings::default());

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert!(matches!(outcome.skipped[1].error, MoversError::Io(_)));
    }
}
