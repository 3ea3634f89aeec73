//! Per-company momentum metrics.

use crate::domain::error::MoversError;
use crate::domain::price_bar::{PriceBar, WINDOW_BARS};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// The two trading days a diff spans: the close of the later day minus the
/// open of the earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffSpan {
    pub close: NaiveDate,
    pub open: NaiveDate,
}

impl fmt::Display for DiffSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "close {} - open {}",
            self.close.format("%Y-%m-%d"),
            self.open.format("%Y-%m-%d")
        )
    }
}

impl FromStr for DiffSpan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix("close ")
            .ok_or_else(|| format!("expected 'close <date> - open <date>', got '{s}'"))?;
        let (close, open) = rest
            .split_once(" - open ")
            .ok_or_else(|| format!("expected 'close <date> - open <date>', got '{s}'"))?;
        let parse = |d: &str| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .map_err(|e| format!("invalid date '{d}': {e}"))
        };
        Ok(Self {
            close: parse(close)?,
            open: parse(open)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyMetrics {
    pub ticker: String,
    pub name: String,
    pub today_open: f64,
    pub yesterday_close: f64,
    pub diff1: f64,
    pub diff2: f64,
    pub diff3: f64,
    pub percent_change: f64,
    pub diff1_dates: DiffSpan,
    pub diff2_dates: DiffSpan,
    pub diff3_dates: DiffSpan,
}

impl CompanyMetrics {
    /// Derives the metrics from four trading days ordered oldest to newest.
    ///
    /// Each diff is a close minus the previous day's open; the percent change
    /// normalises the latest diff by the latest open.
    pub fn from_window(
        ticker: &str,
        name: &str,
        window: &[PriceBar; WINDOW_BARS],
    ) -> Result<Self, MoversError> {
        let [b0, b1, b2, b3] = window;

        if window
            .iter()
            .flat_map(|b| [b.open, b.close])
            .any(|p| !p.is_finite())
        {
            return Err(MoversError::InvalidPrices {
                identifier: ticker.to_string(),
                reason: "non-finite price in window".into(),
            });
        }
        if b3.open <= 0.0 {
            return Err(MoversError::InvalidPrices {
                identifier: ticker.to_string(),
                reason: format!("latest open {} is not positive", b3.open),
            });
        }

        let diff1 = b3.close - b2.open;
        Ok(Self {
            ticker: ticker.to_string(),
            name: name.to_string(),
            today_open: b3.open,
            yesterday_close: b2.close,
            diff1,
            diff2: b2.close - b1.open,
            diff3: b1.close - b0.open,
            percent_change: diff1 / b3.open * 100.0,
            diff1_dates: DiffSpan {
                close: b3.date,
                open: b2.date,
            },
            diff2_dates: DiffSpan {
                close: b2.date,
                open: b1.date,
            },
            diff3_dates: DiffSpan {
                close: b1.date,
                open: b0.date,
            },
        })
    }

    /// Ticker without its market suffix.
    pub fn code(&self) -> &str {
        self.ticker.split('.').next().unwrap_or(&self.ticker)
    }

    /// Category label used on the chart's x axis: code plus the first three
    /// characters of the name.
    pub fn short_label(&self) -> String {
        let prefix: String = self.name.chars().take(3).collect();
        format!("{} {}", self.code(), prefix)
    }

    pub fn diffs(&self) -> [f64; 3] {
        [self.diff1, self.diff2, self.diff3]
    }
}
