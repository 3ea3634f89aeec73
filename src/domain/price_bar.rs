//! Daily price bar and window selection.

use crate::domain::error::MoversError;
use chrono::NaiveDate;

/// Number of trading days the metrics are derived from.
pub const WINDOW_BARS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Days with no volume are market holidays or halts.
    pub fn is_trading_day(&self) -> bool {
        self.volume > 0
    }
}

/// Drops zero-volume bars, orders by date and keeps the last
/// [`WINDOW_BARS`] bars, oldest first.
pub fn select_window(
    identifier: &str,
    bars: Vec<PriceBar>,
) -> Result<[PriceBar; WINDOW_BARS], MoversError> {
    let mut trading: Vec<PriceBar> = bars.into_iter().filter(PriceBar::is_trading_day).collect();
    trading.sort_by_key(|b| b.date);

    if trading.len() < WINDOW_BARS {
        return Err(MoversError::InsufficientBars {
            identifier: identifier.to_string(),
            bars: trading.len(),
            minimum: WINDOW_BARS,
        });
    }

    let tail = trading.split_off(trading.len() - WINDOW_BARS);
    tail.try_into().map_err(|v: Vec<PriceBar>| MoversError::InsufficientBars {
        identifier: identifier.to_string(),
        bars: v.len(),
        minimum: WINDOW_BARS,
    })
}
