//! Market data access port trait.

use crate::domain::error::MoversError;
use crate::domain::price_bar::PriceBar;

pub trait MarketDataPort {
    /// Daily bars for `identifier` covering the last `lookback_days`
    /// calendar days. Order and zero-volume days are not guaranteed.
    fn fetch_daily_bars(
        &self,
        identifier: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, MoversError>;
}
