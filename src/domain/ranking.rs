//! Ranking of the result set by percent change.

use crate::domain::metrics::CompanyMetrics;

pub const DEFAULT_TOP_N: usize = 10;

/// Stable descending sort by percent change, truncated to `n` rows. Ties
/// keep their fetch order.
pub fn rank_top_n(results: &[CompanyMetrics], n: usize) -> Vec<CompanyMetrics> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));
    ranked.truncate(n);
    ranked
}

/// Display form of a percent change. Only for presentation; ranking and
/// plotting use the numeric value.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}
