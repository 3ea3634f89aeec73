//! Yahoo Finance market data adapter.
//!
//! Fetches daily bars from the v8 chart API with a single blocking request
//! per identifier. There is no retry and no rate limiting: a failed request
//! is reported to the caller, which skips the company.

use crate::domain::error::MoversError;
use crate::domain::price_bar::PriceBar;
use crate::domain::run_config::RunConfig;
use crate::ports::market_data_port::MarketDataPort;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MoversError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| MoversError::Provider {
                identifier: base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, MoversError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    fn chart_url(&self, identifier: &str, lookback_days: u32) -> String {
        format!(
            "{}/v8/finance/chart/{identifier}?range={lookback_days}d&interval=1d",
            self.base_url
        )
    }
}

fn provider_error(identifier: &str, reason: impl Into<String>) -> MoversError {
    MoversError::Provider {
        identifier: identifier.to_string(),
        reason: reason.into(),
    }
}

/// Error for a non-success HTTP status. Unknown symbols come back as 404
/// with a chart error body, whose description is kept in the reason.
pub(crate) fn status_error(identifier: &str, status: StatusCode, body: &str) -> MoversError {
    let reason = match serde_json::from_str::<ChartResponse>(body)
        .ok()
        .and_then(|r| r.chart.error)
    {
        Some(err) => format!("HTTP {status}: {}", err.description),
        None => format!("HTTP {status}"),
    };
    provider_error(identifier, reason)
}

/// Converts a chart response into bars. Days with a missing open, close or
/// volume are dropped; dates are taken in the exchange's local time.
pub(crate) fn parse_chart(
    identifier: &str,
    resp: ChartResponse,
) -> Result<Vec<PriceBar>, MoversError> {
    let data = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(provider_error(
                identifier,
                format!("{}: {}", err.code, err.description),
            ));
        }
        (Some(result), None) => result
            .into_iter()
            .next()
            .ok_or_else(|| provider_error(identifier, "result array is empty"))?,
        (None, None) => return Err(provider_error(identifier, "empty result with no error")),
    };

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    // No timestamps means no trading in the requested range.
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| provider_error(identifier, "no quote data"))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| provider_error(identifier, format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        match (open, close, volume) {
            (Some(open), Some(close), Some(volume)) => bars.push(PriceBar {
                date,
                open,
                close,
                volume,
            }),
            _ => debug!("{identifier}: incomplete bar on {date}, dropped"),
        }
    }

    Ok(bars)
}

impl MarketDataPort for YahooAdapter {
    fn fetch_daily_bars(
        &self,
        identifier: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, MoversError> {
        let url = self.chart_url(identifier, lookback_days);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| provider_error(identifier, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(identifier, status, &body));
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| provider_error(identifier, format!("failed to parse response: {e}")))?;
        parse_chart(identifier, chart)
    }
}
