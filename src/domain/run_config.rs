//! Run configuration: building from a [`ConfigPort`] and validation.
//!
//! Every key is optional; the defaults reproduce the stock TSE report
//! (`data.csv` in, `tse_*` CSVs and `top10_tse_*` images out).

use crate::domain::error::MoversError;
use crate::domain::fetch::{DEFAULT_LOOKBACK_DAYS, DEFAULT_MARKET_SUFFIX, FetchSettings};
use crate::domain::price_bar::WINDOW_BARS;
use crate::domain::ranking::DEFAULT_TOP_N;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_CODE_COLUMN: &str = "コード";
pub const DEFAULT_NAME_COLUMN: &str = "銘柄名";
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyColumns {
    pub code: String,
    pub name: String,
}

impl Default for CompanyColumns {
    fn default() -> Self {
        Self {
            code: DEFAULT_CODE_COLUMN.to_string(),
            name: DEFAULT_NAME_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub all_results: PathBuf,
    pub top_results: PathBuf,
    pub table_image: PathBuf,
    pub chart_image: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            all_results: PathBuf::from("tse_all_results.csv"),
            top_results: PathBuf::from("tse_top10_results.csv"),
            table_image: PathBuf::from("top10_tse_table.png"),
            chart_image: PathBuf::from("top10_tse_diff.png"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub companies: PathBuf,
    pub columns: CompanyColumns,
    pub fetch: FetchSettings,
    pub base_url: String,
    pub timeout_secs: u64,
    pub outputs: OutputPaths,
    pub top_n: usize,
    pub show: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            companies: PathBuf::from("data.csv"),
            columns: CompanyColumns::default(),
            fetch: FetchSettings::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            outputs: OutputPaths::default(),
            top_n: DEFAULT_TOP_N,
            show: true,
        }
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> MoversError {
    MoversError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Reads a numeric key, rejecting values below `minimum`.
fn get_at_least(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
    minimum: i64,
) -> Result<i64, MoversError> {
    let value = config.get_int(section, key, default);
    if value < minimum {
        return Err(invalid(
            section,
            key,
            &format!("{key} must be at least {minimum}"),
        ));
    }
    Ok(value)
}

fn get_non_empty(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> Result<String, MoversError> {
    match config.get_string(section, key) {
        Some(v) if v.trim().is_empty() => {
            Err(invalid(section, key, &format!("{key} must not be empty")))
        }
        Some(v) => Ok(v.trim().to_string()),
        None => Ok(default.to_string()),
    }
}

fn get_path(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &std::path::Path,
) -> Result<PathBuf, MoversError> {
    let default = default.to_string_lossy();
    get_non_empty(config, section, key, &default).map(PathBuf::from)
}

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, MoversError> {
    let defaults = RunConfig::default();

    let lookback_days = get_at_least(
        config,
        "fetch",
        "lookback_days",
        DEFAULT_LOOKBACK_DAYS as i64,
        WINDOW_BARS as i64,
    )?;
    let timeout_secs = get_at_least(
        config,
        "fetch",
        "timeout_secs",
        DEFAULT_TIMEOUT_SECS as i64,
        1,
    )?;
    let top_n = get_at_least(config, "output", "top_n", DEFAULT_TOP_N as i64, 1)?;

    Ok(RunConfig {
        companies: get_path(config, "input", "companies", &defaults.companies)?,
        columns: CompanyColumns {
            code: get_non_empty(config, "input", "code_column", DEFAULT_CODE_COLUMN)?,
            name: get_non_empty(config, "input", "name_column", DEFAULT_NAME_COLUMN)?,
        },
        fetch: FetchSettings {
            market_suffix: get_non_empty(config, "fetch", "market_suffix", DEFAULT_MARKET_SUFFIX)?,
            lookback_days: u32::try_from(lookback_days)
                .map_err(|_| invalid("fetch", "lookback_days", "lookback_days is too large"))?,
        },
        base_url: get_non_empty(config, "fetch", "base_url", DEFAULT_BASE_URL)?
            .trim_end_matches('/')
            .to_string(),
        timeout_secs: timeout_secs as u64,
        outputs: OutputPaths {
            all_results: get_path(config, "output", "all_results", &defaults.outputs.all_results)?,
            top_results: get_path(config, "output", "top_results", &defaults.outputs.top_results)?,
            table_image: get_path(config, "output", "table_image", &defaults.outputs.table_image)?,
            chart_image: get_path(config, "output", "chart_image", &defaults.outputs.chart_image)?,
        },
        top_n: top_n as usize,
        show: config.get_bool("render", "show", defaults.show),
    })
}
