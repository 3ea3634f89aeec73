//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::company_list_adapter::load_companies;
use crate::adapters::figures::{
    self, ChartLayout, Rasterizer, TABLE_COLUMNS, TableLayout, render_chart, render_table,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::results_csv_adapter::{read_results, write_results};
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::error::MoversError;
use crate::domain::fetch::collect_metrics;
use crate::domain::metrics::CompanyMetrics;
use crate::domain::ranking::{format_percent, rank_top_n};
use crate::domain::run_config::{RunConfig, build_run_config};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Parser, Debug)]
#[command(name = "tsemovers", about = "Rank TSE companies by recent price momentum")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, rank companies and write the CSVs and figures
    Report {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Do not open the chart in an image viewer
        #[arg(long)]
        no_show: bool,
    },
    /// Print the normalized company list
    Companies {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Re-render the table and chart from a saved results CSV
    Render {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        no_show: bool,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Report { config, no_show } => {
            let mut run_config = match load_config(config.as_deref()) {
                Ok(c) => c,
                Err(code) => return code,
            };
            run_config.show &= !no_show;
            run_report(&run_config)
        }
        Command::Companies { config } => match load_config(config.as_deref()) {
            Ok(c) => run_companies(&c),
            Err(code) => code,
        },
        Command::Render {
            input,
            config,
            no_show,
        } => {
            let mut run_config = match load_config(config.as_deref()) {
                Ok(c) => c,
                Err(code) => return code,
            };
            run_config.show &= !no_show;
            run_render(&input, &run_config)
        }
    }
}

/// Builds the run configuration from an INI file, or from defaults when no
/// file is given.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig, ExitCode> {
    let adapter = match path {
        Some(path) => {
            info!("loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| {
                let err = MoversError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                };
                error!("{err}");
                ExitCode::from(&err)
            })?
        }
        None => FileConfigAdapter::empty(),
    };

    build_run_config(&adapter).map_err(|e| {
        error!("{e}");
        ExitCode::from(&e)
    })
}

fn run_report(config: &RunConfig) -> ExitCode {
    let market = match YahooAdapter::from_config(config) {
        Ok(m) => m,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    let rasterizer = Rasterizer::with_system_fonts();
    run_report_pipeline(&market, config, &rasterizer)
}

pub fn run_report_pipeline(
    market: &dyn MarketDataPort,
    config: &RunConfig,
    rasterizer: &Rasterizer,
) -> ExitCode {
    // Stage 1: Load company list
    let companies = match load_companies(&config.companies, &config.columns) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    // Stage 2: Fetch and compute per company
    info!(
        "fetching {} days of prices for {} companies",
        config.fetch.lookback_days,
        companies.len()
    );
    let outcome = collect_metrics(market, &companies, &config.fetch);

    // Stage 3: Persist the full result set, then the ranked subset
    if let Err(e) = write_results(&config.outputs.all_results, &outcome.results) {
        error!("{e}");
        return (&e).into();
    }
    info!(
        "{} results written to {}",
        outcome.results.len(),
        config.outputs.all_results.display()
    );

    let top = rank_top_n(&outcome.results, config.top_n);
    if let Err(e) = write_results(&config.outputs.top_results, &top) {
        error!("{e}");
        return (&e).into();
    }
    info!(
        "top {} written to {}",
        top.len(),
        config.outputs.top_results.display()
    );
    print_summary(&top);

    // Stage 4: Figures
    render_figures(&top, config, rasterizer)
}

/// Renders both figures. A failure on one is logged and does not stop the
/// other; the exit code reflects the first failure.
pub fn render_figures(
    top: &[CompanyMetrics],
    config: &RunConfig,
    rasterizer: &Rasterizer,
) -> ExitCode {
    let mut first_error: Option<MoversError> = None;

    if let Err(e) = render_table(
        rasterizer,
        top,
        &TABLE_COLUMNS,
        &TableLayout::default(),
        &config.outputs.table_image,
    ) {
        error!("{e}");
        first_error.get_or_insert(e);
    }

    match render_chart(
        rasterizer,
        top,
        &ChartLayout::default(),
        &config.outputs.chart_image,
    ) {
        Ok(()) => {
            if config.show {
                figures::show_image(&config.outputs.chart_image);
            }
        }
        Err(e) => {
            error!("{e}");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => (&e).into(),
        None => ExitCode::SUCCESS,
    }
}

fn run_companies(config: &RunConfig) -> ExitCode {
    let companies = match load_companies(&config.companies, &config.columns) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };

    for company in &companies {
        println!(
            "{}\t{}\t{}",
            company.code,
            company.identifier(&config.fetch.market_suffix),
            company.name
        );
    }
    info!("{} companies", companies.len());
    ExitCode::SUCCESS
}

fn run_render(input: &Path, config: &RunConfig) -> ExitCode {
    let rows = match read_results(input) {
        Ok(r) => r,
        Err(e) => {
            error!("{e}");
            return (&e).into();
        }
    };
    info!("loaded {} results from {}", rows.len(), input.display());

    let top = rank_top_n(&rows, config.top_n);
    print_summary(&top);
    let rasterizer = Rasterizer::with_system_fonts();
    render_figures(&top, config, &rasterizer)
}

/// Ranked summary on stdout, percent change in its display form.
pub fn print_summary(top: &[CompanyMetrics]) {
    if top.is_empty() {
        println!("No companies to rank.");
        return;
    }

    println!(
        "{:>4}  {:<8}  {:>9}  {:>9}  {:>9}  {:>9}  Name",
        "Rank", "Code", "Change", "Diff1", "Diff2", "Diff3"
    );
    for (i, m) in top.iter().enumerate() {
        println!(
            "{:>4}  {:<8}  {:>9}  {:>9.2}  {:>9.2}  {:>9.2}  {}",
            i + 1,
            m.ticker,
            format_percent(m.percent_change),
            m.diff1,
            m.diff2,
            m.diff3,
            m.name
        );
    }
}
