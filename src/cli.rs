//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_record_adapter::write_records_csv;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_chart_adapter::HtmlChartAdapter;
use crate::adapters::json_price_adapter::JsonPriceFile;
use crate::domain::chart::{assemble_chart, parse_series_list, Chart};
use crate::domain::epoch::{bucket_epochs, EpochClock, EpochParams};
use crate::domain::error::RealPricesError;
use crate::domain::price::{Epoch, PriceSample};
use crate::domain::settings::{build_settings, validate_epochs, Settings};
use crate::domain::solidity::{render_price_list, DEFAULT_ARRAY_NAME};
use crate::domain::token_log::{parse_token_log, TokenRecord};
use crate::logging::init_logging;
use crate::ports::chart_port::ChartWriter;
use crate::ports::price_port::PriceSource;

#[derive(Parser, Debug)]
#[command(
    name = "realprices",
    about = "Historical price tooling for market simulation tests"
)]
pub struct Cli {
    /// INI settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct EpochArgs {
    /// Epoch length in seconds
    #[arg(long)]
    pub epoch_length: Option<i64>,
    /// Tolerance past the epoch boundary, in seconds
    #[arg(long)]
    pub mewt: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bucket price history into epochs and emit Solidity assignments
    Pick {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_ARRAY_NAME)]
        array_name: String,
        #[command(flatten)]
        epochs: EpochArgs,
    },
    /// Chart simulation log output against historical prices
    Graph {
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(long)]
        log: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated series: diff, <pool>:<tier>
        #[arg(long)]
        series: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// Plot only the first N ETH epochs
        #[arg(long, value_parser = parse_positive_limit)]
        eth_limit: Option<usize>,
        /// Fail on the first malformed log line
        #[arg(long)]
        strict: bool,
        #[command(flatten)]
        epochs: EpochArgs,
    },
    /// Export parsed simulation log records as CSV
    Records {
        #[arg(long)]
        prices: Option<PathBuf>,
        #[arg(long)]
        log: Option<PathBuf>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        strict: bool,
        #[command(flatten)]
        epochs: EpochArgs,
    },
    /// Download hourly market data from CoinGecko
    Fetch {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        coin: Option<String>,
        #[arg(long)]
        vs_currency: Option<String>,
        #[arg(long)]
        days: Option<i64>,
    },
}

fn parse_positive_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be positive".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let result = match cli.command {
        Command::Pick {
            input,
            output,
            array_name,
            epochs,
        } => run_pick(settings, input, output, &array_name, &epochs),
        Command::Graph {
            prices,
            log,
            output,
            series,
            title,
            eth_limit,
            strict,
            epochs,
        } => run_graph(
            settings,
            GraphOverrides {
                prices,
                log,
                output,
                series,
                title,
                eth_limit,
            },
            strict,
            &epochs,
        ),
        Command::Records {
            prices,
            log,
            output,
            strict,
            epochs,
        } => run_records(settings, prices, log, output, strict, &epochs),
        Command::Fetch {
            output,
            coin,
            vs_currency,
            days,
        } => run_fetch(settings, output, coin, vs_currency, days),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(err: &RealPricesError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_settings(path: Option<&PathBuf>) -> Result<Settings, RealPricesError> {
    let Some(path) = path else {
        return build_settings(&FileConfigAdapter::empty());
    };
    tracing::info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| RealPricesError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    build_settings(&adapter)
}

/// Apply `--epoch-length` / `--mewt` on top of the configured values.
pub fn resolve_epochs(base: EpochParams, args: &EpochArgs) -> Result<EpochParams, RealPricesError> {
    let params = EpochParams {
        epoch_length: args.epoch_length.unwrap_or(base.epoch_length),
        mewt: args.mewt.unwrap_or(base.mewt),
    };
    validate_epochs(&params)?;
    Ok(params)
}

/// Load samples and bucket them. Also returns the clock anchored at the
/// first sample's epoch, which log records are timestamped against.
pub fn load_epochs(
    source: &dyn PriceSource,
    params: &EpochParams,
) -> Result<(Vec<Epoch>, EpochClock), RealPricesError> {
    let samples: Vec<PriceSample> = source.load_samples()?;
    let clock = EpochClock::for_series(&samples, params.epoch_length).ok_or_else(|| {
        RealPricesError::EmptyPriceData {
            file: source.describe(),
        }
    })?;
    let epochs = bucket_epochs(&samples, params);
    tracing::info!(
        "Bucketed {} samples from {} into {} epochs",
        samples.len(),
        source.describe(),
        epochs.len()
    );
    Ok((epochs, clock))
}

/// Price-list text for a source, plus the number of epochs in it.
pub fn pick_prices(
    source: &dyn PriceSource,
    params: &EpochParams,
    array_name: &str,
) -> Result<(String, usize), RealPricesError> {
    let (epochs, _) = load_epochs(source, params)?;
    let text = render_price_list(&epochs, array_name)?;
    Ok((text, epochs.len()))
}

/// Parse the simulation log. Issues are logged as warnings, or returned as
/// an error for the first one when `strict` is set.
pub fn load_records(
    log_path: &Path,
    clock: &EpochClock,
    strict: bool,
) -> Result<Vec<TokenRecord>, RealPricesError> {
    let text = fs::read_to_string(log_path).map_err(|e| {
        io::Error::new(e.kind(), format!("failed to read {}: {}", log_path.display(), e))
    })?;
    let report = parse_token_log(&text, clock);
    tracing::info!(
        "Parsed {} records from {} ({} lines, {} skipped, {} issues)",
        report.records.len(),
        log_path.display(),
        report.lines_read,
        report.lines_skipped,
        report.issues.len()
    );

    if strict {
        return report.into_strict().map_err(|issue| {
            tracing::error!("{}", issue.error.display_with_context(&issue.text));
            RealPricesError::LogParse(issue.error)
        });
    }
    for issue in &report.issues {
        tracing::warn!("{}", issue.error.display_with_context(&issue.text));
    }
    Ok(report.records)
}

pub fn build_chart(
    source: &dyn PriceSource,
    log_path: &Path,
    settings: &Settings,
    strict: bool,
) -> Result<Chart, RealPricesError> {
    let (epochs, clock) = load_epochs(source, &settings.epochs)?;
    let records = load_records(log_path, &clock, strict)?;
    assemble_chart(&epochs, &records, &settings.chart)
}

fn run_pick(
    settings: Settings,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    array_name: &str,
    epoch_args: &EpochArgs,
) -> Result<(), RealPricesError> {
    let params = resolve_epochs(settings.epochs, epoch_args)?;
    let source = JsonPriceFile::new(input.unwrap_or(settings.files.price_data));
    let output = output.unwrap_or(settings.files.price_list);

    let (text, count) = pick_prices(&source, &params, array_name)?;
    fs::write(&output, text)?;
    tracing::info!("Wrote {} price assignments to {}", count, output.display());
    Ok(())
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Default)]
pub struct GraphOverrides {
    pub prices: Option<PathBuf>,
    pub log: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub series: Option<String>,
    pub title: Option<String>,
    pub eth_limit: Option<usize>,
}

impl GraphOverrides {
    pub fn apply(self, mut settings: Settings) -> Result<Settings, RealPricesError> {
        if let Some(p) = self.prices {
            settings.files.price_data = p;
        }
        if let Some(p) = self.log {
            settings.files.token_log = p;
        }
        if let Some(p) = self.output {
            settings.files.chart = p;
        }
        if let Some(raw) = self.series {
            settings.chart.series =
                parse_series_list(&raw).map_err(|reason| RealPricesError::ConfigInvalid {
                    section: "chart".into(),
                    key: "series".into(),
                    reason,
                })?;
        }
        if let Some(title) = self.title {
            settings.chart.title = title;
        }
        if let Some(limit) = self.eth_limit {
            settings.chart.eth_epoch_limit = Some(limit);
        }
        Ok(settings)
    }
}

fn run_graph(
    settings: Settings,
    overrides: GraphOverrides,
    strict: bool,
    epoch_args: &EpochArgs,
) -> Result<(), RealPricesError> {
    let mut settings = overrides.apply(settings)?;
    settings.epochs = resolve_epochs(settings.epochs, epoch_args)?;

    let source = JsonPriceFile::new(settings.files.price_data.clone());
    let chart = build_chart(&source, &settings.files.token_log, &settings, strict)?;

    HtmlChartAdapter::new().write_chart(&chart, &settings.files.chart)?;
    tracing::info!("Chart written to: {}", settings.files.chart.display());
    Ok(())
}

fn run_records(
    settings: Settings,
    prices: Option<PathBuf>,
    log: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    epoch_args: &EpochArgs,
) -> Result<(), RealPricesError> {
    let params = resolve_epochs(settings.epochs, epoch_args)?;
    let source = JsonPriceFile::new(prices.unwrap_or(settings.files.price_data));
    let log = log.unwrap_or(settings.files.token_log);

    let (_, clock) = load_epochs(&source, &params)?;
    let records = load_records(&log, &clock, strict)?;

    let rows = match output {
        Some(path) => {
            let rows = write_records_csv(&records, fs::File::create(&path)?)?;
            tracing::info!("Wrote {} rows to {}", rows, path.display());
            rows
        }
        None => write_records_csv(&records, io::stdout().lock())?,
    };
    tracing::debug!(rows, "record export complete");
    Ok(())
}

fn run_fetch(
    settings: Settings,
    output: Option<PathBuf>,
    coin: Option<String>,
    vs_currency: Option<String>,
    days: Option<i64>,
) -> Result<(), RealPricesError> {
    let mut fetch = settings.fetch;
    if let Some(c) = coin {
        fetch.coin = c;
    }
    if let Some(v) = vs_currency {
        fetch.vs_currency = v;
    }
    if let Some(d) = days {
        if d <= 0 {
            return Err(RealPricesError::ConfigInvalid {
                section: "fetch".into(),
                key: "days".into(),
                reason: "must be positive".into(),
            });
        }
        fetch.days = d;
    }
    let output = output.unwrap_or(settings.files.price_data);

    #[cfg(feature = "fetch")]
    {
        use crate::adapters::coingecko_adapter::CoinGeckoAdapter;

        let adapter = CoinGeckoAdapter::new(fetch, chrono::Utc::now().timestamp())?;
        let body = adapter.fetch_raw()?;
        fs::write(&output, body)?;
        tracing::info!("Market data written to: {}", output.display());
        Ok(())
    }

    #[cfg(not(feature = "fetch"))]
    {
        let _ = (fetch, output);
        Err(RealPricesError::Fetch {
            reason: "fetch feature is required for fetch".into(),
        })
    }
}
