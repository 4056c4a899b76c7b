//! Run settings read from an optional INI file.
//!
//! ```ini
//! [epochs]
//! epoch_length = 3600
//! mewt = 10
//!
//! [files]
//! price_data = eth_data.json
//! token_log = token_price_data.txt
//! price_list = eth_price_list.txt
//! chart = token_price_chart.html
//!
//! [chart]
//! title = Leaking of total liquidity
//! series = diff, short:0
//! eth_epoch_limit = 399
//!
//! [fetch]
//! coin = ethereum
//! vs_currency = usd
//! days = 90
//! ```
//!
//! Every key is optional. Values that are present but unusable are rejected
//! rather than silently replaced by the default.

use std::path::PathBuf;

use crate::domain::chart::{parse_series_list, ChartOptions};
use crate::domain::epoch::{EpochParams, MAX_EPOCH_LENGTH};
use crate::domain::error::RealPricesError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_PRICE_DATA: &str = "eth_data.json";
pub const DEFAULT_TOKEN_LOG: &str = "token_price_data.txt";
pub const DEFAULT_PRICE_LIST: &str = "eth_price_list.txt";
pub const DEFAULT_CHART: &str = "token_price_chart.html";

pub const DEFAULT_COIN: &str = "ethereum";
pub const DEFAULT_VS_CURRENCY: &str = "usd";
/// Longest window the CoinGecko range endpoint still answers with hourly points.
pub const DEFAULT_FETCH_DAYS: i64 = 90;
pub const DEFAULT_FETCH_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone, PartialEq)]
pub struct FilePaths {
    pub price_data: PathBuf,
    pub token_log: PathBuf,
    pub price_list: PathBuf,
    pub chart: PathBuf,
}

impl Default for FilePaths {
    fn default() -> Self {
        Self {
            price_data: PathBuf::from(DEFAULT_PRICE_DATA),
            token_log: PathBuf::from(DEFAULT_TOKEN_LOG),
            price_list: PathBuf::from(DEFAULT_PRICE_LIST),
            chart: PathBuf::from(DEFAULT_CHART),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub coin: String,
    pub vs_currency: String,
    pub days: i64,
    pub base_url: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            coin: DEFAULT_COIN.to_string(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            days: DEFAULT_FETCH_DAYS,
            base_url: DEFAULT_FETCH_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub epochs: EpochParams,
    pub files: FilePaths,
    pub chart: ChartOptions,
    pub fetch: FetchSettings,
}

const KNOWN_SECTIONS: [&str; 4] = ["epochs", "files", "chart", "fetch"];

pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, RealPricesError> {
    let defaults = Settings::default();

    for section in config.sections() {
        if !KNOWN_SECTIONS.contains(&section.as_str()) {
            tracing::warn!(section = %section, "ignoring unknown config section");
        }
    }

    let epochs = EpochParams {
        epoch_length: read_int(config, "epochs", "epoch_length", defaults.epochs.epoch_length)?,
        mewt: read_int(config, "epochs", "mewt", defaults.epochs.mewt)?,
    };
    validate_epochs(&epochs)?;

    let files = FilePaths {
        price_data: read_path(config, "price_data", defaults.files.price_data),
        token_log: read_path(config, "token_log", defaults.files.token_log),
        price_list: read_path(config, "price_list", defaults.files.price_list),
        chart: read_path(config, "chart", defaults.files.chart),
    };

    let series = match non_empty(config, "chart", "series") {
        Some(raw) => parse_series_list(&raw).map_err(|reason| invalid("chart", "series", reason))?,
        None => defaults.chart.series,
    };
    let eth_epoch_limit = match non_empty(config, "chart", "eth_epoch_limit") {
        Some(_) => {
            let limit = read_int(config, "chart", "eth_epoch_limit", 0)?;
            if limit <= 0 {
                return Err(invalid("chart", "eth_epoch_limit", "must be positive"));
            }
            Some(limit as usize)
        }
        None => None,
    };
    let chart = ChartOptions {
        title: non_empty(config, "chart", "title").unwrap_or(defaults.chart.title),
        series,
        eth_epoch_limit,
    };

    let fetch = FetchSettings {
        coin: non_empty(config, "fetch", "coin").unwrap_or(defaults.fetch.coin),
        vs_currency: non_empty(config, "fetch", "vs_currency").unwrap_or(defaults.fetch.vs_currency),
        days: read_int(config, "fetch", "days", defaults.fetch.days)?,
        base_url: non_empty(config, "fetch", "base_url").unwrap_or(defaults.fetch.base_url),
    };
    if fetch.days <= 0 {
        return Err(invalid("fetch", "days", "must be positive"));
    }

    Ok(Settings {
        epochs,
        files,
        chart,
        fetch,
    })
}

pub fn validate_epochs(params: &EpochParams) -> Result<(), RealPricesError> {
    if params.epoch_length <= 0 {
        return Err(invalid("epochs", "epoch_length", "epoch_length must be positive"));
    }
    if params.epoch_length > MAX_EPOCH_LENGTH {
        return Err(invalid(
            "epochs",
            "epoch_length",
            format!("epoch_length must be at most {MAX_EPOCH_LENGTH}"),
        ));
    }
    if params.mewt < 0 {
        return Err(invalid("epochs", "mewt", "mewt must be non-negative"));
    }
    if params.mewt >= params.epoch_length {
        return Err(invalid("epochs", "mewt", "mewt must be shorter than epoch_length"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> RealPricesError {
    RealPricesError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, RealPricesError> {
    match non_empty(config, section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| invalid(section, key, format!("'{raw}' is not an integer"))),
    }
}

fn read_path(config: &dyn ConfigPort, key: &str, default: PathBuf) -> PathBuf {
    non_empty(config, "files", key)
        .map(PathBuf::from)
        .unwrap_or(default)
}
