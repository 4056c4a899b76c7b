//! Chart assembly: aligns ETH epochs and simulation records into series.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::RealPricesError;
use crate::domain::price::Epoch;
use crate::domain::token_log::{PoolType, TokenRecord};

pub const DEFAULT_TITLE: &str = "Leaking of total liquidity";
pub const ETH_SERIES_NAME: &str = "ETH";

/// A token-side series picked from the simulation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSpec {
    Diff,
    Pool { pool: PoolType, tier: u32 },
}

impl SeriesSpec {
    fn value(&self, record: &TokenRecord) -> Option<f64> {
        match *self {
            SeriesSpec::Diff => record.diff,
            SeriesSpec::Pool { pool, tier } => record.price(pool, tier),
        }
    }
}

impl fmt::Display for SeriesSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSpec::Diff => write!(f, "Diff"),
            SeriesSpec::Pool { pool, tier } => write!(f, "{pool} tier {tier}"),
        }
    }
}

impl FromStr for SeriesSpec {
    type Err = String;

    /// `diff` or `<pool>:<tier>`, e.g. `short:1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("diff") {
            return Ok(SeriesSpec::Diff);
        }
        let (pool, tier) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid series '{s}' (expected diff or <pool>:<tier>)"))?;
        let pool = pool.parse::<PoolType>()?;
        let tier = tier
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid tier in series '{s}'"))?;
        Ok(SeriesSpec::Pool { pool, tier })
    }
}

/// Parse a comma-separated series list. Empty entries are ignored.
pub fn parse_series_list(input: &str) -> Result<Vec<SeriesSpec>, String> {
    input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub axis: Axis,
    /// (unix seconds, value)
    pub points: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_title: String,
    pub left_title: String,
    pub right_title: String,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    pub fn series_on(&self, axis: Axis) -> impl Iterator<Item = &ChartSeries> {
        self.series.iter().filter(move |s| s.axis == axis)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub series: Vec<SeriesSpec>,
    /// Keep only the first N ETH epochs.
    pub eth_epoch_limit: Option<usize>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            series: vec![SeriesSpec::Diff],
            eth_epoch_limit: None,
        }
    }
}

/// Build the dual-axis chart. Token series go on the left axis, ETH on the
/// right. Every record must carry a value for every requested series.
pub fn assemble_chart(
    epochs: &[Epoch],
    records: &[TokenRecord],
    options: &ChartOptions,
) -> Result<Chart, RealPricesError> {
    let mut series = Vec::with_capacity(options.series.len() + 1);

    for spec in &options.series {
        let points = records
            .iter()
            .map(|record| {
                spec.value(record)
                    .map(|v| (record.timestamp, v))
                    .ok_or_else(|| RealPricesError::MissingSeries {
                        epoch: record.epoch_index,
                        series: spec.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        series.push(ChartSeries {
            name: spec.to_string(),
            axis: Axis::Left,
            points,
        });
    }

    let eth_len = options
        .eth_epoch_limit
        .map_or(epochs.len(), |limit| limit.min(epochs.len()));
    series.push(ChartSeries {
        name: ETH_SERIES_NAME.to_string(),
        axis: Axis::Right,
        points: epochs[..eth_len]
            .iter()
            .map(|e| (e.start_time, e.price))
            .collect(),
    });

    Ok(Chart {
        title: options.title.clone(),
        x_title: "Timestamp".to_string(),
        left_title: "Token Price".to_string(),
        right_title: "ETH Price".to_string(),
        series,
    })
}
