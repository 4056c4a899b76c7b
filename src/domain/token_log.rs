//! Simulation log grammar and record builder.
//!
//! The simulator prints free text. Three kinds of lines carry data, each
//! recognised by a trigger word and then read by token position:
//!
//! ```text
//! ... currentEpochIndex <n>              token 3 (space split) is the epoch
//! ... price: <pool> <tier> <wad>         after the last ':'
//! ... Diff: <diff>                       after the last ':'
//! ```
//!
//! Matchers run in that order. A line whose trigger word appears but whose
//! tokens do not fit falls through to the next matcher, and is reported as
//! malformed when none of them accepts it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::epoch::EpochClock;
use crate::domain::error::LineError;

const WAD: f64 = 1e18;

const EPOCH_TRIGGER: &str = "currentEpochIndex";
const PRICE_TRIGGER: &str = "price";
const DIFF_TRIGGER: &str = "Diff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolType {
    Short,
    Long,
    Float,
}

impl PoolType {
    pub const ALL: [PoolType; 3] = [PoolType::Short, PoolType::Long, PoolType::Float];

    /// Pool type for the simulator's numeric pool index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            PoolType::Short => 0,
            PoolType::Long => 1,
            PoolType::Float => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PoolType::Short => "short",
            PoolType::Long => "long",
            PoolType::Float => "float",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(PoolType::Short),
            "long" => Ok(PoolType::Long),
            "float" => Ok(PoolType::Float),
            other => Err(format!("unknown pool type '{other}'")),
        }
    }
}

/// Token prices and diff logged for one simulation epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRecord {
    pub epoch_index: u64,
    pub timestamp: i64,
    pub pool_prices: [BTreeMap<u32, f64>; 3],
    pub diff: Option<f64>,
}

impl TokenRecord {
    pub fn new(epoch_index: u64, timestamp: i64) -> Self {
        Self {
            epoch_index,
            timestamp,
            pool_prices: Default::default(),
            diff: None,
        }
    }

    pub fn price(&self, pool: PoolType, tier: u32) -> Option<f64> {
        self.pool_prices[pool.index()].get(&tier).copied()
    }

    /// Later entries for the same pool and tier replace earlier ones.
    pub fn set_price(&mut self, pool: PoolType, tier: u32, price: f64) {
        self.pool_prices[pool.index()].insert(tier, price);
    }

    pub fn tiers(&self, pool: PoolType) -> &BTreeMap<u32, f64> {
        &self.pool_prices[pool.index()]
    }
}

/// One classified log line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    EpochHeader { epoch_index: u64 },
    PriceEntry { pool: PoolType, tier: u32, price: f64 },
    DiffEntry { diff: f64 },
    Unrecognized,
}

/// Classify a single line.
///
/// `Err` means a trigger word was present but no matcher could read the
/// line; the message comes from the first matcher that tried.
pub fn classify_line(line: &str) -> Result<LogLine, String> {
    let mut first_failure: Option<String> = None;

    if line.contains(EPOCH_TRIGGER) {
        match parse_epoch_header(line) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => first_failure = first_failure.or(Some(e)),
        }
    }
    if line.contains(PRICE_TRIGGER) {
        match parse_price_entry(line) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => first_failure = first_failure.or(Some(e)),
        }
    }
    if line.contains(DIFF_TRIGGER) {
        match parse_diff_entry(line) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => first_failure = first_failure.or(Some(e)),
        }
    }

    match first_failure {
        Some(reason) => Err(reason),
        None => Ok(LogLine::Unrecognized),
    }
}

fn token<'a>(tokens: &[&'a str], index: usize, what: &str) -> Result<&'a str, String> {
    tokens
        .get(index)
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| format!("missing {what} (token {index})"))
}

/// Whitespace-split text after the last ':' on the line.
fn tail_tokens(line: &str) -> Vec<&str> {
    line.rsplit(':').next().unwrap_or(line).split(' ').collect()
}

fn parse_epoch_header(line: &str) -> Result<LogLine, String> {
    let tokens: Vec<&str> = line.split(' ').collect();
    let raw = token(&tokens, 3, "epoch index")?;
    let epoch_index = raw
        .parse::<u64>()
        .map_err(|_| format!("invalid epoch index '{raw}'"))?;
    Ok(LogLine::EpochHeader { epoch_index })
}

fn parse_price_entry(line: &str) -> Result<LogLine, String> {
    let tokens = tail_tokens(line);

    let raw_pool = token(&tokens, 1, "pool index")?;
    let pool = raw_pool
        .parse::<usize>()
        .ok()
        .and_then(PoolType::from_index)
        .ok_or_else(|| format!("invalid pool index '{raw_pool}'"))?;

    let raw_tier = token(&tokens, 2, "tier")?;
    let tier = raw_tier
        .parse::<u32>()
        .map_err(|_| format!("invalid tier '{raw_tier}'"))?;

    let raw_value = token(&tokens, 3, "price value")?;
    let value = raw_value
        .parse::<f64>()
        .map_err(|_| format!("invalid price value '{raw_value}'"))?;

    Ok(LogLine::PriceEntry {
        pool,
        tier,
        price: value / WAD,
    })
}

fn parse_diff_entry(line: &str) -> Result<LogLine, String> {
    let tokens = tail_tokens(line);
    let raw = token(&tokens, 1, "diff value")?;
    let diff = raw
        .parse::<i128>()
        .map_err(|_| format!("invalid diff value '{raw}'"))?;
    Ok(LogLine::DiffEntry { diff: diff as f64 })
}

/// A log line that carried a trigger word but could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct LineIssue {
    pub error: LineError,
    pub text: String,
}

/// Records built from a log, plus the lines that could not be used.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub records: Vec<TokenRecord>,
    pub issues: Vec<LineIssue>,
    pub lines_read: usize,
    pub lines_skipped: usize,
}

impl ParseReport {
    /// Records only if no line was malformed or orphaned.
    pub fn into_strict(self) -> Result<Vec<TokenRecord>, LineIssue> {
        match self.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(self.records),
        }
    }
}

/// Scan a simulation log and build one record per epoch header.
///
/// Price and diff lines update the record opened by the most recent header.
/// Entries seen before any header, or after a header whose epoch cannot be
/// placed on the clock, have no record to go to and are reported.
pub fn parse_token_log(text: &str, clock: &EpochClock) -> ParseReport {
    let mut report = ParseReport::default();
    let mut current: Option<TokenRecord> = None;

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        report.lines_read += 1;

        let parsed = match classify_line(line) {
            Ok(parsed) => parsed,
            Err(message) => {
                report.issues.push(LineIssue {
                    error: LineError {
                        line: line_no,
                        message,
                    },
                    text: line.to_string(),
                });
                continue;
            }
        };

        match parsed {
            LogLine::EpochHeader { epoch_index } => {
                if let Some(done) = current.take() {
                    report.records.push(done);
                }
                match clock.start_of(epoch_index) {
                    Some(timestamp) => current = Some(TokenRecord::new(epoch_index, timestamp)),
                    None => report.issues.push(LineIssue {
                        error: LineError {
                            line: line_no,
                            message: format!("epoch index {epoch_index} out of range"),
                        },
                        text: line.to_string(),
                    }),
                }
            }
            LogLine::PriceEntry { pool, tier, price } => match current.as_mut() {
                Some(record) => record.set_price(pool, tier, price),
                None => report.issues.push(orphan(line_no, line, "price entry")),
            },
            LogLine::DiffEntry { diff } => match current.as_mut() {
                Some(record) => record.diff = Some(diff),
                None => report.issues.push(orphan(line_no, line, "diff entry")),
            },
            LogLine::Unrecognized => report.lines_skipped += 1,
        }
    }

    if let Some(done) = current {
        report.records.push(done);
    }
    report
}

fn orphan(line: usize, text: &str, what: &str) -> LineIssue {
    LineIssue {
        error: LineError {
            line,
            message: format!("{what} outside any epoch record"),
        },
        text: text.to_string(),
    }
}
