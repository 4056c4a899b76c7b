//! Raw price samples and bucketed epochs.

/// One point of the external market-data series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub timestamp_millis: i64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp_millis: i64, price: f64) -> Self {
        Self {
            timestamp_millis,
            price,
        }
    }

    /// Timestamp in whole seconds, truncated.
    pub fn timestamp_secs(&self) -> i64 {
        self.timestamp_millis / 1000
    }
}

/// A representative price for one fixed-length epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epoch {
    /// Epoch start in unix seconds.
    pub start_time: i64,
    pub price: f64,
}
