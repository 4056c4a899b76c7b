#![allow(dead_code)]

use realprices::domain::error::RealPricesError;
pub use realprices::domain::price::PriceSample;
use realprices::ports::price_port::PriceSource;
use std::io::Write;

/// 2023-11-14T22:00:00Z, aligned to the hour.
pub const T0: i64 = 1_699_999_200;
pub const HOUR: i64 = 3600;

pub struct MockPriceSource {
    pub samples: Vec<PriceSample>,
    pub error: Option<String>,
}

impl MockPriceSource {
    pub fn new(samples: Vec<PriceSample>) -> Self {
        Self {
            samples,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            samples: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PriceSource for MockPriceSource {
    fn load_samples(&self) -> Result<Vec<PriceSample>, RealPricesError> {
        if let Some(reason) = &self.error {
            return Err(RealPricesError::PriceData {
                file: self.describe(),
                reason: reason.clone(),
            });
        }
        Ok(self.samples.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// One sample per hour, 30 seconds past each boundary.
pub fn hourly_samples(count: usize, start_price: f64) -> Vec<PriceSample> {
    (0..count)
        .map(|i| {
            let secs = T0 + 30 + i as i64 * HOUR;
            PriceSample::new(secs * 1000, start_price + i as f64)
        })
        .collect()
}

pub fn market_chart_json(samples: &[PriceSample]) -> String {
    let prices: Vec<serde_json::Value> = samples
        .iter()
        .map(|s| serde_json::json!([s.timestamp_millis, s.price]))
        .collect();
    serde_json::json!({
        "prices": prices,
        "market_caps": [],
        "total_volumes": [],
    })
    .to_string()
}

/// Simulation log with `epochs` blocks; every block logs short tiers 0 and 1,
/// long tier 0, float tier 0 and a diff equal to the epoch index times 10.
pub fn sample_log(epochs: u64) -> String {
    let mut log = String::from("Deploying market...\n");
    for e in 0..epochs {
        log.push_str(&format!("epoch currentEpochIndex = {e}\n"));
        log.push_str(&format!("short price: 0 0 {}\n", (1_000 + e) * 1_000_000_000_000_000));
        log.push_str(&format!("short price: 0 1 {}\n", (2_000 + e) * 1_000_000_000_000_000));
        log.push_str(&format!("long price: 1 0 {}\n", (500 + e) * 1_000_000_000_000_000));
        log.push_str(&format!("float price: 2 0 {}\n", 1_000_000_000_000_000_000u128));
        log.push_str(&format!("Liquidity Diff: {}\n", e * 10));
        log.push_str("tx mined\n");
    }
    log
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
