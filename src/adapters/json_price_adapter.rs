//! Market-chart JSON file adapter.
//!
//! Reads the `{"prices": [[timestamp_millis, price], ...]}` shape returned by
//! CoinGecko's market-chart endpoints. Other keys are ignored.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::error::RealPricesError;
use crate::domain::price::PriceSample;
use crate::ports::price_port::PriceSource;

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

/// Parse market-chart JSON text into samples, keeping source order.
pub fn parse_market_chart(json: &str) -> Result<Vec<PriceSample>, serde_json::Error> {
    let chart: MarketChart = serde_json::from_str(json)?;
    Ok(chart
        .prices
        .into_iter()
        .map(|(ts, price)| PriceSample::new(ts as i64, price))
        .collect())
}

pub struct JsonPriceFile {
    path: PathBuf,
}

impl JsonPriceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn data_error(&self, reason: impl ToString) -> RealPricesError {
        RealPricesError::PriceData {
            file: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl PriceSource for JsonPriceFile {
    fn load_samples(&self) -> Result<Vec<PriceSample>, RealPricesError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.data_error(format!("failed to read: {e}")))?;
        let samples = parse_market_chart(&content).map_err(|e| self.data_error(e))?;

        if samples.is_empty() {
            return Err(RealPricesError::EmptyPriceData {
                file: self.path.display().to_string(),
            });
        }
        if let Some(pos) = samples
            .windows(2)
            .position(|w| w[1].timestamp_millis < w[0].timestamp_millis)
        {
            tracing::warn!(
                index = pos + 1,
                file = %self.path.display(),
                "price samples are not in ascending order"
            );
        }

        tracing::debug!(samples = samples.len(), file = %self.path.display(), "loaded price data");
        Ok(samples)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
