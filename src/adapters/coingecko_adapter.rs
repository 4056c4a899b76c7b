//! CoinGecko market-chart download (feature `fetch`).

use std::time::Duration;

use crate::adapters::json_price_adapter::parse_market_chart;
use crate::domain::error::RealPricesError;
use crate::domain::settings::FetchSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SECS_PER_DAY: i64 = 24 * 60 * 60;
/// The range endpoint returns hourly points only for windows up to this many
/// days; longer windows come back daily.
pub const HOURLY_MAX_DAYS: i64 = 90;

pub fn is_hourly_window(days: i64) -> bool {
    days <= HOURLY_MAX_DAYS
}

/// `[from, to]` window in unix seconds ending at `now`.
pub fn fetch_window(now: i64, days: i64) -> (i64, i64) {
    (now.saturating_sub(days.saturating_mul(SECS_PER_DAY)), now)
}

pub fn market_chart_url(settings: &FetchSettings) -> String {
    format!(
        "{}/coins/{}/market_chart/range",
        settings.base_url.trim_end_matches('/'),
        settings.coin
    )
}

pub struct CoinGeckoAdapter {
    client: reqwest::blocking::Client,
    settings: FetchSettings,
    now: i64,
}

impl CoinGeckoAdapter {
    pub fn new(settings: FetchSettings, now: i64) -> Result<Self, RealPricesError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(fetch_error)?;
        Ok(Self {
            client,
            settings,
            now,
        })
    }

    /// Raw response body, checked to parse as a market chart.
    pub fn fetch_raw(&self) -> Result<String, RealPricesError> {
        let (from, to) = fetch_window(self.now, self.settings.days);
        let url = market_chart_url(&self.settings);
        if !is_hourly_window(self.settings.days) {
            tracing::warn!(
                days = self.settings.days,
                "windows longer than {HOURLY_MAX_DAYS} days come back with daily prices"
            );
        }
        tracing::info!(url = %url, from, to, "requesting market chart");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", self.settings.vs_currency.clone()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ])
            .send()
            .map_err(fetch_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RealPricesError::Fetch {
                reason: format!("{url} returned {status}"),
            });
        }
        let body = resp.text().map_err(fetch_error)?;
        parse_market_chart(&body).map_err(|e| RealPricesError::Fetch {
            reason: format!("unexpected response body: {e}"),
        })?;
        Ok(body)
    }
}

fn fetch_error(e: reqwest::Error) -> RealPricesError {
    RealPricesError::Fetch {
        reason: e.to_string(),
    }
}
