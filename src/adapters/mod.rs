//! Concrete adapter implementations for ports.

pub mod chart_svg;
#[cfg(feature = "fetch")]
pub mod coingecko_adapter;
pub mod csv_record_adapter;
pub mod file_config_adapter;
pub mod html_chart_adapter;
pub mod json_price_adapter;
