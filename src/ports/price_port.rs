//! Price series source port trait.

use crate::domain::error::RealPricesError;
use crate::domain::price::PriceSample;

pub trait PriceSource {
    /// Samples in source order, expected ascending by timestamp.
    fn load_samples(&self) -> Result<Vec<PriceSample>, RealPricesError>;

    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;
}
