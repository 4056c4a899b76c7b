//! Chart output port trait.

use std::path::Path;

use crate::domain::chart::Chart;
use crate::domain::error::RealPricesError;

pub trait ChartWriter {
    fn write_chart(&self, chart: &Chart, output_path: &Path) -> Result<(), RealPricesError>;
}
