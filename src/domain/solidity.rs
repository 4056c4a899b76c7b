//! Solidity array-assignment literal for bucketed prices.

use crate::domain::error::RealPricesError;
use crate::domain::price::Epoch;

pub const DEFAULT_ARRAY_NAME: &str = "prices";

const WAD: f64 = 1e18;

/// Scale a price to 18-decimal fixed point, truncating toward zero.
pub fn to_wad(price: f64) -> Option<i128> {
    if !price.is_finite() {
        return None;
    }
    Some((price * WAD) as i128)
}

/// Emit `name[i] = <wad>;` for every epoch, one per line, in order.
pub fn render_price_list(epochs: &[Epoch], array_name: &str) -> Result<String, RealPricesError> {
    let mut output = String::with_capacity(epochs.len() * 40);
    for (index, epoch) in epochs.iter().enumerate() {
        let wad = to_wad(epoch.price).ok_or(RealPricesError::NonFinitePrice { index })?;
        output.push_str(&format!("{array_name}[{index}] = {wad};\n"));
    }
    Ok(output)
}
