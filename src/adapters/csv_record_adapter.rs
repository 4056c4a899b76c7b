//! CSV export of parsed simulation records.
//!
//! One row per pool/tier value. A record without any pool values still gets
//! a single row so its diff is not lost.

use std::io::Write;

use crate::domain::error::RealPricesError;
use crate::domain::token_log::{PoolType, TokenRecord};

const HEADER: [&str; 6] = ["epoch", "timestamp", "pool", "tier", "price", "diff"];

pub fn write_records_csv<W: Write>(
    records: &[TokenRecord],
    writer: W,
) -> Result<usize, RealPricesError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(csv_error)?;

    let mut rows = 0;
    for record in records {
        let epoch = record.epoch_index.to_string();
        let timestamp = record.timestamp.to_string();
        let diff = record.diff.map(|d| d.to_string()).unwrap_or_default();

        let mut wrote_any = false;
        for pool in PoolType::ALL {
            for (tier, price) in record.tiers(pool) {
                let tier = tier.to_string();
                let price = price.to_string();
                wtr.write_record([
                    epoch.as_str(),
                    timestamp.as_str(),
                    pool.as_str(),
                    tier.as_str(),
                    price.as_str(),
                    diff.as_str(),
                ])
                .map_err(csv_error)?;
                rows += 1;
                wrote_any = true;
            }
        }
        if !wrote_any {
            wtr.write_record([epoch.as_str(), timestamp.as_str(), "", "", "", diff.as_str()])
                .map_err(csv_error)?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

fn csv_error(e: csv::Error) -> RealPricesError {
    RealPricesError::Io(std::io::Error::other(format!("CSV write error: {e}")))
}
