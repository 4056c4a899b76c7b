//! Epoch bucketing of a price series.
//!
//! Samples are walked in order against a running epoch boundary. The first
//! sample that lands more than `mewt` seconds past the boundary becomes the
//! epoch's price and moves the boundary forward by one `epoch_length`. Every
//! other sample is dropped, so the output holds at most one point per epoch.
//!
//! Gaps are not filled: a sample arriving several epochs late still advances
//! the boundary by a single epoch, and the start times stay evenly spaced.

use crate::domain::price::{Epoch, PriceSample};

pub const DEFAULT_EPOCH_LENGTH: i64 = 3600;
pub const DEFAULT_MEWT: i64 = 10;
/// Upper bound on `epoch_length`, leaving 32 bits of headroom for epoch indices.
pub const MAX_EPOCH_LENGTH: i64 = i64::MAX >> 32;

/// Bucketing parameters, both in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochParams {
    pub epoch_length: i64,
    pub mewt: i64,
}

impl Default for EpochParams {
    fn default() -> Self {
        Self {
            epoch_length: DEFAULT_EPOCH_LENGTH,
            mewt: DEFAULT_MEWT,
        }
    }
}

/// Maps epoch indices to wall-clock seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochClock {
    pub origin: i64,
    pub epoch_length: i64,
}

impl EpochClock {
    /// Clock whose origin is the start of the bucket holding `first`.
    pub fn from_first_sample(first: &PriceSample, epoch_length: i64) -> Self {
        let origin = first.timestamp_secs().div_euclid(epoch_length) * epoch_length;
        Self {
            origin,
            epoch_length,
        }
    }

    /// Clock derived from the first sample of a series, if any.
    pub fn for_series(samples: &[PriceSample], epoch_length: i64) -> Option<Self> {
        samples
            .first()
            .map(|first| Self::from_first_sample(first, epoch_length))
    }

    /// Start of epoch `index`, or `None` when it does not fit in an `i64`.
    pub fn start_of(&self, index: u64) -> Option<i64> {
        i64::try_from(index)
            .ok()?
            .checked_mul(self.epoch_length)?
            .checked_add(self.origin)
    }
}

/// Bucket an ascending series into epochs.
///
/// A sample qualifies for the current epoch only when
/// `epoch_start + mewt < timestamp` holds strictly.
pub fn bucket_epochs(samples: &[PriceSample], params: &EpochParams) -> Vec<Epoch> {
    let Some(clock) = EpochClock::for_series(samples, params.epoch_length) else {
        return Vec::new();
    };

    let mut epochs = Vec::new();
    let mut index: u64 = 0;

    for sample in samples {
        // past i64 range no later sample can qualify
        let Some(start_time) = clock.start_of(index) else {
            break;
        };
        let Some(threshold) = start_time.checked_add(params.mewt) else {
            break;
        };
        if threshold < sample.timestamp_secs() {
            epochs.push(Epoch {
                start_time,
                price: sample.price,
            });
            index += 1;
        }
    }

    epochs
}
