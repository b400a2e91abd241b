//! Equal-width bucketing of unit prices.

use serde::{Deserialize, Serialize};

/// One bucket; `upper` is exclusive except for the last bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Price distribution panel data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistogram {
    pub bins: Vec<HistogramBin>,
    /// Number of prices bucketed, after sampling
    pub sample_size: usize,
    /// Mean of the bucketed prices
    pub mean: Option<f64>,
}

impl PriceHistogram {
    pub fn from_values(values: &[f64], bin_count: usize) -> Self {
        let mean = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };

        Self {
            bins: bucket(values, bin_count),
            sample_size: values.len(),
            mean,
        }
    }

    /// Total of all bucket counts.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

/// Split `[min, max]` of `values` into `bin_count` equal-width buckets.
///
/// When every value is equal the range widens to `value ± 0.5`. Empty input
/// or a zero bin count gives no buckets.
pub fn bucket(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let (mut min, mut max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        bins[index].count += 1;
    }

    bins
}
