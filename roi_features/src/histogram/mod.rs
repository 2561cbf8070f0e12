//! Exact intensity frequency table and the order statistics derived from it.
//!
//! Binning contract (version 1):
//! - counts are kept per distinct intensity, so order statistics are exact;
//! - percentile `p` is the linear interpolation between the order statistics
//!   at rank `p / 100 * (n - 1)` (0-based);
//! - mode is the most frequent intensity, ties resolved to the smallest value;
//! - entropy and uniformity use [`ENTROPY_BINS`] equal-width bins spanning
//!   `[min, max + 1)`;
//! - robust MAD is the mean absolute deviation of the intensities lying in
//!   `[P10, P90]` around their own mean.

#[cfg(test)]
mod tests;

use hashbrown::HashMap;

use crate::types::PixIntens;

/// Version of the binning rules above. Bump when any of them change.
pub const HISTOGRAM_CONTRACT_VERSION: u32 = 1;

pub const ENTROPY_BINS: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: HashMap<PixIntens, u32>,
    total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramStats {
    pub median: f64,
    pub mode: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub iqr: f64,
    pub rmad: f64,
    pub entropy: f64,
    pub uniformity: f64,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, value: PixIntens) {
        *self.counts.entry(value).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of observations added.
    #[inline]
    pub fn len(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct intensities.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn count_of(&self, value: PixIntens) -> u32 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// Order statistics of everything added so far; `None` when empty.
    pub fn stats(&self) -> Option<HistogramStats> {
        if self.is_empty() {
            return None;
        }

        let mut bins: Vec<(PixIntens, u32)> = self.counts.iter().map(|(&v, &c)| (v, c)).collect();
        bins.sort_unstable_by_key(|&(v, _)| v);
        let sorted = SortedCounts::new(bins);

        let p10 = sorted.percentile(10.0);
        let p25 = sorted.percentile(25.0);
        let p75 = sorted.percentile(75.0);
        let p90 = sorted.percentile(90.0);
        let (entropy, uniformity) = sorted.entropy_uniformity(self.total);

        Some(HistogramStats {
            median: sorted.percentile(50.0),
            mode: sorted.mode() as f64,
            p10,
            p25,
            p75,
            p90,
            iqr: p75 - p25,
            rmad: sorted.robust_mad(p10, p90),
            entropy,
            uniformity,
        })
    }
}

/// Distinct values in ascending order with running cumulative counts.
struct SortedCounts {
    bins: Vec<(PixIntens, u32)>,
    // cumulative[i] = number of observations with value <= bins[i].0
    cumulative: Vec<u64>,
}

impl SortedCounts {
    fn new(bins: Vec<(PixIntens, u32)>) -> Self {
        let cumulative = bins
            .iter()
            .scan(0u64, |acc, &(_, c)| {
                *acc += c as u64;
                Some(*acc)
            })
            .collect();
        Self { bins, cumulative }
    }

    fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Value of the order statistic at 0-based `rank`.
    fn value_at(&self, rank: u64) -> f64 {
        let i = self.cumulative.partition_point(|&c| c <= rank);
        let i = i.min(self.bins.len() - 1);
        self.bins[i].0 as f64
    }

    fn percentile(&self, p: f64) -> f64 {
        let rank = p / 100.0 * (self.total() - 1) as f64;
        let lo = rank.floor();
        let frac = rank - lo;
        let lo_value = self.value_at(lo as u64);
        if frac == 0.0 {
            return lo_value;
        }
        let hi_value = self.value_at(lo as u64 + 1);
        lo_value + frac * (hi_value - lo_value)
    }

    fn mode(&self) -> PixIntens {
        let mut best = self.bins[0];
        for &(v, c) in &self.bins[1..] {
            if c > best.1 {
                best = (v, c);
            }
        }
        best.0
    }

    fn entropy_uniformity(&self, total: u64) -> (f64, f64) {
        let min = self.bins[0].0 as f64;
        let max = self.bins[self.bins.len() - 1].0 as f64;
        let bin_width = (max - min + 1.0) / ENTROPY_BINS as f64;

        let mut binned = [0u64; ENTROPY_BINS];
        for &(v, c) in &self.bins {
            let idx = (((v as f64 - min) / bin_width) as usize).min(ENTROPY_BINS - 1);
            binned[idx] += c as u64;
        }

        let n = total as f64;
        let mut entropy = 0.0;
        let mut uniformity = 0.0;
        for &c in binned.iter().filter(|&&c| c > 0) {
            let p = c as f64 / n;
            entropy -= p * p.log2();
            uniformity += p * p;
        }
        (entropy, uniformity)
    }

    fn robust_mad(&self, lo: f64, hi: f64) -> f64 {
        let in_range = || {
            self.bins
                .iter()
                .filter(move |&&(v, _)| (v as f64) >= lo && (v as f64) <= hi)
        };

        let (sum, count) = in_range().fold((0.0, 0u64), |(s, n), &(v, c)| {
            (s + v as f64 * c as f64, n + c as u64)
        });
        if count == 0 {
            return 0.0;
        }
        let mean = sum / count as f64;
        let dev: f64 = in_range()
            .map(|&(v, c)| (v as f64 - mean).abs() * c as f64)
            .sum();
        dev / count as f64
    }
}
