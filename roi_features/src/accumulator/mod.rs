//! Per-ROI online statistics, updated one observation at a time.
//!
//! Moments use the single-pass central-moment recurrences (Welford/Terriberry):
//! with `n` the count after inclusion, `delta = I - mean`, `delta_n = delta / n`
//! and `term1 = delta * delta_n * (n - 1)`:
//!
//! ```text
//! mean += delta_n
//! M4   += term1 * delta_n^2 * (n^2 - 3n + 3) + 6 * delta_n^2 * M2 - 4 * delta_n * M3
//! M3   += term1 * delta_n * (n - 2) - 3 * delta_n * M2
//! M2   += term1
//! ```
//!
//! M4 and M3 are updated before M2 because each uses the previous lower moments.

#[cfg(test)]
mod tests;

use glam::DVec2;

use crate::histogram::Histogram;
use crate::types::{Aabb, Label, PixIntens, Pixel};

/// Accumulated state of one ROI.
///
/// Invariants: `count() == pixels().len()`, and `aabb()` contains every
/// buffered pixel.
#[derive(Debug, Clone)]
pub struct RoiAccumulator {
    label: Label,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    variance: f64,
    min: PixIntens,
    max: PixIntens,
    energy: f64,
    mad_sum: f64,
    // First pixel is seeded 1-based, the rest are added 0-based.
    weighted_centroid_sum: DVec2,
    coord_sum: DVec2,
    histogram: Histogram,
    pixels: Vec<Pixel>,
    aabb: Aabb,
}

/// Intensity moments derived from the accumulated state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub mean: f64,
    /// Sample variance (divides by `n - 1`).
    pub variance: f64,
    pub skewness: f64,
    /// Excess kurtosis.
    pub kurtosis: f64,
    pub mad: f64,
    pub rms: f64,
}

impl Moments {
    #[inline]
    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }
}

impl RoiAccumulator {
    /// Creates a record seeded from the first observation of `label`.
    pub fn initialize(label: Label, x: u32, y: u32, intensity: PixIntens) -> Self {
        let value = intensity as f64;
        let mut histogram = Histogram::new();
        histogram.add(intensity);

        Self {
            label,
            mean: value,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            variance: 0.0,
            min: intensity,
            max: intensity,
            energy: value * value,
            mad_sum: 0.0,
            weighted_centroid_sum: DVec2::new(x as f64 + 1.0, y as f64 + 1.0),
            coord_sum: DVec2::new(x as f64, y as f64),
            histogram,
            pixels: vec![Pixel::new(x, y, intensity)],
            aabb: Aabb::from_point(x, y),
        }
    }

    /// Folds one more observation into the record.
    pub fn update(&mut self, x: u32, y: u32, intensity: PixIntens) {
        let value = intensity as f64;
        let prev_n = self.pixels.len() as f64;
        let n = prev_n + 1.0;
        let prev_mean = self.mean;

        let delta = value - prev_mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * prev_n;

        self.mean = prev_mean + delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;

        self.variance = (n - 2.0) * self.variance / (n - 1.0) + delta * delta / n;

        self.min = self.min.min(intensity);
        self.max = self.max.max(intensity);
        self.energy += value * value;
        self.mad_sum += (value - self.mean).abs();

        self.weighted_centroid_sum += DVec2::new(x as f64, y as f64);
        self.coord_sum += DVec2::new(x as f64, y as f64);

        self.histogram.add(intensity);
        self.pixels.push(Pixel::new(x, y, intensity));
        self.aabb.include(x, y);
    }

    #[inline]
    pub fn label(&self) -> Label {
        self.label
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn min(&self) -> PixIntens {
        self.min
    }

    #[inline]
    pub fn max(&self) -> PixIntens {
        self.max
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Raw second/third/fourth central-moment sums.
    pub fn cumulants(&self) -> (f64, f64, f64) {
        (self.m2, self.m3, self.m4)
    }

    /// Mean pixel position.
    pub fn centroid(&self) -> DVec2 {
        self.coord_sum / self.count() as f64
    }

    /// Legacy centroid whose first pixel counts 1-based.
    pub fn weighted_centroid(&self) -> DVec2 {
        self.weighted_centroid_sum / self.count() as f64
    }

    /// Moments from the online recurrences.
    pub fn online_moments(&self) -> Moments {
        let n = self.count() as f64;
        let (skewness, kurtosis) = shape_moments(n, self.m2, self.m3, self.m4);
        Moments {
            mean: self.mean,
            variance: self.variance,
            skewness,
            kurtosis,
            mad: self.mad_sum / n,
            rms: (self.energy / n).sqrt(),
        }
    }

    /// Moments recomputed from the buffered pixels around the online mean.
    pub fn direct_moments(&self) -> Moments {
        let n = self.count() as f64;
        let mean = self.mean;

        let (mut s2, mut s3, mut s4, mut abs_sum, mut energy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for pix in &self.pixels {
            let value = pix.intensity as f64;
            let d = value - mean;
            let d2 = d * d;
            s2 += d2;
            s3 += d2 * d;
            s4 += d2 * d2;
            abs_sum += d.abs();
            energy += value * value;
        }

        let (skewness, kurtosis) = shape_moments(n, s2, s3, s4);
        Moments {
            mean,
            variance: if n > 1.0 { s2 / (n - 1.0) } else { 0.0 },
            skewness,
            kurtosis,
            mad: abs_sum / n,
            rms: (energy / n).sqrt(),
        }
    }

    /// Online moments for small ROIs, direct moments above `min_online_roi_size` pixels.
    pub fn moments(&self, min_online_roi_size: usize) -> Moments {
        if self.count() > min_online_roi_size {
            self.direct_moments()
        } else {
            self.online_moments()
        }
    }
}

/// Skewness and excess kurtosis from central-moment sums; zero for a flat ROI.
fn shape_moments(n: f64, m2: f64, m3: f64, m4: f64) -> (f64, f64) {
    if m2 <= 0.0 {
        return (0.0, 0.0);
    }
    let skewness = n.sqrt() * m3 / m2.powf(1.5);
    let kurtosis = n * m4 / (m2 * m2) - 3.0;
    (skewness, kurtosis)
}
