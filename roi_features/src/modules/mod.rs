//! Built-in feature modules and the standard stage registry.

mod calipers;
mod circles;
mod contour;
mod ellipse;
mod euler;
mod extrema;
mod hu;
mod hull;
mod intensity;
mod morphology;
mod polygonality;
mod raster;
mod texture;
mod zernike;


pub use calipers::{FeretModule, MartinModule, NassensteinModule};
pub use circles::CirclesModule;
pub use contour::ContourModule;
pub use ellipse::EllipseModule;
pub use euler::EulerModule;
pub use extrema::ExtremaModule;
pub use hu::HuMomentsModule;
pub use hull::ConvexHullModule;
pub use intensity::IntensityModule;
pub use morphology::MorphologyModule;
pub use polygonality::{GeodeticModule, PolygonalityModule};
pub use raster::RoiRaster;
pub use texture::{GlcmModule, GldmModule, GlrlmModule, GlszmModule, NgtdmModule};
pub use zernike::ZernikeModule;

use crate::neighbors::NeighborsStage;
use crate::reduction::{PerRoi, Stage};

/// Every built-in stage in registration order.
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(PerRoi(IntensityModule)),
        Box::new(PerRoi(MorphologyModule)),
        Box::new(PerRoi(EllipseModule)),
        Box::new(PerRoi(ContourModule)),
        Box::new(PerRoi(ConvexHullModule)),
        Box::new(PerRoi(ExtremaModule)),
        Box::new(PerRoi(EulerModule)),
        Box::new(NeighborsStage),
        Box::new(PerRoi(FeretModule)),
        Box::new(PerRoi(MartinModule)),
        Box::new(PerRoi(NassensteinModule)),
        Box::new(PerRoi(PolygonalityModule)),
        Box::new(PerRoi(CirclesModule)),
        Box::new(PerRoi(GeodeticModule)),
        Box::new(PerRoi(GlcmModule)),
        Box::new(PerRoi(ZernikeModule)),
        Box::new(PerRoi(GlrlmModule)),
        Box::new(PerRoi(GlszmModule)),
        Box::new(PerRoi(GldmModule)),
        Box::new(PerRoi(NgtdmModule)),
        Box::new(PerRoi(HuMomentsModule)),
    ]
}

/// Summary of a sample of caliper lengths:
/// `[min, max, mean, median, stddev, mode]`.
///
/// Stddev is the sample deviation; mode is the most frequent value after
/// rounding to whole pixels, ties to the smaller value.
pub(crate) fn diameter_stats(values: &[f64]) -> [f64; 6] {
    if values.is_empty() {
        return [0.0; 6];
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    };
    let stddev = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    // rounded values arrive in ascending order, so the first longest run wins ties
    let mut mode = sorted[0].round();
    let mut best_run = 0;
    let mut run = 0;
    let mut current = f64::NAN;
    for v in sorted.iter().map(|v| v.round()) {
        if v == current {
            run += 1;
        } else {
            current = v;
            run = 1;
        }
        if run > best_run {
            best_run = run;
            mode = v;
        }
    }

    [sorted[0], sorted[n - 1], mean, median, stddev, mode]
}
