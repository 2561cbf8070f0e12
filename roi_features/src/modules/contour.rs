use std::f64::consts::PI;

use crate::accumulator::RoiAccumulator;
use crate::gate::code::CONTOUR;
use crate::gate::FeatureCode::*;
use crate::modules::RoiRaster;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;
use crate::types::Pixel;

/// Boundary pixels (any 4-neighbor outside the ROI) and edge intensity statistics.
pub struct ContourModule;

const INFO: StageInfo = StageInfo::new("contour", CONTOUR).provides(&[Artifact::Contour]);

impl FeatureModule for ContourModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let contour = boundary_pixels(acc);
        if contour.is_empty() {
            derived.contour.clear();
            return;
        }

        let perimeter = contour.len() as f64;
        let n = perimeter;
        let sum: f64 = contour.iter().map(|p| p.intensity as f64).sum();
        let mean = sum / n;
        let stddev = if contour.len() > 1 {
            (contour
                .iter()
                .map(|p| (p.intensity as f64 - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0))
                .sqrt()
        } else {
            0.0
        };
        let max = contour.iter().map(|p| p.intensity).max().unwrap_or(0);
        let min = contour.iter().map(|p| p.intensity).min().unwrap_or(0);
        let area = acc.count() as f64;

        let v = &mut derived.values;
        v[Perimeter] = perimeter;
        v[EquivalentDiameter] = perimeter / PI;
        v[EdgeMeanIntensity] = mean;
        v[EdgeStddevIntensity] = stddev;
        v[EdgeMaxIntensity] = max as f64;
        v[EdgeMinIntensity] = min as f64;
        v[EdgeIntegratedIntensity] = sum;
        v[Circularity] = 4.0 * PI * area / (perimeter * perimeter);

        derived.contour = contour;
    }
}

/// Boundary pixels in raster order.
pub(crate) fn boundary_pixels(acc: &RoiAccumulator) -> Vec<Pixel> {
    let raster = RoiRaster::new(acc);
    let mut contour: Vec<Pixel> = acc
        .pixels()
        .iter()
        .filter(|p| {
            let (x, y) = (p.x as i64, p.y as i64);
            !(raster.is_set(x - 1, y)
                && raster.is_set(x + 1, y)
                && raster.is_set(x, y - 1)
                && raster.is_set(x, y + 1))
        })
        .copied()
        .collect();
    contour.sort_unstable_by_key(|p| (p.y, p.x));
    contour
}
