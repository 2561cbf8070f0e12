use std::f64::consts::{PI, SQRT_2};

use crate::accumulator::RoiAccumulator;
use crate::gate::code::ELLIPSE;
use crate::gate::FeatureCode::*;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Ellipse with the same normalized second central moments as the ROI.
pub struct EllipseModule;

const INFO: StageInfo = StageInfo::new("ellipse", ELLIPSE).requires(&[Artifact::Centroid]);

impl FeatureModule for EllipseModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let c = derived.centroid;
        let n = acc.count() as f64;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for p in acc.pixels() {
            let dx = c.x - p.x as f64;
            let dy = c.y - p.y as f64;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        // 1/12 is the second central moment of a unit pixel.
        let uxx = sxx / n + 1.0 / 12.0;
        let uyy = syy / n + 1.0 / 12.0;
        let uxy = sxy / n;

        let common = ((uxx - uyy).powi(2) + 4.0 * uxy * uxy).sqrt();
        let major = 2.0 * SQRT_2 * (uxx + uyy + common).sqrt();
        let minor = 2.0 * SQRT_2 * (uxx + uyy - common).max(0.0).sqrt();
        let eccentricity = if major > 0.0 {
            2.0 * ((major / 2.0).powi(2) - (minor / 2.0).powi(2)).max(0.0).sqrt() / major
        } else {
            0.0
        };

        let (num, den) = if uyy > uxx {
            (uyy - uxx + ((uyy - uxx).powi(2) + 4.0 * uxy * uxy).sqrt(), 2.0 * uxy)
        } else {
            (2.0 * uxy, uxx - uyy + ((uxx - uyy).powi(2) + 4.0 * uxy * uxy).sqrt())
        };
        let orientation = if num == 0.0 && den == 0.0 {
            0.0
        } else {
            (180.0 / PI) * (num / den).atan()
        };

        let v = &mut derived.values;
        v[MajorAxisLength] = major;
        v[MinorAxisLength] = minor;
        v[Eccentricity] = eccentricity;
        v[Orientation] = orientation;
    }
}
