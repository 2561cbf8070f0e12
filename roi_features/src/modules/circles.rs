use glam::DVec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::hull::convex_hull;
use crate::accumulator::RoiAccumulator;
use crate::gate::code::CIRCLES;
use crate::gate::FeatureCode::*;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Minimum enclosing circle of the contour, and circles centred on the
/// centroid through the farthest and nearest contour pixels.
///
/// Like polygonality, only ROIs with at least one neighbor and a hull are
/// measured; the rest keep zeros.
pub struct CirclesModule;

const INFO: StageInfo = StageInfo::new("circles", CIRCLES).requires(&[
    Artifact::Contour,
    Artifact::Centroid,
    Artifact::ConvexHull,
    Artifact::Neighbors,
    Artifact::FeretDiameters,
]);

const SHUFFLE_SEED: u64 = 0x5eed_c1c1e;

impl FeatureModule for CirclesModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, _acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        if derived.num_neighbors == 0 || derived.contour.is_empty() || derived.hull.is_empty() {
            return;
        }
        let points: Vec<DVec2> = derived
            .contour
            .iter()
            .map(|p| DVec2::new(p.x as f64, p.y as f64))
            .collect();

        let (_, radius) = enclosing_circle(&points);
        let centroid = derived.centroid;
        let (nearest, farthest) = points
            .iter()
            .map(|p| p.distance(centroid))
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), d| (lo.min(d), hi.max(d)));

        let v = &mut derived.values;
        v[DiameterMinEnclosingCircle] = 2.0 * radius;
        v[DiameterCircumscribingCircle] = 2.0 * farthest;
        v[DiameterInscribingCircle] = 2.0 * nearest;
    }
}

/// Minimum enclosing circle of a point cloud; `(centre, radius)`.
///
/// Only hull vertices can lie on the circle. They are fed to
/// [`min_enclosing_circle`] in a seeded random order, which keeps the
/// construction expected linear for raster-sorted input.
pub(crate) fn enclosing_circle(points: &[DVec2]) -> (DVec2, f64) {
    let mut hull = convex_hull(points.to_vec());
    hull.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    min_enclosing_circle(&hull)
}

/// Incremental Welzl construction in input order; `(centre, radius)`.
pub(crate) fn min_enclosing_circle(points: &[DVec2]) -> (DVec2, f64) {
    const TOL: f64 = 1e-9;
    let inside = |c: DVec2, r: f64, p: DVec2| p.distance(c) <= r + TOL;

    let Some(&first) = points.first() else {
        return (DVec2::ZERO, 0.0);
    };
    let (mut c, mut r) = (first, 0.0);
    for i in 1..points.len() {
        if inside(c, r, points[i]) {
            continue;
        }
        (c, r) = (points[i], 0.0);
        for j in 0..i {
            if inside(c, r, points[j]) {
                continue;
            }
            c = (points[i] + points[j]) / 2.0;
            r = points[i].distance(c);
            for k in 0..j {
                if inside(c, r, points[k]) {
                    continue;
                }
                (c, r) = circumcircle(points[i], points[j], points[k]);
            }
        }
    }
    (c, r)
}

/// Circle through three points; for collinear points the circle on the
/// farthest pair.
fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> (DVec2, f64) {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.perp_dot(ac);
    if d.abs() < 1e-12 {
        let pairs = [(a, b), (a, c), (b, c)];
        let (p, q) = pairs
            .into_iter()
            .max_by(|x, y| x.0.distance(x.1).total_cmp(&y.0.distance(y.1)))
            .unwrap_or((a, b));
        let centre = (p + q) / 2.0;
        return (centre, p.distance(centre));
    }
    let ux = (ac.y * ab.length_squared() - ab.y * ac.length_squared()) / d;
    let uy = (ab.x * ac.length_squared() - ac.x * ab.length_squared()) / d;
    let centre = a + DVec2::new(ux, uy);
    (centre, centre.distance(a))
}
