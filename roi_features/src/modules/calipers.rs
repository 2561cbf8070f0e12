//! Rotating-caliper diameters sampled at 1 degree steps over `[0, 180)`.
//!
//! - Feret: distance between two parallel tangents to the convex hull.
//! - Martin: length of the hull chord, parallel to the measuring direction,
//!   that splits the hull area in half.
//! - Nassenstein: length of the hull chord, parallel to the measuring
//!   direction, half a pixel above the lowest hull point.
//!
//! All three work on the convex hull over pixel corners.

use glam::DVec2;

use super::hull::polygon_area;
use crate::accumulator::RoiAccumulator;
use crate::gate::code::{FERET, MARTIN, NASSENSTEIN};
use crate::gate::FeatureCode::*;
use crate::modules::diameter_stats;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

const NUM_ANGLES: usize = 180;

/// Unit measuring directions; index equals the angle in degrees.
fn directions() -> impl Iterator<Item = DVec2> {
    (0..NUM_ANGLES).map(|deg| DVec2::from_angle((deg as f64).to_radians()))
}

/// Nassenstein chords sit this far above the lowest hull point.
const NASSENSTEIN_OFFSET: f64 = 0.5;

const BISECTION_STEPS: usize = 60;

/// `[lo, hi]` of `p.dot(normal)` over the hull.
fn normal_span(hull: &[DVec2], normal: DVec2) -> (f64, f64) {
    hull.iter()
        .map(|v| v.dot(normal))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)))
}

/// Consecutive hull edges, closing back to the first vertex.
fn edges(hull: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    hull.iter().copied().zip(hull.iter().copied().cycle().skip(1))
}

/// Length of the hull cross-section on the line `p.dot(dir.perp()) == level`.
fn chord_length(hull: &[DVec2], dir: DVec2, level: f64) -> f64 {
    let normal = dir.perp();
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut touch = |p: DVec2| {
        let t = p.dot(dir);
        lo = lo.min(t);
        hi = hi.max(t);
    };
    for (a, b) in edges(hull) {
        let (da, db) = (a.dot(normal) - level, b.dot(normal) - level);
        if da == 0.0 {
            touch(a);
        }
        if da * db < 0.0 {
            touch(a + (b - a) * (da / (da - db)));
        }
    }
    if lo > hi {
        0.0
    } else {
        hi - lo
    }
}

/// Area of the hull part with `p.dot(normal) <= level`.
fn area_below(hull: &[DVec2], normal: DVec2, level: f64) -> f64 {
    let mut clipped = Vec::with_capacity(hull.len() + 2);
    for (a, b) in edges(hull) {
        let (da, db) = (a.dot(normal) - level, b.dot(normal) - level);
        if da <= 0.0 {
            clipped.push(a);
        }
        if da * db < 0.0 {
            clipped.push(a + (b - a) * (da / (da - db)));
        }
    }
    polygon_area(&clipped)
}

/// Normal level of the line splitting the hull area in half.
fn bisecting_level(hull: &[DVec2], normal: DVec2, area: f64) -> f64 {
    let (mut lo, mut hi) = normal_span(hull, normal);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if area_below(hull, normal, mid) < 0.5 * area {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

pub struct FeretModule;

const FERET_INFO: StageInfo = StageInfo::new("feret", FERET)
    .requires(&[Artifact::ConvexHull])
    .provides(&[Artifact::FeretDiameters]);

impl FeatureModule for FeretModule {
    fn info(&self) -> &StageInfo {
        &FERET_INFO
    }

    fn compute(&self, _acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        if derived.hull.is_empty() {
            return;
        }

        let widths: Vec<f64> = directions()
            .map(|dir| {
                let (lo, hi) = normal_span(&derived.hull, dir);
                hi - lo
            })
            .collect();

        let (min_angle, min_width) = extreme(&widths, |a, b| a < b);
        let (max_angle, max_width) = extreme(&widths, |a, b| a > b);

        let v = &mut derived.values;
        v[MinFeretDiameter] = min_width;
        v[MaxFeretDiameter] = max_width;
        v[MinFeretAngle] = min_angle as f64;
        v[MaxFeretAngle] = max_angle as f64;
        v.set_all(&FERET[4..], &diameter_stats(&widths));
    }
}

/// First index whose value beats every other under `better`.
fn extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> (usize, f64) {
    let mut best = (0, values[0]);
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, best.1) {
            best = (i, v);
        }
    }
    best
}

pub struct MartinModule;

const MARTIN_INFO: StageInfo = StageInfo::new("martin", MARTIN).requires(&[Artifact::ConvexHull]);

impl FeatureModule for MartinModule {
    fn info(&self) -> &StageInfo {
        &MARTIN_INFO
    }

    fn compute(&self, _acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let hull = &derived.hull;
        if hull.is_empty() {
            return;
        }
        let lengths: Vec<f64> = directions()
            .map(|dir| chord_length(hull, dir, bisecting_level(hull, dir.perp(), derived.hull_area)))
            .collect();
        derived.values.set_all(MARTIN, &diameter_stats(&lengths));
    }
}

pub struct NassensteinModule;

const NASSENSTEIN_INFO: StageInfo =
    StageInfo::new("nassenstein", NASSENSTEIN).requires(&[Artifact::ConvexHull]);

impl FeatureModule for NassensteinModule {
    fn info(&self) -> &StageInfo {
        &NASSENSTEIN_INFO
    }

    fn compute(&self, _acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let hull = &derived.hull;
        if hull.is_empty() {
            return;
        }
        let lengths: Vec<f64> = directions()
            .map(|dir| {
                let (lo, hi) = normal_span(hull, dir.perp());
                // hulls thinner than a pixel are cut through the middle
                let level = (lo + NASSENSTEIN_OFFSET).min(0.5 * (lo + hi));
                chord_length(hull, dir, level)
            })
            .collect();
        derived.values.set_all(NASSENSTEIN, &diameter_stats(&lengths));
    }
}
