use glam::DVec2;

use crate::accumulator::RoiAccumulator;
use crate::gate::code::CONVEX_HULL;
use crate::gate::FeatureCode::*;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Convex hull of the pixel squares (not their centres) and solidity.
pub struct ConvexHullModule;

const INFO: StageInfo =
    StageInfo::new("convex_hull", CONVEX_HULL).provides(&[Artifact::ConvexHull]);

impl FeatureModule for ConvexHullModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let corners: Vec<DVec2> = acc
            .pixels()
            .iter()
            .flat_map(|p| {
                let (x, y) = (p.x as f64, p.y as f64);
                [
                    DVec2::new(x, y),
                    DVec2::new(x + 1.0, y),
                    DVec2::new(x, y + 1.0),
                    DVec2::new(x + 1.0, y + 1.0),
                ]
            })
            .collect();

        let hull = convex_hull(corners);
        let area = polygon_area(&hull);
        if hull.len() < 3 || area <= 0.0 {
            derived.hull.clear();
            derived.hull_area = 0.0;
            return;
        }

        derived.values[ConvexHullArea] = area;
        derived.values[Solidity] = acc.count() as f64 / area;
        derived.hull = hull;
        derived.hull_area = area;
    }
}

/// Andrew's monotone chain; counter-clockwise, no collinear vertices.
pub(crate) fn convex_hull(mut points: Vec<DVec2>) -> Vec<DVec2> {
    points.sort_unstable_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let cross = |o: DVec2, a: DVec2, b: DVec2| (a - o).perp_dot(b - o);
    let mut hull: Vec<DVec2> = Vec::with_capacity(points.len() * 2);

    for &p in &points {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Shoelace area, always non-negative.
pub(crate) fn polygon_area(vertices: &[DVec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    twice.abs() / 2.0
}
