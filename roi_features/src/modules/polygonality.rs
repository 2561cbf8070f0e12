//! Shape factors derived from already reduced measurements.

use std::f64::consts::PI;

use crate::accumulator::RoiAccumulator;
use crate::gate::code::{GEODETIC, POLYGONALITY};
use crate::gate::FeatureCode::*;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Polygonality and hexagonality scores: agreement between area and
/// perimeter estimates of a regular polygon with one side per neighbor.
pub struct PolygonalityModule;

const POLYGONALITY_INFO: StageInfo = StageInfo::new("polygonality", POLYGONALITY).requires(&[
    Artifact::Contour,
    Artifact::ConvexHull,
    Artifact::Neighbors,
    Artifact::FeretDiameters,
]);

impl FeatureModule for PolygonalityModule {
    fn info(&self) -> &StageInfo {
        &POLYGONALITY_INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        if derived.num_neighbors == 0 || derived.contour.is_empty() || derived.hull.is_empty() {
            return;
        }
        let shape = ShapeMeasures {
            neighbors: derived.num_neighbors as f64,
            area: acc.count() as f64,
            perimeter: derived.values[Perimeter],
            hull_area: derived.hull_area,
            min_feret: derived.values[MinFeretDiameter],
            max_feret: derived.values[MaxFeretDiameter],
        };
        if let Some((poly_ave, hex_ave, hex_sd)) = shape.scores() {
            let v = &mut derived.values;
            v[PolygonalityAve] = poly_ave;
            v[HexagonalityAve] = hex_ave;
            v[HexagonalityStddev] = hex_sd;
        }
    }
}

struct ShapeMeasures {
    neighbors: f64,
    area: f64,
    perimeter: f64,
    hull_area: f64,
    min_feret: f64,
    max_feret: f64,
}

impl ShapeMeasures {
    /// `(polygonality, hexagonality, hexagonality stddev)`; `None` below three sides.
    fn scores(&self) -> Option<(f64, f64, f64)> {
        let Self {
            neighbors,
            area,
            perimeter,
            hull_area,
            min_feret,
            max_feret,
        } = *self;
        if neighbors < 3.0 || min_feret <= 0.0 {
            return None;
        }

        let sqrt3 = 3f64.sqrt();
        let perim_neighbors = perimeter / neighbors;
        let tan = (PI / neighbors).tan();

        let poly_size_ratio =
            1.0 - (1.0 - perim_neighbors / (4.0 * area / (neighbors / tan)).sqrt()).abs();
        let poly_area_ratio =
            1.0 - (1.0 - area / (0.25 * neighbors * perim_neighbors * perim_neighbors / tan)).abs();
        let poly_ave = 10.0 * (poly_size_ratio + poly_area_ratio) / 2.0;

        // Regular hexagon estimates from independent measurements
        let perim_hull = 6.0 * (hull_area / (1.5 * sqrt3)).sqrt();
        let apoth1 = sqrt3 * perimeter / 12.0;
        let apoth2 = sqrt3 * max_feret / 4.0;
        let apoth3 = min_feret / 2.0;
        let apoth4 = sqrt3 * perim_hull / 12.0;
        let apoth5 = (4.0 * hull_area / (4.5 * sqrt3)).sqrt();
        let side1 = perimeter / 6.0;
        let side2 = max_feret / 2.0;
        let side3 = min_feret / sqrt3;
        let side4 = perim_hull / 6.0;

        let hex_area = |side: f64| 0.5 * 3.0 * sqrt3 * side * side;
        let areas = [
            hex_area(side1),
            hex_area(side2),
            hex_area(side3),
            3.0 * side1 * apoth2,
            3.0 * side1 * apoth3,
            3.0 * side2 * apoth3,
            3.0 * side4 * apoth1,
            3.0 * side4 * apoth2,
            3.0 * side4 * apoth3,
            hull_area,
            area,
        ];
        let perimeters = [
            (24.0 * area / sqrt3).sqrt(),
            (24.0 * hull_area / sqrt3).sqrt(),
            perimeter,
            perim_hull,
            3.0 * max_feret,
            6.0 * min_feret / sqrt3,
            2.0 * area / apoth1,
            2.0 * area / apoth2,
            2.0 * area / apoth3,
            2.0 * area / apoth4,
            2.0 * area / apoth5,
            2.0 * hull_area / apoth1,
            2.0 * hull_area / apoth2,
            2.0 * hull_area / apoth3,
        ];

        let (area_ave, area_sd) = pairwise_agreement(&areas);
        let (perim_ave, perim_sd) = pairwise_agreement(&perimeters);
        let hex_ave = 10.0 * (area_ave + perim_ave) / 2.0;
        let hex_sd = ((area_sd * area_sd + perim_sd * perim_sd) / 2.0).sqrt();

        Some((poly_ave, hex_ave, hex_sd))
    }
}

/// Mean and population stddev of `1 - |1 - a/b|` over all ordered pairs `a` before `b`.
fn pairwise_agreement(values: &[f64]) -> (f64, f64) {
    let ratios: Vec<f64> = values
        .iter()
        .enumerate()
        .flat_map(|(i, &a)| values[i + 1..].iter().map(move |&b| 1.0 - (1.0 - a / b).abs()))
        .collect();
    let n = ratios.len() as f64;
    let mean = ratios.iter().sum::<f64>() / n;
    let var = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Length and thickness of a ribbon with the ROI's area and perimeter.
/// Gated on neighbors and hull like [`PolygonalityModule`].
pub struct GeodeticModule;

const GEODETIC_INFO: StageInfo = StageInfo::new("geodetic", GEODETIC).requires(&[
    Artifact::Contour,
    Artifact::ConvexHull,
    Artifact::Neighbors,
    Artifact::FeretDiameters,
]);

impl FeatureModule for GeodeticModule {
    fn info(&self) -> &StageInfo {
        &GEODETIC_INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        if derived.num_neighbors == 0 || derived.contour.is_empty() || derived.hull.is_empty() {
            return;
        }
        let (length, thickness) =
            geodetic_length_thickness(acc.count() as f64, derived.values[Perimeter]);
        derived.values[GeodeticLength] = length;
        derived.values[Thickness] = thickness;
    }
}

/// Sides of the rectangle with area `area` and perimeter `perimeter`
/// (`L * T = A`, `2 (L + T) = P`); a square of side `P / 4` when no such
/// rectangle exists.
pub(crate) fn geodetic_length_thickness(area: f64, perimeter: f64) -> (f64, f64) {
    let disc = perimeter * perimeter - 16.0 * area;
    if disc < 0.0 {
        let side = perimeter / 4.0;
        return (side, side);
    }
    let root = disc.sqrt();
    ((perimeter + root) / 4.0, (perimeter - root) / 4.0)
}
