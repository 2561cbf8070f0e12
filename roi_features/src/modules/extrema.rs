use crate::accumulator::RoiAccumulator;
use crate::gate::code::EXTREMA;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Eight extreme boundary points, clockwise from the top-left:
/// top (left, right), right (top, bottom), bottom (right, left), left (bottom, top).
pub struct ExtremaModule;

const INFO: StageInfo = StageInfo::new("extrema", EXTREMA).always();

impl FeatureModule for ExtremaModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let aabb = acc.aabb();
        let (top, bottom, left, right) = (aabb.y_min, aabb.y_max, aabb.x_min, aabb.x_max);

        let mut top_x = (u32::MAX, 0);
        let mut bottom_x = (u32::MAX, 0);
        let mut left_y = (u32::MAX, 0);
        let mut right_y = (u32::MAX, 0);
        for p in acc.pixels() {
            if p.y == top {
                top_x = (top_x.0.min(p.x), top_x.1.max(p.x));
            }
            if p.y == bottom {
                bottom_x = (bottom_x.0.min(p.x), bottom_x.1.max(p.x));
            }
            if p.x == left {
                left_y = (left_y.0.min(p.y), left_y.1.max(p.y));
            }
            if p.x == right {
                right_y = (right_y.0.min(p.y), right_y.1.max(p.y));
            }
        }

        let points = [
            (top_x.0, top),
            (top_x.1, top),
            (right, right_y.0),
            (right, right_y.1),
            (bottom_x.1, bottom),
            (bottom_x.0, bottom),
            (left, left_y.1),
            (left, left_y.0),
        ];
        let values: Vec<f64> = points
            .iter()
            .flat_map(|&(x, y)| [x as f64, y as f64])
            .collect();
        derived.values.set_all(EXTREMA, &values);
    }
}
