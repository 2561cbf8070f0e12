use crate::accumulator::RoiAccumulator;
use crate::gate::code::EULER;
use crate::gate::FeatureCode;
use crate::modules::RoiRaster;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Euler number (objects minus holes) under 8-connectivity, by bit-quad counting.
pub struct EulerModule;

const INFO: StageInfo = StageInfo::new("euler", EULER).always();

impl FeatureModule for EulerModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        derived.values[FeatureCode::EulerNumber] = euler_number(&RoiRaster::new(acc)) as f64;
    }
}

pub(crate) fn euler_number(raster: &RoiRaster) -> i64 {
    let cells = raster.cells();
    let set = |x: usize, y: usize| cells[(x, y)].is_some();

    let (mut q1, mut q3, mut qd) = (0i64, 0i64, 0i64);
    // The empty border guarantees every quad touching the ROI is visited.
    for y in 0..raster.height() - 1 {
        for x in 0..raster.width() - 1 {
            let tl = set(x, y);
            let tr = set(x + 1, y);
            let bl = set(x, y + 1);
            let br = set(x + 1, y + 1);
            match tl as u8 + tr as u8 + bl as u8 + br as u8 {
                1 => q1 += 1,
                3 => q3 += 1,
                2 if tl == br => qd += 1,
                _ => {}
            }
        }
    }
    (q1 - q3 - 2 * qd) / 4
}
