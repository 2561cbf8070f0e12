use super::size_matrix::{emphasis_features, SizeMatrix};
use super::{LevelGrid, DIRECTIONS};
use crate::accumulator::RoiAccumulator;
use crate::gate::code::GLRLM;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Grey-level run-length features, averaged over the four directions.
pub struct GlrlmModule;

const INFO: StageInfo = StageInfo::new("glrlm", GLRLM);

impl FeatureModule for GlrlmModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let grid = LevelGrid::new(acc, ctx.config.texture.grey_levels);

        let mut sums = [0.0; 16];
        for (dx, dy) in DIRECTIONS {
            let features = emphasis_features(&run_lengths(&grid, dx, dy), grid.pixel_count);
            sums.iter_mut().zip(features).for_each(|(s, f)| *s += f);
        }
        let means: Vec<f64> = sums.iter().map(|s| s / DIRECTIONS.len() as f64).collect();
        derived.values.set_all(GLRLM, &means);
    }
}

/// Runs along `(dx, dy)`, keyed by level and run length.
pub(crate) fn run_lengths(grid: &LevelGrid, dx: i64, dy: i64) -> SizeMatrix {
    let mut runs = SizeMatrix::new();
    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            let level = grid.level(x, y);
            // only start counting at the first pixel of a run
            if level == 0 || grid.level(x - dx, y - dy) == level {
                continue;
            }
            let mut len = 1;
            while grid.level(x + dx * len as i64, y + dy * len as i64) == level {
                len += 1;
            }
            runs.add(level, len);
        }
    }
    runs
}
