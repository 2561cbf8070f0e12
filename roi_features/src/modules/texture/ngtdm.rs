use super::LevelGrid;
use crate::accumulator::RoiAccumulator;
use crate::gate::code::NGTDM;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Coarseness reported when the difference sum is zero (a flat ROI).
const FLAT_COARSENESS: f64 = 1e6;

/// Neighborhood grey-tone difference features over the 8-neighborhood.
pub struct NgtdmModule;

const INFO: StageInfo = StageInfo::new("ngtdm", NGTDM);

impl FeatureModule for NgtdmModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let grid = LevelGrid::new(acc, ctx.config.texture.grey_levels);
        if let Some(features) = ngtdm_features(&grid) {
            derived.values.set_all(NGTDM, &features);
        }
    }
}

/// `[coarseness, contrast, busyness, complexity, strength]`; `None` when no
/// pixel has an ROI neighbor.
pub(crate) fn ngtdm_features(grid: &LevelGrid) -> Option<[f64; 5]> {
    let g = grid.grey_levels;
    let mut s = vec![0.0; g];
    let mut n = vec![0u64; g];

    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            let level = grid.level(x, y);
            if level == 0 {
                continue;
            }
            let (mut sum, mut count) = (0usize, 0usize);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nb = grid.level(x + dx, y + dy);
                    if nb > 0 {
                        sum += nb;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                let avg = sum as f64 / count as f64;
                s[level - 1] += (level as f64 - avg).abs();
                n[level - 1] += 1;
            }
        }
    }

    let nvp: u64 = n.iter().sum();
    if nvp == 0 {
        return None;
    }
    let p: Vec<f64> = n.iter().map(|&c| c as f64 / nvp as f64).collect();
    let present: Vec<usize> = (0..g).filter(|&i| p[i] > 0.0).collect();
    let ngp = present.len() as f64;
    let s_total: f64 = s.iter().sum();
    let ps_sum: f64 = (0..g).map(|i| p[i] * s[i]).sum();

    let coarseness = if ps_sum > 0.0 { 1.0 / ps_sum } else { FLAT_COARSENESS };

    let (mut contrast_sum, mut busy_denom, mut complexity, mut strength_num) = (0.0, 0.0, 0.0, 0.0);
    for &i in &present {
        for &j in &present {
            let (li, lj) = ((i + 1) as f64, (j + 1) as f64);
            let d2 = (li - lj).powi(2);
            contrast_sum += p[i] * p[j] * d2;
            busy_denom += (li * p[i] - lj * p[j]).abs();
            complexity += (li - lj).abs() * (p[i] * s[i] + p[j] * s[j]) / (p[i] + p[j]);
            strength_num += (p[i] + p[j]) * d2;
        }
    }

    let contrast = if ngp > 1.0 {
        contrast_sum / (ngp * (ngp - 1.0)) * s_total / nvp as f64
    } else {
        0.0
    };
    let busyness = if busy_denom > 0.0 { ps_sum / busy_denom } else { 0.0 };
    let complexity = complexity / nvp as f64;
    let strength = if s_total > 0.0 { strength_num / s_total } else { 0.0 };

    Some([coarseness, contrast, busyness, complexity, strength])
}
