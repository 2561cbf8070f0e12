use super::{entropy, LevelGrid, DIRECTIONS};
use crate::accumulator::RoiAccumulator;
use crate::gate::code::GLCM;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Haralick features of the symmetric grey-level co-occurrence matrix,
/// averaged over the four directions that have at least one pixel pair.
pub struct GlcmModule;

const INFO: StageInfo = StageInfo::new("glcm", GLCM);

impl FeatureModule for GlcmModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let texture = &ctx.config.texture;
        let grid = LevelGrid::new(acc, texture.grey_levels);
        let distance = texture.glcm_distance as i64;

        let mut sums = [0.0; 13];
        let mut used = 0;
        for (dx, dy) in DIRECTIONS {
            if let Some(features) = haralick(&cooccurrence(&grid, dx * distance, dy * distance)) {
                sums.iter_mut().zip(features).for_each(|(s, f)| *s += f);
                used += 1;
            }
        }
        if used == 0 {
            return;
        }
        let means: Vec<f64> = sums.iter().map(|s| s / used as f64).collect();
        derived.values.set_all(GLCM, &means);
    }
}

/// Normalized symmetric co-occurrence matrix, row-major `G x G`.
pub(crate) fn cooccurrence(grid: &LevelGrid, dx: i64, dy: i64) -> Vec<f64> {
    let g = grid.grey_levels;
    let mut counts = vec![0u64; g * g];
    for y in 0..grid.height() as i64 {
        for x in 0..grid.width() as i64 {
            let a = grid.level(x, y);
            let b = grid.level(x + dx, y + dy);
            if a == 0 || b == 0 {
                continue;
            }
            counts[(a - 1) * g + (b - 1)] += 1;
            counts[(b - 1) * g + (a - 1)] += 1;
        }
    }
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    counts.iter().map(|&c| c as f64 / total as f64).collect()
}

/// The 13 Haralick features in output order; `None` for an empty matrix.
pub(crate) fn haralick(p: &[f64]) -> Option<[f64; 13]> {
    if p.is_empty() {
        return None;
    }
    let g = (p.len() as f64).sqrt().round() as usize;
    let at = |i: usize, j: usize| p[i * g + j];

    // marginals, with levels numbered from 1
    let mut px = vec![0.0; g];
    let mut py = vec![0.0; g];
    let mut p_sum = vec![0.0; 2 * g + 1];
    let mut p_diff = vec![0.0; g];
    for i in 0..g {
        for j in 0..g {
            let v = at(i, j);
            px[i] += v;
            py[j] += v;
            p_sum[i + j + 2] += v;
            p_diff[i.abs_diff(j)] += v;
        }
    }

    let level = |i: usize| (i + 1) as f64;
    let mu_x: f64 = (0..g).map(|i| level(i) * px[i]).sum();
    let mu_y: f64 = (0..g).map(|j| level(j) * py[j]).sum();
    let sd_x = (0..g).map(|i| (level(i) - mu_x).powi(2) * px[i]).sum::<f64>().sqrt();
    let sd_y = (0..g).map(|j| (level(j) - mu_y).powi(2) * py[j]).sum::<f64>().sqrt();

    let (mut asm, mut idm, mut variance, mut cross) = (0.0, 0.0, 0.0, 0.0);
    let (mut hxy1, mut hxy2) = (0.0, 0.0);
    for i in 0..g {
        for j in 0..g {
            let v = at(i, j);
            let (li, lj) = (level(i), level(j));
            asm += v * v;
            idm += v / (1.0 + (li - lj).powi(2));
            variance += (li - mu_x).powi(2) * v;
            cross += li * lj * v;
            let pxy = px[i] * py[j];
            if pxy > 0.0 {
                if v > 0.0 {
                    hxy1 -= v * pxy.ln();
                }
                hxy2 -= pxy * pxy.ln();
            }
        }
    }

    let contrast: f64 = p_diff.iter().enumerate().map(|(k, v)| (k * k) as f64 * v).sum();
    let correlation = if sd_x > 0.0 && sd_y > 0.0 {
        (cross - mu_x * mu_y) / (sd_x * sd_y)
    } else {
        0.0
    };
    let sum_average: f64 = p_sum.iter().enumerate().map(|(k, v)| k as f64 * v).sum();
    let sum_variance: f64 = p_sum
        .iter()
        .enumerate()
        .map(|(k, v)| (k as f64 - sum_average).powi(2) * v)
        .sum();
    let sum_entropy = entropy(&p_sum);
    let hxy = entropy(p);
    let diff_mean: f64 = p_diff.iter().enumerate().map(|(k, v)| k as f64 * v).sum();
    let diff_variance: f64 = p_diff
        .iter()
        .enumerate()
        .map(|(k, v)| (k as f64 - diff_mean).powi(2) * v)
        .sum();
    let diff_entropy = entropy(&p_diff);

    let hx = entropy(&px);
    let hy = entropy(&py);
    let info_meas1 = if hx.max(hy) > 0.0 {
        (hxy - hxy1) / hx.max(hy)
    } else {
        0.0
    };
    let info_meas2 = (1.0 - (-2.0 * (hxy2 - hxy)).exp()).max(0.0).sqrt();

    Some([
        asm,
        contrast,
        correlation,
        variance,
        idm,
        sum_average,
        sum_variance,
        sum_entropy,
        hxy,
        diff_variance,
        diff_entropy,
        info_meas1,
        info_meas2,
    ])
}
