use glam::DVec2;

use crate::accumulator::RoiAccumulator;
use crate::gate::code::{ZERNIKE, ZERNIKE_COLUMNS, ZERNIKE_ORDER};
use crate::gate::FeatureCode;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;
use crate::types::Pixel;

/// Zernike moment magnitudes `|Z_nm|` of the intensity image, mapped onto the
/// unit disc around the intensity-weighted centre of mass.
pub struct ZernikeModule;

const INFO: StageInfo = StageInfo::new("zernike", ZERNIKE);

impl FeatureModule for ZernikeModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let magnitudes = zernike_magnitudes(acc);
        derived
            .values
            .columns_mut(FeatureCode::TextureZernike2D)
            .copy_from_slice(&magnitudes);
    }
}

/// `(n, m)` pairs in column order.
pub(crate) fn zernike_orders() -> impl Iterator<Item = (usize, usize)> {
    (0..=ZERNIKE_ORDER).flat_map(|n| (n % 2..=n).step_by(2).map(move |m| (n, m)))
}

/// Coefficients of `R_nm(rho)`, as `(power, coefficient)` pairs.
fn radial_terms(n: usize, m: usize) -> Vec<(usize, f64)> {
    let fact = |k: usize| (1..=k).map(|v| v as f64).product::<f64>();
    (0..=(n - m) / 2)
        .map(|s| {
            let sign = if s % 2 == 0 { 1.0 } else { -1.0 };
            let c = sign * fact(n - s)
                / (fact(s) * fact((n + m) / 2 - s) * fact((n - m) / 2 - s));
            (n - 2 * s, c)
        })
        .collect()
}

pub(crate) fn zernike_magnitudes(acc: &RoiAccumulator) -> [f64; ZERNIKE_COLUMNS.len()] {
    let mut out = [0.0; ZERNIKE_COLUMNS.len()];
    let pixels = acc.pixels();
    if pixels.is_empty() {
        return out;
    }

    let total: f64 = pixels.iter().map(|p| p.intensity as f64).sum();
    // an all-zero ROI falls back to uniform weights
    let uniform = total <= 0.0;
    let scale = if uniform { pixels.len() as f64 } else { total };
    let weight = |p: &Pixel| (if uniform { 1.0 } else { p.intensity as f64 }) / scale;
    let centre: DVec2 = pixels
        .iter()
        .map(|p| weight(p) * DVec2::new(p.x as f64, p.y as f64))
        .sum();

    let radius = pixels
        .iter()
        .map(|p| ((p.x as f64 - centre.x).powi(2) + (p.y as f64 - centre.y).powi(2)).sqrt())
        .fold(0.0, f64::max)
        + 0.5;

    let orders: Vec<(usize, usize)> = zernike_orders().collect();
    let terms: Vec<Vec<(usize, f64)>> = orders.iter().map(|&(n, m)| radial_terms(n, m)).collect();
    // (re, im) accumulators of sum(w * R_nm * e^{-i m theta})
    let mut sums = vec![(0.0f64, 0.0f64); orders.len()];

    let mut rho_pow = [0.0f64; ZERNIKE_ORDER + 1];
    let mut phase = [(0.0f64, 0.0f64); ZERNIKE_ORDER + 1];
    for p in pixels {
        let w = weight(p);
        let dx = p.x as f64 - centre.x;
        let dy = p.y as f64 - centre.y;
        let d = (dx * dx + dy * dy).sqrt();
        let rho = d / radius;

        // e^{-i theta}; the angle is arbitrary at the centre, where only m = 0 survives
        let (c1, s1) = if d > 0.0 { (dx / d, -dy / d) } else { (1.0, 0.0) };
        rho_pow[0] = 1.0;
        phase[0] = (1.0, 0.0);
        for k in 1..=ZERNIKE_ORDER {
            rho_pow[k] = rho_pow[k - 1] * rho;
            let (re, im) = phase[k - 1];
            phase[k] = (re * c1 - im * s1, re * s1 + im * c1);
        }

        for ((&(_, m), terms), sum) in orders.iter().zip(&terms).zip(sums.iter_mut()) {
            let r: f64 = terms.iter().map(|&(k, c)| c * rho_pow[k]).sum();
            sum.0 += w * r * phase[m].0;
            sum.1 += w * r * phase[m].1;
        }
    }

    for ((&(n, _), (re, im)), slot) in orders.iter().zip(sums).zip(out.iter_mut()) {
        *slot = (n as f64 + 1.0) / std::f64::consts::PI * (re * re + im * im).sqrt();
    }
    out
}
