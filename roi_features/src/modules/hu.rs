use crate::accumulator::RoiAccumulator;
use crate::gate::code::HU_MOMENTS;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Hu's seven invariant moments of the binary ROI shape.
pub struct HuMomentsModule;

const INFO: StageInfo = StageInfo::new("hu_moments", HU_MOMENTS);

impl FeatureModule for HuMomentsModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        derived.values.set_all(HU_MOMENTS, &hu_moments(acc));
    }
}

pub(crate) fn hu_moments(acc: &RoiAccumulator) -> [f64; 7] {
    let c = acc.centroid();
    let m00 = acc.count() as f64;

    // central moments mu[p][q] for p + q <= 3
    let mut mu = [[0.0f64; 4]; 4];
    for px in acc.pixels() {
        let dx = px.x as f64 - c.x;
        let dy = px.y as f64 - c.y;
        let xs = [1.0, dx, dx * dx, dx * dx * dx];
        let ys = [1.0, dy, dy * dy, dy * dy * dy];
        for p in 0..4 {
            for q in 0..4 - p {
                mu[p][q] += xs[p] * ys[q];
            }
        }
    }
    let eta = |p: usize, q: usize| mu[p][q] / m00.powf(1.0 + (p + q) as f64 / 2.0);

    let (n20, n02, n11) = (eta(2, 0), eta(0, 2), eta(1, 1));
    let (n30, n03, n21, n12) = (eta(3, 0), eta(0, 3), eta(2, 1), eta(1, 2));

    let a = n30 + n12;
    let b = n21 + n03;
    let h1 = n20 + n02;
    let h2 = (n20 - n02).powi(2) + 4.0 * n11 * n11;
    let h3 = (n30 - 3.0 * n12).powi(2) + (3.0 * n21 - n03).powi(2);
    let h4 = a * a + b * b;
    let h5 = (n30 - 3.0 * n12) * a * (a * a - 3.0 * b * b)
        + (3.0 * n21 - n03) * b * (3.0 * a * a - b * b);
    let h6 = (n20 - n02) * (a * a - b * b) + 4.0 * n11 * a * b;
    let h7 = (3.0 * n21 - n03) * a * (a * a - 3.0 * b * b)
        - (n30 - 3.0 * n12) * b * (3.0 * a * a - b * b);

    [h1, h2, h3, h4, h5, h6, h7]
}
