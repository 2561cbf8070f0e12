use crate::accumulator::RoiAccumulator;
use crate::gate::code::INTENSITY;
use crate::gate::FeatureCode::*;
use crate::reduction::{FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Scalar intensity statistics from the online state and the histogram.
pub struct IntensityModule;

const INFO: StageInfo = StageInfo::new("intensity", INTENSITY).always();

impl FeatureModule for IntensityModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, ctx: &ReduceContext<'_>) {
        let m = acc.moments(ctx.config.min_online_roi_size);
        let v = &mut derived.values;

        v[Mean] = m.mean;
        v[Min] = acc.min() as f64;
        v[Max] = acc.max() as f64;
        v[Range] = (acc.max() - acc.min()) as f64;
        v[StandardDeviation] = m.stddev();
        v[Skewness] = m.skewness;
        v[Kurtosis] = m.kurtosis;
        v[MeanAbsoluteDeviation] = m.mad;
        v[Energy] = acc.energy();
        v[RootMeanSquared] = m.rms;

        if let Some(h) = acc.histogram().stats() {
            v[Median] = h.median;
            v[Mode] = h.mode;
            v[P10] = h.p10;
            v[P25] = h.p25;
            v[P75] = h.p75;
            v[P90] = h.p90;
            v[InterquartileRange] = h.iqr;
            v[RobustMeanAbsoluteDeviation] = h.rmad;
            v[Entropy] = h.entropy;
            v[Uniformity] = h.uniformity;
        }

        let weighted = acc.weighted_centroid();
        v[WeightedCentroidX] = weighted.x;
        v[WeightedCentroidY] = weighted.y;
    }
}
