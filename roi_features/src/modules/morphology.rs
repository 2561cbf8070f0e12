use crate::accumulator::RoiAccumulator;
use crate::gate::code::MORPHOLOGY;
use crate::gate::FeatureCode::*;
use crate::reduction::{Artifact, FeatureModule, ReduceContext, StageInfo};
use crate::roi::Derived;

/// Area, centroid and bounding-box shape descriptors.
pub struct MorphologyModule;

const INFO: StageInfo = StageInfo::new("morphology", MORPHOLOGY)
    .provides(&[Artifact::Centroid])
    .always();

impl FeatureModule for MorphologyModule {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn compute(&self, acc: &RoiAccumulator, derived: &mut Derived, _ctx: &ReduceContext<'_>) {
        let aabb = acc.aabb();
        let centroid = acc.centroid();
        derived.centroid = centroid;

        let v = &mut derived.values;
        v[AreaPixelsCount] = acc.count() as f64;
        v[CentroidX] = centroid.x;
        v[CentroidY] = centroid.y;
        v[BboxYmin] = aabb.y_min as f64;
        v[BboxXmin] = aabb.x_min as f64;
        v[BboxHeight] = aabb.height() as f64;
        v[BboxWidth] = aabb.width() as f64;
        v[Extent] = acc.count() as f64 / aabb.area() as f64;
        v[AspectRatio] = aabb.width() as f64 / aabb.height() as f64;
    }
}
