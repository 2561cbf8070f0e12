//! Spatial-hash neighbor counting over ROI bounding boxes.
//!
//! Every box is dilated by `radius` towards +x/+y and its corner cells are
//! hashed into buckets. The cell edge equals the largest dilated box extent,
//! so a box spans at most two cells per axis and its corner cells are all the
//! cells it touches. Two overlapping boxes therefore always share the bucket
//! of the cell holding their intersection's minimum corner; a pair is tested
//! in every shared bucket but only counted in that one.


use crate::gate::code::NEIGHBORS;
use crate::gate::FeatureCode;
use crate::reduction::{Artifact, ReduceContext, Stage, StageInfo};
use crate::roi::Roi;
use crate::types::Aabb;

const HASH_PRIME_X: u64 = 73_856_093;
const HASH_PRIME_Y: u64 = 19_349_663;
const MIN_BUCKETS: usize = 64;

/// Number of boxes overlapping each box once dilated by `radius`.
///
/// Result is index-aligned with `boxes`. Adjacency is symmetric and each
/// unordered overlapping pair contributes exactly one contact to each side.
pub fn count_neighbors(boxes: &[Aabb], radius: u32) -> Vec<u32> {
    let n = boxes.len();
    let mut counts = vec![0u32; n];
    if n < 2 {
        return counts;
    }

    let grid = HashGrid::new(boxes, radius);
    let buckets = grid.fill(boxes);

    for (bucket_idx, members) in buckets.iter().enumerate() {
        if members.len() < 2 {
            continue;
        }
        for (i, &a) in members.iter().enumerate() {
            let box_a = &boxes[a as usize];
            for &b in &members[..i] {
                let box_b = &boxes[b as usize];
                if !box_a.overlaps_dilated(box_b, radius) {
                    continue;
                }
                let corner_x = box_a.x_min.max(box_b.x_min) as u64;
                let corner_y = box_a.y_min.max(box_b.y_min) as u64;
                if grid.bucket_of(corner_x, corner_y) == bucket_idx {
                    counts[a as usize] += 1;
                    counts[b as usize] += 1;
                }
            }
        }
    }

    counts
}

/// Global stage writing `NUM_NEIGHBORS`; needs every ROI's final bounding box.
pub struct NeighborsStage;

const INFO: StageInfo = StageInfo::new("neighbors", NEIGHBORS).provides(&[Artifact::Neighbors]);

impl Stage for NeighborsStage {
    fn info(&self) -> &StageInfo {
        &INFO
    }

    fn run(&self, rois: &mut [Roi], ctx: &ReduceContext<'_>) {
        let boxes: Vec<Aabb> = rois.iter().map(|r| r.acc.aabb()).collect();
        let counts = count_neighbors(&boxes, ctx.config.neighbor_radius);

        let isolated = counts.iter().filter(|&&c| c == 0).count();
        for (roi, count) in rois.iter_mut().zip(counts) {
            roi.derived.num_neighbors = count;
            roi.derived.values[FeatureCode::NumNeighbors] = count as f64;
        }
        if rois.len() > 1 && isolated == rois.len() {
            tracing::warn!(
                rois = rois.len(),
                radius = ctx.config.neighbor_radius,
                "No ROI has neighbors; polygonality features stay at defaults"
            );
        }
    }
}

/// Total number of unordered overlapping pairs.
pub fn count_contacts(boxes: &[Aabb], radius: u32) -> u64 {
    count_neighbors(boxes, radius)
        .iter()
        .map(|&c| c as u64)
        .sum::<u64>()
        / 2
}

struct HashGrid {
    cell: u64,
    radius: u64,
    buckets: usize,
}

impl HashGrid {
    fn new(boxes: &[Aabb], radius: u32) -> Self {
        let radius = radius as u64;
        let cell = boxes
            .iter()
            .map(|b| (b.width() as u64).max(b.height() as u64) + radius)
            .max()
            .unwrap_or(1);
        Self {
            cell,
            radius,
            buckets: (boxes.len() * 2).max(MIN_BUCKETS),
        }
    }

    #[inline]
    fn bucket_of(&self, x: u64, y: u64) -> usize {
        let cx = x / self.cell;
        let cy = y / self.cell;
        let h = cx.wrapping_mul(HASH_PRIME_X) ^ cy.wrapping_mul(HASH_PRIME_Y);
        (h % self.buckets as u64) as usize
    }

    /// Bucket -> indices of the boxes whose corner cells hash there.
    fn fill(&self, boxes: &[Aabb]) -> Vec<Vec<u32>> {
        let mut buckets = vec![Vec::new(); self.buckets];
        for (idx, b) in boxes.iter().enumerate() {
            let x0 = b.x_min as u64;
            let y0 = b.y_min as u64;
            let x1 = b.x_max as u64 + self.radius;
            let y1 = b.y_max as u64 + self.radius;

            let mut corners = [
                self.bucket_of(x0, y0),
                self.bucket_of(x1, y0),
                self.bucket_of(x0, y1),
                self.bucket_of(x1, y1),
            ];
            corners.sort_unstable();
            let mut last = usize::MAX;
            for bucket in corners {
                if bucket != last {
                    buckets[bucket].push(idx as u32);
                    last = bucket;
                }
            }
        }
        buckets
    }
}
