//! ROI records as seen by the reduction phase.

use std::ops::{Index, IndexMut};

use glam::DVec2;

use crate::accumulator::RoiAccumulator;
use crate::gate::code::TOTAL_COLUMNS;
use crate::gate::{FeatureCode, FeatureGate};
use crate::types::{Label, Pixel};

/// One slot per output column, laid out by [`FeatureCode::offset`]. Slots
/// default to `0.0` until a stage writes them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureValues {
    values: Vec<f64>,
}

impl Default for FeatureValues {
    fn default() -> Self {
        Self {
            values: vec![0.0; TOTAL_COLUMNS],
        }
    }
}

impl FeatureValues {
    #[inline]
    pub fn set(&mut self, code: FeatureCode, value: f64) {
        self.values[code.offset()] = value;
    }

    /// First column of `code`.
    #[inline]
    pub fn get(&self, code: FeatureCode) -> f64 {
        self.values[code.offset()]
    }

    /// Every column of `code`.
    #[inline]
    pub fn columns(&self, code: FeatureCode) -> &[f64] {
        let start = code.offset();
        &self.values[start..start + code.width()]
    }

    #[inline]
    pub fn columns_mut(&mut self, code: FeatureCode) -> &mut [f64] {
        let start = code.offset();
        &mut self.values[start..start + code.width()]
    }

    /// Writes `values` into consecutive codes of `codes`.
    pub fn set_all(&mut self, codes: &[FeatureCode], values: &[f64]) {
        debug_assert_eq!(codes.len(), values.len());
        for (&code, &value) in codes.iter().zip(values) {
            self.set(code, value);
        }
    }

    /// Values of the enabled codes in column order.
    pub fn select<'a>(&'a self, gate: &'a FeatureGate) -> impl Iterator<Item = f64> + 'a {
        gate.enabled_codes()
            .flat_map(move |code| self.columns(code).iter().copied())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Index<FeatureCode> for FeatureValues {
    type Output = f64;

    #[inline]
    fn index(&self, code: FeatureCode) -> &f64 {
        &self.values[code.offset()]
    }
}

impl IndexMut<FeatureCode> for FeatureValues {
    #[inline]
    fn index_mut(&mut self, code: FeatureCode) -> &mut f64 {
        &mut self.values[code.offset()]
    }
}

/// Everything reduction stages produce for one ROI.
#[derive(Debug, Clone, Default)]
pub struct Derived {
    pub values: FeatureValues,
    pub centroid: DVec2,
    /// Boundary pixels in raster order.
    pub contour: Vec<Pixel>,
    /// Hull vertices, counter-clockwise.
    pub hull: Vec<DVec2>,
    pub hull_area: f64,
    pub num_neighbors: u32,
}

/// A finished streaming record plus its reduction output.
///
/// The accumulator is read-only from here on.
#[derive(Debug, Clone)]
pub struct Roi {
    pub acc: RoiAccumulator,
    pub derived: Derived,
}

impl Roi {
    pub fn new(acc: RoiAccumulator) -> Self {
        Self {
            acc,
            derived: Derived::default(),
        }
    }

    #[inline]
    pub fn label(&self) -> Label {
        self.acc.label()
    }

    #[inline]
    pub fn value(&self, code: FeatureCode) -> f64 {
        self.derived.values[code]
    }
}

impl From<RoiAccumulator> for Roi {
    fn from(acc: RoiAccumulator) -> Self {
        Self::new(acc)
    }
}
