//! Feature gate: a bitset over [`FeatureCode`] that decides which reduction
//! stages run and which columns appear in the output.
//!
//! The gate is built before a processing run and is only read during
//! reduction.

pub mod code;


use strum::{EnumCount, IntoEnumIterator};

pub use code::{FeatureCode, FeatureGroup};

use crate::error::GateError;

const WORDS: usize = FeatureCode::COUNT.div_ceil(64);

#[derive(Clone, PartialEq, Eq)]
pub struct FeatureGate {
    bits: [u64; WORDS],
}

impl Default for FeatureGate {
    /// Every feature enabled.
    fn default() -> Self {
        Self::all()
    }
}

impl std::fmt::Debug for FeatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureGate")
            .field("enabled", &self.num_enabled())
            .field("total", &FeatureCode::COUNT)
            .finish()
    }
}

impl FeatureGate {
    pub fn all() -> Self {
        let mut gate = Self::none();
        gate.enable_all(true);
        gate
    }

    pub fn none() -> Self {
        Self { bits: [0; WORDS] }
    }

    /// Gate with exactly the given codes enabled.
    pub fn only(codes: &[FeatureCode]) -> Self {
        let mut gate = Self::none();
        gate.enable_codes(codes);
        gate
    }

    /// Builds a gate from user-facing names and `*GROUP*` tokens.
    /// Names are case-insensitive.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, GateError> {
        let mut gate = Self::none();
        for name in names {
            let name = name.as_ref().trim();
            if let Some(group) = FeatureGroup::from_token(name) {
                gate.enable_group(group);
            } else {
                gate.enable(Self::find_by_name(name)?);
            }
        }
        Ok(gate)
    }

    pub fn enable_all(&mut self, status: bool) {
        if status {
            for code in FeatureCode::iter() {
                self.enable(code);
            }
        } else {
            self.bits = [0; WORDS];
        }
    }

    #[inline]
    pub fn set(&mut self, code: FeatureCode, status: bool) {
        let (word, bit) = Self::slot(code);
        if status {
            self.bits[word] |= bit;
        } else {
            self.bits[word] &= !bit;
        }
    }

    #[inline]
    pub fn enable(&mut self, code: FeatureCode) {
        self.set(code, true);
    }

    #[inline]
    pub fn disable(&mut self, code: FeatureCode) {
        self.set(code, false);
    }

    pub fn enable_codes(&mut self, codes: &[FeatureCode]) {
        codes.iter().for_each(|&c| self.enable(c));
    }

    pub fn disable_codes(&mut self, codes: &[FeatureCode]) {
        codes.iter().for_each(|&c| self.disable(c));
    }

    pub fn enable_group(&mut self, group: FeatureGroup) {
        self.enable_codes(&group.codes());
    }

    pub fn disable_group(&mut self, group: FeatureGroup) {
        self.disable_codes(&group.codes());
    }

    /// Legacy preset: disables everything, then enables only the group.
    pub fn enable_only_group(&mut self, group: FeatureGroup) {
        self.enable_all(false);
        self.enable_group(group);
    }

    #[inline]
    pub fn is_enabled(&self, code: FeatureCode) -> bool {
        let (word, bit) = Self::slot(code);
        self.bits[word] & bit != 0
    }

    pub fn any_enabled(&self, codes: &[FeatureCode]) -> bool {
        codes.iter().any(|&c| self.is_enabled(c))
    }

    pub fn num_enabled(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Enabled codes in column order.
    pub fn enabled_codes(&self) -> impl Iterator<Item = FeatureCode> + '_ {
        FeatureCode::iter().filter(|&c| self.is_enabled(c))
    }

    /// Output columns the enabled codes fill.
    pub fn num_columns(&self) -> usize {
        self.enabled_codes().map(FeatureCode::width).sum()
    }

    /// Header names of the enabled columns, in order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.enabled_codes().flat_map(FeatureCode::column_names).collect()
    }

    /// `(name, code)` pairs of enabled features in column order.
    pub fn enabled_features(&self) -> Vec<(&'static str, FeatureCode)> {
        self.enabled_codes().map(|c| (c.name(), c)).collect()
    }

    pub fn find_by_name(name: &str) -> Result<FeatureCode, GateError> {
        let upper = name.trim().to_ascii_uppercase();
        upper
            .parse::<FeatureCode>()
            .map_err(|_| GateError::UnknownFeature(name.to_string()))
    }

    /// Help table: every feature name in column order, then group tokens.
    pub fn feature_names() -> Vec<&'static str> {
        FeatureCode::iter()
            .map(FeatureCode::name)
            .chain(FeatureGroup::iter().map(FeatureGroup::token))
            .collect()
    }

    #[inline]
    fn slot(code: FeatureCode) -> (usize, u64) {
        let i = code.index();
        (i / 64, 1u64 << (i % 64))
    }
}
