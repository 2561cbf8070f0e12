//! Concurrent label -> accumulator map used during the streaming phase.
//!
//! Two lock levels: each shard's `RwLock` guards the map structure (read for
//! updates of known labels, write for insertion) and every entry has its own
//! `Mutex` serializing updates of that label.

#[cfg(test)]
mod tests;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use crate::accumulator::RoiAccumulator;
use crate::types::{Label, PixIntens, BACKGROUND};

type Shard = RwLock<HashMap<Label, Mutex<RoiAccumulator>>>;

pub struct RoiRegistry {
    shards: Box<[Shard]>,
    shard_mask: usize,
    // Labels in discovery order; always the same set as the shards' keys.
    order: Mutex<Vec<Label>>,
}

impl Default for RoiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoiRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoiRegistry")
            .field("shards", &self.shards.len())
            .field("rois", &self.len())
            .finish()
    }
}

impl RoiRegistry {
    /// Shard count scales with the rayon pool.
    pub fn new() -> Self {
        Self::with_shards(rayon::current_num_threads() * 4)
    }

    /// `shards` is rounded up to a power of two.
    pub fn with_shards(shards: usize) -> Self {
        let count = shards.max(1).next_power_of_two();
        Self {
            shards: (0..count).map(|_| RwLock::new(HashMap::new())).collect(),
            shard_mask: count - 1,
            order: Mutex::new(Vec::new()),
        }
    }

    /// Records one observation. Background pixels are ignored and return `false`.
    pub fn observe(&self, x: u32, y: u32, label: Label, intensity: PixIntens) -> bool {
        if label == BACKGROUND {
            return false;
        }
        let shard = &self.shards[self.shard_index(label)];

        {
            let map = shard.read();
            if let Some(entry) = map.get(&label) {
                entry.lock().update(x, y, intensity);
                return true;
            }
        }

        let mut map = shard.write();
        // Another thread may have inserted between the two locks.
        if let Some(entry) = map.get_mut(&label) {
            entry.get_mut().update(x, y, intensity);
        } else {
            map.insert(
                label,
                Mutex::new(RoiAccumulator::initialize(label, x, y, intensity)),
            );
            self.order.lock().push(label);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, label: Label) -> bool {
        self.shards[self.shard_index(label)].read().contains_key(&label)
    }

    /// Labels in the order they were first observed.
    pub fn labels(&self) -> Vec<Label> {
        self.order.lock().clone()
    }

    /// Copy of one record, mostly for inspection.
    pub fn snapshot(&self, label: Label) -> Option<RoiAccumulator> {
        let map = self.shards[self.shard_index(label)].read();
        map.get(&label).map(|entry| entry.lock().clone())
    }

    /// Ends the streaming phase and hands out the records in discovery order.
    pub fn into_rois(self) -> Vec<RoiAccumulator> {
        let order = self.order.into_inner();
        let mut merged: HashMap<Label, RoiAccumulator> = HashMap::with_capacity(order.len());
        for shard in self.shards.into_vec() {
            merged.extend(
                shard
                    .into_inner()
                    .into_iter()
                    .map(|(label, entry)| (label, entry.into_inner())),
            );
        }
        order
            .into_iter()
            .filter_map(|label| merged.remove(&label))
            .collect()
    }

    #[inline]
    fn shard_index(&self, label: Label) -> usize {
        // Fibonacci hashing spreads consecutive labels across shards.
        ((label as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 32) as usize & self.shard_mask
    }
}
