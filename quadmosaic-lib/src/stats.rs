use crate::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub frames: usize,
    pub blocks: usize,
    pub max_blocks: usize,
    /// Leaves whose color was computed from the frame they were emitted for.
    pub recomputed: usize,
    /// Leaves copied unchanged from the previous frame.
    pub reused: usize,
    /// Leaves re-checked by the differ.
    pub checked: usize,
    pub refreshes: BTreeMap<RefreshKind, usize>,
}

impl Stats {
    pub(crate) fn record(&mut self, kind: RefreshKind, checked: usize, cache: &Cache) {
        let blocks = cache.blocks().len();

        let recomputed = match kind {
            RefreshKind::Repeat => 0,
            _ => cache.tree().fresh_leaves(),
        };

        self.frames += 1;
        self.blocks += blocks;
        self.max_blocks = self.max_blocks.max(blocks);
        self.recomputed += recomputed;
        self.reused += blocks - recomputed;
        self.checked += checked;
        *self.refreshes.entry(kind).or_default() += 1;
    }

    pub fn mean_blocks(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.blocks as f64 / self.frames as f64
        }
    }
}
