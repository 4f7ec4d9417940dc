use crate::*;

/// Outcome of comparing a frame against the previous tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Changes {
    /// Per node of the previous tree: changed leaves, plus split nodes all
    /// four of whose children are dirty.
    pub dirty: Vec<bool>,
    /// Leaves re-checked against the new frame.
    pub checked: usize,
    /// Leaves found changed.
    pub changed: usize,
}

impl Changes {
    pub fn is_clean(&self) -> bool {
        self.changed == 0
    }
}

/// Re-checks the previous tree's leaves against a new frame.
#[derive(Copy, Clone, Debug)]
pub struct Differ<'a> {
    params: &'a Params,
    sampler: &'a dyn Sampler,
}

impl<'a> Differ<'a> {
    pub fn new(params: &'a Params, sampler: &'a dyn Sampler) -> Self {
        Self { params, sampler }
    }

    /// `prev` must tile `curr`.
    pub fn diff(&self, prev: &QuadTree, curr: &PixelBuffer, frame: u64) -> Changes {
        let leaves: Vec<NodeId> = prev.leaves().collect();
        let mut dirty = vec![false; prev.len()];
        let mut checked = 0;
        let mut changed = 0;

        for idx in self.order(prev, &leaves, frame) {
            let id = match leaves.get(idx) {
                Some(&id) => id,
                None => continue,
            };

            let node = prev.node(id);
            let now = RegionStats::compute(curr, node.rect);

            checked += 1;

            if self.is_changed(&node.stats, &now) {
                dirty[id] = true;
                changed += 1;
            }
        }

        // Children are stored after their parent
        for id in (0..prev.len()).rev() {
            if let Some(children) = prev.node(id).children() {
                dirty[id] = children.iter().all(|&child| dirty[child]);
            }
        }

        Changes {
            dirty,
            checked,
            changed,
        }
    }

    pub fn is_changed(&self, before: &RegionStats, after: &RegionStats) -> bool {
        before.color_delta(after) > self.params.change_threshold
            || before.variance_delta(after) > self.params.change_threshold
    }

    fn order(&self, prev: &QuadTree, leaves: &[NodeId], frame: u64) -> Vec<usize> {
        match self.params.sample_budget {
            Some(budget) if budget < leaves.len() => {
                let priors: Vec<f64> = leaves
                    .iter()
                    .map(|&id| prev.node(id).stats.variance)
                    .collect();

                let mut order = self.sampler.rank(&priors, frame);
                order.truncate(budget);
                order
            }

            _ => (0..leaves.len()).collect(),
        }
    }
}
