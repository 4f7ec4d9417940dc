use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::fmt;

/// Decides which leaves get re-checked first when a frame only has budget
/// for some of them.
///
/// `priors` holds each leaf's variance from the frame its block was taken
/// from; the result is a permutation of `0..priors.len()`, most likely to
/// have changed first. `frame` counts frames within the session.
pub trait Sampler: fmt::Debug + Send + Sync {
    fn rank(&self, priors: &[f64], frame: u64) -> Vec<usize>;
}

/// Leaf order, top-left to bottom-right.
#[derive(Copy, Clone, Debug, Default)]
pub struct Exhaustive;

impl Sampler for Exhaustive {
    fn rank(&self, priors: &[f64], _: u64) -> Vec<usize> {
        (0..priors.len()).collect()
    }
}

/// Busiest leaves first; ties keep leaf order.
#[derive(Copy, Clone, Debug, Default)]
pub struct Busiest;

impl Sampler for Busiest {
    fn rank(&self, priors: &[f64], _: u64) -> Vec<usize> {
        let mut idxs: Vec<_> = (0..priors.len()).collect();
        idxs.sort_by(|&a, &b| priors[b].total_cmp(&priors[a]));
        idxs
    }
}

/// Random order weighted by variance, so quiet leaves still get their
/// turn. Seeded per frame; the same session replays the same order.
#[derive(Copy, Clone, Debug)]
pub struct Weighted {
    seed: u64,
    floor: f64,
}

impl Weighted {
    pub fn new(seed: u64) -> Self {
        Self { seed, floor: 1.0 }
    }

    /// Weight given to a leaf on top of its variance; larger values flatten
    /// the distribution towards uniform.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor.max(f64::MIN_POSITIVE);
        self
    }
}

impl Sampler for Weighted {
    fn rank(&self, priors: &[f64], frame: u64) -> Vec<usize> {
        let mut rng = Pcg32::seed_from_u64(self.seed ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15));

        // Sampling without replacement: sort by u^(1/w), compared in log space
        let mut keys: Vec<(f64, usize)> = priors
            .iter()
            .enumerate()
            .map(|(idx, &variance)| {
                let weight = variance.max(0.0) + self.floor;
                let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);

                (u.ln() / weight, idx)
            })
            .collect();

        keys.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        keys.into_iter().map(|(_, idx)| idx).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(mut idxs: Vec<usize>, len: usize) -> bool {
        idxs.sort_unstable();
        idxs == (0..len).collect::<Vec<_>>()
    }

    #[test]
    fn exhaustive_keeps_leaf_order() {
        assert_eq!(Exhaustive.rank(&[3.0, 1.0, 2.0], 0), vec![0, 1, 2]);
    }

    #[test]
    fn busiest_sorts_by_variance() {
        assert_eq!(Busiest.rank(&[3.0, 9.0, 3.0, 0.0], 0), vec![1, 0, 2, 3]);
    }

    #[test]
    fn weighted_is_seeded_permutation() {
        let priors: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let sampler = Weighted::new(7);

        let a = sampler.rank(&priors, 3);
        let b = sampler.rank(&priors, 3);

        assert_eq!(a, b);
        assert!(is_permutation(a, priors.len()));
    }

    #[test]
    fn weighted_prefers_busy_leaves() {
        let mut priors = vec![0.0; 100];
        priors[42] = 10_000.0;

        let sampler = Weighted::new(1);
        let firsts = (0..50).filter(|&frame| sampler.rank(&priors, frame)[0] == 42).count();

        assert!(firsts > 40, "busy leaf ranked first {} times", firsts);
    }

    #[test]
    fn large_floor_flattens_ranking() {
        let priors = [10_000.0, 0.0];
        let busy_first = |sampler: Weighted| {
            (0..200)
                .filter(|&frame| sampler.rank(&priors, frame)[0] == 0)
                .count()
        };

        assert!(busy_first(Weighted::new(3)) > 190);

        let flat = busy_first(Weighted::new(3).with_floor(1e9));
        assert!((60..140).contains(&flat), "busy leaf ranked first {} times", flat);
    }
}
