use crate::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    pub(crate) variance_threshold: f64,
    pub(crate) min_leaf_size: u32,
    pub(crate) max_depth: u32,
    pub(crate) change_threshold: f64,
    pub(crate) sample_budget: Option<usize>,
    pub(crate) seed: u64,
}

impl Params {
    pub fn new(
        variance_threshold: f64,
        min_leaf_size: u32,
        max_depth: u32,
        change_threshold: f64,
    ) -> Result<Self> {
        ensure!(
            variance_threshold.is_finite() && variance_threshold >= 0.0,
            "Variance threshold must be a non-negative number"
        );

        ensure!(
            change_threshold.is_finite() && change_threshold >= 0.0,
            "Change threshold must be a non-negative number"
        );

        ensure!(min_leaf_size >= 1, "Leaves must be at least one pixel wide");
        ensure!(max_depth <= 16, "Depth is capped at 16, got {}", max_depth);

        Ok(Self {
            variance_threshold,
            min_leaf_size,
            max_depth,
            change_threshold,
            sample_budget: None,
            seed: 0,
        })
    }

    /// Re-checks at most `budget` leaves per frame, in the order the
    /// session's sampler ranks them.
    pub fn with_sample_budget(mut self, budget: usize) -> Self {
        self.sample_budget = Some(budget);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn variance_threshold(&self) -> f64 {
        self.variance_threshold
    }

    pub fn min_leaf_size(&self) -> u32 {
        self.min_leaf_size
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn change_threshold(&self) -> f64 {
        self.change_threshold
    }

    pub fn sample_budget(&self) -> Option<usize> {
        self.sample_budget
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            variance_threshold: 20.0,
            min_leaf_size: 20,
            max_depth: 8,
            change_threshold: 10.0,
            sample_budget: None,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates() {
        assert!(Params::new(20.0, 20, 8, 10.0).is_ok());
        assert!(Params::new(-1.0, 20, 8, 10.0).is_err());
        assert!(Params::new(f64::NAN, 20, 8, 10.0).is_err());
        assert!(Params::new(20.0, 0, 8, 10.0).is_err());
        assert!(Params::new(20.0, 20, 17, 10.0).is_err());
        assert!(Params::new(20.0, 20, 8, f64::INFINITY).is_err());
    }

    #[test]
    fn defaults_match_new() {
        assert_eq!(Params::new(20.0, 20, 8, 10.0).unwrap(), Params::default());
    }
}
