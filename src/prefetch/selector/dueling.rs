//! Set-dueling categorisation.
//!
//! Cache sets are partitioned into a small sampler population, one dedicated
//! population per candidate prefetcher, and the policy-controlled majority.
//! The partition is a pure function of the set index, so no per-set storage
//! is needed to classify a set.

/// Role a cache set plays in the dueling scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetCategory {
    /// Sampler set: the transformer prefetcher runs here and counters are
    /// attributed through metadata tags.
    Sampler,
    /// Only the transformer prefetcher operates here.
    TransformerDedicated,
    /// Only the secondary prefetcher operates here.
    PythiaDedicated,
    /// Follows the sign of the global policy counter.
    PolicyControlled,
}

/// Set-index partitioning for a given cache geometry.
#[derive(Clone, Copy, Debug)]
pub struct SetDueling {
    num_sets: usize,
    rate: usize,
}

impl SetDueling {
    /// Creates the partition for a cache with `num_sets` sets (power of two).
    pub fn new(num_sets: usize) -> Self {
        Self {
            num_sets,
            rate: Self::sample_rate(num_sets),
        }
    }

    /// Sets sampled per dueling population for a given cache size.
    pub fn sample_rate(num_sets: usize) -> usize {
        match num_sets {
            1024.. => 32,
            256..=1023 => 16,
            64..=255 => 8,
            8..=63 => 4,
            _ => 32,
        }
    }

    /// Number of sets in the cache.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Sampling rate in use.
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Number of sampler sets (one per sampling stride).
    pub fn num_sampler_sets(&self) -> usize {
        self.num_sets / self.rate
    }

    /// Category of a set index.
    ///
    /// Folds the low and next-low index bits together so each category is
    /// spread evenly across the cache rather than clustered.
    pub fn category(&self, set: usize) -> SetCategory {
        let r = self.rate;
        let m = r - 1;
        let s = r.trailing_zeros();
        match (r + (set & m) - ((set >> s) & m)) & m {
            0 => SetCategory::Sampler,
            1 => SetCategory::TransformerDedicated,
            2 => SetCategory::PythiaDedicated,
            _ => SetCategory::PolicyControlled,
        }
    }

    /// Index of a sampler set's counter slot.
    pub fn sampler_index(&self, set: usize) -> usize {
        set / self.rate
    }
}
