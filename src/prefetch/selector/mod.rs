//! Bandwidth-aware dynamic prefetcher selector.
//!
//! Multiplexes the transformer stream prefetcher against an externally
//! supplied secondary prefetcher across cache sets:
//! 1. **Set Dueling:** Dedicated set populations measure each candidate in
//!    isolation; the policy-controlled majority follows a saturating counter.
//! 2. **Source Tagging:** Every request's metadata carries its source, so
//!    useful hits and fills are attributed without host changes.
//! 3. **Global Throttle:** Prefetching stops entirely while DRAM bandwidth is
//!    saturated and measured accuracy does not justify the traffic.

/// Set-dueling categorisation.
pub mod dueling;
/// Metadata source tags.
pub mod metadata;

use self::dueling::{SetCategory, SetDueling};
use self::metadata::{is_pythia, is_transformer, tag_pythia, tag_transformer};
use crate::common::{AccessType, Address, BLOCK_BITS};
use crate::config::SelectorConfig;
use crate::host::CacheHost;
use crate::prefetch::transformer::TransformerStreamPrefetcher;
use crate::prefetch::PrefetchModule;
use crate::stats::SelectorStats;

/// Saturation bounds of the policy counter.
const POLICY_MAX: i32 = 1024;
const POLICY_MIN: i32 = -1024;

/// Minimum issued prefetches per source before a policy decision is made.
const POLICY_MIN_ISSUED: u64 = 100;

/// Score ratio one source must exceed before the policy moves (hysteresis).
const SCORE_HYSTERESIS: f64 = 1.05;

/// Full-scale value of the host DRAM bandwidth query.
const DRAM_BW_SCALE: f64 = 16.0;

/// Useful/issued counters for both sources.
#[derive(Clone, Copy, Debug, Default)]
struct SourceCounters {
    transformer_useful: u64,
    transformer_issued: u64,
    pythia_useful: u64,
    pythia_issued: u64,
}

/// Bandwidth-aware set-dueling selector.
///
/// Owns both underlying prefetchers and never exposes them; the only
/// externally visible attribution is the metadata tag.
pub struct BandwidthSelector {
    config: SelectorConfig,

    transformer: TransformerStreamPrefetcher,
    secondary: Box<dyn PrefetchModule>,

    dueling: SetDueling,
    num_ways: usize,

    samplers: Vec<SourceCounters>,
    dedicated: SourceCounters,

    policy_selector: i32,
    cycle_count: u64,

    /// Event counters, reported by `final_stats`.
    pub stats: SelectorStats,
}

impl BandwidthSelector {
    /// Creates a selector wrapping the given secondary prefetcher.
    ///
    /// The transformer prefetcher is constructed internally. Geometry is
    /// captured at `initialize`; until then the selector assumes a one-set
    /// cache.
    pub fn new(config: SelectorConfig, secondary: Box<dyn PrefetchModule>) -> Self {
        Self {
            config,
            transformer: TransformerStreamPrefetcher::new(),
            secondary,
            dueling: SetDueling::new(1),
            num_ways: 0,
            samplers: Vec::new(),
            dedicated: SourceCounters::default(),
            policy_selector: 0,
            cycle_count: 0,
            stats: SelectorStats::default(),
        }
    }

    /// Current value of the saturating policy counter.
    pub fn policy_selector(&self) -> i32 {
        self.policy_selector
    }

    /// Associativity captured from the host at initialization.
    pub fn num_ways(&self) -> usize {
        self.num_ways
    }

    /// Whether a given set is currently served by the transformer prefetcher.
    pub fn serves_with_transformer(&self, set: usize) -> bool {
        match self.dueling.category(set) {
            SetCategory::Sampler | SetCategory::TransformerDedicated => true,
            SetCategory::PythiaDedicated => false,
            SetCategory::PolicyControlled => self.policy_selector >= 0,
        }
    }

    fn set_of(&self, addr: Address) -> usize {
        (addr.val() >> BLOCK_BITS) as usize & (self.dueling.num_sets() - 1)
    }

    /// Combined prefetch accuracy across both sources, samplers plus
    /// dedicated sets. Reads 1.0 before any prefetch has been issued.
    ///
    /// The throttle deliberately uses the combined number: the question it
    /// answers is whether prefetch traffic as a whole is paying for the
    /// bandwidth it consumes, not which source is better.
    fn prefetch_accuracy(&self) -> f64 {
        let mut useful = self.dedicated.transformer_useful + self.dedicated.pythia_useful;
        let mut issued = self.dedicated.transformer_issued + self.dedicated.pythia_issued;
        for s in &self.samplers {
            useful += s.transformer_useful + s.pythia_useful;
            issued += s.transformer_issued + s.pythia_issued;
        }
        if issued == 0 {
            return 1.0;
        }
        useful as f64 / issued as f64
    }

    fn should_allow_prefetch(&mut self, host: &dyn CacheHost) -> bool {
        let bw_util = host.dram_bandwidth() as f64 / DRAM_BW_SCALE;
        let accuracy = self.prefetch_accuracy();

        let bw_ok = bw_util < self.config.bw_util_threshold;
        let accuracy_ok = accuracy > bw_util || accuracy > self.config.min_accuracy_threshold;

        if !bw_ok {
            self.stats.high_bw_events += 1;
        }
        if !accuracy_ok {
            self.stats.low_accuracy_events += 1;
        }

        let allow = bw_ok && accuracy_ok;
        if allow {
            self.stats.prefetch_allowed += 1;
        } else {
            self.stats.prefetch_throttled += 1;
        }
        allow
    }

    fn credit_useful(&mut self, set: usize, metadata: u32) {
        match self.dueling.category(set) {
            SetCategory::Sampler => {
                let idx = self.dueling.sampler_index(set);
                if let Some(counters) = self.samplers.get_mut(idx) {
                    if is_transformer(metadata) {
                        counters.transformer_useful += 1;
                    } else if is_pythia(metadata) {
                        counters.pythia_useful += 1;
                    }
                }
            }
            SetCategory::TransformerDedicated => self.dedicated.transformer_useful += 1,
            SetCategory::PythiaDedicated => self.dedicated.pythia_useful += 1,
            SetCategory::PolicyControlled => {
                if self.policy_selector >= 0 {
                    self.dedicated.transformer_useful += 1;
                } else {
                    self.dedicated.pythia_useful += 1;
                }
            }
        }
    }

    fn credit_issued(&mut self, set: usize, metadata: u32) {
        match self.dueling.category(set) {
            SetCategory::Sampler => {
                let idx = self.dueling.sampler_index(set);
                if let Some(counters) = self.samplers.get_mut(idx) {
                    if is_transformer(metadata) {
                        counters.transformer_issued += 1;
                    } else if is_pythia(metadata) {
                        counters.pythia_issued += 1;
                    }
                }
            }
            SetCategory::TransformerDedicated => self.dedicated.transformer_issued += 1,
            SetCategory::PythiaDedicated => self.dedicated.pythia_issued += 1,
            SetCategory::PolicyControlled => {
                if self.policy_selector >= 0 {
                    self.dedicated.transformer_issued += 1;
                } else {
                    self.dedicated.pythia_issued += 1;
                }
            }
        }
    }

    fn aggregate_counters(&self) -> SourceCounters {
        let mut total = self.dedicated;
        for s in &self.samplers {
            total.transformer_useful += s.transformer_useful;
            total.transformer_issued += s.transformer_issued;
            total.pythia_useful += s.pythia_useful;
            total.pythia_issued += s.pythia_issued;
        }
        total
    }

    /// Accuracy weighted by log coverage; rewards sources that are both
    /// precise and productive.
    fn score(useful: u64, issued: u64) -> f64 {
        if issued == 0 {
            return 0.0;
        }
        (useful as f64 / issued as f64) * (1.0 + (1.0 + useful as f64).ln())
    }

    fn update_policy_selector(&mut self) {
        let total = self.aggregate_counters();
        if total.transformer_issued < POLICY_MIN_ISSUED || total.pythia_issued < POLICY_MIN_ISSUED
        {
            return;
        }

        let transformer_score = Self::score(total.transformer_useful, total.transformer_issued);
        let pythia_score = Self::score(total.pythia_useful, total.pythia_issued);

        if transformer_score > pythia_score * SCORE_HYSTERESIS {
            self.policy_selector = (self.policy_selector + 1).min(POLICY_MAX);
            self.stats.transformer_wins += 1;
        } else if pythia_score > transformer_score * SCORE_HYSTERESIS {
            self.policy_selector = (self.policy_selector - 1).max(POLICY_MIN);
            self.stats.pythia_wins += 1;
        }
    }
}

impl PrefetchModule for BandwidthSelector {
    fn initialize(&mut self, host: &dyn CacheHost) {
        let num_sets = host.num_sets();
        assert!(
            num_sets.is_power_of_two(),
            "selector requires a power-of-two set count, got {num_sets}"
        );

        self.dueling = SetDueling::new(num_sets);
        self.num_ways = host.num_ways();
        self.samplers = vec![SourceCounters::default(); self.dueling.num_sampler_sets()];
        self.dedicated = SourceCounters::default();
        self.policy_selector = 0;
        self.cycle_count = 0;
        self.stats = SelectorStats::default();

        self.transformer.initialize(host);
        self.secondary.initialize(host);
    }

    fn cache_operate(
        &mut self,
        host: &mut dyn CacheHost,
        addr: Address,
        ip: Address,
        cache_hit: bool,
        useful_prefetch: bool,
        access: AccessType,
        metadata_in: u32,
    ) -> u32 {
        let set = self.set_of(addr);

        if useful_prefetch && cache_hit {
            self.credit_useful(set, metadata_in);
        }

        if !self.should_allow_prefetch(host) {
            return metadata_in;
        }

        if self.serves_with_transformer(set) {
            self.stats.transformer_selected += 1;
            let metadata = self.transformer.cache_operate(
                host,
                addr,
                ip,
                cache_hit,
                useful_prefetch,
                access,
                metadata_in,
            );
            tag_transformer(metadata)
        } else {
            self.stats.pythia_selected += 1;
            let metadata = self.secondary.cache_operate(
                host,
                addr,
                ip,
                cache_hit,
                useful_prefetch,
                access,
                metadata_in,
            );
            tag_pythia(metadata)
        }
    }

    fn cache_fill(
        &mut self,
        host: &mut dyn CacheHost,
        addr: Address,
        set: usize,
        way: usize,
        is_prefetch: bool,
        evicted_addr: Address,
        metadata_in: u32,
    ) -> u32 {
        if is_prefetch {
            self.credit_issued(set, metadata_in);
        }

        // Both prefetchers see every fill so neither loses internal state.
        self.transformer
            .cache_fill(host, addr, set, way, is_prefetch, evicted_addr, metadata_in);
        self.secondary
            .cache_fill(host, addr, set, way, is_prefetch, evicted_addr, metadata_in);

        metadata_in
    }

    fn cycle_operate(&mut self, host: &mut dyn CacheHost) {
        self.cycle_count += 1;
        if self.config.policy_update_interval > 0
            && self.cycle_count % self.config.policy_update_interval == 0
        {
            self.update_policy_selector();
        }

        self.transformer.cycle_operate(host);
        self.secondary.cycle_operate(host);
    }

    fn final_stats(&self) {
        let total = self.aggregate_counters();
        self.stats.print(
            self.policy_selector,
            total.transformer_useful,
            total.transformer_issued,
            total.pythia_useful,
            total.pythia_issued,
        );

        self.transformer.final_stats();
        self.secondary.final_stats();
    }
}
