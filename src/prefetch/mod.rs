//! Prefetcher implementations.
//!
//! This module contains the hook interface every prefetcher implements and the
//! two prefetchers this crate provides: the transformer-aware stream
//! prefetcher and the bandwidth-aware selector that multiplexes it against an
//! externally supplied secondary prefetcher.

/// Bandwidth-aware set-dueling selector.
pub mod selector;

/// Transformer-aware stream prefetcher.
pub mod transformer;

pub use self::selector::BandwidthSelector;
pub use self::transformer::TransformerStreamPrefetcher;

use crate::common::{AccessType, Address};
use crate::host::CacheHost;

/// Hook interface between the host cache and a prefetcher.
///
/// The host drives one instance per prefetch slot through these four hooks.
/// All hooks return synchronously and only `cache_operate` and
/// `cycle_operate` may issue prefetches. The 32-bit metadata word flows
/// through the cache pipeline untouched by the host; prefetchers may use it
/// to tag requests and recognize them again on fill and on useful hits.
pub trait PrefetchModule {
    /// Resets all internal tables and captures the host geometry.
    ///
    /// Called once before any other hook.
    fn initialize(&mut self, host: &dyn CacheHost);

    /// Observes a demand access (or a prefetch arriving from above).
    ///
    /// `cache_hit` tells whether the access hit this level;
    /// `useful_prefetch` marks a hit on a line that was brought in by a
    /// prefetch. Returns the metadata word to attach to the access.
    #[allow(clippy::too_many_arguments)]
    fn cache_operate(
        &mut self,
        host: &mut dyn CacheHost,
        addr: Address,
        ip: Address,
        cache_hit: bool,
        useful_prefetch: bool,
        access: AccessType,
        metadata_in: u32,
    ) -> u32;

    /// Observes a line filling into this level.
    ///
    /// `is_prefetch` marks fills caused by a prefetch; `metadata_in` is the
    /// word the prefetch was issued with. Returns the metadata word to store
    /// with the line.
    #[allow(clippy::too_many_arguments)]
    fn cache_fill(
        &mut self,
        host: &mut dyn CacheHost,
        addr: Address,
        set: usize,
        way: usize,
        is_prefetch: bool,
        evicted_addr: Address,
        metadata_in: u32,
    ) -> u32;

    /// Advances background work by one host cycle.
    fn cycle_operate(&mut self, host: &mut dyn CacheHost);

    /// Emits the end-of-simulation statistics report.
    fn final_stats(&self);
}
