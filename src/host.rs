//! Host cache interface.
//!
//! The prefetchers never touch simulator state directly; everything they know
//! about the outside world arrives through this trait. It provides:
//! 1. **Geometry:** Set and way counts, read once at initialization.
//! 2. **Pressure Queries:** MSHR occupancy and DRAM bandwidth, both read-only.
//! 3. **Issue Path:** `prefetch_line`, the single side-effecting callback.

use crate::common::Address;

/// Callbacks the host cache exposes to a prefetcher.
///
/// Implemented by the simulator's cache model; tests substitute a recording
/// mock. All queries are cheap and may be called on every access.
pub trait CacheHost {
    /// Number of sets in the host cache. Must be a power of two.
    fn num_sets(&self) -> usize;

    /// Associativity of the host cache.
    fn num_ways(&self) -> usize;

    /// Current MSHR occupancy as a fraction in `[0.0, 1.0]`.
    fn mshr_occupancy_ratio(&self) -> f64;

    /// Current DRAM bandwidth consumption on a 0..=16 scale.
    fn dram_bandwidth(&self) -> u32;

    /// Enqueues a prefetch for the block containing `addr`.
    ///
    /// `fill_this_level` requests the line be installed at this cache level
    /// rather than a lower one. `metadata` travels with the request through
    /// the fill pipeline and comes back on `cache_fill`.
    ///
    /// Returns `false` if the prefetch queue is full and the request was
    /// dropped.
    fn prefetch_line(&mut self, addr: Address, fill_this_level: bool, metadata: u32) -> bool;
}
