//! Common types shared by the prefetcher implementations.

/// Byte address and cache-block number types.
pub mod addr;

pub use self::addr::{Address, BlockNumber, BLOCK_BITS};

/// Kind of cache access presented to a prefetcher.
///
/// Mirrors the access classification of the host cache pipeline. The stream
/// prefetchers are address-behavior-driven and treat all demand kinds alike,
/// but the kind is part of the hook contract and is forwarded unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Demand load.
    Load,
    /// Read-for-ownership (store miss).
    Rfo,
    /// Prefetch issued by a lower level.
    Prefetch,
    /// Writeback from an upper level.
    Write,
    /// Page-table walk access.
    Translation,
}
