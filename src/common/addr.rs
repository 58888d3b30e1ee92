//! Byte address and cache-block number types.
//!
//! This module defines strong types for the two units of address arithmetic the
//! prefetchers work in. It provides the following:
//! 1. **Type Safety:** Distinguishes byte addresses from block numbers at compile time.
//! 2. **Block Arithmetic:** Signed block offsets for direction-aware stream tracking.
//! 3. **Region Alignment:** Power-of-two alignment used by the training tables.

/// Log2 of the cache block size in bytes (64-byte blocks).
///
/// Block numbers are byte addresses right-shifted by this amount.
pub const BLOCK_BITS: u32 = 6;

/// A byte address as seen by the host cache.
///
/// Addresses arrive from the host on every demand access and prefetches are
/// issued back as addresses. All internal pattern state works in block numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub u64);

/// A cache block number (byte address divided by the block size).
///
/// All training, stream, and pattern state is kept in block numbers so that
/// stride arithmetic is independent of the block size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockNumber(pub u64);

impl Address {
    /// Creates a new address from a raw 64-bit value.
    #[inline(always)]
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Returns the block number containing this address.
    #[inline(always)]
    pub fn block(&self) -> BlockNumber {
        BlockNumber(self.0 >> BLOCK_BITS)
    }
}

impl BlockNumber {
    /// Creates a new block number from a raw 64-bit value.
    #[inline(always)]
    pub fn new(block: u64) -> Self {
        Self(block)
    }

    /// Returns the raw 64-bit block number.
    #[inline(always)]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Returns the address of the first byte of this block.
    #[inline(always)]
    pub fn to_address(self) -> Address {
        Address(self.0 << BLOCK_BITS)
    }

    /// Aligns this block number down to a multiple of `blocks`.
    ///
    /// `blocks` must be a power of two. Used to compute the region base of a
    /// miss (`block & !(region_blocks - 1)`).
    #[inline(always)]
    pub fn align_down(self, blocks: u64) -> BlockNumber {
        BlockNumber(self.0 & !(blocks - 1))
    }

    /// Returns the signed block distance from `self` to `target`.
    ///
    /// Positive when `target` lies above `self`. This is the primitive all
    /// direction and stride inference is built on.
    #[inline(always)]
    pub fn offset_to(self, target: BlockNumber) -> i64 {
        target.0.wrapping_sub(self.0) as i64
    }

    /// Returns the block number `delta` blocks away in signed direction.
    #[inline(always)]
    pub fn offset_by(self, delta: i64) -> BlockNumber {
        BlockNumber(self.0.wrapping_add(delta as u64))
    }
}
