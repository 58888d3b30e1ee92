//! Shared test infrastructure for the prefetcher suite.

pub mod mocks;

use prefetch_core::common::{AccessType, Address, BlockNumber};
use prefetch_core::prefetch::PrefetchModule;

use self::mocks::host::RecordingHost;

/// Initializes test logging once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Byte address of the first byte of `block`.
pub fn block_addr(block: u64) -> Address {
    BlockNumber::new(block).to_address()
}

/// Drives one demand miss at `block` through a prefetcher.
pub fn miss_block<P: PrefetchModule>(pf: &mut P, host: &mut RecordingHost, block: u64) -> u32 {
    pf.cache_operate(
        host,
        block_addr(block),
        Address::new(0),
        false,
        false,
        AccessType::Load,
        0,
    )
}

/// Drives one demand hit at `block` through a prefetcher.
pub fn hit_block<P: PrefetchModule>(
    pf: &mut P,
    host: &mut RecordingHost,
    block: u64,
    useful_prefetch: bool,
) -> u32 {
    pf.cache_operate(
        host,
        block_addr(block),
        Address::new(0),
        true,
        useful_prefetch,
        AccessType::Load,
        0,
    )
}
