//! Routing and Forwarding Tests.
//!
//! Verifies per-category routing, source tagging on the return path, fill
//! and cycle forwarding to both underlying prefetchers, and re-initialization.

use super::{first_set_of, make_selector};
use crate::common::block_addr;
use prefetch_core::common::{AccessType, Address};
use prefetch_core::config::SelectorConfig;
use prefetch_core::prefetch::selector::dueling::SetCategory;
use prefetch_core::prefetch::selector::metadata::{is_pythia, is_transformer};
use prefetch_core::prefetch::{BandwidthSelector, PrefetchModule};

use crate::common::mocks::host::RecordingHost;
use crate::common::mocks::secondary::ScriptedPrefetcher;

/// Sampler and transformer-dedicated sets run the transformer and tag its
/// metadata.
#[test]
fn transformer_sets_tag_bit_30() {
    let (mut sel, mut host, log) = make_selector(5000, 2048);

    for category in [SetCategory::Sampler, SetCategory::TransformerDedicated] {
        let set = first_set_of(2048, category);
        let out = sel.cache_operate(
            &mut host,
            block_addr(set as u64),
            Address::new(0),
            false,
            false,
            AccessType::Load,
            0x0123,
        );
        assert!(is_transformer(out));
        assert_eq!(out & 0x3FFF_FFFF, 0x0123);
    }
    assert_eq!(log.borrow().operates.len(), 0);
    assert_eq!(sel.stats.transformer_selected, 2);
}

/// Secondary-dedicated sets consult the secondary and tag bit 31, keeping
/// only the low thirty bits of whatever it returns.
#[test]
fn pythia_sets_tag_bit_31() {
    let secondary = ScriptedPrefetcher::with_metadata(0xF234_5678);
    let log = secondary.log();
    let mut sel = BandwidthSelector::new(SelectorConfig::default(), Box::new(secondary));
    let mut host = RecordingHost::new(2048);
    sel.initialize(&host);

    let p_set = first_set_of(2048, SetCategory::PythiaDedicated);
    let out = sel.cache_operate(
        &mut host,
        block_addr(p_set as u64),
        Address::new(0),
        false,
        false,
        AccessType::Load,
        0x0042,
    );

    assert_eq!(log.borrow().operates.len(), 1);
    assert_eq!(log.borrow().operates[0].1, 0x0042, "metadata_in forwarded");
    // The secondary's stray high bits are overwritten by the tag.
    assert_eq!(out, 0xB234_5678);
    assert!(is_pythia(out));
    assert!(!is_transformer(out));
    assert_eq!(sel.stats.pythia_selected, 1);
}

/// With a non-negative policy, policy-controlled sets default to the
/// transformer.
#[test]
fn policy_controlled_defaults_to_transformer() {
    let (mut sel, mut host, log) = make_selector(5000, 2048);
    let pc_set = first_set_of(2048, SetCategory::PolicyControlled);

    assert_eq!(sel.policy_selector(), 0);
    let out = sel.cache_operate(
        &mut host,
        block_addr(pc_set as u64),
        Address::new(0),
        false,
        false,
        AccessType::Load,
        0,
    );
    assert!(is_transformer(out));
    assert_eq!(log.borrow().operates.len(), 0);
}

/// Fills are forwarded to both prefetchers and metadata is returned
/// unchanged.
#[test]
fn fills_forward_to_both() {
    let (mut sel, mut host, log) = make_selector(5000, 2048);

    let out = sel.cache_fill(&mut host, block_addr(7), 7, 3, true, Address::new(0), 0xDEAD);
    assert_eq!(out, 0xDEAD);
    assert_eq!(log.borrow().fills, 1);

    // Demand fills forward too.
    sel.cache_fill(&mut host, block_addr(9), 9, 0, false, Address::new(0), 0);
    assert_eq!(log.borrow().fills, 2);
}

/// Cycles are forwarded to both prefetchers.
#[test]
fn cycles_forward_to_both() {
    let (mut sel, mut host, log) = make_selector(5000, 2048);
    for _ in 0..7 {
        sel.cycle_operate(&mut host);
    }
    assert_eq!(log.borrow().cycles, 7);
}

/// The transformer prefetches through the selector on sets it serves.
#[test]
fn transformer_prefetches_through_selector() {
    let (mut sel, mut host, _log) = make_selector(5000, 2048);

    // Blocks 101..103 map to policy-controlled sets under this geometry,
    // all transformer-served while the policy is neutral.
    for block in [101u64, 102, 103] {
        sel.cache_operate(
            &mut host,
            block_addr(block),
            Address::new(0),
            false,
            false,
            AccessType::Load,
            0,
        );
    }
    assert!(host.issued_blocks().contains(&104));
}

/// Re-initialization resets the policy and reaches both prefetchers.
#[test]
fn reinitialize_resets_state() {
    let (mut sel, mut host, log) = make_selector(1, 2048);
    let t_set = first_set_of(2048, SetCategory::TransformerDedicated);
    let p_set = first_set_of(2048, SetCategory::PythiaDedicated);

    for _ in 0..200 {
        sel.cache_fill(&mut host, block_addr(t_set as u64), t_set, 0, true, Address::new(0), 0);
        sel.cache_fill(&mut host, block_addr(p_set as u64), p_set, 0, true, Address::new(0), 0);
    }
    for _ in 0..5 {
        sel.cache_operate(
            &mut host,
            block_addr(t_set as u64),
            Address::new(0),
            true,
            true,
            AccessType::Load,
            0,
        );
        sel.cycle_operate(&mut host);
    }
    assert_ne!(sel.policy_selector(), 0);

    sel.initialize(&host);
    assert_eq!(sel.policy_selector(), 0);
    assert_eq!(sel.stats.transformer_wins, 0);
    assert_eq!(log.borrow().initializations, 2);
    assert_eq!(sel.num_ways(), host.num_ways);
}
