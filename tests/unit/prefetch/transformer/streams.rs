//! Stream Entry and Classification Tests.
//!
//! Verifies the class table, per-class degrees, coverage and boundary
//! predicates, stability-gated lookahead, and eviction priorities.

use prefetch_core::common::BlockNumber;
use prefetch_core::prefetch::transformer::streams::{
    class_degree, classify, eviction_priority, safe_lookahead, StreamClass, StreamDirection,
    StreamEntry,
};

fn block(n: u64) -> BlockNumber {
    BlockNumber::new(n)
}

fn positive_stream(start: u64, current: u64, end: u64, stride: i64) -> StreamEntry {
    StreamEntry {
        valid: true,
        active: true,
        start_block: block(start),
        end_block: block(end),
        current_prefetch_block: block(current),
        direction: StreamDirection::Positive,
        stride,
        confidence: 1,
        ..StreamEntry::default()
    }
}

// ══════════════════════════════════════════════════════════
// 1. Classification table
// ══════════════════════════════════════════════════════════

/// Every row of the stride/length class table.
#[test]
fn classification_table() {
    // Small stride: dense once long enough, medium before.
    assert_eq!(classify(1, 8), StreamClass::Dense);
    assert_eq!(classify(2, 8), StreamClass::Dense);
    assert_eq!(classify(2, 7), StreamClass::Medium);
    assert_eq!(classify(1, 0), StreamClass::Medium);
    // Medium stride: medium once long enough, sparse before.
    assert_eq!(classify(3, 4), StreamClass::Medium);
    assert_eq!(classify(16, 4), StreamClass::Medium);
    assert_eq!(classify(16, 3), StreamClass::Sparse);
    // Large stride: always sparse.
    assert_eq!(classify(17, 100), StreamClass::Sparse);
}

/// Degrees per class.
#[test]
fn class_degrees() {
    assert_eq!(class_degree(StreamClass::Dense), 4);
    assert_eq!(class_degree(StreamClass::Medium), 2);
    assert_eq!(class_degree(StreamClass::Sparse), 1);
    assert_eq!(class_degree(StreamClass::Unknown), 2);
}

// ══════════════════════════════════════════════════════════
// 2. Coverage and boundaries
// ══════════════════════════════════════════════════════════

/// Coverage spans start to current prefetch block in the stream direction.
#[test]
fn coverage_positive() {
    let entry = positive_stream(100, 104, 164, 1);
    assert!(entry.covers(block(100)));
    assert!(entry.covers(block(104)));
    assert!(!entry.covers(block(99)));
    assert!(!entry.covers(block(105)));
}

/// Negative streams cover downward.
#[test]
fn coverage_negative() {
    let entry = StreamEntry {
        direction: StreamDirection::Negative,
        start_block: block(200),
        current_prefetch_block: block(196),
        end_block: block(136),
        valid: true,
        active: true,
        stride: 1,
        ..StreamEntry::default()
    };
    assert!(entry.covers(block(200)));
    assert!(entry.covers(block(196)));
    assert!(!entry.covers(block(201)));
    assert!(!entry.covers(block(195)));
}

/// The stride boundary is reached when one stride no longer fits.
#[test]
fn stride_boundary() {
    let near_end = positive_stream(100, 118, 120, 4);
    assert!(near_end.at_stride_boundary());

    let mid_stream = positive_stream(100, 108, 120, 4);
    assert!(!mid_stream.at_stride_boundary());
}

// ══════════════════════════════════════════════════════════
// 3. Stability-gated lookahead
// ══════════════════════════════════════════════════════════

/// Unstable streams stay one block ahead; stable ones open up by class.
#[test]
fn lookahead_gate() {
    let mut entry = positive_stream(100, 104, 164, 1);

    entry.consistent_stride_count = 2;
    assert_eq!(safe_lookahead(&entry), 1);

    entry.consistent_stride_count = 3;
    entry.class = StreamClass::Medium;
    assert_eq!(safe_lookahead(&entry), 2);

    entry.class = StreamClass::Dense;
    assert_eq!(safe_lookahead(&entry), 4);
}

// ══════════════════════════════════════════════════════════
// 4. Eviction priority
// ══════════════════════════════════════════════════════════

/// Priority composes class, confidence, group size, and activity.
#[test]
fn priority_composition() {
    let mut entry = positive_stream(100, 104, 164, 1);
    entry.class = StreamClass::Dense;
    entry.confidence = 5;
    entry.last_trigger_timestamp = 100;

    // 30 (dense) + 10 (confidence) + 6 (two members) + 10 (active).
    assert_eq!(eviction_priority(&entry, 2, 100), 56);

    entry.active = false;
    assert_eq!(eviction_priority(&entry, 2, 100), 46);
}

/// Aging erodes priority in two steps.
#[test]
fn priority_age_penalties() {
    let mut entry = positive_stream(100, 104, 164, 1);
    entry.class = StreamClass::Sparse;
    entry.confidence = 1;
    entry.last_trigger_timestamp = 0;

    // 10 + 2 + 0 + 10 at age zero.
    assert_eq!(eviction_priority(&entry, 0, 0), 22);
    // Past half the dead threshold: -5.
    assert_eq!(eviction_priority(&entry, 0, 501), 17);
    // Past the dead threshold: another -10.
    assert_eq!(eviction_priority(&entry, 0, 1001), 7);
}

/// A protected, confident, active dense stream outranks everything aged.
#[test]
fn priority_ordering() {
    let mut hot = positive_stream(100, 104, 164, 1);
    hot.class = StreamClass::Dense;
    hot.confidence = 8;

    let mut stale = positive_stream(5000, 5004, 5064, 8);
    stale.class = StreamClass::Sparse;
    stale.confidence = 1;
    stale.active = false;
    stale.last_trigger_timestamp = 0;

    assert!(eviction_priority(&hot, 4, 1200) > eviction_priority(&stale, 0, 1200));
}
