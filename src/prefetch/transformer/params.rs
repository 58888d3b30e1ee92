//! Tuning constants for the transformer-aware stream prefetcher.
//!
//! Every table here is a fixed-size array sized by these constants; nothing is
//! allocated after construction. Values are tuned for workloads dominated by
//! nested, repeating streams (dense inner traversals, per-layer repetition,
//! many concurrent identical streams) while staying safe on general code.

// Base stream prefetcher geometry.

/// Entries in the per-region training table.
pub const TRAINING_TABLE_SIZE: usize = 32;

/// Entries in the stream table. Sized for many concurrent similar streams.
pub const STREAM_TABLE_SIZE: usize = 32;

/// Blocks per training region (power of two).
pub const REGION_SIZE_BLOCKS: u64 = 4;

/// Consecutive consistent misses required to confirm a stream.
pub const CONFIRMATION_THRESHOLD: u32 = 3;

/// Maximum block distance between a miss and a training entry's last miss for
/// the miss to keep training that entry. Covers the medium-stride range so
/// that strides spanning multiple regions can still be confirmed.
pub const TRAINING_REACH_BLOCKS: i64 = 16;

/// Age (in misses) after which a stream with no progress is a removal
/// candidate.
pub const DEAD_STREAM_THRESHOLD: u64 = 1000;

/// Streams shorter than this are eligible for dead-stream removal.
pub const SHORT_STREAM_THRESHOLD: u32 = 4;

/// Prefetch degree outside any classification or phase adjustment.
pub const BASE_PREFETCH_DEGREE: u32 = 2;

/// Misses between periodic dead-stream sweeps.
pub const CLEANUP_INTERVAL: u64 = 256;

/// Blocks ahead of the trigger a new stream's end is placed, per unit stride.
pub const STREAM_WINDOW_BLOCKS: i64 = 64;

// Multi-stream grouping.

/// Maximum distinct (direction, stride) groups tracked at once.
pub const MAX_STREAM_GROUPS: usize = 8;

/// Maximum member streams per group.
pub const MAX_STREAMS_PER_GROUP: usize = 8;

// Stream classification thresholds.

/// Strides up to this are dense (inner-dimension traversals).
pub const DENSE_STRIDE_MAX: i64 = 2;

/// Strides up to this (and above the dense bound) are medium.
pub const MEDIUM_STRIDE_MAX: i64 = 16;

/// Minimum prefetched length for a small-stride stream to count as dense.
pub const DENSE_LENGTH_MIN: u32 = 8;

/// Minimum prefetched length for a medium-stride stream to count as medium.
pub const MEDIUM_LENGTH_MIN: u32 = 4;

/// Prefetch degree for dense streams.
pub const DENSE_PREFETCH_DEGREE: u32 = 4;

/// Prefetch degree for medium streams.
pub const MEDIUM_PREFETCH_DEGREE: u32 = 2;

/// Prefetch degree for sparse streams.
pub const SPARSE_PREFETCH_DEGREE: u32 = 1;

/// Prefetches between classification refreshes of a growing stream.
pub const CLASS_REFRESH_INTERVAL: u32 = 8;

// Repetition-aware reinforcement.

/// Timestamp window within which a terminated pattern can be matched again.
pub const REUSE_WINDOW_SIZE: u64 = 2000;

/// Ceiling for stream confidence scores.
pub const MAX_CONFIDENCE: u32 = 8;

/// Confidence added when a dormant stream is re-launched.
pub const CONFIDENCE_BOOST_ON_REUSE: u32 = 2;

/// Pattern confidence at which training may confirm after only two misses.
pub const FAST_TRACK_CONFIDENCE: u32 = 4;

/// Terminated streams remembered for repetition detection.
pub const PATTERN_HISTORY_SIZE: usize = 16;

/// Maximum block distance between region bases for a pattern-history match.
pub const PATTERN_REGION_RADIUS_BLOCKS: i64 = (REGION_SIZE_BLOCKS * 4) as i64;

/// Maximum block distance between region bases for a dormant-stream re-launch.
pub const RELAUNCH_REGION_RADIUS_BLOCKS: i64 = (REGION_SIZE_BLOCKS * 2) as i64;

// Phase-aware throttling.

/// Misses per phase-detection window.
pub const PHASE_WINDOW_SIZE: u32 = 64;

/// Stream terminations within one window that signal a phase transition.
pub const PHASE_TRANSITION_THRESHOLD: u32 = 4;

/// Prefetch degree while a phase transition is in effect.
pub const MIN_PREFETCH_DEGREE: u32 = 1;

/// Termination-free misses required to recover from a phase transition.
pub const PHASE_RECOVERY_WINDOW: u32 = 32;

// Boundary-safe lookahead.

/// Lookahead for streams whose stride has not yet proven stable.
pub const CONSERVATIVE_LOOKAHEAD: u32 = 1;

/// Lookahead for stable dense streams.
pub const AGGRESSIVE_LOOKAHEAD: u32 = 4;

/// Consecutive same-stride prefetches required before aggressive lookahead.
pub const STRIDE_STABILITY_THRESHOLD: u32 = 3;

// Host pressure limits.

/// MSHR occupancy above which prefetch issue stops for this invocation.
pub const MSHR_STOP_RATIO: f64 = 0.75;

/// MSHR occupancy below which prefetches fill this level rather than below.
pub const MSHR_FILL_RATIO: f64 = 0.5;
