//! Stream table entries, direction, and classification.
//!
//! A stream is a confirmed (direction, stride) pattern with a start block, an
//! end block, and the block the prefetcher will fetch next. Streams are
//! classified by stride magnitude and observed length; the class selects the
//! prefetch degree and feeds the eviction priority.

use super::params::*;
use crate::common::BlockNumber;

/// Direction of a memory stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamDirection {
    /// No stable direction inferred yet.
    #[default]
    Unknown,
    /// Ascending block numbers.
    Positive,
    /// Descending block numbers.
    Negative,
}

impl StreamDirection {
    /// Signed unit step for this direction (0 when unknown).
    pub fn sign(self) -> i64 {
        match self {
            StreamDirection::Unknown => 0,
            StreamDirection::Positive => 1,
            StreamDirection::Negative => -1,
        }
    }
}

/// Behavioral class of a stream.
///
/// Inferred purely from stride magnitude and prefetched length; nothing here
/// relies on program counters or software hints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamClass {
    /// Not enough evidence yet.
    #[default]
    Unknown,
    /// Small stride, long run: inner-dimension traversal.
    Dense,
    /// Moderate stride with regular gaps.
    Medium,
    /// Large stride or short run: long-reuse traffic.
    Sparse,
}

/// One learned stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamEntry {
    /// Entry holds a live stream.
    pub valid: bool,
    /// Stream is still advancing; dormant streams keep state for re-launch.
    pub active: bool,

    /// First block covered by the stream.
    pub start_block: BlockNumber,
    /// Last block the stream may prefetch, in the direction's sense.
    pub end_block: BlockNumber,
    /// Block the next prefetch will be computed from.
    pub current_prefetch_block: BlockNumber,

    /// Stream direction; never `Unknown` on a valid entry.
    pub direction: StreamDirection,
    /// Stride in blocks, always >= 1 on a valid entry.
    pub stride: i64,

    /// Timestamp of the last miss or prefetch that advanced this stream.
    pub last_trigger_timestamp: u64,
    /// Blocks prefetched so far.
    pub length: u32,

    /// Current classification.
    pub class: StreamClass,

    /// Times a dormant copy of this pattern was woken up.
    pub reactivation_count: u32,
    /// Confidence score in `1..=MAX_CONFIDENCE`.
    pub confidence: u32,

    /// Owning group index, `None` when ungrouped.
    pub group_id: Option<usize>,

    /// Consecutive prefetches issued at an unchanged stride.
    pub consistent_stride_count: u32,
}

impl StreamEntry {
    /// Whether `block` lies between the stream start and the current prefetch
    /// position, inclusive, in the stream's direction.
    pub fn covers(&self, block: BlockNumber) -> bool {
        match self.direction {
            StreamDirection::Positive => {
                block >= self.start_block && block <= self.current_prefetch_block
            }
            StreamDirection::Negative => {
                block <= self.start_block && block >= self.current_prefetch_block
            }
            StreamDirection::Unknown => false,
        }
    }

    /// Whether the remaining distance to the stream end is at most one stride.
    pub fn at_stride_boundary(&self) -> bool {
        let remaining = match self.direction {
            StreamDirection::Positive => self.current_prefetch_block.offset_to(self.end_block),
            StreamDirection::Negative => self.end_block.offset_to(self.current_prefetch_block),
            StreamDirection::Unknown => return true,
        };
        remaining <= self.stride
    }
}

/// Classifies a stream from its stride magnitude and prefetched length.
///
/// Small strides need a long run to count as dense; medium strides need a
/// moderate run to count as medium. Everything larger or shorter degrades one
/// class toward sparse.
pub fn classify(stride: i64, length: u32) -> StreamClass {
    if stride <= DENSE_STRIDE_MAX {
        if length >= DENSE_LENGTH_MIN {
            return StreamClass::Dense;
        }
        return StreamClass::Medium;
    }
    if stride <= MEDIUM_STRIDE_MAX {
        if length >= MEDIUM_LENGTH_MIN {
            return StreamClass::Medium;
        }
        return StreamClass::Sparse;
    }
    StreamClass::Sparse
}

/// Prefetch degree granted to a stream class.
pub fn class_degree(class: StreamClass) -> u32 {
    match class {
        StreamClass::Dense => DENSE_PREFETCH_DEGREE,
        StreamClass::Medium => MEDIUM_PREFETCH_DEGREE,
        StreamClass::Sparse => SPARSE_PREFETCH_DEGREE,
        StreamClass::Unknown => BASE_PREFETCH_DEGREE,
    }
}

/// Lookahead bound from stride stability.
///
/// Streams that have kept the same stride for long enough may run ahead
/// aggressively (dense streams most of all); unstable streams stay one block
/// ahead so a dimension boundary is never overshot by much.
pub fn safe_lookahead(entry: &StreamEntry) -> u32 {
    if entry.consistent_stride_count >= STRIDE_STABILITY_THRESHOLD {
        if entry.class == StreamClass::Dense {
            return AGGRESSIVE_LOOKAHEAD;
        }
        return BASE_PREFETCH_DEGREE;
    }
    CONSERVATIVE_LOOKAHEAD
}

/// Eviction priority of a stream; the lowest-priority entry is the victim.
///
/// Combines class value, confidence, group size, activity, and age. Invalid
/// entries never reach this function (they are always preferred victims).
pub fn eviction_priority(entry: &StreamEntry, group_members: u32, now: u64) -> i32 {
    let mut priority = match entry.class {
        StreamClass::Dense => 30,
        StreamClass::Medium => 20,
        StreamClass::Sparse => 10,
        StreamClass::Unknown => 15,
    };

    priority += entry.confidence as i32 * 2;
    priority += group_members as i32 * 3;

    if entry.active {
        priority += 10;
    }

    let age = now.saturating_sub(entry.last_trigger_timestamp);
    if age > DEAD_STREAM_THRESHOLD / 2 {
        priority -= 5;
    }
    if age > DEAD_STREAM_THRESHOLD {
        priority -= 10;
    }

    priority
}
