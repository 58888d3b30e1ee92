//! Pattern history for repetition-aware reinforcement.
//!
//! Workloads with per-layer repetition terminate a stream and start an
//! identical one shortly after. Terminated streams are remembered in a small
//! circular buffer; a training entry that matches a recent pattern earns
//! confidence and may confirm after fewer misses.

use super::params::*;
use super::streams::{StreamClass, StreamDirection};
use crate::common::BlockNumber;

/// A terminated stream's footprint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatternRecord {
    /// Record holds a terminated stream.
    pub valid: bool,
    /// Direction of the terminated stream.
    pub direction: StreamDirection,
    /// Stride of the terminated stream in blocks.
    pub stride: i64,
    /// Start block of the terminated stream (aligned at match time).
    pub start_block: BlockNumber,
    /// Timestamp at which the stream was terminated.
    pub termination_timestamp: u64,
    /// Blocks the stream had prefetched when terminated.
    pub length: u32,
    /// Classification at termination.
    pub class: StreamClass,
}

/// Fixed circular buffer of terminated stream patterns.
pub struct PatternHistory {
    records: [PatternRecord; PATTERN_HISTORY_SIZE],
    head: usize,
}

impl Default for PatternHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self {
            records: [PatternRecord::default(); PATTERN_HISTORY_SIZE],
            head: 0,
        }
    }

    /// Records a terminated stream, overwriting the oldest slot.
    pub fn record(
        &mut self,
        direction: StreamDirection,
        stride: i64,
        start_block: BlockNumber,
        length: u32,
        class: StreamClass,
        now: u64,
    ) {
        self.records[self.head] = PatternRecord {
            valid: true,
            direction,
            stride,
            start_block,
            termination_timestamp: now,
            length,
            class,
        };
        self.head = (self.head + 1) % PATTERN_HISTORY_SIZE;
    }

    /// Finds a recent pattern matching `(direction, stride)` near `region`.
    ///
    /// Scans in slot order and returns the first record that is still inside
    /// the reuse window, matches direction and stride, and whose start region
    /// lies within the pattern region radius. Slot order, not recency order,
    /// decides ties between multiple matches.
    pub fn find(
        &self,
        direction: StreamDirection,
        stride: i64,
        region: BlockNumber,
        now: u64,
    ) -> Option<&PatternRecord> {
        let region_base = region.align_down(REGION_SIZE_BLOCKS);

        self.records.iter().find(|record| {
            record.valid
                && now.saturating_sub(record.termination_timestamp) <= REUSE_WINDOW_SIZE
                && record.direction == direction
                && record.stride == stride
                && {
                    let pattern_region = record.start_block.align_down(REGION_SIZE_BLOCKS);
                    region_base.offset_to(pattern_region).abs() <= PATTERN_REGION_RADIUS_BLOCKS
                }
        })
    }

    /// Confidence earned by a training entry matching `(direction, stride)`
    /// near `region`.
    ///
    /// Long patterns and fresh patterns earn more; the result is capped at
    /// half the stream confidence ceiling so history can accelerate a launch
    /// but never outweigh live behavior. Returns 0 with no match.
    pub fn confidence(
        &self,
        direction: StreamDirection,
        stride: i64,
        region: BlockNumber,
        now: u64,
    ) -> u32 {
        let Some(record) = self.find(direction, stride, region, now) else {
            return 0;
        };

        let mut confidence = 1;

        if record.length >= DENSE_LENGTH_MIN {
            confidence += 2;
        }

        let age = now.saturating_sub(record.termination_timestamp);
        if age < REUSE_WINDOW_SIZE / 4 {
            confidence += 2;
        } else if age < REUSE_WINDOW_SIZE / 2 {
            confidence += 1;
        }

        confidence.min(MAX_CONFIDENCE / 2)
    }

    /// Read-only view of the records, in slot order.
    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }
}
