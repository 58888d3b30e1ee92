//! Per-region miss training.
//!
//! Each training entry accumulates the three most recent misses of one region
//! neighborhood and infers a direction and stride from the two gaps between
//! them. Entries are allocated per region base and matched either exactly or
//! by proximity to their last miss, so a stride that crosses region
//! boundaries keeps training the same entry.

use super::params::*;
use super::pattern::PatternHistory;
use super::streams::StreamDirection;
use crate::common::BlockNumber;

/// One region's training state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrainingEntry {
    /// Entry is live.
    pub valid: bool,

    /// Region base the entry was allocated for.
    pub region_base: BlockNumber,
    /// Most recent miss block.
    pub last_miss: BlockNumber,
    /// Second most recent miss block.
    pub second_last_miss: BlockNumber,
    /// Third most recent miss block.
    pub third_last_miss: BlockNumber,

    /// Misses accumulated toward confirmation (0..=3).
    pub miss_count: u32,
    /// Inferred direction. Tentative after two misses, validated at three.
    pub direction: StreamDirection,
    /// Inferred stride in blocks, >= 1 once a direction is known.
    pub stride: i64,
    /// Timestamp of the last miss that touched this entry.
    pub last_access_timestamp: u64,

    /// Confidence inherited from pattern history for this neighborhood.
    pub pattern_confidence: u32,
}

/// What a training update did with the observed miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingOutcome {
    /// The miss advanced or reset the entry normally.
    Trained,
    /// The miss was absorbed as noise; the entry is unchanged.
    Noise,
}

/// Fixed table of training entries, LRU-replaced.
#[derive(Default)]
pub struct TrainingTable {
    entries: [TrainingEntry; TRAINING_TABLE_SIZE],
}

impl TrainingTable {
    /// Creates an empty training table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the entry training the neighborhood of `miss_block`.
    ///
    /// An exact region-base match wins; otherwise the entry whose last miss
    /// is nearest to `miss_block` within the training reach is used, so that
    /// strides larger than a region stay with one entry.
    pub fn find(&self, miss_block: BlockNumber, region_base: BlockNumber) -> Option<usize> {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.valid && e.region_base == region_base)
        {
            return Some(idx);
        }

        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.valid)
            .map(|(i, e)| (i, e.last_miss.offset_to(miss_block).abs()))
            .filter(|(_, dist)| *dist <= TRAINING_REACH_BLOCKS)
            .min_by_key(|(_, dist)| *dist)
            .map(|(i, _)| i)
    }

    /// Allocates an entry for `region_base`, evicting the LRU entry when the
    /// table is full.
    pub fn allocate(&mut self, region_base: BlockNumber, now: u64) -> usize {
        let idx = self
            .entries
            .iter()
            .position(|e| !e.valid)
            .unwrap_or_else(|| {
                self.entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, e)| e.last_access_timestamp)
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });

        self.entries[idx] = TrainingEntry {
            valid: true,
            region_base,
            stride: 1,
            last_access_timestamp: now,
            ..TrainingEntry::default()
        };
        idx
    }

    /// Feeds one miss into an entry, advancing the inference state machine.
    ///
    /// The first miss only primes the history. The second infers a tentative
    /// direction and stride from the single gap, enough for pattern history
    /// to fast-track a known neighborhood. The third validates both against
    /// the full gap pair: a noisy sample is discarded wholesale, an
    /// inconsistent pair resets the entry, a consistent pair confirms.
    pub fn update(
        &mut self,
        idx: usize,
        miss_block: BlockNumber,
        now: u64,
        history: &PatternHistory,
    ) -> TrainingOutcome {
        let Some(entry) = self.entries.get_mut(idx) else {
            return TrainingOutcome::Trained;
        };
        entry.last_access_timestamp = now;

        match entry.miss_count {
            0 => {
                entry.last_miss = miss_block;
                entry.miss_count = 1;
                entry.pattern_confidence = 0;
            }
            1 => {
                entry.second_last_miss = entry.last_miss;
                entry.last_miss = miss_block;
                entry.miss_count = 2;

                let gap = entry.second_last_miss.offset_to(entry.last_miss);
                if gap != 0 {
                    entry.direction = if gap > 0 {
                        StreamDirection::Positive
                    } else {
                        StreamDirection::Negative
                    };
                    entry.stride = gap.abs();
                    entry.pattern_confidence = history.confidence(
                        entry.direction,
                        entry.stride,
                        entry.region_base,
                        now,
                    );
                }
            }
            _ => {
                let gap1 = entry.second_last_miss.offset_to(entry.last_miss);
                let gap2 = entry.last_miss.offset_to(miss_block);

                if is_noise(gap1, gap2) {
                    return TrainingOutcome::Noise;
                }

                entry.third_last_miss = entry.second_last_miss;
                entry.second_last_miss = entry.last_miss;
                entry.last_miss = miss_block;

                let direction = detect_direction(gap1, gap2);
                let stride = detect_stride(gap1, gap2);

                if direction == StreamDirection::Unknown || stride < 1 {
                    entry.miss_count = 1;
                    entry.direction = StreamDirection::Unknown;
                    entry.stride = 1;
                    return TrainingOutcome::Trained;
                }

                entry.direction = direction;
                entry.stride = stride;
                entry.miss_count = 3;
                entry.pattern_confidence =
                    history.confidence(direction, stride, entry.region_base, now);
            }
        }

        TrainingOutcome::Trained
    }

    /// Read access to an entry.
    pub fn entry(&self, idx: usize) -> &TrainingEntry {
        &self.entries[idx]
    }

    /// Invalidates an entry (after a confirmed launch).
    pub fn invalidate(&mut self, idx: usize) {
        if let Some(entry) = self.entries.get_mut(idx) {
            entry.valid = false;
        }
    }

    /// Read-only view of all entries.
    pub fn entries(&self) -> &[TrainingEntry] {
        &self.entries
    }
}

/// Whether a gap pair is a transient reordering rather than a real pattern
/// change: exactly one of the gaps is small (at most one block) and the gaps
/// point in opposite directions.
pub fn is_noise(gap1: i64, gap2: i64) -> bool {
    ((gap1.abs() <= 1) ^ (gap2.abs() <= 1)) && gap1 * gap2 < 0
}

/// Direction agreed on by both gaps, or `Unknown`.
pub fn detect_direction(gap1: i64, gap2: i64) -> StreamDirection {
    if gap1 > 0 && gap2 > 0 {
        StreamDirection::Positive
    } else if gap1 < 0 && gap2 < 0 {
        StreamDirection::Negative
    } else {
        StreamDirection::Unknown
    }
}

/// Common stride magnitude of the gap pair, or 0 when they disagree.
pub fn detect_stride(gap1: i64, gap2: i64) -> i64 {
    if gap1.abs() != gap2.abs() || gap1.abs() < 1 {
        return 0;
    }
    gap1.abs()
}
