//! Transformer-aware stream prefetcher.
//!
//! A constant-stride, region-trained streaming prefetcher extended with five
//! mechanisms for nested-stream workloads:
//! 1. **Grouping:** Concurrent identical streams share a group and protect
//!    each other from eviction.
//! 2. **Classification:** Dense/medium/sparse classes scale the prefetch
//!    degree to the stream shape.
//! 3. **Repetition Reinforcement:** Terminated patterns are remembered and a
//!    reappearing one confirms after fewer misses.
//! 4. **Phase Throttling:** A burst of terminations drops the degree until
//!    behavior stabilizes.
//! 5. **Boundary-Safe Lookahead:** Unstable streams stay one block ahead;
//!    stability near the stream end always stops early.
//!
//! All inference is emergent from miss addresses. No program counters, no
//! software hints.

/// Stream groups for concurrent identical streams.
pub mod groups;
/// Tuning constants.
pub mod params;
/// Terminated-pattern history.
pub mod pattern;
/// Phase-transition detection.
pub mod phase;
/// Stream entries and classification.
pub mod streams;
/// Per-region miss training.
pub mod training;

use self::groups::{GroupTable, StreamGroup};
use self::params::*;
use self::pattern::PatternHistory;
use self::phase::PhaseState;
use self::streams::{
    class_degree, classify, eviction_priority, safe_lookahead, StreamDirection, StreamEntry,
};
use self::training::{TrainingEntry, TrainingOutcome, TrainingTable};
use crate::common::{AccessType, Address, BlockNumber};
use crate::host::CacheHost;
use crate::prefetch::PrefetchModule;
use crate::stats::TransformerStats;

/// Transformer-aware stream prefetcher state.
///
/// All tables are fixed-size arrays; the only external effects are
/// `prefetch_line` calls on the host. Timestamps are counted in misses, never
/// in cycles or wall-clock time.
pub struct TransformerStreamPrefetcher {
    training: TrainingTable,
    streams: [StreamEntry; STREAM_TABLE_SIZE],
    groups: GroupTable,
    history: PatternHistory,
    phase: PhaseState,

    timestamp: u64,
    cleanup_counter: u64,

    /// Event counters, reported by `final_stats`.
    pub stats: TransformerStats,
}

impl Default for TransformerStreamPrefetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformerStreamPrefetcher {
    /// Creates a prefetcher with all tables empty.
    pub fn new() -> Self {
        Self {
            training: TrainingTable::new(),
            streams: [StreamEntry::default(); STREAM_TABLE_SIZE],
            groups: GroupTable::new(),
            history: PatternHistory::new(),
            phase: PhaseState::new(),
            timestamp: 0,
            cleanup_counter: 0,
            stats: TransformerStats::default(),
        }
    }

    /// Read-only view of the stream table.
    pub fn streams(&self) -> &[StreamEntry] {
        &self.streams
    }

    /// Read-only view of the group table.
    pub fn groups(&self) -> &[StreamGroup] {
        self.groups.groups()
    }

    /// Read-only view of the training table.
    pub fn training_entries(&self) -> &[TrainingEntry] {
        self.training.entries()
    }

    /// Read-only view of the pattern history.
    pub fn pattern_history(&self) -> &PatternHistory {
        &self.history
    }

    /// Current phase state.
    pub fn phase(&self) -> &PhaseState {
        &self.phase
    }

    /// Terminates streams that have aged out without making progress.
    ///
    /// A stream is dead when it has been idle past the dead-stream threshold
    /// while still short, unless a multi-member group protects it and its
    /// confidence is high. Runs periodically and before any eviction.
    pub fn remove_dead_streams(&mut self) {
        for idx in 0..self.streams.len() {
            let entry = self.streams[idx];
            if !entry.valid {
                continue;
            }

            let age = self.timestamp.saturating_sub(entry.last_trigger_timestamp);
            let mut dead =
                age > DEAD_STREAM_THRESHOLD && entry.length < SHORT_STREAM_THRESHOLD;

            if dead
                && self.groups.is_protected(&entry)
                && entry.confidence >= FAST_TRACK_CONFIDENCE
            {
                dead = false;
            }

            if dead {
                self.terminate_stream(idx);
            }
        }
    }

    fn find_stream_for_block(&self, block: BlockNumber) -> Option<usize> {
        self.streams
            .iter()
            .position(|e| e.valid && e.covers(block))
    }

    fn find_matching_inactive_stream(
        &self,
        direction: StreamDirection,
        stride: i64,
        region_base: BlockNumber,
    ) -> Option<usize> {
        self.streams.iter().position(|e| {
            e.valid
                && !e.active
                && e.direction == direction
                && e.stride == stride
                && {
                    let stream_region = e.start_block.align_down(REGION_SIZE_BLOCKS);
                    region_base.offset_to(stream_region).abs() <= RELAUNCH_REGION_RADIUS_BLOCKS
                }
        })
    }

    fn select_victim_stream(&self) -> usize {
        let mut victim = 0;
        let mut lowest = i32::MAX;

        for (idx, entry) in self.streams.iter().enumerate() {
            if !entry.valid {
                return idx;
            }

            let members = self.groups.member_count_for(entry);
            let priority = eviction_priority(entry, members, self.timestamp);
            if priority < lowest {
                lowest = priority;
                victim = idx;
            }
        }

        victim
    }

    fn allocate_stream_entry(&mut self) -> usize {
        if let Some(idx) = self.streams.iter().position(|e| !e.valid) {
            return idx;
        }

        self.remove_dead_streams();
        if let Some(idx) = self.streams.iter().position(|e| !e.valid) {
            return idx;
        }

        let victim = self.select_victim_stream();
        self.terminate_stream(victim);
        victim
    }

    fn terminate_stream(&mut self, idx: usize) {
        let Some(entry) = self.streams.get(idx).copied() else {
            return;
        };
        if !entry.valid {
            return;
        }

        self.history.record(
            entry.direction,
            entry.stride,
            entry.start_block,
            entry.length,
            entry.class,
            self.timestamp,
        );
        self.groups.remove_member(idx, &mut self.streams);
        self.phase.record_termination();
        self.stats.streams_terminated += 1;

        self.streams[idx].valid = false;
        self.streams[idx].active = false;
    }

    fn create_stream(&mut self, host: &mut dyn CacheHost, trained: TrainingEntry) {
        let idx = self.allocate_stream_entry();

        let end_offset = trained.direction.sign() * trained.stride * STREAM_WINDOW_BLOCKS;
        self.streams[idx] = StreamEntry {
            valid: true,
            active: true,
            start_block: trained.last_miss,
            end_block: trained.last_miss.offset_by(end_offset),
            current_prefetch_block: trained.last_miss,
            direction: trained.direction,
            stride: trained.stride,
            last_trigger_timestamp: self.timestamp,
            length: 0,
            class: classify(trained.stride, 0),
            reactivation_count: 0,
            confidence: trained.pattern_confidence.max(1),
            group_id: None,
            consistent_stride_count: 0,
        };

        let group_idx =
            self.groups
                .find_or_create(trained.direction, trained.stride, self.timestamp, &mut self.streams);
        self.groups.add_member(group_idx, idx, &mut self.streams);

        self.stats.streams_created += 1;
        self.generate_prefetches(host, idx);
    }

    fn reactivate_stream(&mut self, host: &mut dyn CacheHost, idx: usize, trigger: BlockNumber) {
        let entry = &mut self.streams[idx];

        entry.active = true;
        entry.last_trigger_timestamp = self.timestamp;
        entry.reactivation_count += 1;
        entry.current_prefetch_block = trigger;
        entry.confidence = (entry.confidence + CONFIDENCE_BOOST_ON_REUSE).min(MAX_CONFIDENCE);

        // Grow the window outward at both ends; the trigger may sit before
        // the recorded start, and the current block must stay inside the
        // stream bounds.
        let end_offset = entry.direction.sign() * entry.stride * STREAM_WINDOW_BLOCKS;
        let new_end = trigger.offset_by(end_offset);
        match entry.direction {
            StreamDirection::Positive => {
                if new_end > entry.end_block {
                    entry.end_block = new_end;
                }
                if trigger < entry.start_block {
                    entry.start_block = trigger;
                }
            }
            StreamDirection::Negative => {
                if new_end < entry.end_block {
                    entry.end_block = new_end;
                }
                if trigger > entry.start_block {
                    entry.start_block = trigger;
                }
            }
            StreamDirection::Unknown => {}
        }

        if self.streams[idx].group_id.is_none() {
            let (direction, stride) = (self.streams[idx].direction, self.streams[idx].stride);
            let group_idx =
                self.groups
                    .find_or_create(direction, stride, self.timestamp, &mut self.streams);
            self.groups.add_member(group_idx, idx, &mut self.streams);
        }

        self.stats.streams_reactivated += 1;
        self.generate_prefetches(host, idx);
    }

    fn try_relaunch_stream(
        &mut self,
        host: &mut dyn CacheHost,
        miss_block: BlockNumber,
        direction: StreamDirection,
        stride: i64,
    ) -> bool {
        let region = miss_block.align_down(REGION_SIZE_BLOCKS);
        match self.find_matching_inactive_stream(direction, stride, region) {
            Some(idx) => {
                self.reactivate_stream(host, idx, miss_block);
                true
            }
            None => false,
        }
    }

    fn reinforce_stream_confidence(&mut self, idx: usize) {
        let entry = &mut self.streams[idx];
        entry.confidence = (entry.confidence + 1).min(MAX_CONFIDENCE);
        let entry = self.streams[idx];
        self.groups.reinforce(&entry);
    }

    fn refresh_classification(&mut self, idx: usize) {
        let entry = self.streams[idx];
        if !entry.valid {
            return;
        }
        let class = classify(entry.stride, entry.length);
        self.streams[idx].class = class;
        self.groups.set_typical_class(&self.streams[idx], class);
    }

    fn generate_prefetches(&mut self, host: &mut dyn CacheHost, idx: usize) {
        if !self.streams[idx].valid || !self.streams[idx].active {
            return;
        }

        let phase_degree = self.phase.degree();
        let class_deg = class_degree(self.streams[idx].class);
        let lookahead = safe_lookahead(&self.streams[idx]);

        let mut degree = phase_degree.min(class_deg).min(lookahead);
        if self.phase.in_transition() {
            degree = degree.min(MIN_PREFETCH_DEGREE);
        }

        for issued in 0..degree {
            let entry = self.streams[idx];
            let next = entry
                .current_prefetch_block
                .offset_by(entry.direction.sign() * entry.stride);

            let beyond_end = match entry.direction {
                StreamDirection::Positive => next > entry.end_block,
                StreamDirection::Negative => next < entry.end_block,
                StreamDirection::Unknown => true,
            };
            if beyond_end {
                self.streams[idx].active = false;
                return;
            }

            if entry.at_stride_boundary() && issued > 0 {
                break;
            }

            let mshr_ratio = host.mshr_occupancy_ratio();
            if mshr_ratio > MSHR_STOP_RATIO {
                self.stats.mshr_stalls += 1;
                return;
            }

            let fill_this_level = mshr_ratio < MSHR_FILL_RATIO;
            if !host.prefetch_line(next.to_address(), fill_this_level, 0) {
                self.stats.queue_rejections += 1;
                return;
            }

            self.stats.prefetches_issued += 1;
            let entry = &mut self.streams[idx];
            entry.current_prefetch_block = next;
            entry.length += 1;
            entry.consistent_stride_count += 1;
            if entry.length % CLASS_REFRESH_INTERVAL == 0 {
                self.refresh_classification(idx);
            }
        }

        self.streams[idx].last_trigger_timestamp = self.timestamp;
    }

    fn train_on_miss(&mut self, host: &mut dyn CacheHost, miss_block: BlockNumber) {
        let region_base = miss_block.align_down(REGION_SIZE_BLOCKS);

        let train_idx = self
            .training
            .find(miss_block, region_base)
            .unwrap_or_else(|| self.training.allocate(region_base, self.timestamp));

        let outcome = self
            .training
            .update(train_idx, miss_block, self.timestamp, &self.history);
        if outcome == TrainingOutcome::Noise {
            self.stats.noise_events += 1;
            return;
        }

        let trained = *self.training.entry(train_idx);
        let fast_track = trained.pattern_confidence >= FAST_TRACK_CONFIDENCE;
        let ready = trained.miss_count >= CONFIRMATION_THRESHOLD
            || (trained.miss_count >= CONFIRMATION_THRESHOLD - 1 && fast_track);

        if ready && trained.direction != StreamDirection::Unknown && trained.stride >= 1 {
            if self.try_relaunch_stream(host, miss_block, trained.direction, trained.stride) {
                self.stats.relaunches += 1;
            } else {
                if trained.miss_count < CONFIRMATION_THRESHOLD {
                    self.stats.fast_track_launches += 1;
                }
                self.create_stream(host, trained);
            }
            self.training.invalidate(train_idx);
        }
    }
}

impl PrefetchModule for TransformerStreamPrefetcher {
    fn initialize(&mut self, _host: &dyn CacheHost) {
        *self = Self::new();
    }

    fn cache_operate(
        &mut self,
        host: &mut dyn CacheHost,
        addr: Address,
        _ip: Address,
        cache_hit: bool,
        _useful_prefetch: bool,
        _access: AccessType,
        metadata_in: u32,
    ) -> u32 {
        // Training happens on misses only; hits pass through untouched.
        if cache_hit {
            return metadata_in;
        }

        self.timestamp += 1;
        let terminated_before = self.stats.streams_terminated;

        if self.phase.record_miss(self.timestamp) {
            self.stats.phase_transitions += 1;
        }

        self.cleanup_counter += 1;
        if self.cleanup_counter >= CLEANUP_INTERVAL {
            self.remove_dead_streams();
            self.cleanup_counter = 0;
        }

        let miss_block = addr.block();

        if let Some(idx) = self.find_stream_for_block(miss_block) {
            let entry = &mut self.streams[idx];
            entry.last_trigger_timestamp = self.timestamp;
            if !entry.active {
                entry.active = true;
                entry.reactivation_count += 1;
                self.stats.streams_reactivated += 1;
            }
            self.reinforce_stream_confidence(idx);
            self.generate_prefetches(host, idx);
        } else {
            self.train_on_miss(host, miss_block);
        }

        // A miss that terminated nothing counts toward phase recovery.
        if self.phase.in_transition() && self.stats.streams_terminated == terminated_before {
            self.phase.tick_recovery();
        }

        metadata_in
    }

    fn cache_fill(
        &mut self,
        _host: &mut dyn CacheHost,
        _addr: Address,
        _set: usize,
        _way: usize,
        _is_prefetch: bool,
        _evicted_addr: Address,
        metadata_in: u32,
    ) -> u32 {
        // Prefetched fills never feed training.
        metadata_in
    }

    fn cycle_operate(&mut self, host: &mut dyn CacheHost) {
        for idx in 0..self.streams.len() {
            if self.streams[idx].valid && self.streams[idx].active {
                self.generate_prefetches(host, idx);
            }
        }
    }

    fn final_stats(&self) {
        self.stats.print();
    }
}
