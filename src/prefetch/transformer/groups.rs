//! Stream groups for multi-stream concurrency awareness.
//!
//! Workloads with many concurrent identical streams (multi-head traversals)
//! produce several live streams sharing one (direction, stride). Grouping
//! them protects the whole population from eviction and dead-stream removal
//! while the pattern is hot. Groups reference streams by table index; no
//! entry ever holds a pointer into the stream table.

use super::params::*;
use super::streams::{classify, StreamClass, StreamDirection, StreamEntry};

/// A set of concurrent streams sharing direction and stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamGroup {
    /// Group is live.
    pub valid: bool,
    /// Shared direction of the member streams.
    pub direction: StreamDirection,
    /// Shared stride of the member streams.
    pub stride: i64,
    /// Number of occupied member slots.
    pub member_count: u32,
    /// Class most recently observed on a member.
    pub typical_class: StreamClass,
    /// Reinforcement count accumulated by member hits.
    pub confidence: u64,
    /// Timestamp of the last membership change or lookup hit.
    pub last_seen_timestamp: u64,
    /// Member stream indices; `None` marks an empty slot.
    pub members: [Option<usize>; MAX_STREAMS_PER_GROUP],
}

impl Default for StreamGroup {
    fn default() -> Self {
        Self {
            valid: false,
            direction: StreamDirection::Unknown,
            stride: 0,
            member_count: 0,
            typical_class: StreamClass::Unknown,
            confidence: 0,
            last_seen_timestamp: 0,
            members: [None; MAX_STREAMS_PER_GROUP],
        }
    }
}

/// Fixed table of stream groups.
#[derive(Default)]
pub struct GroupTable {
    groups: [StreamGroup; MAX_STREAM_GROUPS],
}

impl GroupTable {
    /// Creates an empty group table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the group matching `(direction, stride)`.
    pub fn find(&self, direction: StreamDirection, stride: i64) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.valid && g.direction == direction && g.stride == stride)
    }

    /// Finds or creates the group for `(direction, stride)`.
    ///
    /// A full table evicts the group seen longest ago, clearing the departing
    /// members' group links in `streams` first.
    pub fn find_or_create(
        &mut self,
        direction: StreamDirection,
        stride: i64,
        now: u64,
        streams: &mut [StreamEntry],
    ) -> usize {
        if let Some(idx) = self.find(direction, stride) {
            self.groups[idx].last_seen_timestamp = now;
            return idx;
        }

        let idx = match self.groups.iter().position(|g| !g.valid) {
            Some(free) => free,
            None => {
                let oldest = self
                    .groups
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, g)| g.last_seen_timestamp)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                self.evict(oldest, streams);
                oldest
            }
        };

        self.groups[idx] = StreamGroup {
            valid: true,
            direction,
            stride,
            member_count: 0,
            // A new group has no observed length yet; classify on stride alone.
            typical_class: classify(stride, DENSE_LENGTH_MIN),
            confidence: 0,
            last_seen_timestamp: now,
            members: [None; MAX_STREAMS_PER_GROUP],
        };
        idx
    }

    /// Adds a stream to a group's first free slot.
    ///
    /// A stream only becomes a member when a slot is free; a full group
    /// leaves the stream ungrouped so that every grouped stream occupies
    /// exactly one slot.
    pub fn add_member(&mut self, group_idx: usize, stream_idx: usize, streams: &mut [StreamEntry]) {
        if group_idx >= self.groups.len() || stream_idx >= streams.len() {
            return;
        }

        let group = &mut self.groups[group_idx];
        if let Some(slot) = group.members.iter().position(|m| m.is_none()) {
            group.members[slot] = Some(stream_idx);
            group.member_count += 1;
            streams[stream_idx].group_id = Some(group_idx);
        }
    }

    /// Removes a stream from its group, invalidating the group when it
    /// empties.
    pub fn remove_member(&mut self, stream_idx: usize, streams: &mut [StreamEntry]) {
        if stream_idx >= streams.len() {
            return;
        }

        let Some(group_idx) = streams[stream_idx].group_id else {
            return;
        };
        streams[stream_idx].group_id = None;

        let Some(group) = self.groups.get_mut(group_idx) else {
            return;
        };

        if let Some(slot) = group.members.iter().position(|m| *m == Some(stream_idx)) {
            group.members[slot] = None;
            group.member_count = group.member_count.saturating_sub(1);
        }

        if group.member_count == 0 {
            group.valid = false;
        }
    }

    /// Whether a stream is protected by a group with multiple live members.
    pub fn is_protected(&self, entry: &StreamEntry) -> bool {
        self.member_count_for(entry) >= 2
    }

    /// Occupied member slots of the group owning `entry` (0 when ungrouped).
    pub fn member_count_for(&self, entry: &StreamEntry) -> u32 {
        entry
            .group_id
            .and_then(|idx| self.groups.get(idx))
            .filter(|g| g.valid)
            .map(|g| g.member_count)
            .unwrap_or(0)
    }

    /// Reinforces the group owning `entry` after a member hit.
    pub fn reinforce(&mut self, entry: &StreamEntry) {
        if let Some(group) = entry.group_id.and_then(|idx| self.groups.get_mut(idx)) {
            if group.valid {
                group.confidence += 1;
            }
        }
    }

    /// Updates the typical class of the group owning `entry`.
    pub fn set_typical_class(&mut self, entry: &StreamEntry, class: StreamClass) {
        if let Some(group) = entry.group_id.and_then(|idx| self.groups.get_mut(idx)) {
            if group.valid {
                group.typical_class = class;
            }
        }
    }

    /// Read-only view of the groups.
    pub fn groups(&self) -> &[StreamGroup] {
        &self.groups
    }

    fn evict(&mut self, group_idx: usize, streams: &mut [StreamEntry]) {
        for member in self.groups[group_idx].members.iter().flatten() {
            if let Some(entry) = streams.get_mut(*member) {
                entry.group_id = None;
            }
        }
        self.groups[group_idx] = StreamGroup::default();
    }
}
