//! Phase-transition detection and degree throttling.
//!
//! A burst of stream terminations inside one miss window is read as the
//! workload switching sub-computation. During the transition the prefetch
//! degree drops to the minimum; a run of termination-free misses restores it.

use super::params::*;

/// Phase detection state.
#[derive(Clone, Copy, Debug)]
pub struct PhaseState {
    window_start_timestamp: u64,
    misses_in_window: u32,
    streams_terminated_in_window: u32,

    current_prefetch_degree: u32,
    in_transition: bool,
    recovery_counter: u32,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseState {
    /// Creates phase state at the base degree, outside any transition.
    pub fn new() -> Self {
        Self {
            window_start_timestamp: 0,
            misses_in_window: 0,
            streams_terminated_in_window: 0,
            current_prefetch_degree: BASE_PREFETCH_DEGREE,
            in_transition: false,
            recovery_counter: 0,
        }
    }

    /// Accounts one miss; closes the window when it fills.
    ///
    /// At the window boundary, a termination count at or above the transition
    /// threshold enters a phase transition and drops the degree to the
    /// minimum. The window counters reset either way. Returns `true` when a
    /// transition was entered.
    pub fn record_miss(&mut self, now: u64) -> bool {
        self.misses_in_window += 1;

        if self.misses_in_window < PHASE_WINDOW_SIZE {
            return false;
        }

        let entered = self.streams_terminated_in_window >= PHASE_TRANSITION_THRESHOLD;
        if entered {
            self.in_transition = true;
            self.current_prefetch_degree = MIN_PREFETCH_DEGREE;
            self.recovery_counter = 0;
        }

        self.window_start_timestamp = now;
        self.misses_in_window = 0;
        self.streams_terminated_in_window = 0;

        entered
    }

    /// Accounts one stream termination in the current window.
    pub fn record_termination(&mut self) {
        self.streams_terminated_in_window += 1;
    }

    /// Grants one recovery step after a miss that terminated no stream.
    ///
    /// Enough consecutive steps end the transition and restore the base
    /// degree. No-op outside a transition.
    pub fn tick_recovery(&mut self) {
        if !self.in_transition {
            return;
        }

        self.recovery_counter += 1;
        if self.recovery_counter >= PHASE_RECOVERY_WINDOW {
            self.in_transition = false;
            self.current_prefetch_degree = BASE_PREFETCH_DEGREE;
            self.recovery_counter = 0;
        }
    }

    /// Current phase-adjusted prefetch degree.
    pub fn degree(&self) -> u32 {
        self.current_prefetch_degree
    }

    /// Whether a phase transition is in effect.
    pub fn in_transition(&self) -> bool {
        self.in_transition
    }

    /// Timestamp at which the current window opened.
    pub fn window_start(&self) -> u64 {
        self.window_start_timestamp
    }

    /// Misses accounted in the current window.
    pub fn misses_in_window(&self) -> u32 {
        self.misses_in_window
    }

    /// Terminations accounted in the current window.
    pub fn terminations_in_window(&self) -> u32 {
        self.streams_terminated_in_window
    }
}
