//! Phase Detection Tests.
//!
//! Verifies the miss-window accounting, transition entry at the termination
//! threshold, and recovery back to the base degree.

use prefetch_core::prefetch::transformer::phase::PhaseState;

/// Fresh state runs at the base degree outside any transition.
#[test]
fn initial_state() {
    let phase = PhaseState::new();
    assert!(!phase.in_transition());
    assert_eq!(phase.degree(), 2);
    assert_eq!(phase.misses_in_window(), 0);
}

/// Enough terminations inside one window enter a transition and drop the
/// degree to the minimum.
#[test]
fn transition_on_termination_burst() {
    let mut phase = PhaseState::new();

    for _ in 0..4 {
        phase.record_termination();
    }
    for i in 1..=63 {
        assert!(!phase.record_miss(i), "window still open");
        assert!(!phase.in_transition());
    }

    assert!(phase.record_miss(64), "window closes with a burst");
    assert!(phase.in_transition());
    assert_eq!(phase.degree(), 1);
    // Window counters reset at the boundary.
    assert_eq!(phase.misses_in_window(), 0);
    assert_eq!(phase.terminations_in_window(), 0);
}

/// Below the threshold, the window closes quietly and counters reset.
#[test]
fn no_transition_below_threshold() {
    let mut phase = PhaseState::new();

    for _ in 0..3 {
        phase.record_termination();
    }
    for i in 1..=64 {
        assert!(!phase.record_miss(i));
    }

    assert!(!phase.in_transition());
    assert_eq!(phase.degree(), 2);
    assert_eq!(phase.terminations_in_window(), 0);
}

/// Terminations only count within their own window.
#[test]
fn terminations_do_not_carry_across_windows() {
    let mut phase = PhaseState::new();

    // Two terminations in each of two consecutive windows: never enough.
    for _ in 0..2 {
        for _ in 0..2 {
            phase.record_termination();
        }
        for i in 1..=64 {
            phase.record_miss(i);
        }
    }
    assert!(!phase.in_transition());
}

/// A run of termination-free misses restores the base degree.
#[test]
fn recovery_restores_degree() {
    let mut phase = PhaseState::new();
    for _ in 0..4 {
        phase.record_termination();
    }
    for i in 1..=64 {
        phase.record_miss(i);
    }
    assert!(phase.in_transition());

    for _ in 0..31 {
        phase.tick_recovery();
        assert!(phase.in_transition(), "recovery needs the full window");
        assert_eq!(phase.degree(), 1);
    }
    phase.tick_recovery();
    assert!(!phase.in_transition());
    assert_eq!(phase.degree(), 2);
}

/// Recovery ticks outside a transition are no-ops.
#[test]
fn recovery_noop_outside_transition() {
    let mut phase = PhaseState::new();
    for _ in 0..64 {
        phase.tick_recovery();
    }
    assert!(!phase.in_transition());
    assert_eq!(phase.degree(), 2);
}
