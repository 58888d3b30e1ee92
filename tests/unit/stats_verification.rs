//! Statistics Verification Tests.
//!
//! Ensures the counter structures start zeroed, track the events they claim
//! to track, and that the report printers run on arbitrary counter values.

use crate::common::mocks::host::RecordingHost;
use crate::common::miss_block;
use prefetch_core::prefetch::TransformerStreamPrefetcher;
use prefetch_core::stats::{SelectorStats, TransformerStats};

/// All counters start at zero.
#[test]
fn counters_start_zeroed() {
    let t = TransformerStats::default();
    assert_eq!(t.streams_created, 0);
    assert_eq!(t.prefetches_issued, 0);
    assert_eq!(t.noise_events, 0);

    let s = SelectorStats::default();
    assert_eq!(s.prefetch_allowed, 0);
    assert_eq!(s.prefetch_throttled, 0);
    assert_eq!(s.transformer_wins, 0);
}

/// Driving a stream updates the lifecycle and issue counters coherently.
#[test]
fn transformer_counters_track_events() {
    let mut host = RecordingHost::new(64);
    let mut pf = TransformerStreamPrefetcher::new();

    for b in 100u64..=104 {
        miss_block(&mut pf, &mut host, b);
    }

    assert_eq!(pf.stats.streams_created, 1);
    assert_eq!(pf.stats.streams_terminated, 0);
    assert_eq!(
        pf.stats.prefetches_issued as usize,
        host.issued.len(),
        "every accepted prefetch is counted once"
    );
}

/// The printers handle zero and non-zero counters without dividing by zero.
#[test]
fn reports_print() {
    TransformerStats::default().print();
    SelectorStats::default().print(0, 0, 0, 0, 0);

    let loaded = SelectorStats {
        prefetch_allowed: 900,
        prefetch_throttled: 100,
        high_bw_events: 60,
        low_accuracy_events: 40,
        transformer_selected: 700,
        pythia_selected: 300,
        transformer_wins: 12,
        pythia_wins: 3,
    };
    loaded.print(512, 800, 1000, 100, 1000);
}
