//! Prefetcher statistics collection and reporting.
//!
//! This module tracks event counters for both prefetcher components. It
//! provides:
//! 1. **Transformer Events:** Stream lifecycle, launches, noise, and issue
//!    pressure counters.
//! 2. **Selector Events:** Throttling, selection, and policy-duel counters.
//! 3. **Reporting:** Aligned key/value reports printed at end of simulation.

/// Event counters for the transformer stream prefetcher.
#[derive(Clone, Debug, Default)]
pub struct TransformerStats {
    /// Streams confirmed and created from training.
    pub streams_created: u64,
    /// Streams terminated (dead-stream sweep or eviction).
    pub streams_terminated: u64,
    /// Dormant streams woken up, by coverage hit or re-launch.
    pub streams_reactivated: u64,
    /// Confirmations that re-launched a dormant stream instead of creating.
    pub relaunches: u64,
    /// Streams launched after only two misses on pattern-history confidence.
    pub fast_track_launches: u64,
    /// Training samples absorbed as noise.
    pub noise_events: u64,
    /// Phase transitions entered.
    pub phase_transitions: u64,
    /// Prefetch lines accepted by the host.
    pub prefetches_issued: u64,
    /// Prefetch attempts dropped because the host queue was full.
    pub queue_rejections: u64,
    /// Generation passes cut short by MSHR pressure.
    pub mshr_stalls: u64,
}

impl TransformerStats {
    /// Prints the transformer report to stdout.
    pub fn print(&self) {
        println!("\n==========================================================");
        println!("TRANSFORMER STREAM PREFETCHER STATISTICS");
        println!("==========================================================");
        println!("streams.created          {}", self.streams_created);
        println!("streams.terminated       {}", self.streams_terminated);
        println!("streams.reactivated      {}", self.streams_reactivated);
        println!("launch.relaunches        {}", self.relaunches);
        println!("launch.fast_track        {}", self.fast_track_launches);
        println!("train.noise_absorbed     {}", self.noise_events);
        println!("phase.transitions        {}", self.phase_transitions);
        println!("issue.prefetches         {}", self.prefetches_issued);
        println!("issue.queue_rejections   {}", self.queue_rejections);
        println!("issue.mshr_stalls        {}", self.mshr_stalls);
        println!("==========================================================");
    }
}

/// Event counters for the bandwidth-aware selector.
#[derive(Clone, Debug, Default)]
pub struct SelectorStats {
    /// Accesses where prefetching was allowed.
    pub prefetch_allowed: u64,
    /// Accesses where prefetching was throttled.
    pub prefetch_throttled: u64,
    /// Throttle evaluations that saw bandwidth above the threshold.
    pub high_bw_events: u64,
    /// Throttle evaluations that saw accuracy below both floors.
    pub low_accuracy_events: u64,
    /// Accesses routed to the transformer prefetcher.
    pub transformer_selected: u64,
    /// Accesses routed to the secondary prefetcher.
    pub pythia_selected: u64,
    /// Policy updates won by the transformer.
    pub transformer_wins: u64,
    /// Policy updates won by the secondary prefetcher.
    pub pythia_wins: u64,
}

impl SelectorStats {
    /// Prints the selector report to stdout.
    ///
    /// Takes the live policy value and the aggregated useful/issued counters
    /// (samplers plus dedicated sets) for the accuracy breakdown.
    pub fn print(
        &self,
        policy_selector: i32,
        transformer_useful: u64,
        transformer_issued: u64,
        pythia_useful: u64,
        pythia_issued: u64,
    ) {
        let throttle_total = self.prefetch_allowed + self.prefetch_throttled;
        let throttled_pct = if throttle_total > 0 {
            100.0 * self.prefetch_throttled as f64 / throttle_total as f64
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("BANDWIDTH-AWARE SELECTOR STATISTICS");
        println!("==========================================================");
        println!("throttle.allowed         {}", self.prefetch_allowed);
        println!(
            "throttle.throttled       {} ({:.2}%)",
            self.prefetch_throttled, throttled_pct
        );
        println!("throttle.high_bw         {}", self.high_bw_events);
        println!("throttle.low_accuracy    {}", self.low_accuracy_events);
        println!("select.transformer       {}", self.transformer_selected);
        println!("select.pythia            {}", self.pythia_selected);
        println!("policy.value             {}", policy_selector);
        println!("policy.transformer_wins  {}", self.transformer_wins);
        println!("policy.pythia_wins       {}", self.pythia_wins);
        println!("----------------------------------------------------------");
        println!("SAMPLER + DEDICATED ACCURACY");

        let print_source = |name: &str, useful: u64, issued: u64| {
            let accuracy = if issued > 0 {
                100.0 * useful as f64 / issued as f64
            } else {
                0.0
            };
            println!(
                "  {:<12} useful: {:<10} | issued: {:<10} | accuracy: {:.2}%",
                name, useful, issued, accuracy
            );
        };
        print_source("transformer", transformer_useful, transformer_issued);
        print_source("pythia", pythia_useful, pythia_issued);
        println!("==========================================================");
    }
}
