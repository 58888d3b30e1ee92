//! Configuration for the prefetcher family.
//!
//! This module defines the runtime-tunable knobs of the selector. It
//! provides:
//! 1. **Defaults:** Baseline values matching the hardware-realistic tuning.
//! 2. **Structures:** Serde-deserializable config with per-field defaults.
//!
//! Table geometries and the transformer's behavioral thresholds are
//! compile-time constants (every table is a fixed-size array), not
//! configuration.

use serde::Deserialize;

/// Default configuration constants for the selector.
mod defaults {
    /// Cycles between policy-counter updates.
    pub const POLICY_UPDATE_INTERVAL: u64 = 5000;

    /// DRAM bandwidth utilization above which all prefetching is throttled.
    pub const BW_UTIL_THRESHOLD: f64 = 0.9;

    /// Accuracy floor below which prefetching is throttled even at moderate
    /// bandwidth.
    pub const MIN_ACCURACY_THRESHOLD: f64 = 0.1;
}

/// Tunables of the bandwidth-aware selector.
///
/// # Examples
///
/// Deserializing a partial configuration; omitted fields take defaults:
///
/// ```
/// use prefetch_core::config::SelectorConfig;
///
/// let json = r#"{ "policy_update_interval": 10000 }"#;
/// let config: SelectorConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.policy_update_interval, 10000);
/// assert_eq!(config.bw_util_threshold, 0.9);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Cycles between policy-counter updates (0 disables updates).
    #[serde(default = "SelectorConfig::default_policy_update_interval")]
    pub policy_update_interval: u64,

    /// DRAM bandwidth utilization above which prefetching is throttled.
    #[serde(default = "SelectorConfig::default_bw_util_threshold")]
    pub bw_util_threshold: f64,

    /// Accuracy floor that keeps prefetching alive under moderate bandwidth.
    #[serde(default = "SelectorConfig::default_min_accuracy_threshold")]
    pub min_accuracy_threshold: f64,
}

impl SelectorConfig {
    fn default_policy_update_interval() -> u64 {
        defaults::POLICY_UPDATE_INTERVAL
    }

    fn default_bw_util_threshold() -> f64 {
        defaults::BW_UTIL_THRESHOLD
    }

    fn default_min_accuracy_threshold() -> f64 {
        defaults::MIN_ACCURACY_THRESHOLD
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            policy_update_interval: defaults::POLICY_UPDATE_INTERVAL,
            bw_util_threshold: defaults::BW_UTIL_THRESHOLD,
            min_accuracy_threshold: defaults::MIN_ACCURACY_THRESHOLD,
        }
    }
}

/// Root configuration for the prefetcher family.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefetchConfig {
    /// Bandwidth-aware selector tunables.
    #[serde(default)]
    pub selector: SelectorConfig,
}
