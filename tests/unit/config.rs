//! Configuration Tests.
//!
//! Verifies the default values and JSON deserialization with full and
//! partial field sets.

use prefetch_core::config::{PrefetchConfig, SelectorConfig};

/// Defaults match the hardware-realistic tuning.
#[test]
fn selector_defaults() {
    let config = SelectorConfig::default();
    assert_eq!(config.policy_update_interval, 5000);
    assert_eq!(config.bw_util_threshold, 0.9);
    assert_eq!(config.min_accuracy_threshold, 0.1);
}

/// A fully specified JSON document overrides every field.
#[test]
fn selector_full_json() {
    let json = r#"{
        "policy_update_interval": 10000,
        "bw_util_threshold": 0.8,
        "min_accuracy_threshold": 0.2
    }"#;
    let config: SelectorConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.policy_update_interval, 10000);
    assert_eq!(config.bw_util_threshold, 0.8);
    assert_eq!(config.min_accuracy_threshold, 0.2);
}

/// Omitted fields take their defaults.
#[test]
fn selector_partial_json() {
    let json = r#"{ "bw_util_threshold": 0.75 }"#;
    let config: SelectorConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.bw_util_threshold, 0.75);
    assert_eq!(config.policy_update_interval, 5000);
    assert_eq!(config.min_accuracy_threshold, 0.1);
}

/// An empty root document yields the default configuration.
#[test]
fn root_empty_json() {
    let config: PrefetchConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.selector.policy_update_interval, 5000);
}

/// The root document nests the selector section.
#[test]
fn root_nested_json() {
    let json = r#"{ "selector": { "policy_update_interval": 2500 } }"#;
    let config: PrefetchConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.selector.policy_update_interval, 2500);
    assert_eq!(config.selector.bw_util_threshold, 0.9);
}
