//! # Configuration Tests
//!
//! Tests for configuration defaults and JSON deserialization.

use pretty_assertions::assert_eq;
use sdramctl_core::common::error::ConfigError;
use sdramctl_core::config::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.clock.frequency_hz, 100_000_000);
    assert!(!config.trace.commands);
}

#[test]
fn test_geometry_defaults() {
    let geometry = GeometryConfig::default();
    assert_eq!(geometry.bank_bits, 2);
    assert_eq!(geometry.row_bits, 11);
    assert_eq!(geometry.column_bits, 8);
}

#[test]
fn test_timing_defaults() {
    let timing = TimingConfig::default();
    assert_eq!(timing.t_rp_ns, 20);
    assert_eq!(timing.t_rc_ns, 70);
    assert_eq!(timing.t_rcd_ns, 20);
    assert_eq!(timing.t_mrd_cycles, 2);
    assert_eq!(timing.cas_latency, 2);
    assert_eq!(timing.t_wr_cycles, 2);
    assert_eq!(timing.refresh_interval_ns, 15_000);
    assert_eq!(timing.init_delay_ns, 200_000);
}

#[test]
fn test_empty_document_yields_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_document_keeps_other_defaults() {
    let json = r#"{
        "clock": { "frequency_hz": 143000000 },
        "timing": { "cas_latency": 3 }
    }"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.clock.frequency_hz, 143_000_000);
    assert_eq!(config.timing.cas_latency, 3);
    assert_eq!(config.timing.t_rp_ns, 20);
    assert_eq!(config.geometry, GeometryConfig::default());
}

#[test]
fn test_serialized_config_parses_back() {
    let mut config = Config::default();
    config.geometry.row_bits = 13;
    config.trace.commands = true;
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(Config::from_json(&json).unwrap(), config);
}

#[test]
fn test_malformed_document_is_a_parse_error() {
    let err = Config::from_json(r#"{ "clock": { "frequency_hz": "fast" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("malformed configuration"));
}
