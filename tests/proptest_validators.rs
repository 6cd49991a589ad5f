//! Property-based tests using proptest
//!
//! These tests cover duration parsing and formatting, the wire duration
//! encoding, attribute validators and strict schema validation using
//! randomized inputs.

use doublecloud_provider::api::http::sanitize_for_log;
use doublecloud_provider::api::wire::{duration_from_wire, duration_to_wire};
use doublecloud_provider::framework::{format_duration, parse_duration, Validator};
use doublecloud_provider::resources::{kafka, network};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

/// Durations small enough to survive float arithmetic exactly
fn arb_duration() -> impl Strategy<Value = Duration> {
    (0u64..1_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| Duration::new(secs, nanos))
}

/// Randomly upper/lower-cases each character
fn arb_casing(value: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), value.len()).prop_map(move |mask| {
        value
            .chars()
            .zip(mask)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

fn network_config() -> Value {
    json!({
        "project_id": "p1",
        "name": "prod",
        "region_id": "eu-central-1",
        "cloud_type": "aws",
        "ipv4_cidr_block": "10.0.0.0/16"
    })
}

proptest! {
    /// Formatting then parsing gives back the same duration
    #[test]
    fn format_then_parse_is_identity(d in arb_duration()) {
        let formatted = format_duration(d);
        prop_assert_eq!(parse_duration(&formatted).unwrap(), d, "formatted as {}", formatted);
    }

    /// The wire encoding is itself valid configuration syntax
    #[test]
    fn wire_duration_parses(d in arb_duration()) {
        let wire = duration_to_wire(d);
        prop_assert!(wire.ends_with('s'));
        prop_assert_eq!(parse_duration(&wire).unwrap(), d);
        prop_assert_eq!(duration_from_wire(&wire), Some(d));
    }

    /// Compound durations add up their components
    #[test]
    fn components_add_up(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
        let input = format!("{}h{}m{}s", h, m, s);
        prop_assert_eq!(
            parse_duration(&input).unwrap(),
            Duration::from_secs(h * 3600 + m * 60 + s)
        );
    }

    /// Bare numbers and unknown units are rejected, never panic
    #[test]
    fn garbage_durations_rejected(n in 1u64..10_000, unit in "[a-gi-lo-rt-z]{1,3}") {
        prop_assert!(parse_duration(&n.to_string()).is_err());
        let input = format!("{}{}", n, unit);
        prop_assert!(parse_duration(&input).is_err());
    }

    /// Case-insensitive enums accept any casing of an allowed value
    #[test]
    fn compression_type_any_case(
        value in prop::sample::select(kafka::COMPRESSION_TYPES).prop_flat_map(arb_casing)
    ) {
        let validator = Validator::OneOfCaseInsensitive(kafka::COMPRESSION_TYPES);
        prop_assert!(validator.check(&json!(value)).is_ok());
    }

    /// Exact enums reject anything outside the list
    #[test]
    fn exact_enum_rejects_other_values(value in "[a-z]{1,12}") {
        let validator = Validator::OneOf(network::CLOUD_TYPES);
        let expected = network::CLOUD_TYPES.contains(&value.as_str());
        prop_assert_eq!(validator.check(&json!(value)).is_ok(), expected);
    }

    /// Lower bounds hold for every integer
    #[test]
    fn at_least_bound(min in -100i64..100, n in -1000i64..1000) {
        prop_assert_eq!(Validator::AtLeast(min).check(&json!(n)).is_ok(), n >= min);
    }

    /// Every unknown argument is reported once, alongside a valid config
    #[test]
    fn unknown_arguments_reported(extra in proptest::collection::btree_set("x_[a-z]{1,8}", 0..6)) {
        let mut config = network_config();
        for key in &extra {
            config[key.as_str()] = json!("value");
        }
        let diags = network::schema().validate(&config);
        prop_assert_eq!(diags.len(), extra.len());
        prop_assert!(diags.iter().all(|d| d.summary == "Unsupported argument"));
    }

    /// Log sanitising bounds length and strips control characters
    #[test]
    fn sanitized_bodies_are_printable(body in "\\PC{0,600}") {
        let sanitized = sanitize_for_log(&body);
        prop_assert!(sanitized.chars().all(|c| c.is_ascii_graphic() || c == ' '));
        prop_assert!(sanitized.len() <= 200 + "... [truncated, 0000 bytes total]".len());
    }
}
