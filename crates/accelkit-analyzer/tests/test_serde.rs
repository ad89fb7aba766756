//! JSON interchange of analysis inputs and outputs.
//!
//! Built only with the `serde` feature:
//! `cargo test -p accelkit-analyzer --features serde --test test_serde`.

#![cfg(feature = "serde")]

mod common;

use accelkit_analyzer::{active, AnalyzerConfig, Input, Output};
use approx::assert_relative_eq;
use common::{known_input, synthetic_input};
use pretty_assertions::assert_eq;
use serde_json::json;

fn analyze(input: &Input) -> Output {
    let mut output = Output::default();
    let mut elapsed = 0.0;
    active::analyze_with(input, &mut output, &mut elapsed, &AnalyzerConfig::default()).unwrap();
    output
}

#[test]
fn test_input_from_json() {
    let input: Input = serde_json::from_value(json!({
        "digis": [
            { "module": 0, "channel": 4, "adc": 30 },
            { "module": 0, "channel": 5, "adc": 50 },
            { "module": 1, "channel": 9, "adc": 20 }
        ],
        "calibration": { "gains": [1.0, 2.0], "pedestal": 10.0 }
    }))
    .unwrap();
    assert_eq!(input.len(), 3);

    let output = analyze(&input);
    assert_eq!(output.clusters.len(), 2);
    assert_eq!(output.clusters[0].size, 2);
    assert_eq!(output.clusters[1].charge, 20.0);
}

#[test]
fn test_output_survives_json() {
    for input in [known_input(), synthetic_input(5, 8, 2_000)] {
        let output = analyze(&input);
        let text = serde_json::to_string(&output).unwrap();
        let back: Output = serde_json::from_str(&text).unwrap();

        assert_eq!(back.digis, output.digis);
        assert_eq!(back.clusters.len(), output.clusters.len());
        for (a, b) in back.clusters.iter().zip(&output.clusters) {
            assert_eq!((a.module, a.first_channel, a.size), (b.module, b.first_channel, b.size));
            assert_relative_eq!(a.charge, b.charge);
            assert_relative_eq!(a.centroid, b.centroid);
        }
        assert_eq!(back.modules.len(), output.modules.len());
        assert_relative_eq!(back.total_charge, output.total_charge, max_relative = 1e-12);
    }
}

#[test]
fn test_output_field_names() {
    let output = analyze(&known_input());
    let value = serde_json::to_value(&output).unwrap();
    for field in ["clusters", "modules", "total_charge", "digis"] {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    let cluster = &value["clusters"][0];
    for field in ["module", "first_channel", "size", "charge", "centroid"] {
        assert!(cluster.get(field).is_some(), "missing cluster.{field}");
    }
}
