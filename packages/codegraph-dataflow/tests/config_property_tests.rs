//! Property-based tests for engine configuration
//!
//! Validation must accept exactly the documented ranges, and YAML export
//! must load back to the same configuration.

use codegraph_dataflow::config::{ConfigError, DataflowConfig, Preset};
use codegraph_dataflow::InterproceduralKind;
use proptest::prelude::*;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

// ============================================================================
// QuickCheck
// ============================================================================

#[quickcheck]
fn qc_call_chain_range(depth: u32) -> bool {
    let config = DataflowConfig::default().with_max_call_chain(depth);
    let valid = (1..=16).contains(&depth);
    config.validate().is_ok() == valid
}

#[quickcheck]
fn qc_lambda_chain_range(depth: u32) -> bool {
    let config = DataflowConfig::default().with_max_lambda_call_chain(depth);
    config.validate().is_ok() == (depth <= 16)
}

#[quickcheck]
fn qc_block_visit_bound(limit: usize) -> bool {
    // Concentrate around the upper bound
    let limit = limit % 20_000_000;
    let config = DataflowConfig::default().with_max_block_visits(limit);
    let valid = (1..=10_000_000).contains(&limit);
    config.validate().is_ok() == valid
}

#[quickcheck]
fn qc_hazard_flag_does_not_affect_validity(track: bool, preset_index: u8) -> TestResult {
    let preset = match preset_index % 4 {
        0 => Preset::Fast,
        1 => Preset::Balanced,
        2 => Preset::Thorough,
        _ => return TestResult::discard(),
    };
    TestResult::from_bool(DataflowConfig::preset(preset).with_track_hazards(track).validate().is_ok())
}

#[quickcheck]
fn qc_intraprocedural_accepts_zero_depth(pessimistic: bool) -> bool {
    DataflowConfig::default()
        .with_interprocedural_kind(InterproceduralKind::None)
        .with_max_call_chain(0)
        .with_pessimistic(pessimistic)
        .validate()
        .is_ok()
}

// ============================================================================
// Proptest
// ============================================================================

fn preset_strategy() -> impl Strategy<Value = Preset> {
    prop_oneof![Just(Preset::Fast), Just(Preset::Balanced), Just(Preset::Thorough)]
}

prop_compose! {
    fn valid_config()(
        preset in preset_strategy(),
        depth in 1u32..=16,
        lambda_depth in 0u32..=16,
        pessimistic in any::<bool>(),
        predicates in any::<bool>(),
        hazards in any::<bool>(),
        visits in 1usize..=10_000_000,
        cache in any::<bool>(),
    ) -> DataflowConfig {
        DataflowConfig::preset(preset)
            .with_interprocedural_kind(InterproceduralKind::ContextSensitive)
            .with_max_call_chain(depth)
            .with_max_lambda_call_chain(lambda_depth)
            .with_pessimistic(pessimistic)
            .with_predicate_analysis(predicates)
            .with_track_hazards(hazards)
            .with_max_block_visits(visits)
            .with_cache_enabled(cache)
    }
}

proptest! {
    #[test]
    fn prop_yaml_roundtrip(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
        let yaml = config.to_yaml().unwrap();
        let loaded = DataflowConfig::from_yaml_str(&yaml).unwrap();
        prop_assert_eq!(loaded, config);
    }

    #[test]
    fn prop_policy_mirrors_settings(config in valid_config()) {
        let policy = config.policy();
        prop_assert_eq!(policy.kind, config.interprocedural.kind);
        prop_assert_eq!(policy.max_call_chain, config.interprocedural.max_call_chain);
        prop_assert_eq!(policy.max_lambda_call_chain, config.interprocedural.max_lambda_call_chain);
        prop_assert_eq!(policy.pessimistic, config.interprocedural.pessimistic);
    }

    #[test]
    fn prop_preset_names_parse(preset in preset_strategy()) {
        prop_assert_eq!(Preset::parse(preset.as_str()).unwrap(), preset);
        prop_assert_eq!(Preset::parse(&preset.as_str().to_uppercase()).unwrap(), preset);
    }

    #[test]
    fn prop_unknown_preset_rejected(name in "[a-z]{1,12}") {
        prop_assume!(!["fast", "balanced", "thorough"].contains(&name.as_str()));
        prop_assert!(matches!(Preset::parse(&name), Err(ConfigError::UnknownPreset(_))));
    }
}

#[test]
fn test_yaml_file_with_preset_override() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "version: 1\npreset: thorough\ntrack_hazards: false\nmax_block_visits: 5000"
    )
    .unwrap();

    let config = DataflowConfig::from_yaml(file.path()).unwrap();
    assert_eq!(config.policy().max_call_chain, 3);
    assert!(config.policy().pessimistic);
    assert!(!config.track_hazards);
    assert_eq!(config.max_block_visits, 5000);
}
