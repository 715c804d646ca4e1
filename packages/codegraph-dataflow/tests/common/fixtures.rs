//! Test fixtures
//!
//! The running example is an insecure deserializer: `Serializer` objects
//! are hazardous until their `Binder` property is set to a non-null value.

use codegraph_dataflow::config::{DataflowConfig, Preset};
use codegraph_dataflow::features::property_set::HazardousUsageRule;
use codegraph_dataflow::PropertySetAnalyzer;

pub const TRACKED_TYPE: &str = "Serializer";
pub const GUARD_FIELD: &str = "Binder";
pub const GUARD_TYPE: &str = "Binder";
pub const HAZARDOUS_METHOD: &str = "Deserialize";
pub const RULE_ID: &str = "insecure-deserializer";

pub const RULE_YAML: &str = r#"
id: insecure-deserializer
type_name: Serializer
guard_field: Binder
hazardous_methods: [Deserialize]
hazardous_argument_methods: [Process]
message: "Serializer used without a Binder"
"#;

pub fn serializer_rule() -> HazardousUsageRule {
    HazardousUsageRule::new(RULE_ID, TRACKED_TYPE, GUARD_FIELD, &[HAZARDOUS_METHOD])
}

/// Balanced preset: one level of context-sensitive calls, predicates on
pub fn balanced() -> DataflowConfig {
    DataflowConfig::preset(Preset::Balanced)
}

pub fn analyzer() -> PropertySetAnalyzer {
    analyzer_with(balanced())
}

pub fn analyzer_with(config: DataflowConfig) -> PropertySetAnalyzer {
    PropertySetAnalyzer::new(serializer_rule(), config).expect("valid rule and config")
}
