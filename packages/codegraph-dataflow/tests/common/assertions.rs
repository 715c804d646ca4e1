//! Custom assertions for hazard reports

use codegraph_dataflow::features::property_set::{FindingSeverity, PropertySetReport};
use codegraph_dataflow::{HazardFinding, OperationId, PropertySetValue};

/// Assert that the report has no findings
pub fn assert_no_findings(report: &PropertySetReport) {
    assert!(
        report.findings.is_empty(),
        "Expected no findings in {}, got: {:?}",
        report.procedure,
        report.findings
    );
}

/// Assert exactly one finding, at `operation`, with `value`
pub fn assert_single_finding(
    report: &PropertySetReport,
    operation: OperationId,
    value: PropertySetValue,
) -> &HazardFinding {
    assert_eq!(
        report.findings.len(),
        1,
        "Expected one finding in {}, got: {:?}",
        report.procedure,
        report.findings
    );
    let finding = &report.findings[0];
    assert_eq!(finding.operation, operation, "finding anchored at the wrong operation");
    assert_eq!(finding.value, value);
    let expected = if value == PropertySetValue::Flagged {
        FindingSeverity::Definite
    } else {
        FindingSeverity::Possible
    };
    assert_eq!(finding.severity, expected);
    finding
}

/// Assert that the report flags each of `operations` and nothing else
pub fn assert_findings_at(report: &PropertySetReport, operations: &[OperationId]) {
    let mut found: Vec<OperationId> = report.findings.iter().map(|f| f.operation).collect();
    found.sort();
    let mut expected = operations.to_vec();
    expected.sort();
    assert_eq!(found, expected, "findings: {:?}", report.findings);
}
