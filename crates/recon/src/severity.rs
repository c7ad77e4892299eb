//! CC/MCC comparison restricted to secondary diagnoses.
//!
//! Callers pass extracted records already filtered to `DiagnosisRole::Sdx`.

use crate::matcher::match_code;
use crate::model::{ComparisonRow, DiagnosisRecord, GroundTruthRecord, SeverityCounts, SeverityTag};

/// Tally CC/MCC on each side independently.
pub fn count_severity(
    ground_truth_sdx: &[GroundTruthRecord],
    extracted_sdx: &[DiagnosisRecord],
) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for record in ground_truth_sdx {
        match record.severity_tag {
            SeverityTag::Cc => counts.gt_cc += 1,
            SeverityTag::Mcc => counts.gt_mcc += 1,
            SeverityTag::None => {}
        }
    }
    for record in extracted_sdx {
        match record.severity_tag {
            SeverityTag::Cc => counts.extracted_cc += 1,
            SeverityTag::Mcc => counts.extracted_mcc += 1,
            SeverityTag::None => {}
        }
    }
    counts
}

/// Side-by-side table of severity-bearing ground-truth codes and their
/// extracted counterparts, in ground-truth order.
///
/// Untagged ground-truth records are left out of the table. When the
/// counterpart code was extracted more than once, the last record's
/// severity is shown.
pub fn compare_severity(
    ground_truth_sdx: &[GroundTruthRecord],
    extracted_sdx: &[DiagnosisRecord],
) -> (SeverityCounts, Vec<ComparisonRow>) {
    let counts = count_severity(ground_truth_sdx, extracted_sdx);

    let references: Vec<&str> = extracted_sdx
        .iter()
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    let rows = ground_truth_sdx
        .iter()
        .filter(|gt| gt.severity_tag.is_tagged())
        .map(|gt| {
            let outcome = match_code(&gt.icd_code, &references);
            let extracted_severity = outcome
                .reference
                .and_then(|code| extracted_sdx.iter().rev().find(|r| r.icd_code == code))
                .map(|r| r.severity_tag)
                .unwrap_or_default();

            ComparisonRow {
                ground_truth_code: (!gt.icd_code.is_empty()).then(|| gt.icd_code.clone()),
                ground_truth_severity: gt.severity_tag,
                extracted_code: outcome.reference.map(str::to_string),
                extracted_severity,
                match_kind: outcome.kind,
            }
        })
        .collect();

    (counts, rows)
}

/// Whether any ground-truth secondary diagnosis carries a CC/MCC tag.
pub fn has_severity_tags(ground_truth_sdx: &[GroundTruthRecord]) -> bool {
    ground_truth_sdx.iter().any(|r| r.severity_tag.is_tagged())
}
