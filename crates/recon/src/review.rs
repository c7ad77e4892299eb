use std::collections::BTreeSet;

use crate::matcher::{match_code, specificity_candidates};
use crate::model::{CodeReview, DiagnosisRecord, GroundTruthRecord, MatchKind, SourceTable};

/// Classify every extracted code against the ground-truth SDX codes.
///
/// `reference_codes` lists what an auditor needs to judge the row: the exact
/// code on a match, every qualifying code on a specificity issue, and the
/// full ground-truth list on a mismatch.
pub fn review_codes(
    extracted: &[DiagnosisRecord],
    ground_truth_sdx: &[GroundTruthRecord],
) -> Vec<CodeReview> {
    let references: Vec<&str> = ground_truth_sdx
        .iter()
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    extracted
        .iter()
        .map(|record| {
            let outcome = match_code(&record.icd_code, &references);
            let reference_codes: Vec<String> = match outcome.kind {
                MatchKind::Match => outcome.reference.into_iter().map(str::to_string).collect(),
                MatchKind::SpecificityIssue => specificity_candidates(&record.icd_code, &references)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                MatchKind::Mismatch => references.iter().map(|c| c.to_string()).collect(),
            };

            CodeReview {
                icd_code: record.icd_code.clone(),
                diagnosis_role: record.diagnosis_role,
                severity_tag: record.severity_tag,
                match_kind: outcome.kind,
                reference_codes,
            }
        })
        .collect()
}

/// Combination-review codes that were also coded in the diagnoses table.
///
/// Follows review-table order; a code reviewed twice is listed twice.
pub fn diagnosis_overlap(extracted: &[DiagnosisRecord]) -> Vec<String> {
    let coded: BTreeSet<&str> = extracted
        .iter()
        .filter(|r| r.source_table == SourceTable::CodedDiagnoses)
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();

    extracted
        .iter()
        .filter(|r| r.source_table == SourceTable::CombinationReview)
        .filter(|r| coded.contains(r.icd_code.as_str()))
        .map(|r| r.icd_code.clone())
        .collect()
}
