use std::collections::BTreeMap;

use crate::aggregate::round_one_decimal;
use crate::model::{AccountReport, AuditSummary};

/// Compute batch-level summary statistics from per-account reports.
pub fn compute_summary(reports: &BTreeMap<String, AccountReport>) -> AuditSummary {
    let mut summary = AuditSummary {
        accounts: reports.len(),
        ..AuditSummary::default()
    };
    let mut accuracy_total = 0.0;

    for report in reports.values() {
        let stats = &report.statistics;
        if report.degraded {
            summary.degraded_accounts += 1;
        }
        if stats.pdx_matched {
            summary.pdx_matched += 1;
        }
        summary.total_ground_truth_sdx += stats.total_ground_truth_sdx;
        summary.matched_sdx += stats.matched_sdx;
        summary.severity_counts.add(&stats.severity_counts);
        accuracy_total += stats.accuracy_percent;

        for row in &report.severity_rows {
            *summary
                .severity_row_counts
                .entry(row.match_kind.to_string())
                .or_insert(0) += 1;
        }
    }

    if !reports.is_empty() {
        summary.mean_accuracy_percent = round_one_decimal(accuracy_total / reports.len() as f64);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountStatistics, ComparisonRow, MatchKind, SeverityCounts, SeverityTag};

    fn report(accuracy: f64, pdx_matched: bool, kinds: &[MatchKind]) -> AccountReport {
        AccountReport {
            statistics: AccountStatistics {
                total_ground_truth_sdx: 4,
                matched_sdx: 2,
                accuracy_percent: accuracy,
                pdx_matched,
                severity_counts: SeverityCounts { gt_cc: 1, gt_mcc: 1, extracted_cc: 1, extracted_mcc: 0 },
                ..AccountStatistics::sentinel()
            },
            severity_rows: kinds
                .iter()
                .map(|k| ComparisonRow {
                    ground_truth_code: Some("N179".into()),
                    ground_truth_severity: SeverityTag::Cc,
                    extracted_code: None,
                    extracted_severity: SeverityTag::None,
                    match_kind: *k,
                })
                .collect(),
            code_review: Vec::new(),
            has_severity_tags: true,
            diagnosis_overlap: Vec::new(),
            degraded: false,
        }
    }

    #[test]
    fn summary_counts() {
        let reports = BTreeMap::from([
            ("1".to_string(), report(50.0, true, &[MatchKind::Match, MatchKind::Mismatch])),
            ("2".to_string(), report(75.0, false, &[MatchKind::Match])),
            ("3".to_string(), report(0.0, true, &[MatchKind::SpecificityIssue])),
        ]);
        let summary = compute_summary(&reports);
        assert_eq!(summary.accounts, 3);
        assert_eq!(summary.pdx_matched, 2);
        assert_eq!(summary.total_ground_truth_sdx, 12);
        assert_eq!(summary.matched_sdx, 6);
        assert_eq!(summary.mean_accuracy_percent, 41.7);
        assert_eq!(summary.severity_counts.gt_cc, 3);
        assert_eq!(summary.severity_row_counts["match"], 2);
        assert_eq!(summary.severity_row_counts["specificity_issue"], 1);
        assert_eq!(summary.severity_row_counts["mismatch"], 1);
    }

    #[test]
    fn mean_accuracy_ties_round_to_even() {
        let reports = BTreeMap::from([
            ("1".to_string(), report(12.5, false, &[])),
            ("2".to_string(), report(0.0, false, &[])),
        ]);
        assert_eq!(compute_summary(&reports).mean_accuracy_percent, 6.2);
    }

    #[test]
    fn empty_batch() {
        let summary = compute_summary(&BTreeMap::new());
        assert_eq!(summary.accounts, 0);
        assert_eq!(summary.mean_accuracy_percent, 0.0);
    }
}
