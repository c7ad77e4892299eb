use std::collections::BTreeSet;

use crate::error::ReconError;
use crate::matcher::classify;
use crate::model::{
    AccountStatistics, DiagnosisRecord, DiagnosisRole, GroundTruthRecord, MatchKind, NOT_AVAILABLE,
};
use crate::severity::count_severity;

/// Reconcile one account. Never fails: errors are logged and the account
/// degrades to [`AccountStatistics::sentinel`].
pub fn reconcile(
    account_id: &str,
    extracted: &[DiagnosisRecord],
    ground_truth_sdx: &[GroundTruthRecord],
    ground_truth_pdx: &[GroundTruthRecord],
) -> AccountStatistics {
    try_reconcile(account_id, extracted, ground_truth_sdx, ground_truth_pdx)
        .unwrap_or_else(|err| degrade(account_id, &err))
}

/// Fallible core of [`reconcile`].
///
/// Records with an empty `account_id` are treated as belonging to `account_id`.
pub fn try_reconcile(
    account_id: &str,
    extracted: &[DiagnosisRecord],
    ground_truth_sdx: &[GroundTruthRecord],
    ground_truth_pdx: &[GroundTruthRecord],
) -> Result<AccountStatistics, ReconError> {
    let owners = extracted
        .iter()
        .map(|r| r.account_id.as_str())
        .chain(ground_truth_sdx.iter().map(|r| r.account_id.as_str()))
        .chain(ground_truth_pdx.iter().map(|r| r.account_id.as_str()));
    for owner in owners {
        if !owner.is_empty() && owner != account_id {
            return Err(ReconError::AccountMismatch {
                account_id: account_id.to_string(),
                record_account_id: owner.to_string(),
            });
        }
    }

    let extracted_sdx: Vec<DiagnosisRecord> = extracted
        .iter()
        .filter(|r| r.diagnosis_role == DiagnosisRole::Sdx)
        .cloned()
        .collect();

    // Set-based SDX overlap: exact codes only, blanks never count.
    let gt_sdx_codes: BTreeSet<&str> = ground_truth_sdx
        .iter()
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let extracted_sdx_codes: BTreeSet<&str> = extracted_sdx
        .iter()
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let matched_sdx = gt_sdx_codes.intersection(&extracted_sdx_codes).count();

    let references: Vec<&str> = ground_truth_sdx
        .iter()
        .map(|r| r.icd_code.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let matched_icds_overall = extracted
        .iter()
        .filter(|r| classify(&r.icd_code, &references) == MatchKind::Match)
        .count();

    let accuracy_percent = accuracy(matched_icds_overall, extracted.len());
    if !(0.0..=100.0).contains(&accuracy_percent) {
        return Err(ReconError::InvalidStatistic {
            account_id: account_id.to_string(),
            name: "accuracy_percent".into(),
            value: accuracy_percent,
        });
    }

    let pdx_extracted_code = code_or_na(
        extracted
            .iter()
            .find(|r| r.diagnosis_role == DiagnosisRole::Pdx)
            .map(|r| r.icd_code.as_str()),
    );
    let pdx_ground_truth_code = code_or_na(ground_truth_pdx.first().map(|r| r.icd_code.as_str()));
    let pdx_matched =
        pdx_ground_truth_code != NOT_AVAILABLE && pdx_ground_truth_code == pdx_extracted_code;

    let statistics = AccountStatistics {
        total_ground_truth_sdx: ground_truth_sdx.len(),
        matched_sdx,
        matched_icds_overall,
        accuracy_percent,
        pdx_ground_truth_code,
        pdx_extracted_code,
        pdx_matched,
        severity_counts: count_severity(ground_truth_sdx, &extracted_sdx),
    };

    log::debug!(
        "account {account_id}: {} extracted, {} gt sdx, {} matched sdx, accuracy {:.1}%",
        extracted.len(),
        statistics.total_ground_truth_sdx,
        statistics.matched_sdx,
        statistics.accuracy_percent,
    );

    Ok(statistics)
}

/// Log a failed account and hand back the sentinel statistics.
pub(crate) fn degrade(account_id: &str, err: &ReconError) -> AccountStatistics {
    log::error!("account {account_id}: reconciliation failed, using empty statistics: {err}");
    AccountStatistics::sentinel()
}

/// `matched / total * 100` rounded to one decimal; 0 when there is nothing to measure.
fn accuracy(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(matched as f64 / total as f64 * 100.0)
}

/// Halves go to the even neighbour, so 6.25 reports as 6.2.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

fn code_or_na(code: Option<&str>) -> String {
    match code {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroundTruthRole, SeverityTag};

    fn dx(code: &str, role: DiagnosisRole) -> DiagnosisRecord {
        DiagnosisRecord {
            account_id: "A1".into(),
            icd_code: code.into(),
            diagnosis_role: role,
            ..DiagnosisRecord::default()
        }
    }

    fn gt(code: &str, role: GroundTruthRole, severity: SeverityTag) -> GroundTruthRecord {
        GroundTruthRecord {
            account_id: "A1".into(),
            icd_code: code.into(),
            description: String::new(),
            diagnosis_role: role,
            severity_tag: severity,
            patient_encounter_id: "PE1".into(),
            severity_of_illness: String::new(),
            risk_of_mortality: String::new(),
        }
    }

    #[test]
    fn basic_statistics() {
        let extracted = vec![
            dx("I2510", DiagnosisRole::Pdx),
            dx("E1122", DiagnosisRole::Sdx),
            dx("N179", DiagnosisRole::Sdx),
            dx("I10", DiagnosisRole::Adx),
        ];
        let gt_sdx = vec![
            gt("E1122", GroundTruthRole::Sdx, SeverityTag::Cc),
            gt("N189", GroundTruthRole::Sdx, SeverityTag::None),
            gt("I10", GroundTruthRole::Sdx, SeverityTag::None),
        ];
        let gt_pdx = vec![gt("I2510", GroundTruthRole::Pdx, SeverityTag::None)];

        let stats = reconcile("A1", &extracted, &gt_sdx, &gt_pdx);
        assert_eq!(stats.total_ground_truth_sdx, 3);
        // I10 is extracted as ADX, so only E1122 overlaps on the SDX sets
        assert_eq!(stats.matched_sdx, 1);
        // ...but every role counts toward the headline figure
        assert_eq!(stats.matched_icds_overall, 2);
        assert_eq!(stats.accuracy_percent, 50.0);
        assert_eq!(stats.pdx_extracted_code, "I2510");
        assert_eq!(stats.pdx_ground_truth_code, "I2510");
        assert!(stats.pdx_matched);
        assert_eq!(stats.severity_counts.gt_cc, 1);
    }

    #[test]
    fn accuracy_rounds_to_one_decimal() {
        let extracted = vec![
            dx("E1122", DiagnosisRole::Sdx),
            dx("X1", DiagnosisRole::Sdx),
            dx("X2", DiagnosisRole::Sdx),
        ];
        let gt_sdx = vec![gt("E1122", GroundTruthRole::Sdx, SeverityTag::None)];
        let stats = reconcile("A1", &extracted, &gt_sdx, &[]);
        assert_eq!(stats.accuracy_percent, 33.3);
    }

    #[test]
    fn accuracy_ties_round_to_even() {
        let mut extracted = vec![dx("E1122", DiagnosisRole::Sdx)];
        extracted.extend((0..15).map(|i| dx(&format!("Z{i:03}"), DiagnosisRole::Sdx)));
        let gt_sdx = vec![gt("E1122", GroundTruthRole::Sdx, SeverityTag::None)];
        let stats = reconcile("A1", &extracted, &gt_sdx, &[]);
        assert_eq!(stats.accuracy_percent, 6.2);

        assert_eq!(round_one_decimal(31.25), 31.2);
        assert_eq!(round_one_decimal(18.75), 18.8);
        assert_eq!(round_one_decimal(33.333), 33.3);
    }

    #[test]
    fn no_extracted_records() {
        let gt_sdx = vec![gt("A001", GroundTruthRole::Sdx, SeverityTag::None)];
        let stats = reconcile("A1", &[], &gt_sdx, &[]);
        assert_eq!(stats.accuracy_percent, 0.0);
        assert_eq!(stats.total_ground_truth_sdx, 1);
        assert_eq!(stats.matched_sdx, 0);
        assert_eq!(stats.pdx_extracted_code, NOT_AVAILABLE);
        assert_eq!(stats.pdx_ground_truth_code, NOT_AVAILABLE);
        assert!(!stats.pdx_matched);
    }

    #[test]
    fn specificity_issue_does_not_count_as_matched() {
        let extracted = vec![dx("E1121", DiagnosisRole::Sdx)];
        let gt_sdx = vec![gt("E1122", GroundTruthRole::Sdx, SeverityTag::Mcc)];
        let stats = reconcile("A1", &extracted, &gt_sdx, &[]);
        assert_eq!(stats.matched_sdx, 0);
        assert_eq!(stats.matched_icds_overall, 0);
        assert_eq!(stats.accuracy_percent, 0.0);
    }

    #[test]
    fn pdx_requires_exact_match() {
        let extracted = vec![dx("I2511", DiagnosisRole::Pdx), dx("I2510", DiagnosisRole::Pdx)];
        let gt_pdx = vec![
            gt("I2510", GroundTruthRole::Pdx, SeverityTag::None),
            gt("I2511", GroundTruthRole::Pdx, SeverityTag::None),
        ];
        let stats = reconcile("A1", &extracted, &[], &gt_pdx);
        // first extracted PDX vs first ground-truth PDX only
        assert_eq!(stats.pdx_extracted_code, "I2511");
        assert_eq!(stats.pdx_ground_truth_code, "I2510");
        assert!(!stats.pdx_matched);
    }

    #[test]
    fn blank_pdx_on_both_sides_is_not_a_match() {
        let extracted = vec![dx("", DiagnosisRole::Pdx)];
        let gt_pdx = vec![gt("", GroundTruthRole::Pdx, SeverityTag::None)];
        let stats = reconcile("A1", &extracted, &[], &gt_pdx);
        assert_eq!(stats.pdx_extracted_code, NOT_AVAILABLE);
        assert!(!stats.pdx_matched);
    }

    #[test]
    fn duplicate_codes_are_kept() {
        let extracted = vec![dx("E1122", DiagnosisRole::Sdx), dx("E1122", DiagnosisRole::Adx)];
        let gt_sdx = vec![gt("E1122", GroundTruthRole::Sdx, SeverityTag::None)];
        let stats = reconcile("A1", &extracted, &gt_sdx, &[]);
        assert_eq!(stats.matched_icds_overall, 2);
        assert_eq!(stats.matched_sdx, 1);
        assert_eq!(stats.accuracy_percent, 100.0);
    }

    #[test]
    fn foreign_record_degrades_to_sentinel() {
        let mut stray = dx("E1122", DiagnosisRole::Sdx);
        stray.account_id = "B2".into();
        let err = try_reconcile("A1", &[stray.clone()], &[], &[]).unwrap_err();
        assert!(matches!(err, ReconError::AccountMismatch { .. }));

        let stats = reconcile("A1", &[stray], &[], &[]);
        assert_eq!(stats, AccountStatistics::sentinel());
    }

    #[test]
    fn idempotent() {
        let extracted = vec![dx("E1122", DiagnosisRole::Sdx), dx("I2510", DiagnosisRole::Pdx)];
        let gt_sdx = vec![gt("E1122", GroundTruthRole::Sdx, SeverityTag::Mcc)];
        let gt_pdx = vec![gt("I2510", GroundTruthRole::Pdx, SeverityTag::None)];
        let first = reconcile("A1", &extracted, &gt_sdx, &gt_pdx);
        let second = reconcile("A1", &extracted, &gt_sdx, &gt_pdx);
        assert_eq!(first, second);
    }
}
