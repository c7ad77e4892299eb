use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::aggregate::{degrade, try_reconcile};
use crate::config::AuditConfig;
use crate::evidence::compute_summary;
use crate::model::{AccountInput, AccountReport, AuditInput, AuditMeta, AuditResult};
use crate::review::{diagnosis_overlap, review_codes};
use crate::severity::{compare_severity, has_severity_tags};

/// Reconcile one account into its statistics and comparison tables.
///
/// A degraded account keeps the sentinel statistics and empty tables.
pub fn reconcile_account(account_id: &str, input: &AccountInput) -> AccountReport {
    let statistics = try_reconcile(
        account_id,
        &input.extracted,
        &input.ground_truth_sdx,
        &input.ground_truth_pdx,
    );

    match statistics {
        Ok(statistics) => {
            let extracted_sdx = input.extracted_sdx();
            let (_, severity_rows) = compare_severity(&input.ground_truth_sdx, &extracted_sdx);
            AccountReport {
                statistics,
                severity_rows,
                code_review: review_codes(&input.extracted, &input.ground_truth_sdx),
                has_severity_tags: has_severity_tags(&input.ground_truth_sdx),
                diagnosis_overlap: diagnosis_overlap(&input.extracted),
                degraded: false,
            }
        }
        Err(err) => AccountReport {
            statistics: degrade(account_id, &err),
            severity_rows: Vec::new(),
            code_review: Vec::new(),
            has_severity_tags: false,
            diagnosis_overlap: Vec::new(),
            degraded: true,
        },
    }
}

/// Reconcile every account independently.
///
/// Accounts without extracted records are skipped (accuracy is undefined).
/// Accounts share no state, so they are processed in parallel; the result
/// is keyed and ordered by account id.
pub fn reconcile_all(input: &AuditInput) -> BTreeMap<String, AccountReport> {
    input
        .accounts
        .par_iter()
        .filter(|(account_id, account)| {
            if account.extracted.is_empty() {
                log::debug!("account {account_id}: no extracted records, skipping");
                false
            } else {
                true
            }
        })
        .map(|(account_id, account)| (account_id.clone(), reconcile_account(account_id, account)))
        .collect()
}

/// Run a full audit: reconcile all accounts, then summarize.
pub fn run(config: &AuditConfig, input: &AuditInput) -> AuditResult {
    let accounts = reconcile_all(input);
    let summary = compute_summary(&accounts);

    log::info!(
        "{}: reconciled {} of {} account(s), {} degraded",
        config.name,
        summary.accounts,
        input.accounts.len(),
        summary.degraded_accounts,
    );

    AuditResult {
        meta: AuditMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        accounts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DiagnosisRecord, DiagnosisRole, GroundTruthRecord, GroundTruthRole, MatchKind, SeverityTag,
        SourceTable,
    };

    fn dx(account: &str, code: &str, role: DiagnosisRole, severity: SeverityTag) -> DiagnosisRecord {
        DiagnosisRecord {
            account_id: account.into(),
            icd_code: code.into(),
            diagnosis_role: role,
            severity_tag: severity,
            ..DiagnosisRecord::default()
        }
    }

    fn gt(account: &str, code: &str, role: GroundTruthRole, severity: SeverityTag) -> GroundTruthRecord {
        GroundTruthRecord {
            account_id: account.into(),
            icd_code: code.into(),
            description: String::new(),
            diagnosis_role: role,
            severity_tag: severity,
            patient_encounter_id: String::new(),
            severity_of_illness: String::new(),
            risk_of_mortality: String::new(),
        }
    }

    #[test]
    fn account_report_tables() {
        let input = AccountInput {
            extracted: vec![
                dx("A1", "I2510", DiagnosisRole::Pdx, SeverityTag::None),
                dx("A1", "E1121", DiagnosisRole::Sdx, SeverityTag::None),
            ],
            ground_truth_pdx: vec![gt("A1", "I2510", GroundTruthRole::Pdx, SeverityTag::None)],
            ground_truth_sdx: vec![gt("A1", "E1122", GroundTruthRole::Sdx, SeverityTag::Mcc)],
        };
        let report = reconcile_account("A1", &input);
        assert!(!report.degraded);
        assert!(report.has_severity_tags);
        assert!(report.statistics.pdx_matched);
        assert_eq!(report.severity_rows.len(), 1);
        assert_eq!(report.severity_rows[0].match_kind, MatchKind::SpecificityIssue);
        assert_eq!(report.code_review.len(), 2);
        assert_eq!(report.code_review[1].reference_codes, vec!["E1122"]);
        assert!(report.diagnosis_overlap.is_empty());
    }

    #[test]
    fn account_report_lists_codes_in_both_tables() {
        let mut reviewed = dx("A1", "E1121", DiagnosisRole::Sdx, SeverityTag::None);
        reviewed.source_table = SourceTable::CombinationReview;
        let input = AccountInput {
            extracted: vec![dx("A1", "E1121", DiagnosisRole::Sdx, SeverityTag::None), reviewed],
            ground_truth_pdx: vec![],
            ground_truth_sdx: vec![gt("A1", "E1122", GroundTruthRole::Sdx, SeverityTag::Mcc)],
        };
        let report = reconcile_account("A1", &input);
        assert_eq!(report.diagnosis_overlap, vec!["E1121"]);
    }

    #[test]
    fn degraded_account_has_empty_tables() {
        let input = AccountInput {
            extracted: vec![dx("B2", "E1122", DiagnosisRole::Sdx, SeverityTag::Cc)],
            ground_truth_pdx: vec![],
            ground_truth_sdx: vec![gt("A1", "E1122", GroundTruthRole::Sdx, SeverityTag::Cc)],
        };
        let report = reconcile_account("A1", &input);
        assert!(report.degraded);
        assert!(report.severity_rows.is_empty());
        assert!(report.code_review.is_empty());
        assert!(report.diagnosis_overlap.is_empty());
        assert_eq!(report.statistics.accuracy_percent, 0.0);
    }

    #[test]
    fn accounts_without_extracted_records_are_skipped() {
        let mut input = AuditInput::default();
        input.accounts.insert(
            "A1".into(),
            AccountInput {
                extracted: vec![dx("A1", "I10", DiagnosisRole::Sdx, SeverityTag::None)],
                ..AccountInput::default()
            },
        );
        input.accounts.insert(
            "A2".into(),
            AccountInput {
                ground_truth_sdx: vec![gt("A2", "I10", GroundTruthRole::Sdx, SeverityTag::None)],
                ..AccountInput::default()
            },
        );
        let reports = reconcile_all(&input);
        assert_eq!(reports.keys().map(String::as_str).collect::<Vec<_>>(), vec!["A1"]);
    }

    #[test]
    fn empty_input() {
        assert!(reconcile_all(&AuditInput::default()).is_empty());
    }

    #[test]
    fn one_bad_account_does_not_block_others() {
        let mut input = AuditInput::default();
        input.accounts.insert(
            "A1".into(),
            AccountInput {
                extracted: vec![dx("A1", "I10", DiagnosisRole::Sdx, SeverityTag::None)],
                ground_truth_sdx: vec![gt("A1", "I10", GroundTruthRole::Sdx, SeverityTag::None)],
                ..AccountInput::default()
            },
        );
        input.accounts.insert(
            "A2".into(),
            AccountInput {
                extracted: vec![dx("ZZ", "I10", DiagnosisRole::Sdx, SeverityTag::None)],
                ..AccountInput::default()
            },
        );
        let reports = reconcile_all(&input);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports["A1"].statistics.accuracy_percent, 100.0);
        assert!(reports["A2"].degraded);
    }
}
