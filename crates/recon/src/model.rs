use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder shown wherever a PDX code is absent on one side.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Role of an extracted diagnosis within the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosisRole {
    Pdx,
    Adx,
    Sdx,
    #[default]
    Unknown,
}

impl std::fmt::Display for DiagnosisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdx => write!(f, "PDX"),
            Self::Adx => write!(f, "ADX"),
            Self::Sdx => write!(f, "SDX"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Ground truth is partitioned into PDX and SDX at load time; nothing else exists there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroundTruthRole {
    Pdx,
    Sdx,
}

impl std::fmt::Display for GroundTruthRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdx => write!(f, "PDX"),
            Self::Sdx => write!(f, "SDX"),
        }
    }
}

/// CC/MCC severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTag {
    #[default]
    None,
    Cc,
    Mcc,
}

impl SeverityTag {
    pub fn is_tagged(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for SeverityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Cc => write!(f, "CC"),
            Self::Mcc => write!(f, "MCC"),
        }
    }
}

/// Outcome of comparing one code against a reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Match,
    SpecificityIssue,
    Mismatch,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::SpecificityIssue => write!(f, "specificity_issue"),
            Self::Mismatch => write!(f, "mismatch"),
        }
    }
}

/// Which extraction table a diagnosis was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceTable {
    #[default]
    CodedDiagnoses,
    CombinationReview,
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CodedDiagnoses => write!(f, "coded_diagnoses"),
            Self::CombinationReview => write!(f, "combination_code_review"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single normalized diagnosis produced by the automated extraction.
///
/// Identity is `(account_id, icd_code, diagnosis_role)`. Duplicates are kept:
/// the same code may legitimately appear under different roles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub account_id: String,
    pub icd_code: String,
    pub description: String,
    pub diagnosis_role: DiagnosisRole,
    pub severity_tag: SeverityTag,
    pub present_on_admission: String,
    pub supporting_documentation: String,
    pub guideline_reference: String,
    #[serde(default)]
    pub source_table: SourceTable,
}

/// A single human-coded ground-truth diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub account_id: String,
    pub icd_code: String,
    pub description: String,
    pub diagnosis_role: GroundTruthRole,
    pub severity_tag: SeverityTag,
    pub patient_encounter_id: String,
    pub severity_of_illness: String,
    pub risk_of_mortality: String,
}

/// Everything known about one account, already normalized.
#[derive(Debug, Clone, Default)]
pub struct AccountInput {
    pub extracted: Vec<DiagnosisRecord>,
    pub ground_truth_pdx: Vec<GroundTruthRecord>,
    pub ground_truth_sdx: Vec<GroundTruthRecord>,
}

impl AccountInput {
    /// Extracted records tagged as secondary diagnoses, in source order.
    pub fn extracted_sdx(&self) -> Vec<DiagnosisRecord> {
        self.extracted
            .iter()
            .filter(|r| r.diagnosis_role == DiagnosisRole::Sdx)
            .cloned()
            .collect()
    }
}

/// Pre-loaded records grouped by account id.
#[derive(Debug, Clone, Default)]
pub struct AuditInput {
    pub accounts: BTreeMap<String, AccountInput>,
}

// ---------------------------------------------------------------------------
// Comparison output
// ---------------------------------------------------------------------------

/// One line of the ground-truth vs. extracted severity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub ground_truth_code: Option<String>,
    pub ground_truth_severity: SeverityTag,
    pub extracted_code: Option<String>,
    pub extracted_severity: SeverityTag,
    pub match_kind: MatchKind,
}

/// Classification of one extracted code against the ground-truth SDX codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeReview {
    pub icd_code: String,
    pub diagnosis_role: DiagnosisRole,
    pub severity_tag: SeverityTag,
    pub match_kind: MatchKind,
    /// Ground-truth codes that explain `match_kind`.
    pub reference_codes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub gt_cc: usize,
    pub gt_mcc: usize,
    pub extracted_cc: usize,
    pub extracted_mcc: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, other: &SeverityCounts) {
        self.gt_cc += other.gt_cc;
        self.gt_mcc += other.gt_mcc;
        self.extracted_cc += other.extracted_cc;
        self.extracted_mcc += other.extracted_mcc;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStatistics {
    pub total_ground_truth_sdx: usize,
    pub matched_sdx: usize,
    pub matched_icds_overall: usize,
    pub accuracy_percent: f64,
    pub pdx_ground_truth_code: String,
    pub pdx_extracted_code: String,
    pub pdx_matched: bool,
    pub severity_counts: SeverityCounts,
}

impl AccountStatistics {
    /// All-zero / "N/A" statistics used when an account cannot be reconciled.
    pub fn sentinel() -> Self {
        Self {
            total_ground_truth_sdx: 0,
            matched_sdx: 0,
            matched_icds_overall: 0,
            accuracy_percent: 0.0,
            pdx_ground_truth_code: NOT_AVAILABLE.to_string(),
            pdx_extracted_code: NOT_AVAILABLE.to_string(),
            pdx_matched: false,
            severity_counts: SeverityCounts::default(),
        }
    }
}

/// Statistics plus comparison tables for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub statistics: AccountStatistics,
    pub severity_rows: Vec<ComparisonRow>,
    pub code_review: Vec<CodeReview>,
    pub has_severity_tags: bool,
    /// Codes listed both in the coded-diagnoses table and in the
    /// combination-code review table, in review-table order.
    pub diagnosis_overlap: Vec<String>,
    /// True when `statistics` fell back to the sentinel.
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub accounts: usize,
    pub degraded_accounts: usize,
    pub pdx_matched: usize,
    pub total_ground_truth_sdx: usize,
    pub matched_sdx: usize,
    pub mean_accuracy_percent: f64,
    pub severity_counts: SeverityCounts,
    pub severity_row_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub meta: AuditMeta,
    pub summary: AuditSummary,
    pub accounts: BTreeMap<String, AccountReport>,
}
