//! Record normalizer: heterogeneous source rows → canonical records.
//!
//! Never fails. Missing or malformed fields degrade to an empty string,
//! `SeverityTag::None` or `DiagnosisRole::Unknown`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::FieldAliases;
use crate::model::{
    DiagnosisRecord, DiagnosisRole, GroundTruthRecord, GroundTruthRole, SeverityTag, SourceTable,
};

/// One source row, keyed by the source's own column names.
pub type RawRecord = BTreeMap<String, Value>;

/// Placeholder some exports write for "no code".
const CODE_PLACEHOLDER: &str = "-";

/// Coerce a raw value to text. Nested arrays/objects carry no usable scalar.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Text of the first alias present on the row, or empty.
pub fn field_text(raw: &RawRecord, aliases: &[String]) -> String {
    aliases
        .iter()
        .find_map(|alias| raw.get(alias))
        .map(value_text)
        .unwrap_or_default()
}

/// Infer the extraction table from which ICD column the row carries.
pub fn source_table(raw: &RawRecord, aliases: &FieldAliases) -> SourceTable {
    let code_column = aliases.icd_code.iter().find(|alias| raw.contains_key(alias.as_str()));
    match code_column {
        Some(column) if aliases.combination_icd_code.contains(column) => SourceTable::CombinationReview,
        _ => SourceTable::CodedDiagnoses,
    }
}

pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    if code == CODE_PLACEHOLDER {
        String::new()
    } else {
        code.to_string()
    }
}

pub fn normalize_role(role: &str) -> DiagnosisRole {
    match role.trim().to_uppercase().as_str() {
        "PDX" => DiagnosisRole::Pdx,
        "ADX" => DiagnosisRole::Adx,
        "SDX" => DiagnosisRole::Sdx,
        _ => DiagnosisRole::Unknown,
    }
}

pub fn normalize_severity(severity: &str) -> SeverityTag {
    match severity.trim().to_uppercase().as_str() {
        "CC" => SeverityTag::Cc,
        "MCC" => SeverityTag::Mcc,
        _ => SeverityTag::None,
    }
}

pub fn normalize_extracted(account_id: &str, raw: &RawRecord, aliases: &FieldAliases) -> DiagnosisRecord {
    DiagnosisRecord {
        account_id: account_id.to_string(),
        icd_code: normalize_code(&field_text(raw, &aliases.icd_code)),
        description: field_text(raw, &aliases.description),
        diagnosis_role: normalize_role(&field_text(raw, &aliases.diagnosis_role)),
        severity_tag: normalize_severity(&field_text(raw, &aliases.severity)),
        present_on_admission: field_text(raw, &aliases.present_on_admission),
        supporting_documentation: field_text(raw, &aliases.supporting_documentation),
        guideline_reference: field_text(raw, &aliases.guideline_reference),
        source_table: source_table(raw, aliases),
    }
}

/// `role` comes from which ground-truth file the row was read from.
pub fn normalize_ground_truth(
    account_id: &str,
    raw: &RawRecord,
    role: GroundTruthRole,
    aliases: &FieldAliases,
) -> GroundTruthRecord {
    GroundTruthRecord {
        account_id: account_id.to_string(),
        icd_code: normalize_code(&field_text(raw, &aliases.icd_code)),
        description: field_text(raw, &aliases.description),
        diagnosis_role: role,
        severity_tag: normalize_severity(&field_text(raw, &aliases.severity)),
        patient_encounter_id: field_text(raw, &aliases.patient_encounter_id),
        severity_of_illness: field_text(raw, &aliases.severity_of_illness),
        risk_of_mortality: field_text(raw, &aliases.risk_of_mortality),
    }
}
