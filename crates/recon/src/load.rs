//! Ingestion adapters: already-read CSV / JSON text → normalized records
//! grouped by account. No filesystem access happens here.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::AuditConfig;
use crate::error::ReconError;
use crate::model::{
    AccountInput, AuditInput, DiagnosisRecord, GroundTruthRecord, GroundTruthRole, SourceTable,
};
use crate::normalize::{normalize_extracted, normalize_ground_truth, RawRecord};

/// Load one ground-truth CSV (the PDX file or the SDX file).
///
/// Row order is preserved within each account.
pub fn load_ground_truth_csv(
    csv_data: &str,
    role: GroundTruthRole,
    config: &AuditConfig,
) -> Result<BTreeMap<String, Vec<GroundTruthRecord>>, ReconError> {
    let source = format!("ground truth {role}");
    let rows = read_csv_rows(&source, csv_data, &config.ground_truth.account_columns)?;

    let mut grouped: BTreeMap<String, Vec<GroundTruthRecord>> = BTreeMap::new();
    for (account_id, raw) in rows {
        let record = normalize_ground_truth(&account_id, &raw, role, &config.fields);
        grouped.entry(account_id).or_default().push(record);
    }
    log::info!("{source}: loaded {} account(s)", grouped.len());
    Ok(grouped)
}

/// Keys of the per-table form of an extracted account.
const TABLE_KEYS: [(&str, SourceTable); 2] = [
    ("coded_diagnoses", SourceTable::CodedDiagnoses),
    ("combination_code_review", SourceTable::CombinationReview),
];

/// Load extracted diagnoses from a JSON object keyed by account id.
///
/// Each account is either a flat `[diagnosis, ...]` array, whose rows get
/// their table from the code column they carry, or an object holding
/// `coded_diagnoses` and `combination_code_review` arrays. Anything else, and
/// array elements that are not objects, are skipped with a warning.
pub fn load_extracted_json(
    json_data: &str,
    config: &AuditConfig,
) -> Result<BTreeMap<String, Vec<DiagnosisRecord>>, ReconError> {
    let root: Value = serde_json::from_str(json_data).map_err(|e| ReconError::Parse {
        source: "extracted".into(),
        message: e.to_string(),
    })?;
    let Value::Object(accounts) = root else {
        return Err(ReconError::Parse {
            source: "extracted".into(),
            message: "expected a JSON object keyed by account id".into(),
        });
    };

    let mut grouped: BTreeMap<String, Vec<DiagnosisRecord>> = BTreeMap::new();
    for (account_id, entries) in accounts {
        let account_id = account_id.trim().to_string();
        match entries {
            Value::Array(entries) => {
                let records = grouped.entry(account_id.clone()).or_default();
                push_entries(&account_id, entries, None, records, config);
            }
            Value::Object(mut tables) => {
                let records = grouped.entry(account_id.clone()).or_default();
                for (key, table) in TABLE_KEYS {
                    match tables.remove(key) {
                        Some(Value::Array(entries)) => {
                            push_entries(&account_id, entries, Some(table), records, config)
                        }
                        Some(other) => log::warn!(
                            "extracted: account {account_id}: {key} is not an array ({}), skipping",
                            json_kind(&other)
                        ),
                        None => {}
                    }
                }
            }
            other => {
                log::warn!(
                    "extracted: account {account_id}: expected an array or table object, got {}, skipping",
                    json_kind(&other)
                );
            }
        }
    }
    log::info!("extracted: loaded {} account(s)", grouped.len());
    Ok(grouped)
}

/// Normalize one extracted table. `table` overrides the column-based inference.
fn push_entries(
    account_id: &str,
    entries: Vec<Value>,
    table: Option<SourceTable>,
    records: &mut Vec<DiagnosisRecord>,
    config: &AuditConfig,
) {
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(fields) => {
                let raw: RawRecord = fields.into_iter().collect();
                let mut record = normalize_extracted(account_id, &raw, &config.fields);
                if let Some(table) = table {
                    record.source_table = table;
                }
                records.push(record);
            }
            other => {
                log::warn!(
                    "extracted: account {account_id}: entry {idx} is not an object ({}), skipping",
                    json_kind(&other)
                );
            }
        }
    }
}

/// Load extracted diagnoses from flat CSV rows carrying an account column.
pub fn load_extracted_csv(
    csv_data: &str,
    config: &AuditConfig,
) -> Result<BTreeMap<String, Vec<DiagnosisRecord>>, ReconError> {
    let rows = read_csv_rows("extracted", csv_data, &config.extracted.account_columns)?;

    let mut grouped: BTreeMap<String, Vec<DiagnosisRecord>> = BTreeMap::new();
    for (account_id, raw) in rows {
        let record = normalize_extracted(&account_id, &raw, &config.fields);
        grouped.entry(account_id).or_default().push(record);
    }
    log::info!("extracted: loaded {} account(s)", grouped.len());
    Ok(grouped)
}

/// Join the three sources into per-account inputs over the union of account ids.
pub fn assemble_input(
    mut extracted: BTreeMap<String, Vec<DiagnosisRecord>>,
    mut ground_truth_pdx: BTreeMap<String, Vec<GroundTruthRecord>>,
    mut ground_truth_sdx: BTreeMap<String, Vec<GroundTruthRecord>>,
) -> AuditInput {
    let mut account_ids: Vec<String> = extracted.keys().cloned().collect();
    account_ids.extend(ground_truth_pdx.keys().cloned());
    account_ids.extend(ground_truth_sdx.keys().cloned());
    account_ids.sort();
    account_ids.dedup();

    let accounts = account_ids
        .into_iter()
        .map(|id| {
            let input = AccountInput {
                extracted: extracted.remove(&id).unwrap_or_default(),
                ground_truth_pdx: ground_truth_pdx.remove(&id).unwrap_or_default(),
                ground_truth_sdx: ground_truth_sdx.remove(&id).unwrap_or_default(),
            };
            (id, input)
        })
        .collect();

    AuditInput { accounts }
}

/// Read CSV rows as raw records, paired with the trimmed account id.
/// Rows without an account id are dropped.
fn read_csv_rows(
    source: &str,
    csv_data: &str,
    account_columns: &[String],
) -> Result<Vec<(String, RawRecord)>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Parse {
            source: source.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let account_idx = account_columns
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| ReconError::MissingColumn {
            source: source.into(),
            column: account_columns.join(", "),
        })?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Parse {
            source: source.into(),
            message: e.to_string(),
        })?;

        let account_id = record.get(account_idx).unwrap_or("").trim().to_string();
        if account_id.is_empty() {
            log::warn!("{source}: row {} has no account id, skipping", line + 1);
            continue;
        }

        let raw: RawRecord = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| record.get(i).map(|v| (h.clone(), Value::String(v.to_string()))))
            .collect();
        rows.push((account_id, raw));
    }

    Ok(rows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
