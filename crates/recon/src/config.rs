use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    pub name: String,
    pub inputs: InputFiles,
    #[serde(default)]
    pub fields: FieldAliases,
    #[serde(default)]
    pub ground_truth: GroundTruthSource,
    #[serde(default)]
    pub extracted: ExtractedSource,
}

/// Input files, resolved relative to the config file's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct InputFiles {
    pub extracted: String,
    pub ground_truth_pdx: String,
    pub ground_truth_sdx: String,
}

// ---------------------------------------------------------------------------
// Field aliases
// ---------------------------------------------------------------------------

/// Source column names per canonical field. The first alias present on a row wins.
///
/// Defaults cover the known exports: the extraction's "A. Coded Diagnoses"
/// table, its lower-cased combination-code review table, and the
/// `pdx_gt` / `sdx_gt` ground-truth CSVs.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAliases {
    #[serde(default = "default_icd_code")]
    pub icd_code: Vec<String>,
    #[serde(default = "default_description")]
    pub description: Vec<String>,
    #[serde(default = "default_diagnosis_role")]
    pub diagnosis_role: Vec<String>,
    #[serde(default = "default_severity")]
    pub severity: Vec<String>,
    #[serde(default = "default_present_on_admission")]
    pub present_on_admission: Vec<String>,
    #[serde(default = "default_supporting_documentation")]
    pub supporting_documentation: Vec<String>,
    #[serde(default = "default_guideline_reference")]
    pub guideline_reference: Vec<String>,
    #[serde(default = "default_patient_encounter_id")]
    pub patient_encounter_id: Vec<String>,
    #[serde(default = "default_severity_of_illness")]
    pub severity_of_illness: Vec<String>,
    #[serde(default = "default_risk_of_mortality")]
    pub risk_of_mortality: Vec<String>,
    /// ICD code columns that only the combination-code review table uses.
    /// A row whose code is read from one of these is tagged
    /// `SourceTable::CombinationReview`. May be empty.
    #[serde(default = "default_combination_icd_code")]
    pub combination_icd_code: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            icd_code: default_icd_code(),
            description: default_description(),
            diagnosis_role: default_diagnosis_role(),
            severity: default_severity(),
            present_on_admission: default_present_on_admission(),
            supporting_documentation: default_supporting_documentation(),
            guideline_reference: default_guideline_reference(),
            patient_encounter_id: default_patient_encounter_id(),
            severity_of_illness: default_severity_of_illness(),
            risk_of_mortality: default_risk_of_mortality(),
            combination_icd_code: default_combination_icd_code(),
        }
    }
}

impl FieldAliases {
    fn lists(&self) -> [(&'static str, &Vec<String>); 10] {
        [
            ("icd_code", &self.icd_code),
            ("description", &self.description),
            ("diagnosis_role", &self.diagnosis_role),
            ("severity", &self.severity),
            ("present_on_admission", &self.present_on_admission),
            ("supporting_documentation", &self.supporting_documentation),
            ("guideline_reference", &self.guideline_reference),
            ("patient_encounter_id", &self.patient_encounter_id),
            ("severity_of_illness", &self.severity_of_illness),
            ("risk_of_mortality", &self.risk_of_mortality),
        ]
    }
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_icd_code() -> Vec<String> {
    aliases(&["ICD-10-CM Code", "icd-10-cm code", "icd_code", "ICD_CODE"])
}

fn default_description() -> Vec<String> {
    aliases(&["Diagnosis/Condition", "description", "icd_term"])
}

fn default_diagnosis_role() -> Vec<String> {
    aliases(&["Type", "type", "diagnosis_role"])
}

fn default_severity() -> Vec<String> {
    aliases(&["CC/MCC", "cc/mcc", "cc_mcc", "ccmcc"])
}

fn default_present_on_admission() -> Vec<String> {
    aliases(&["POA", "poa"])
}

fn default_supporting_documentation() -> Vec<String> {
    aliases(&["Supporting Documentation & Location", "supporting_documentation"])
}

fn default_guideline_reference() -> Vec<String> {
    aliases(&["Coding Clinic/Guideline Reference", "coding_clinic_reference"])
}

fn default_patient_encounter_id() -> Vec<String> {
    aliases(&["pat_enc_id", "patient_encounter_id"])
}

fn default_severity_of_illness() -> Vec<String> {
    aliases(&["SOI", "soi"])
}

fn default_risk_of_mortality() -> Vec<String> {
    aliases(&["ROM", "rom"])
}

fn default_combination_icd_code() -> Vec<String> {
    aliases(&["icd-10-cm code"])
}

fn default_account_columns() -> Vec<String> {
    aliases(&["acct_number", "account_number"])
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruthSource {
    #[serde(default = "default_account_columns")]
    pub account_columns: Vec<String>,
}

impl Default for GroundTruthSource {
    fn default() -> Self {
        Self {
            account_columns: default_account_columns(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedSource {
    #[serde(default)]
    pub format: ExtractedFormat,
    /// Only consulted for the CSV form.
    #[serde(default = "default_account_columns")]
    pub account_columns: Vec<String>,
}

impl Default for ExtractedSource {
    fn default() -> Self {
        Self {
            format: ExtractedFormat::default(),
            account_columns: default_account_columns(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedFormat {
    /// Object mapping account id to an array of diagnosis objects.
    #[default]
    Json,
    /// Flat rows with an account column.
    Csv,
}

impl std::fmt::Display for ExtractedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AuditConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: AuditConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        let inputs = [
            ("extracted", &self.inputs.extracted),
            ("ground_truth_pdx", &self.inputs.ground_truth_pdx),
            ("ground_truth_sdx", &self.inputs.ground_truth_sdx),
        ];
        for (key, path) in inputs {
            if path.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "inputs.{key} must not be empty"
                )));
            }
        }

        for (field, list) in self.fields.lists() {
            if list.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "fields.{field} needs at least one column alias"
                )));
            }
        }

        if self.ground_truth.account_columns.is_empty() {
            return Err(ReconError::ConfigValidation(
                "ground_truth.account_columns needs at least one column".into(),
            ));
        }
        if self.extracted.format == ExtractedFormat::Csv
            && self.extracted.account_columns.is_empty()
        {
            return Err(ReconError::ConfigValidation(
                "extracted.account_columns needs at least one column for csv input".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
