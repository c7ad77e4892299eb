//! `dxaudit run` / `dxaudit validate`: config-driven diagnosis code audit.

use std::path::{Path, PathBuf};

use dxaudit_recon::config::{AuditConfig, ExtractedFormat};
use dxaudit_recon::load::{assemble_input, load_extracted_csv, load_extracted_json, load_ground_truth_csv};
use dxaudit_recon::model::{AuditInput, GroundTruthRole};

use crate::exit_codes::{EXIT_AUDIT_BELOW_THRESHOLD, EXIT_AUDIT_INVALID_CONFIG, EXIT_AUDIT_RUNTIME};
use crate::CliError;

fn audit_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        audit_err(EXIT_AUDIT_RUNTIME, format!("cannot read {}: {e}", path.display()))
            .with_hint("input paths are resolved relative to the config file")
    })
}

fn load_config(config_path: &Path) -> Result<AuditConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("cannot read config: {e}")))?;
    AuditConfig::from_toml(&config_str).map_err(|e| audit_err(EXIT_AUDIT_INVALID_CONFIG, e.to_string()))
}

/// Read and normalize all three sources named by the config.
fn load_input(config: &AuditConfig, base_dir: &Path) -> Result<AuditInput, CliError> {
    let runtime = |e: dxaudit_recon::ReconError| audit_err(EXIT_AUDIT_RUNTIME, e.to_string());

    let extracted_data = read_input(&base_dir.join(&config.inputs.extracted))?;
    let extracted = match config.extracted.format {
        ExtractedFormat::Json => load_extracted_json(&extracted_data, config),
        ExtractedFormat::Csv => load_extracted_csv(&extracted_data, config),
    }
    .map_err(runtime)?;

    let pdx_data = read_input(&base_dir.join(&config.inputs.ground_truth_pdx))?;
    let pdx = load_ground_truth_csv(&pdx_data, GroundTruthRole::Pdx, config).map_err(runtime)?;

    let sdx_data = read_input(&base_dir.join(&config.inputs.ground_truth_sdx))?;
    let sdx = load_ground_truth_csv(&sdx_data, GroundTruthRole::Sdx, config).map_err(runtime)?;

    let input = assemble_input(extracted, pdx, sdx);
    log::debug!("{} account(s) across all sources", input.accounts.len());
    Ok(input)
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    min_accuracy: Option<f64>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    log::info!("running audit '{}' from {}", config.name, config_path.display());

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_input(&config, base_dir)?;

    let result = dxaudit_recon::run(&config, &input);

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| audit_err(EXIT_AUDIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "audit '{}': {} account(s), mean accuracy {:.1}%, {} PDX matched, {}/{} SDX matched, {} degraded",
        result.meta.config_name,
        s.accounts,
        s.mean_accuracy_percent,
        s.pdx_matched,
        s.matched_sdx,
        s.total_ground_truth_sdx,
        s.degraded_accounts,
    );
    eprintln!(
        "severity: ground truth {} CC / {} MCC, extracted {} CC / {} MCC",
        s.severity_counts.gt_cc,
        s.severity_counts.gt_mcc,
        s.severity_counts.extracted_cc,
        s.severity_counts.extracted_mcc,
    );

    if let Some(threshold) = min_accuracy {
        if s.mean_accuracy_percent < threshold {
            return Err(audit_err(
                EXIT_AUDIT_BELOW_THRESHOLD,
                format!(
                    "mean accuracy {:.1}% is below the {:.1}% threshold",
                    s.mean_accuracy_percent, threshold
                ),
            ));
        }
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: audit '{}' ({} extracted input, ground truth {} + {})",
        config.name,
        config.extracted.format,
        config.inputs.ground_truth_pdx,
        config.inputs.ground_truth_sdx,
    );
    Ok(())
}
