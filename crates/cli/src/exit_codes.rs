//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | audit            | Reconciliation audit codes               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Audit (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_AUDIT_INVALID_CONFIG: u8 = 60;

/// Input could not be read or parsed, or output could not be written.
pub const EXIT_AUDIT_RUNTIME: u8 = 61;

/// Batch mean accuracy fell below `--min-accuracy`.
pub const EXIT_AUDIT_BELOW_THRESHOLD: u8 = 62;
