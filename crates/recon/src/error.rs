use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty alias list, missing input path, etc.).
    ConfigValidation(String),
    /// Missing required column in a ground-truth or extracted CSV.
    MissingColumn { source: String, column: String },
    /// Malformed CSV / JSON payload.
    Parse { source: String, message: String },
    /// A record handed to an account's reconciliation belongs to another account.
    AccountMismatch { account_id: String, record_account_id: String },
    /// A derived statistic fell outside its valid range.
    InvalidStatistic { account_id: String, name: String, value: f64 },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column (expected one of {column})")
            }
            Self::Parse { source, message } => write!(f, "{source}: {message}"),
            Self::AccountMismatch { account_id, record_account_id } => {
                write!(
                    f,
                    "account '{account_id}': received record for account '{record_account_id}'"
                )
            }
            Self::InvalidStatistic { account_id, name, value } => {
                write!(f, "account '{account_id}': {name} out of range ({value})")
            }
        }
    }
}

impl std::error::Error for ReconError {}
