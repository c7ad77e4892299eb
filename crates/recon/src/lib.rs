//! `dxaudit-recon`: diagnosis code reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded extracted and ground-truth
//! records, returns per-account match classification, accuracy and CC/MCC
//! statistics. No CLI or filesystem dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod load;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod review;
pub mod severity;

pub use aggregate::reconcile;
pub use config::AuditConfig;
pub use engine::{reconcile_all, run};
pub use error::ReconError;
pub use matcher::{best_reference, classify};
pub use model::{AccountInput, AccountReport, AuditInput, AuditResult, DiagnosisRecord, GroundTruthRecord};
pub use severity::compare_severity;
