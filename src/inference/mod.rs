//! Prediction service
//!
//! Parses the company form, encodes it against the loaded artifacts
//! (absorbing unseen categories) and runs the deployment classifier or the
//! per-target bank.

pub mod engine;
pub mod request;

pub use engine::{confidence, OutcomeResult, Prediction, Predictor};
pub use request::{form_columns, CompanyForm, CompanyRecord, FieldSpec, FieldType, COMPANY_FIELDS, FORM_PREFIX};
