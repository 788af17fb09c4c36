//! Outcome screener - startup outcome prediction
//!
//! Trains per-outcome binary classifiers (IPO, funding round, acquisition,
//! closure, no event) on a company dataset and serves predictions and
//! company search over HTTP.
//!
//! # Modules
//!
//! - [`schema`] - Column lists and outcome targets
//! - [`preprocessing`] - Label encoding and feature assembly
//! - [`training`] - Tree ensembles, cross-validation and the classifier bank
//! - [`export`] - Versioned artifact store
//! - [`inference`] - Company form parsing and prediction
//! - [`search`] - Company name search
//! - [`server`] - HTTP service
//! - [`cli`] - Command-line interface

pub mod error;
pub mod schema;

pub mod preprocessing;
pub mod training;
pub mod export;
pub mod inference;
pub mod search;

pub mod utils;

pub mod server;
pub mod cli;

pub use error::{Result, ScreenerError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, ScreenerError};
    pub use crate::schema::{ClassifierKind, OutcomeTarget};
    pub use crate::preprocessing::{ColumnContract, FeatureAssembler, LabelEncoder, SharedEncoders};
    pub use crate::training::{ClassifierBank, TrainingConfig, TrainingReport};
    pub use crate::export::{ArtifactStore, ModelBundle};
    pub use crate::inference::{CompanyForm, Prediction, Predictor};
    pub use crate::search::CompanyIndex;
    pub use crate::utils::DataLoader;
}
