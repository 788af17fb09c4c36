//! Model persistence module
//!
//! Binary artifacts are bincode envelopes stamped with the column contract
//! fingerprint; the training report is pretty-printed JSON.

pub mod artifacts;
pub mod versioning;

pub use artifacts::{
    ArtifactStore, ModelBundle, CONTRACT_FILE, ENCODERS_FILE, REPORT_FILE, REQUIRED_ARTIFACTS,
    SUCCESS_MODEL_FILE, TARGET_ENCODER_FILE, TARGET_MODELS_FILE,
};
pub use versioning::{ArtifactEnvelope, ArtifactKind, EnvelopeHeader, FORMAT_VERSION, MAGIC};
