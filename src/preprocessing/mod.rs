//! Data preprocessing module
//!
//! - Label encoding of categorical columns, growing at inference time
//! - Feature assembly from the raw company table
//! - The column order contract shared by training and inference

pub mod encoder;
pub mod features;

pub use encoder::{CategoricalEncoders, LabelEncoder, SharedEncoders};
pub use features::{string_values, AssembledFeatures, ColumnContract, FeatureAssembler};
