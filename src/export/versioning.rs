//! Versioned artifact envelopes
//!
//! Every binary artifact is written as a bincode [`ArtifactEnvelope`]: a
//! fixed header (magic, format version, kind, contract fingerprint, creation
//! time) followed by the payload. Readers check the header before touching
//! the payload, so a stale or foreign file fails with a clear message instead
//! of a garbled deserialization error.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, ScreenerError};

/// Leading bytes of every artifact ("OSCR")
pub const MAGIC: u32 = 0x4F53_4352;

/// Bumped whenever a payload layout changes
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    SuccessModel,
    TargetModels,
    CategoricalEncoders,
    TargetEncoder,
    ColumnContract,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::SuccessModel => "success model",
            ArtifactKind::TargetModels => "target models",
            ArtifactKind::CategoricalEncoders => "categorical encoders",
            ArtifactKind::TargetEncoder => "target encoder",
            ArtifactKind::ColumnContract => "column contract",
        };
        f.write_str(name)
    }
}

/// Header fields, in the same order as the start of [`ArtifactEnvelope`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub magic: u32,
    pub format_version: u32,
    pub kind: ArtifactKind,
    /// Fingerprint of the column contract the payload was built against
    pub contract_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// Header plus payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub magic: u32,
    pub format_version: u32,
    pub kind: ArtifactKind,
    pub contract_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub payload: T,
}

impl<T> ArtifactEnvelope<T> {
    pub fn new(kind: ArtifactKind, contract_fingerprint: impl Into<String>, payload: T) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            kind,
            contract_fingerprint: contract_fingerprint.into(),
            created_at: Utc::now(),
            payload,
        }
    }
}

impl<T: Serialize> ArtifactEnvelope<T> {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?).map_err(|e| {
            ScreenerError::ArtifactError(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

impl<T: DeserializeOwned> ArtifactEnvelope<T> {
    /// Decode an envelope of `expected` kind, validating the header first
    pub fn from_bytes(bytes: &[u8], expected: ArtifactKind) -> Result<Self> {
        let header: EnvelopeHeader = bincode::deserialize(bytes)
            .map_err(|e| ScreenerError::ArtifactError(format!("unreadable artifact header: {}", e)))?;

        if header.magic != MAGIC {
            return Err(ScreenerError::ArtifactError(
                "not a screener artifact (bad magic)".to_string(),
            ));
        }
        if header.format_version != FORMAT_VERSION {
            return Err(ScreenerError::ArtifactError(format!(
                "artifact format version {} is not supported (expected {})",
                header.format_version, FORMAT_VERSION
            )));
        }
        if header.kind != expected {
            return Err(ScreenerError::ArtifactError(format!(
                "expected {} artifact, found {}",
                expected, header.kind
            )));
        }

        Ok(bincode::deserialize(bytes)?)
    }

    pub fn read(path: &Path, expected: ArtifactKind) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            ScreenerError::ArtifactError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes, expected).map_err(|e| match e {
            ScreenerError::ArtifactError(msg) => {
                ScreenerError::ArtifactError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Fail unless the payload was built against `fingerprint`
    pub fn expect_fingerprint(self, fingerprint: &str) -> Result<Self> {
        if self.contract_fingerprint != fingerprint {
            return Err(ScreenerError::ArtifactError(format!(
                "{} was built for column contract {} but the current contract is {}",
                self.kind, self.contract_fingerprint, fingerprint
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_prefix_decodes() {
        let envelope = ArtifactEnvelope::new(ArtifactKind::ColumnContract, "abc", vec![1u32, 2, 3]);
        let bytes = envelope.to_bytes().unwrap();
        let back: ArtifactEnvelope<Vec<u32>> =
            ArtifactEnvelope::from_bytes(&bytes, ArtifactKind::ColumnContract).unwrap();
        assert_eq!(back.payload, vec![1, 2, 3]);
        assert_eq!(back.contract_fingerprint, "abc");
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let bytes = ArtifactEnvelope::new(ArtifactKind::TargetEncoder, "abc", 7u8)
            .to_bytes()
            .unwrap();
        let err = ArtifactEnvelope::<u8>::from_bytes(&bytes, ArtifactKind::SuccessModel).unwrap_err();
        assert!(err.to_string().contains("expected success model artifact"));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut envelope = ArtifactEnvelope::new(ArtifactKind::TargetEncoder, "abc", 7u8);
        envelope.magic = 0xDEAD_BEEF;
        let bytes = envelope.to_bytes().unwrap();
        let err = ArtifactEnvelope::<u8>::from_bytes(&bytes, ArtifactKind::TargetEncoder).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let mut envelope = ArtifactEnvelope::new(ArtifactKind::TargetEncoder, "abc", 7u8);
        envelope.format_version = FORMAT_VERSION + 1;
        let bytes = envelope.to_bytes().unwrap();
        assert!(ArtifactEnvelope::<u8>::from_bytes(&bytes, ArtifactKind::TargetEncoder).is_err());
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let envelope = ArtifactEnvelope::new(ArtifactKind::SuccessModel, "aaaa", 0u8);
        assert!(envelope.clone().expect_fingerprint("aaaa").is_ok());
        assert!(envelope.expect_fingerprint("bbbb").is_err());
    }
}
