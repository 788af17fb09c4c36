//! Label encoding for categorical columns and the outcome target

use crate::error::{Result, ScreenerError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Maps the distinct string values of one column to integer codes.
///
/// Fitting sorts the vocabulary lexically, so codes are stable for a given
/// set of values. After fitting the vocabulary may only grow: unseen values
/// are appended with the next unused code by [`LabelEncoder::transform_or_extend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncoderRepr", into = "EncoderRepr")]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    column: String,
    classes: Vec<String>,
}

impl From<EncoderRepr> for LabelEncoder {
    fn from(repr: EncoderRepr) -> Self {
        Self::from_classes(repr.column, repr.classes)
    }
}

impl From<LabelEncoder> for EncoderRepr {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            column: encoder.column,
            classes: encoder.classes,
        }
    }
}

impl LabelEncoder {
    /// Fit an encoder on the values of `column`
    pub fn fit<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        Self::from_classes(column.into(), distinct.into_iter().collect())
    }

    /// Fit and return the codes of `values` in input order
    pub fn fit_transform<S: AsRef<str>>(column: impl Into<String>, values: &[S]) -> (Self, Vec<usize>) {
        let encoder = Self::fit(column, values.iter().map(|v| v.as_ref()));
        let codes = values
            .iter()
            .map(|v| encoder.index[v.as_ref()])
            .collect();
        (encoder, codes)
    }

    fn from_classes(column: String, classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code))
            .collect();
        Self { column, classes, index }
    }

    /// Column this encoder belongs to
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Known values, indexed by code
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    /// Code of a known value
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Encode a value, failing if it was never seen
    pub fn transform(&self, value: &str) -> Result<usize> {
        self.code_of(value).ok_or_else(|| ScreenerError::UnknownValue {
            column: self.column.clone(),
            value: value.to_string(),
        })
    }

    /// Decode a code back to its value
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| {
                ScreenerError::InvalidInput(format!(
                    "code {} out of range for column {} ({} classes)",
                    code,
                    self.column,
                    self.classes.len()
                ))
            })
    }

    /// Encode a value, appending it to the vocabulary first if unseen.
    ///
    /// Returns the code and whether the vocabulary grew.
    pub fn transform_or_extend(&mut self, value: &str) -> (usize, bool) {
        if let Some(code) = self.code_of(value) {
            return (code, false);
        }
        let code = self.classes.len();
        self.classes.push(value.to_string());
        self.index.insert(value.to_string(), code);
        (code, true)
    }
}

/// One label encoder per categorical column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl CategoricalEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, encoder: LabelEncoder) {
        self.encoders.insert(encoder.column().to_string(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut LabelEncoder> {
        self.encoders.get_mut(column)
    }

    /// Encoded column names in sorted order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Encode a known value of `column`
    pub fn transform(&self, column: &str, value: &str) -> Result<usize> {
        self.get(column)
            .ok_or_else(|| ScreenerError::FeatureNotFound(column.to_string()))?
            .transform(value)
    }
}

/// Encoders shared by concurrent request handlers.
///
/// All vocabulary growth goes through one write lock, so two requests that
/// introduce the same unseen value get the same code and the vocabulary
/// grows once.
#[derive(Debug, Default)]
pub struct SharedEncoders {
    inner: RwLock<CategoricalEncoders>,
}

impl SharedEncoders {
    pub fn new(encoders: CategoricalEncoders) -> Self {
        Self {
            inner: RwLock::new(encoders),
        }
    }

    /// Encode `value`, growing the column's vocabulary when it is unseen
    pub fn encode_or_extend(&self, column: &str, value: &str) -> Result<usize> {
        {
            let encoders = self.inner.read();
            let encoder = encoders
                .get(column)
                .ok_or_else(|| ScreenerError::FeatureNotFound(column.to_string()))?;
            if let Some(code) = encoder.code_of(value) {
                return Ok(code);
            }
        }

        let mut encoders = self.inner.write();
        let encoder = encoders
            .get_mut(column)
            .ok_or_else(|| ScreenerError::FeatureNotFound(column.to_string()))?;
        let (code, grew) = encoder.transform_or_extend(value);
        if grew {
            debug!(column, value, code, vocabulary = encoder.len(), "Appended unseen category");
        }
        Ok(code)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.inner.read().get(column).is_some()
    }

    /// Current vocabulary size of a column
    pub fn vocabulary_len(&self, column: &str) -> Option<usize> {
        self.inner.read().get(column).map(LabelEncoder::len)
    }

    /// Copy of the current encoders
    pub fn snapshot(&self) -> CategoricalEncoders {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fit_sorts_vocabulary() {
        let encoder = LabelEncoder::fit("country_code", ["USA", "DEU", "USA", "FRA"]);
        assert_eq!(encoder.classes(), &["DEU", "FRA", "USA"]);
        assert_eq!(encoder.transform("USA").unwrap(), 2);
    }

    #[test]
    fn test_round_trip() {
        let (encoder, codes) = LabelEncoder::fit_transform("city", &["Berlin", "Austin", "Berlin"]);
        assert_eq!(codes, vec![1, 0, 1]);
        for value in ["Berlin", "Austin"] {
            let code = encoder.transform(value).unwrap();
            assert_eq!(encoder.inverse_transform(code).unwrap(), value);
        }
    }

    #[test]
    fn test_unknown_value_errors() {
        let encoder = LabelEncoder::fit("region", ["A", "B"]);
        let err = encoder.transform("C").unwrap_err();
        assert!(matches!(err, ScreenerError::UnknownValue { .. }));
    }

    #[test]
    fn test_extend_grows_by_one() {
        let mut encoder = LabelEncoder::fit("region", ["A", "B"]);
        let (code, grew) = encoder.transform_or_extend("Z");
        assert!(grew);
        assert_eq!(code, 2);
        assert_eq!(encoder.len(), 3);

        let (again, grew_again) = encoder.transform_or_extend("Z");
        assert!(!grew_again);
        assert_eq!(again, 2);
        assert_eq!(encoder.len(), 3);
    }

    #[test]
    fn test_serde_preserves_appended_order() {
        let mut encoder = LabelEncoder::fit("city", ["b", "c"]);
        encoder.transform_or_extend("a");
        let bytes = bincode::serialize(&encoder).unwrap();
        let restored: LabelEncoder = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, encoder);
        assert_eq!(restored.transform("a").unwrap(), 2);
    }

    #[test]
    fn test_shared_encoders_concurrent_same_value() {
        let mut encoders = CategoricalEncoders::new();
        encoders.insert(LabelEncoder::fit("country_code", ["USA", "GBR"]));
        let shared = Arc::new(SharedEncoders::new(encoders));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.encode_or_extend("country_code", "XX").unwrap())
            })
            .collect();
        let codes: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(codes.iter().all(|&c| c == 2));
        assert_eq!(shared.vocabulary_len("country_code"), Some(3));
    }

    #[test]
    fn test_shared_encoders_unknown_column() {
        let shared = SharedEncoders::default();
        assert!(matches!(
            shared.encode_or_extend("nope", "x"),
            Err(ScreenerError::FeatureNotFound(_))
        ));
    }
}
