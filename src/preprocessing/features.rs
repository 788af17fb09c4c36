//! Feature assembly and the column order contract

use crate::error::{Result, ScreenerError};
use crate::schema::{self, MISSING_CATEGORY, OUTCOME_COLUMN};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::info;

use super::encoder::{CategoricalEncoders, LabelEncoder};

/// Ordered feature names fixed at training time.
///
/// Every row handed to a classifier must be laid out in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnContract {
    columns: Vec<String>,
}

impl ColumnContract {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Lay a record out in contract order. Columns the record lacks become 0,
    /// columns the contract lacks are dropped.
    pub fn reindex(&self, record: &HashMap<String, f64>) -> Array1<f64> {
        self.columns
            .iter()
            .map(|column| record.get(column).copied().unwrap_or(0.0))
            .collect()
    }

    /// Same as [`reindex`](Self::reindex) but shaped as a single-row matrix
    pub fn reindex_row(&self, record: &HashMap<String, f64>) -> Array2<f64> {
        self.reindex(record).insert_axis(Axis(0))
    }

    /// Contract columns that `provided` cannot fill
    pub fn missing_from<'a>(&'a self, provided: &[&str]) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|column| !provided.contains(column))
            .collect()
    }

    /// Stable digest of the ordered column names
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for column in &self.columns {
            hasher.update(column.as_bytes());
            hasher.update([0u8]);
        }
        hasher
            .finalize()
            .iter()
            .take(8)
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

/// Output of the feature assembly pass
#[derive(Debug, Clone)]
pub struct AssembledFeatures {
    /// Row-major feature matrix in contract order
    pub x: Array2<f64>,
    pub contract: ColumnContract,
    /// Encoders for the categorical columns present in the contract
    pub encoders: CategoricalEncoders,
    /// Raw outcome code per row
    pub outcomes: Vec<String>,
}

/// Turns the raw company table into a numeric feature matrix
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Drop excluded columns, label-encode categoricals, cast the rest to f64
    pub fn assemble(&self, df: &DataFrame) -> Result<AssembledFeatures> {
        let outcomes = string_values(column_series(df, OUTCOME_COLUMN)?)?;

        let feature_cols: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| !schema::is_excluded(name))
            .collect();

        if feature_cols.is_empty() {
            return Err(ScreenerError::DataError(
                "no feature columns left after exclusion".to_string(),
            ));
        }

        let mut encoders = CategoricalEncoders::new();
        let col_data: Vec<Vec<f64>> = feature_cols
            .iter()
            .map(|name| {
                let series = column_series(df, name)?;
                if schema::is_categorical(name) {
                    let values = string_values(series)?;
                    let (encoder, codes) = LabelEncoder::fit_transform(name.as_str(), &values);
                    encoders.insert(encoder);
                    Ok(codes.into_iter().map(|c| c as f64).collect())
                } else {
                    numeric_values(name, series)
                }
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let n_rows = df.height();
        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        let x = Array2::from_shape_fn((n_rows, feature_cols.len()), |(r, c)| col_refs[c][r]);

        info!(
            rows = n_rows,
            features = feature_cols.len(),
            categorical = encoders.len(),
            "Assembled feature matrix"
        );

        Ok(AssembledFeatures {
            x,
            contract: ColumnContract::new(feature_cols),
            encoders,
            outcomes,
        })
    }
}

fn column_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    Ok(df
        .column(name)
        .map_err(|_| ScreenerError::FeatureNotFound(name.to_string()))?
        .as_materialized_series())
}

/// Values of a column as strings; nulls become [`MISSING_CATEGORY`]
pub fn string_values(series: &Series) -> Result<Vec<String>> {
    let casted = series
        .cast(&DataType::String)
        .map_err(|e| ScreenerError::DataError(e.to_string()))?;
    let values = casted
        .str()
        .map_err(|e| ScreenerError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(MISSING_CATEGORY).to_string())
        .collect();
    Ok(values)
}

/// Values of a numeric column as f64; nulls and NaN become 0
fn numeric_values(name: &str, series: &Series) -> Result<Vec<f64>> {
    if series.dtype() == &DataType::String {
        return Err(ScreenerError::DataError(format!(
            "column '{}' is text but not declared categorical",
            name
        )));
    }
    let casted = series
        .cast(&DataType::Float64)
        .map_err(|e| ScreenerError::DataError(e.to_string()))?;
    let values = casted
        .f64()
        .map_err(|e| ScreenerError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => x,
            _ => 0.0,
        })
        .collect();
    Ok(values)
}
