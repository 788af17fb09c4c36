//! Company form schema and parsing
//!
//! The form carries one field per modeled column, named `company_<column>`.
//! The schema is declared statically in [`COMPANY_FIELDS`]; parsing turns the
//! raw strings into categorical values and numbers.

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use FieldType::{Categorical, Float, Integer};

/// Prefix of every form field name
pub const FORM_PREFIX: &str = "company_";

/// How a form field is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Categorical,
    Integer,
    Float,
}

/// One declared form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub column: &'static str,
    pub kind: FieldType,
    /// Optional fields default to 0 when absent or blank
    pub required: bool,
}

impl FieldSpec {
    const fn new(column: &'static str, kind: FieldType, required: bool) -> Self {
        Self { column, kind, required }
    }

    /// Name of the HTML form field
    pub fn form_name(&self) -> String {
        format!("{}{}", FORM_PREFIX, self.column)
    }
}

/// Fields accepted by the prediction form, in display order
pub const COMPANY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("country_code", Categorical, true),
    FieldSpec::new("region", Categorical, true),
    FieldSpec::new("city", Categorical, true),
    FieldSpec::new("category_list", Categorical, true),
    FieldSpec::new("num_funding_rounds", Integer, true),
    FieldSpec::new("total_funding_usd", Float, true),
    FieldSpec::new("age_months", Integer, true),
    FieldSpec::new("has_facebook_url", Integer, false),
    FieldSpec::new("has_twitter_url", Integer, false),
    FieldSpec::new("has_linkedin_url", Integer, false),
    FieldSpec::new("round_count", Integer, true),
    FieldSpec::new("raised_amount_usd", Float, true),
    FieldSpec::new("last_round_investment_type", Categorical, true),
    FieldSpec::new("last_round_raised_amount_usd", Float, true),
    FieldSpec::new("last_round_post_money_valuation", Float, true),
    FieldSpec::new("last_round_timelapse_months", Integer, true),
    FieldSpec::new("last_round_investor_count", Integer, true),
    FieldSpec::new("founders_dif_country_count", Integer, true),
    FieldSpec::new("founders_male_count", Integer, true),
    FieldSpec::new("founders_female_count", Integer, true),
    FieldSpec::new("founders_degree_count_total", Integer, true),
    FieldSpec::new("founders_degree_count_max", Integer, true),
];

/// Columns the form can supply
pub fn form_columns() -> Vec<&'static str> {
    COMPANY_FIELDS.iter().map(|f| f.column).collect()
}

/// Raw submitted form, field name to value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CompanyForm {
    fields: HashMap<String, String>,
}

impl CompanyForm {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Set a field, accepting either `company_x` or bare `x`
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = if name.starts_with(FORM_PREFIX) {
            name.to_string()
        } else {
            format!("{}{}", FORM_PREFIX, name)
        };
        self.fields.insert(name, value.into());
    }

    fn raw(&self, spec: &FieldSpec) -> Option<&str> {
        self.fields
            .get(&spec.form_name())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Validate and convert every declared field
    pub fn parse(&self) -> Result<CompanyRecord> {
        let mut record = CompanyRecord::default();

        for spec in COMPANY_FIELDS {
            let Some(raw) = self.raw(spec) else {
                if spec.required {
                    return Err(ScreenerError::InvalidInput(format!(
                        "missing required field '{}'",
                        spec.form_name()
                    )));
                }
                record.numeric.insert(spec.column, 0.0);
                continue;
            };

            match spec.kind {
                Categorical => {
                    record.categorical.insert(spec.column, raw.to_string());
                }
                Integer => {
                    let cleaned = raw.replace(',', "");
                    let value: i64 = cleaned.parse().map_err(|_| {
                        ScreenerError::InvalidInput(format!(
                            "invalid literal for integer field '{}': '{}'",
                            spec.form_name(),
                            raw
                        ))
                    })?;
                    record.numeric.insert(spec.column, value as f64);
                }
                Float => {
                    let cleaned = raw.replace(',', "");
                    let value: f64 = cleaned
                        .parse()
                        .ok()
                        .filter(|v: &f64| v.is_finite())
                        .ok_or_else(|| {
                            ScreenerError::InvalidInput(format!(
                                "could not convert '{}' to float for field '{}'",
                                raw,
                                spec.form_name()
                            ))
                        })?;
                    record.numeric.insert(spec.column, value);
                }
            }
        }

        Ok(record)
    }
}

/// Parsed form, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyRecord {
    pub categorical: BTreeMap<&'static str, String>,
    pub numeric: BTreeMap<&'static str, f64>,
}
