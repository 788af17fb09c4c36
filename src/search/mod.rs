//! Company name search over the raw dataset

use crate::error::{Result, ScreenerError};
use crate::schema::{NAME_COLUMN, SEARCH_EXCLUDED};
use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::info;

/// One searchable row: display columns as JSON plus the lowercased name
#[derive(Debug, Clone)]
struct IndexedCompany {
    name_lower: Option<String>,
    record: Map<String, Value>,
}

/// In-memory index of the company table
#[derive(Debug, Clone, Default)]
pub struct CompanyIndex {
    columns: Vec<String>,
    rows: Vec<IndexedCompany>,
}

fn any_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => Value::from(v),
        AnyValue::String(v) => Value::from(v),
        AnyValue::StringOwned(v) => Value::from(v.as_str()),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_json(v as f64),
        AnyValue::Float64(v) => float_json(v),
        other => Value::from(other.to_string()),
    }
}

fn float_json(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

impl CompanyIndex {
    /// Build the index; administrative columns are dropped from the records
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let names = df
            .column(NAME_COLUMN)
            .map_err(|_| ScreenerError::FeatureNotFound(NAME_COLUMN.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let names = names.str()?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .filter(|c| !SEARCH_EXCLUDED.contains(&c.as_str()))
            .collect();
        let series: Vec<&Series> = columns
            .iter()
            .map(|c| df.column(c).map(|col| col.as_materialized_series()))
            .collect::<PolarsResult<_>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let mut record = Map::with_capacity(columns.len());
            for (name, s) in columns.iter().zip(&series) {
                record.insert(name.clone(), any_to_json(s.get(i)?));
            }
            rows.push(IndexedCompany {
                name_lower: names.get(i).map(str::to_lowercase),
                record,
            });
        }

        info!(companies = rows.len(), columns = columns.len(), "Built company index");
        Ok(Self { columns, rows })
    }

    /// Columns present in every record, in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records whose name contains `query`, ignoring case, in file order.
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Map<String, Value>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|row| {
                row.name_lower
                    .as_deref()
                    .is_some_and(|name| name.contains(&needle))
            })
            .map(|row| &row.record)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CompanyIndex {
        let df = df!(
            "uuid_org" => &["u1", "u2", "u3", "u4"],
            "name_org" => &[Some("Acme Corp"), Some("ACME Labs"), Some("Globex"), None],
            "country_code" => &["USA", "GBR", "USA", "DEU"],
            "homepage_url" => &["a.com", "b.com", "c.com", "d.com"],
            "num_funding_rounds" => &[1i64, 2, 3, 4]
        )
        .unwrap();
        CompanyIndex::from_frame(&df).unwrap()
    }

    #[test]
    fn test_case_insensitive_substring() {
        let index = index();
        let hits = index.search("acme");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["name_org"], "Acme Corp");
        assert_eq!(hits[1]["name_org"], "ACME Labs");
    }

    #[test]
    fn test_administrative_columns_removed() {
        let index = index();
        let hit = index.search("globex")[0];
        assert!(!hit.contains_key("uuid_org"));
        assert!(!hit.contains_key("homepage_url"));
        assert_eq!(hit["num_funding_rounds"], 3);
        assert_eq!(index.columns(), &["name_org", "country_code", "num_funding_rounds"]);
    }

    #[test]
    fn test_empty_query_and_null_names() {
        let index = index();
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
        assert!(index.search("zzz").is_empty());
        assert_eq!(index.len(), 4);
    }
}
