// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Semantic values and column metadata as delivered by the query service.
//!
//! A result cell is a closed sum type: null, a scalar carried as text, or one
//! of the nested shapes (array, row, time series). The scalar's type comes
//! from the column metadata, not from the value itself.

use serde::{Deserialize, Serialize};

/// Scalar types the query service can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarType {
    Boolean,
    Integer,
    Bigint,
    Double,
    Decimal,
    Varchar,
    Date,
    Time,
    Timestamp,
    IntervalDayToSecond,
    IntervalYearToMonth,
    /// Type of an all-null column; no conversion is defined for it.
    Unknown,
}

impl ScalarType {
    /// Service-side type name.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Bigint => "bigint",
            ScalarType::Double => "double",
            ScalarType::Decimal => "decimal",
            ScalarType::Varchar => "varchar",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::Timestamp => "timestamp",
            ScalarType::IntervalDayToSecond => "interval day to second",
            ScalarType::IntervalYearToMonth => "interval year to month",
            ScalarType::Unknown => "unknown",
        }
    }
}

/// Type of a result column, possibly nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Scalar(ScalarType),
    Array(Box<ColumnType>),
    Row(Vec<ColumnInfo>),
    TimeSeries(Box<ColumnType>),
    /// Metadata was missing or not understood.
    Unset,
}

/// Metadata of one result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub catalog_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            catalog_name: None,
            schema_name: None,
            table_name: None,
        }
    }

    pub fn scalar(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self::new(name, ColumnType::Scalar(scalar_type))
    }

    pub fn with_table(
        mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Self {
        self.catalog_name = catalog.map(str::to_string);
        self.schema_name = schema.map(str::to_string);
        self.table_name = table.map(str::to_string);
        self
    }
}

/// One point of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub time: String,
    pub value: Value,
}

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Scalar(String),
    Array(Vec<Value>),
    Row(Vec<Value>),
    TimeSeries(Vec<TimeSeriesPoint>),
}

impl Value {
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// One result row: a value per column.
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_json_shape() {
        let json = r#"{"array":[{"scalar":"1"},"null",{"row":[{"scalar":"a"}]}]}"#;
        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::scalar("1"),
                Value::Null,
                Value::Row(vec![Value::scalar("a")]),
            ])
        );
    }

    #[test]
    fn test_column_info_json_shape() {
        let json = r#"{"name":"measure","type":{"array":{"scalar":"DOUBLE"}}}"#;
        let info: ColumnInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.name, "measure");
        assert_eq!(
            info.column_type,
            ColumnType::Array(Box::new(ColumnType::Scalar(ScalarType::Double)))
        );
        assert!(info.table_name.is_none());
    }
}
