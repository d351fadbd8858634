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

//! Service type → SQL type traits.
//!
//! Maps a column type to the SQL type code, sizes, precision and printable
//! name reported through the implementation row descriptor and the type-info
//! pseudo-query. Nested types (arrays, rows, time series) are exposed as
//! variable-length character data because that is how they are rendered.

use crate::types::sql::*;
use crate::types::value::{ColumnType, ScalarType};

/// Column size reported for unbounded character data.
pub const VARCHAR_MAX_LEN: i64 = i32::MAX as i64;

/// Static traits of a column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub sql_type: i16,
    pub type_name: &'static str,
    /// Precision for numeric types, character count for text and temporal types.
    pub column_size: i64,
    pub display_size: i64,
    /// Bytes transferred when the value is fetched in its default C type.
    pub transfer_length: i64,
    pub decimal_digits: i16,
    pub num_prec_radix: i16,
    pub unsigned: bool,
    pub case_sensitive: bool,
    pub searchable: i16,
    pub literal_prefix: Option<&'static str>,
    pub literal_suffix: Option<&'static str>,
}

impl TypeInfo {
    fn numeric(sql_type: i16, name: &'static str, size: i64, display: i64, transfer: i64) -> Self {
        Self {
            sql_type,
            type_name: name,
            column_size: size,
            display_size: display,
            transfer_length: transfer,
            decimal_digits: 0,
            num_prec_radix: 10,
            unsigned: false,
            case_sensitive: false,
            searchable: SQL_PRED_BASIC,
            literal_prefix: None,
            literal_suffix: None,
        }
    }

    fn character(name: &'static str) -> Self {
        Self {
            sql_type: SQL_VARCHAR,
            type_name: name,
            column_size: VARCHAR_MAX_LEN,
            display_size: VARCHAR_MAX_LEN,
            transfer_length: VARCHAR_MAX_LEN,
            decimal_digits: 0,
            num_prec_radix: 0,
            unsigned: false,
            case_sensitive: true,
            searchable: SQL_SEARCHABLE,
            literal_prefix: Some("'"),
            literal_suffix: Some("'"),
        }
    }

    fn temporal(sql_type: i16, name: &'static str, size: i64, transfer: i64, digits: i16) -> Self {
        Self {
            sql_type,
            type_name: name,
            column_size: size,
            display_size: size,
            transfer_length: transfer,
            decimal_digits: digits,
            num_prec_radix: 0,
            unsigned: false,
            case_sensitive: false,
            searchable: SQL_PRED_BASIC,
            literal_prefix: Some("'"),
            literal_suffix: Some("'"),
        }
    }
}

/// Traits of a scalar type.
pub fn scalar_type_info(scalar: ScalarType) -> TypeInfo {
    match scalar {
        ScalarType::Boolean => TypeInfo {
            unsigned: true,
            num_prec_radix: 0,
            ..TypeInfo::numeric(SQL_BIT, "boolean", 1, 1, 1)
        },
        ScalarType::Integer => TypeInfo::numeric(SQL_INTEGER, "integer", 10, 11, 4),
        ScalarType::Bigint => TypeInfo::numeric(SQL_BIGINT, "bigint", 19, 20, 8),
        ScalarType::Double => TypeInfo::numeric(SQL_DOUBLE, "double", 15, 24, 8),
        ScalarType::Decimal => TypeInfo::numeric(SQL_DECIMAL, "decimal", 38, 40, 40),
        ScalarType::Varchar => TypeInfo::character("varchar"),
        ScalarType::Date => TypeInfo::temporal(SQL_TYPE_DATE, "date", 10, 6, 0),
        ScalarType::Time => TypeInfo::temporal(SQL_TYPE_TIME, "time", 18, 6, 9),
        ScalarType::Timestamp => TypeInfo::temporal(SQL_TYPE_TIMESTAMP, "timestamp", 29, 16, 9),
        ScalarType::IntervalDayToSecond => TypeInfo::temporal(
            SQL_INTERVAL_DAY_TO_SECOND,
            "interval day to second",
            29,
            28,
            9,
        ),
        ScalarType::IntervalYearToMonth => TypeInfo::temporal(
            SQL_INTERVAL_YEAR_TO_MONTH,
            "interval year to month",
            13,
            28,
            0,
        ),
        ScalarType::Unknown => TypeInfo {
            searchable: SQL_PRED_NONE,
            ..TypeInfo::character("unknown")
        },
    }
}

/// Traits of any column type, nested ones included.
pub fn type_info(column_type: &ColumnType) -> TypeInfo {
    match column_type {
        ColumnType::Scalar(scalar) => scalar_type_info(*scalar),
        ColumnType::Array(_) => TypeInfo::character("array"),
        ColumnType::Row(_) => TypeInfo::character("row"),
        ColumnType::TimeSeries(_) => TypeInfo::character("timeseries"),
        ColumnType::Unset => TypeInfo {
            sql_type: SQL_UNKNOWN_TYPE,
            searchable: SQL_PRED_NONE,
            ..TypeInfo::character("unknown")
        },
    }
}

/// Scalar types reported by the type-info pseudo-query, in report order.
pub const REPORTED_SCALAR_TYPES: [ScalarType; 11] = [
    ScalarType::Bigint,
    ScalarType::Boolean,
    ScalarType::Date,
    ScalarType::Decimal,
    ScalarType::Double,
    ScalarType::Integer,
    ScalarType::IntervalDayToSecond,
    ScalarType::IntervalYearToMonth,
    ScalarType::Time,
    ScalarType::Timestamp,
    ScalarType::Varchar,
];
