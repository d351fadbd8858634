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

//! Result column layouts of the catalog pseudo-queries.
//!
//! The layouts follow the call-level standard:
//!
//! - tables: TABLE_CAT, TABLE_SCHEM, TABLE_NAME, TABLE_TYPE, REMARKS
//! - columns: the 18 columns of a column listing, TABLE_CAT to IS_NULLABLE
//! - type info: the 19 columns of a type listing, TYPE_NAME to INTERVAL_PRECISION

use crate::types::value::{ColumnInfo, ScalarType};

fn text(name: &str) -> ColumnInfo {
    ColumnInfo::scalar(name, ScalarType::Varchar)
}

fn int(name: &str) -> ColumnInfo {
    ColumnInfo::scalar(name, ScalarType::Integer)
}

/// Columns of the table listing.
pub fn tables_schema() -> Vec<ColumnInfo> {
    vec![
        text("TABLE_CAT"),
        text("TABLE_SCHEM"),
        text("TABLE_NAME"),
        text("TABLE_TYPE"),
        text("REMARKS"),
    ]
}

/// Columns of the column listing.
pub fn columns_schema() -> Vec<ColumnInfo> {
    vec![
        text("TABLE_CAT"),
        text("TABLE_SCHEM"),
        text("TABLE_NAME"),
        text("COLUMN_NAME"),
        int("DATA_TYPE"),
        text("TYPE_NAME"),
        int("COLUMN_SIZE"),
        int("BUFFER_LENGTH"),
        int("DECIMAL_DIGITS"),
        int("NUM_PREC_RADIX"),
        int("NULLABLE"),
        text("REMARKS"),
        text("COLUMN_DEF"),
        int("SQL_DATA_TYPE"),
        int("SQL_DATETIME_SUB"),
        int("CHAR_OCTET_LENGTH"),
        int("ORDINAL_POSITION"),
        text("IS_NULLABLE"),
    ]
}

/// Columns of the type listing.
pub fn type_info_schema() -> Vec<ColumnInfo> {
    vec![
        text("TYPE_NAME"),
        int("DATA_TYPE"),
        int("COLUMN_SIZE"),
        text("LITERAL_PREFIX"),
        text("LITERAL_SUFFIX"),
        text("CREATE_PARAMS"),
        int("NULLABLE"),
        int("CASE_SENSITIVE"),
        int("SEARCHABLE"),
        int("UNSIGNED_ATTRIBUTE"),
        int("FIXED_PREC_SCALE"),
        int("AUTO_UNIQUE_VALUE"),
        text("LOCAL_TYPE_NAME"),
        int("MINIMUM_SCALE"),
        int("MAXIMUM_SCALE"),
        int("SQL_DATA_TYPE"),
        int("SQL_DATETIME_SUB"),
        int("NUM_PREC_RADIX"),
        int("INTERVAL_PRECISION"),
    ]
}
