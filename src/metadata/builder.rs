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

//! Builders for the synthetic rows of the catalog pseudo-queries.
//!
//! Every cell is produced as a [`Value`] so the rows travel through the same
//! cursor and column conversion path as a real query result. Numbers are
//! rendered as scalar text; missing values are `Value::Null`.

use super::schemas::{columns_schema, tables_schema, type_info_schema};
use super::types::TableInfo;
use crate::client::QueryResult;
use crate::descriptor::DescriptorRecord;
use crate::types::sql::*;
use crate::types::traits::{scalar_type_info, type_info, TypeInfo, REPORTED_SCALAR_TYPES};
use crate::types::value::{ColumnInfo, Row, Value};

fn text(value: &str) -> Value {
    Value::scalar(value)
}

fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::scalar)
}

fn num(value: impl Into<i64>) -> Value {
    Value::scalar(value.into().to_string())
}

fn opt_num(value: Option<i64>) -> Value {
    value.map_or(Value::Null, num)
}

fn is_numeric(info: &TypeInfo) -> bool {
    info.num_prec_radix > 0 || info.sql_type == SQL_BIT
}

/// Verbose type and datetime/interval sub-code of an SQL type.
fn verbose_type(sql_type: i16) -> (i16, Option<i64>) {
    let mut record = DescriptorRecord::default();
    record.apply_concise_type(sql_type);
    let sub = (record.datetime_interval_code != 0).then_some(record.datetime_interval_code as i64);
    (record.desc_type, sub)
}

/// Table listing rows.
pub fn build_tables_result(tables: &[TableInfo]) -> QueryResult {
    let rows = tables
        .iter()
        .map(|t| {
            vec![
                opt_text(t.catalog_name.as_deref()),
                opt_text(t.schema_name.as_deref()),
                text(&t.table_name),
                text(&t.table_type),
                opt_text(t.remarks.as_deref()),
            ]
        })
        .collect();
    QueryResult::new(tables_schema(), rows)
}

/// Table listing carrying only the distinct catalog names.
pub fn build_catalogs_result(catalogs: &[String]) -> QueryResult {
    let rows = catalogs
        .iter()
        .map(|c| vec![text(c), Value::Null, Value::Null, Value::Null, Value::Null])
        .collect();
    QueryResult::new(tables_schema(), rows)
}

/// Table listing carrying only the distinct schema names.
pub fn build_schemas_result(schemas: &[String]) -> QueryResult {
    let rows = schemas
        .iter()
        .map(|s| vec![Value::Null, text(s), Value::Null, Value::Null, Value::Null])
        .collect();
    QueryResult::new(tables_schema(), rows)
}

/// Table listing carrying only the distinct table types.
pub fn build_table_types_result(table_types: &[String]) -> QueryResult {
    let rows = table_types
        .iter()
        .map(|t| vec![Value::Null, Value::Null, Value::Null, text(t), Value::Null])
        .collect();
    QueryResult::new(tables_schema(), rows)
}

/// One column-listing row.
fn column_row(table: &TableInfo, column: &ColumnInfo, ordinal: usize) -> Row {
    let info = type_info(&column.column_type);
    let (sql_data_type, datetime_sub) = verbose_type(info.sql_type);
    let character = is_variable_length_type(info.sql_type);
    let scaled = is_numeric(&info) || is_datetime_type(info.sql_type) || is_interval_type(info.sql_type);
    vec![
        opt_text(table.catalog_name.as_deref()),
        opt_text(table.schema_name.as_deref()),
        text(&table.table_name),
        text(&column.name),
        num(info.sql_type),
        text(info.type_name),
        num(info.column_size),
        num(info.transfer_length),
        opt_num(scaled.then_some(info.decimal_digits as i64)),
        opt_num((info.num_prec_radix > 0).then_some(info.num_prec_radix as i64)),
        num(SQL_NULLABLE),
        Value::Null,
        Value::Null,
        num(sql_data_type),
        opt_num(datetime_sub),
        opt_num(character.then_some(info.column_size)),
        num(ordinal as i64),
        text("YES"),
    ]
}

/// Column listing rows of several tables, each with its columns in
/// ordinal order.
pub fn build_columns_result(tables: &[(TableInfo, Vec<(usize, ColumnInfo)>)]) -> QueryResult {
    let rows = tables
        .iter()
        .flat_map(|(table, columns)| {
            columns
                .iter()
                .map(move |(ordinal, column)| column_row(table, column, *ordinal))
        })
        .collect();
    QueryResult::new(columns_schema(), rows)
}

/// Type listing rows, ordered by SQL type code. `SQL_ALL_TYPES` reports
/// every type.
pub fn build_type_info_result(sql_type: i16) -> QueryResult {
    let mut infos: Vec<TypeInfo> = REPORTED_SCALAR_TYPES
        .iter()
        .map(|s| scalar_type_info(*s))
        .filter(|info| sql_type == SQL_ALL_TYPES || info.sql_type == sql_type)
        .collect();
    infos.sort_by_key(|info| info.sql_type);

    let rows = infos
        .iter()
        .map(|info| {
            let numeric = is_numeric(info);
            let interval = is_interval_type(info.sql_type);
            let scaled = info.sql_type == SQL_DECIMAL
                || is_datetime_type(info.sql_type)
                || interval;
            let (sql_data_type, datetime_sub) = verbose_type(info.sql_type);
            vec![
                text(info.type_name),
                num(info.sql_type),
                num(info.column_size),
                opt_text(info.literal_prefix),
                opt_text(info.literal_suffix),
                opt_text((info.sql_type == SQL_DECIMAL).then_some("precision,scale")),
                num(SQL_NULLABLE),
                num(info.case_sensitive as i64),
                num(info.searchable),
                opt_num(numeric.then_some(info.unsigned as i64)),
                num(SQL_FALSE),
                opt_num(numeric.then_some(SQL_FALSE as i64)),
                text(info.type_name),
                opt_num(scaled.then_some(0)),
                opt_num(scaled.then_some(info.decimal_digits as i64)),
                num(sql_data_type),
                opt_num(datetime_sub),
                opt_num((info.num_prec_radix > 0).then_some(info.num_prec_radix as i64)),
                opt_num(interval.then_some(2)),
            ]
        })
        .collect();
    QueryResult::new(type_info_schema(), rows)
}
