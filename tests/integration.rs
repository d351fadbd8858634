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

//! End-to-end tests through the public API, against a mock query service
//! serving JSON fixtures.

use async_trait::async_trait;
use odbc_marshal::metadata::TableInfo;
use odbc_marshal::types::native::{SqlNumericStruct, SqlTimestampStruct};
use odbc_marshal::types::sql::*;
use odbc_marshal::{
    ApplicationDataBuffer, AttributeValue, CallerPtr, ColumnInfo, Connection, DescriptorField,
    DescriptorType, DescriptorValue, NativeType, QueryResult, QueryService, SqlReturn, SqlState,
    StatementState,
};
use std::sync::{Arc, Mutex};

const ORDERS_FIXTURE: &str = r#"{
    "query_id": "01ef-orders",
    "columns": [
        {"name": "id", "type": {"scalar": "BIGINT"}},
        {"name": "customer", "type": {"scalar": "VARCHAR"}},
        {"name": "amount", "type": {"scalar": "DECIMAL"}},
        {"name": "placed_at", "type": {"scalar": "TIMESTAMP"}},
        {"name": "tags", "type": {"array": {"scalar": "VARCHAR"}}},
        {"name": "address", "type": {"row": [
            {"name": "city", "type": {"scalar": "VARCHAR"}},
            {"name": "zip", "type": {"scalar": "INTEGER"}}
        ]}},
        {"name": "readings", "type": {"time_series": {"scalar": "INTEGER"}}}
    ],
    "rows": [
        [
            {"scalar": "1"},
            {"scalar": "Ada"},
            {"scalar": "123.45"},
            {"scalar": "2018-11-01 17:45:59.123456789"},
            {"array": [{"scalar": "new"}, {"scalar": "gift"}]},
            {"row": [{"scalar": "Paris"}, {"scalar": "75001"}]},
            {"time_series": [
                {"time": "2024-01-01 00:00:00.000000000", "value": {"scalar": "5"}},
                {"time": "2024-01-01 00:01:00.000000000", "value": {"scalar": "7"}}
            ]}
        ],
        [
            {"scalar": "2"},
            "null",
            {"scalar": "-0.5"},
            {"scalar": "2020-02-29 00:00:00.000000000"},
            {"array": []},
            {"row": [{"scalar": "Oslo"}, "null"]},
            {"time_series": []}
        ],
        [
            {"scalar": "3"},
            {"scalar": "Grace Brewster Murray Hopper"},
            {"scalar": "7"},
            {"scalar": "not a timestamp"},
            "null",
            "null",
            "null"
        ]
    ]
}"#;

#[derive(Debug)]
struct FixtureService {
    result: QueryResult,
    tables: Vec<TableInfo>,
    columns: Vec<ColumnInfo>,
    executed: Mutex<Vec<String>>,
}

impl FixtureService {
    fn new() -> Self {
        Self {
            result: serde_json::from_str(ORDERS_FIXTURE).unwrap(),
            tables: serde_json::from_str(
                r#"[
                    {"catalog_name": "main", "schema_name": "sales", "table_name": "orders"},
                    {"catalog_name": "main", "schema_name": "sales", "table_name": "returns", "table_type": "VIEW"},
                    {"catalog_name": "main", "schema_name": "hr", "table_name": "staff", "remarks": "people"}
                ]"#,
            )
            .unwrap(),
            columns: serde_json::from_str(
                r#"[
                    {"name": "id", "type": {"scalar": "BIGINT"}, "table_name": "orders"},
                    {"name": "customer", "type": {"scalar": "VARCHAR"}, "table_name": "orders"},
                    {"name": "placed_at", "type": {"scalar": "TIMESTAMP"}, "table_name": "orders"}
                ]"#,
            )
            .unwrap(),
            executed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl QueryService for FixtureService {
    async fn execute_query(&self, sql: &str) -> odbc_marshal::Result<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.result.clone())
    }

    async fn list_tables(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
    ) -> odbc_marshal::Result<Vec<TableInfo>> {
        Ok(self.tables.clone())
    }

    async fn list_columns(
        &self,
        _catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> odbc_marshal::Result<Vec<ColumnInfo>> {
        Ok(self
            .columns
            .iter()
            .filter(|c| c.table_name.as_deref() == Some(table))
            .cloned()
            .collect())
    }

    async fn cancel_query(&self, _query_id: &str) -> odbc_marshal::Result<()> {
        Ok(())
    }
}

fn connect() -> (Arc<FixtureService>, Connection) {
    let service = Arc::new(FixtureService::new());
    let client: Arc<dyn QueryService> = service.clone();
    let connection = Connection::connect("LogLevel=OFF", client).expect("Failed to connect");
    (service, connection)
}

fn char_buffer(data: &mut [u8], len: &mut isize) -> ApplicationDataBuffer {
    unsafe {
        ApplicationDataBuffer::new(
            NativeType::Char,
            CallerPtr::new(data.as_mut_ptr()),
            data.len() as isize,
            CallerPtr::new(len as *mut isize),
        )
    }
}

fn text(data: &[u8], len: isize) -> String {
    String::from_utf8_lossy(&data[..len as usize]).into_owned()
}

#[test]
fn test_bind_execute_fetch_flow() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut id = 0i64;
    let mut id_ind = 0isize;
    let mut customer = [0u8; 16];
    let mut customer_len = 0isize;
    let mut placed_at = SqlTimestampStruct::default();
    let mut placed_ind = 0isize;
    unsafe {
        statement.bind_column(1, SQL_C_SBIGINT, CallerPtr::new(&mut id as *mut i64).cast(), 0, CallerPtr::new(&mut id_ind));
        statement.bind_column(2, SQL_C_CHAR, CallerPtr::new(customer.as_mut_ptr()), 16, CallerPtr::new(&mut customer_len));
        statement.bind_column(4, SQL_C_TYPE_TIMESTAMP, CallerPtr::new(&mut placed_at as *mut SqlTimestampStruct).cast(), 0, CallerPtr::new(&mut placed_ind));
    }

    assert_eq!(statement.execute_sql_query("SELECT * FROM orders"), SqlReturn::Success);
    assert_eq!(statement.num_result_cols(), 7);

    assert_eq!(statement.fetch_row(), SqlReturn::Success);
    assert_eq!(id, 1);
    assert_eq!(text(&customer, customer_len), "Ada");
    assert_eq!(
        placed_at,
        SqlTimestampStruct {
            year: 2018,
            month: 11,
            day: 1,
            hour: 17,
            minute: 45,
            second: 59,
            fraction: 123_456_789,
        }
    );

    assert_eq!(statement.fetch_row(), SqlReturn::Success);
    assert_eq!(id, 2);
    assert_eq!(customer_len, SQL_NULL_DATA);
    assert_eq!(placed_at.day, 29);

    // Third row: the long name is truncated and the timestamp is malformed.
    assert_eq!(statement.fetch_row(), SqlReturn::Error);
    assert_eq!(id, 3);
    assert_eq!(customer_len, 28);
    let states: Vec<(SqlState, i32)> = statement
        .diagnostics()
        .records()
        .iter()
        .map(|r| (r.sql_state, r.column))
        .collect();
    assert_eq!(
        states,
        vec![
            (SqlState::S01004DataTruncated, 2),
            (SqlState::S07006RestrictedDataType, 4)
        ]
    );

    assert_eq!(statement.fetch_row(), SqlReturn::NoData);
}

#[test]
fn test_nested_values_render_as_text() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();
    statement.execute_sql_query("SELECT * FROM orders");

    let mut data = [0u8; 128];
    let mut len = 0isize;
    let mut read = |statement: &mut odbc_marshal::Statement, column: u16| {
        let mut buffer = char_buffer(&mut data, &mut len);
        let code = statement.get_column_data(column, &mut buffer);
        (code, if len >= 0 { text(&data, len) } else { String::new() })
    };

    statement.fetch_row();
    assert_eq!(read(&mut statement, 5), (SqlReturn::Success, "[new,gift]".to_string()));
    assert_eq!(read(&mut statement, 6), (SqlReturn::Success, "(Paris,75001)".to_string()));
    assert_eq!(
        read(&mut statement, 7),
        (
            SqlReturn::Success,
            "[{time: 2024-01-01 00:00:00.000000000, value: 5}, {time: 2024-01-01 00:01:00.000000000, value: 7}]"
                .to_string()
        )
    );

    statement.fetch_row();
    assert_eq!(read(&mut statement, 5), (SqlReturn::Success, "-".to_string()));
    assert_eq!(read(&mut statement, 6), (SqlReturn::Success, "(Oslo,-)".to_string()));
    assert_eq!(read(&mut statement, 7), (SqlReturn::Success, "-".to_string()));
}

#[test]
fn test_numeric_struct_and_wide_text() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut amount = SqlNumericStruct::default();
    let mut amount_ind = 0isize;
    let mut customer = [0u16; 16];
    let mut customer_len = 0isize;
    unsafe {
        statement.bind_column(3, SQL_C_NUMERIC, CallerPtr::new(&mut amount as *mut SqlNumericStruct).cast(), 0, CallerPtr::new(&mut amount_ind));
        statement.bind_column(2, SQL_C_WCHAR, CallerPtr::new(customer.as_mut_ptr()).cast(), 32, CallerPtr::new(&mut customer_len));
    }
    statement.execute_sql_query("SELECT * FROM orders");

    // Scale 0 drops the fraction of 123.45.
    assert_eq!(statement.fetch_row(), SqlReturn::SuccessWithInfo);
    assert_eq!(amount.sign, 1);
    assert_eq!(amount.scale, 0);
    assert_eq!(amount.precision, 3);
    assert_eq!(amount.val[..2], [0x7B, 0]);
    assert_eq!(customer_len, 3);
    assert_eq!(customer[..4], [b'A' as u16, b'd' as u16, b'a' as u16, 0]);
    assert_eq!(
        statement.diagnostics().record(1).unwrap().sql_state,
        SqlState::S01S07FractionalTruncation
    );
}

#[test]
fn test_column_wise_bulk_fetch() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut ids = [0i64; 2];
    let mut id_ind = [0isize; 2];
    let mut names = [[0u8; 8]; 2];
    let mut name_len = [0isize; 2];
    let mut status = [0u16; 2];
    let mut fetched = 0usize;
    unsafe {
        statement.set_attribute(SQL_ATTR_ROW_ARRAY_SIZE, AttributeValue::Integer(2));
        statement.set_attribute(SQL_ATTR_ROW_STATUS_PTR, AttributeValue::pointer(CallerPtr::new(status.as_mut_ptr())));
        statement.set_attribute(SQL_ATTR_ROWS_FETCHED_PTR, AttributeValue::pointer(CallerPtr::new(&mut fetched as *mut usize)));
        statement.bind_column(1, SQL_C_SBIGINT, CallerPtr::new(ids.as_mut_ptr()).cast(), 0, CallerPtr::new(id_ind.as_mut_ptr()));
        statement.bind_column(2, SQL_C_CHAR, CallerPtr::new(names.as_mut_ptr()).cast(), 8, CallerPtr::new(name_len.as_mut_ptr()));
    }
    statement.execute_sql_query("SELECT * FROM orders");

    assert_eq!(statement.fetch_row(), SqlReturn::Success);
    assert_eq!(fetched, 2);
    assert_eq!(ids, [1, 2]);
    assert_eq!(&names[0][..4], b"Ada\0");
    assert_eq!(name_len, [3, SQL_NULL_DATA]);
    assert_eq!(status, [SQL_ROW_SUCCESS, SQL_ROW_SUCCESS]);

    // Last row alone; its name does not fit in 8 bytes.
    assert_eq!(statement.fetch_row(), SqlReturn::SuccessWithInfo);
    assert_eq!(fetched, 1);
    assert_eq!(ids[0], 3);
    assert_eq!(&names[0], b"Grace B\0");
    assert_eq!(status, [SQL_ROW_SUCCESS_WITH_INFO, SQL_ROW_NOROW]);

    assert_eq!(statement.fetch_row(), SqlReturn::NoData);
}

#[test]
fn test_bind_offset_shifts_row_wise_buffers() {
    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct OrderRow {
        id: i64,
        id_ind: isize,
    }
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut rows = [OrderRow::default(); 4];
    let mut offset = (2 * std::mem::size_of::<OrderRow>()) as isize;
    let base = rows.as_mut_ptr();
    unsafe {
        statement.set_attribute(SQL_ATTR_ROW_BIND_TYPE, AttributeValue::Integer(std::mem::size_of::<OrderRow>() as i64));
        statement.set_attribute(SQL_ATTR_ROW_ARRAY_SIZE, AttributeValue::Integer(2));
        statement.set_attribute(SQL_ATTR_ROW_BIND_OFFSET_PTR, AttributeValue::pointer(CallerPtr::new(&mut offset as *mut isize)));
        statement.bind_column(1, SQL_C_SBIGINT, CallerPtr::new(std::ptr::addr_of_mut!((*base).id)).cast(), 0, CallerPtr::new(std::ptr::addr_of_mut!((*base).id_ind)));
    }
    statement.execute_sql_query("SELECT * FROM orders");
    assert_eq!(statement.fetch_row(), SqlReturn::Success);
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 0, 1, 2]);
}

#[test]
fn test_explicit_descriptor_swap_and_free() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();
    let descriptor = connection.alloc_descriptor();

    let mut implicit_id = 0i64;
    let mut explicit_id = 0i64;
    unsafe {
        statement.bind_column(1, SQL_C_SBIGINT, CallerPtr::new(&mut implicit_id as *mut i64).cast(), 0, CallerPtr::null());
    }

    assert_eq!(
        statement.set_attribute(SQL_ATTR_APP_ROW_DESC, AttributeValue::Descriptor(Some(descriptor.clone()))),
        SqlReturn::Success
    );
    // Bind through the descriptor fields instead of bind_column.
    let fields = [
        (DescriptorField::ConciseType, DescriptorValue::Integer(SQL_C_SBIGINT as i64)),
        (DescriptorField::DataPtr, DescriptorValue::pointer(unsafe { CallerPtr::new(&mut explicit_id as *mut i64) })),
    ];
    for (field, value) in fields {
        assert_eq!(
            statement.set_descriptor_field(DescriptorType::Ard, 1, field, value, 0),
            SqlReturn::Success
        );
    }

    statement.execute_sql_query("SELECT * FROM orders");
    statement.fetch_row();
    assert_eq!((implicit_id, explicit_id), (0, 1));

    connection.free_descriptor(&descriptor).unwrap();
    statement.fetch_row();
    assert_eq!((implicit_id, explicit_id), (2, 1));

    let mut value = None;
    statement.get_attribute(SQL_ATTR_APP_ROW_DESC, &mut value);
    let active = value.as_ref().and_then(|v| v.as_descriptor()).unwrap();
    assert!(active.borrow().is_implicit());
}

#[test]
fn test_ird_describes_result_columns() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();
    statement.execute_sql_query("SELECT * FROM orders");

    let mut value = None;
    statement.get_descriptor_field(DescriptorType::Ird, 2, DescriptorField::Name, &mut value);
    assert_eq!(value.as_ref().and_then(|v| v.as_text()), Some("customer"));
    statement.get_descriptor_field(DescriptorType::Ird, 4, DescriptorField::ConciseType, &mut value);
    assert_eq!(value.and_then(|v| v.as_integer()), Some(SQL_TYPE_TIMESTAMP as i64));

    let code = statement.set_descriptor_field(
        DescriptorType::Ird,
        1,
        DescriptorField::ConciseType,
        DescriptorValue::Integer(SQL_INTEGER as i64),
        0,
    );
    assert_eq!(code, SqlReturn::Error);
    assert_eq!(
        statement.diagnostics().record(1).unwrap().sql_state,
        SqlState::SHY016CannotModifyIrd
    );
}

#[test]
fn test_parameters_reach_the_service() {
    let (service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut since = SqlTimestampStruct {
        year: 2020,
        month: 1,
        day: 2,
        hour: 3,
        minute: 4,
        second: 5,
        fraction: 0,
    };
    let mut customer_ind = SQL_NULL_DATA;
    let mut customer = [0u8; 4];
    unsafe {
        statement.bind_parameter(1, SQL_PARAM_INPUT, SQL_C_TYPE_TIMESTAMP, SQL_TYPE_TIMESTAMP, 29, 9, CallerPtr::new(&mut since as *mut SqlTimestampStruct).cast(), 0, CallerPtr::null());
        statement.bind_parameter(2, SQL_PARAM_INPUT, SQL_C_CHAR, SQL_VARCHAR, 4, 0, CallerPtr::new(customer.as_mut_ptr()), 4, CallerPtr::new(&mut customer_ind));
    }
    statement.prepare_sql_query("SELECT * FROM orders WHERE placed_at > ? AND customer = ? AND note = '?'");
    assert_eq!(statement.state(), StatementState::Prepared);
    assert_eq!(statement.execute(), SqlReturn::Success);
    assert_eq!(
        service.executed.lock().unwrap().last().unwrap(),
        "SELECT * FROM orders WHERE placed_at > TIMESTAMP '2020-01-02 03:04:05.000000000' AND customer = NULL AND note = '?'"
    );
}

#[test]
fn test_catalog_queries() {
    let (_service, mut connection) = connect();
    let mut statement = connection.new_statement();

    let mut data = [0u8; 64];
    let mut len = 0isize;
    let mut collect = |statement: &mut odbc_marshal::Statement, column: u16| {
        let mut out = Vec::new();
        while statement.fetch_row() == SqlReturn::Success {
            let mut buffer = char_buffer(&mut data, &mut len);
            statement.get_column_data(column, &mut buffer);
            out.push(if len >= 0 { text(&data, len) } else { "NULL".to_string() });
        }
        out
    };

    statement.execute_get_tables_meta_query(Some("main"), Some("sa%"), None, None);
    assert_eq!(collect(&mut statement, 3), vec!["orders", "returns"]);

    statement.execute_get_tables_meta_query(None, None, None, Some("VIEW"));
    assert_eq!(collect(&mut statement, 3), vec!["returns"]);

    statement.execute_get_tables_meta_query(None, None, Some("staff"), None);
    assert_eq!(collect(&mut statement, 5), vec!["people"]);

    statement.execute_get_columns_meta_query(Some("main"), Some("sales"), Some("orders"), None);
    assert_eq!(collect(&mut statement, 4), vec!["id", "customer", "placed_at"]);

    statement.execute_get_columns_meta_query(None, None, Some("orders"), Some("placed_at"));
    assert_eq!(collect(&mut statement, 6), vec!["timestamp"]);

    statement.execute_get_type_info_query(SQL_ALL_TYPES);
    let names = collect(&mut statement, 1);
    assert!(names.len() > 5);
    assert!(names.contains(&"varchar".to_string()));
}
