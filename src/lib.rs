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

//! Data marshaling and statement binding core of an ODBC driver.
//!
//! This crate sits between a call-based, C-ABI style API and a tabular query
//! service. Applications bind raw buffers of a declared native type to result
//! columns or parameters; the driver converts every fetched value into the
//! bound shape, honoring byte widths, truncation and length/indicator
//! reporting.
//!
//! ## Overview
//!
//! - [`Connection`] - Owns the query service client and configuration
//! - [`Statement`] - Binding, execution and fetch orchestration
//! - [`Descriptor`] - ARD/APD/IRD/IPD binding metadata
//! - [`Cursor`] - Row position over one result batch
//! - [`ApplicationDataBuffer`] - Conversion into and out of caller memory
//!
//! ## Example
//!
//! ```ignore
//! use odbc_marshal::{CallerPtr, Connection, SqlReturn};
//! use odbc_marshal::types::sql::SQL_C_SLONG;
//!
//! let mut connection = Connection::connect("LogLevel=DEBUG", service)?;
//! let mut statement = connection.new_statement();
//!
//! let mut id = 0i32;
//! let mut indicator = 0isize;
//! unsafe {
//!     statement.bind_column(
//!         1,
//!         SQL_C_SLONG,
//!         CallerPtr::new(&mut id as *mut i32).cast(),
//!         0,
//!         CallerPtr::new(&mut indicator),
//!     );
//! }
//! statement.execute_sql_query("SELECT id FROM users");
//! while statement.fetch_row() == SqlReturn::Success {
//!     println!("{}", id);
//! }
//! ```
//!
//! ## Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `LogLevel` | unset | OFF, ERROR, WARN, INFO, DEBUG or TRACE |
//! | `LogOutput` | stderr | Log file path |
//! | `RowArraySize` | 1 | Rowset size of new statements |
//! | `NestedValueMaxLength` | 1024 | Bound on one rendered nested element |

pub mod app;
pub mod client;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod descriptor;
pub mod diagnostic;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod parameter;
pub mod statement;
pub mod types;

// Re-export main types
pub use app::{ApplicationDataBuffer, CallerPtr, ConversionResult};
pub use client::{QueryResult, QueryService};
pub use config::DriverConfig;
pub use connection::Connection;
pub use cursor::{Column, Cursor};
pub use descriptor::{
    Descriptor, DescriptorField, DescriptorHandle, DescriptorRecord, DescriptorType,
    DescriptorValue,
};
pub use diagnostic::{DiagnosticRecord, Diagnostics};
pub use error::{DriverErrorHelper, Error, ErrorKind, Result, SqlState};
pub use statement::{AttributeValue, Statement, StatementState};
pub use types::{ColumnInfo, ColumnType, NativeType, ScalarType, SqlReturn, Value};
