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

//! Type definitions shared by the driver core.
//!
//! This module contains data structures organized by domain:
//! - `sql`: ODBC constants and return codes
//! - `native`: application buffer shapes and C struct layouts
//! - `value`: semantic values and column metadata from the query service
//! - `temporal` / `interval`: fixed-format parsing and rendering
//! - `traits`: SQL type traits of each service type

pub mod interval;
pub mod native;
pub mod sql;
pub mod temporal;
pub mod traits;
pub mod value;

// Re-export commonly used types
pub use interval::{IntervalDaySecond, IntervalYearMonth};
pub use native::{IntervalCode, NativeType};
pub use sql::SqlReturn;
pub use value::{ColumnInfo, ColumnType, Row, ScalarType, TimeSeriesPoint, Value};
