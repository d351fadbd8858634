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

//! Catalog pseudo-queries.
//!
//! Table, column and type listings are not run as SQL. The statement asks the
//! query service for the raw catalog, filters it driver side, and turns it
//! into a synthetic [`QueryResult`](crate::client::QueryResult) that is read
//! through the ordinary cursor.
//!
//! ## Module Structure
//!
//! - `types`: catalog data returned by the query service
//! - `filter`: SQL LIKE search patterns
//! - `schemas`: result column layouts
//! - `builder`: synthetic result rows

pub mod builder;
pub mod filter;
pub mod schemas;
pub mod types;

pub use builder::{
    build_catalogs_result, build_columns_result, build_schemas_result, build_table_types_result,
    build_tables_result, build_type_info_result,
};
pub use filter::{filter_by_pattern, like_match};
pub use types::TableInfo;
