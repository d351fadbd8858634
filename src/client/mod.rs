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

//! Boundary to the tabular query service.
//!
//! The core never talks to the network itself. A [`QueryService`]
//! implementation runs the query and hands back one complete row batch;
//! paging and retries are its own business.

use crate::error::Result;
use crate::metadata::TableInfo;
use crate::types::value::{ColumnInfo, Row};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Complete result of one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Service-side identifier, used to cancel the query.
    #[serde(default)]
    pub query_id: Option<String>,
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self {
            query_id: None,
            columns,
            rows,
        }
    }

    pub fn with_query_id(mut self, query_id: impl Into<String>) -> Self {
        self.query_id = Some(query_id.into());
        self
    }
}

/// Abstract interface to the query service.
///
/// Calls are async; the statement drives them to completion on the
/// connection's runtime so the call-level API stays synchronous.
#[async_trait]
pub trait QueryService: Send + Sync + std::fmt::Debug {
    /// Run `sql` and return every row.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Tables visible in the given catalog/schema; `None` means all.
    async fn list_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
    ) -> Result<Vec<TableInfo>>;

    /// Columns of one table, in ordinal order.
    async fn list_columns(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>>;

    /// Cancel a running query.
    async fn cancel_query(&self, query_id: &str) -> Result<()>;
}
