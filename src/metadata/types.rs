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

//! Data structures returned by the query service's catalog calls.

use serde::{Deserialize, Serialize};

/// A table or view known to the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// The catalog containing this table, if the service has catalogs.
    #[serde(default)]
    pub catalog_name: Option<String>,
    /// The schema (database) containing this table.
    #[serde(default)]
    pub schema_name: Option<String>,
    /// The name of the table.
    pub table_name: String,
    /// The type of the table (e.g., "TABLE", "VIEW").
    #[serde(default = "default_table_type")]
    pub table_type: String,
    /// Optional remarks/comments about the table.
    #[serde(default)]
    pub remarks: Option<String>,
}

fn default_table_type() -> String {
    "TABLE".to_string()
}

impl TableInfo {
    pub fn new(table_name: impl Into<String>, table_type: impl Into<String>) -> Self {
        Self {
            catalog_name: None,
            schema_name: None,
            table_name: table_name.into(),
            table_type: table_type.into(),
            remarks: None,
        }
    }

    pub fn with_location(mut self, catalog: Option<&str>, schema: Option<&str>) -> Self {
        self.catalog_name = catalog.map(str::to_string);
        self.schema_name = schema.map(str::to_string);
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}
