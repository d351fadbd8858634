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

//! Per-handle diagnostic records.
//!
//! Every public statement call starts by clearing the queue. Errors and
//! warnings raised during the call are appended, and the header return code
//! tracks the result of the last call.

use crate::error::{Error, SqlState};
use crate::types::SqlReturn;

/// Row number used when a record is not tied to a row.
pub const NO_ROW_NUMBER: i64 = -1;
/// Column number used when a record is not tied to a column.
pub const NO_COLUMN_NUMBER: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub sql_state: SqlState,
    pub message: String,
    pub row: i64,
    pub column: i32,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    records: Vec<DiagnosticRecord>,
    return_code: SqlReturn,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            return_code: SqlReturn::Success,
        }
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.return_code = SqlReturn::Success;
    }

    pub fn push(&mut self, sql_state: SqlState, message: impl Into<String>, row: i64, column: i32) {
        let message = message.into();
        if sql_state.is_warning() {
            tracing::debug!("[{}] {}", sql_state, message);
        } else {
            tracing::warn!("[{}] {}", sql_state, message);
        }
        self.records.push(DiagnosticRecord {
            sql_state,
            message,
            row,
            column,
        });
    }

    /// Record an error not tied to a row or column.
    pub fn push_error(&mut self, error: &Error) {
        self.push(error.sql_state(), error.message(), NO_ROW_NUMBER, NO_COLUMN_NUMBER);
    }

    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    /// 1-based lookup, as `SQLGetDiagRec` numbers records.
    pub fn record(&self, number: usize) -> Option<&DiagnosticRecord> {
        self.records.get(number.checked_sub(1)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn return_code(&self) -> SqlReturn {
        self.return_code
    }

    pub(crate) fn set_return_code(&mut self, code: SqlReturn) -> SqlReturn {
        self.return_code = code;
        code
    }
}
