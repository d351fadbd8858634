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

//! Forward-only cursor over the row batch of one execution.
//!
//! Position 0 is before the first row, so [`Cursor::increment`] must be
//! called before the first read. [`Column`] wrappers are created lazily the
//! first time a column index is read, and never re-created.

pub mod column;

pub use column::{Column, NULL_DISPLAY};

use crate::app::{ApplicationDataBuffer, ConversionResult};
use crate::types::value::{ColumnInfo, Row, Value};

/// Default bound on the rendering of one nested element.
pub const DEFAULT_NESTED_VALUE_MAX_LENGTH: usize = 1024;

#[derive(Debug)]
pub struct Cursor {
    metadata: Vec<ColumnInfo>,
    rows: Vec<Row>,
    position: usize,
    columns: Vec<Column>,
    nested_max_len: usize,
}

impl Cursor {
    pub fn new(metadata: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        tracing::debug!(
            "Creating cursor: {} columns, {} rows",
            metadata.len(),
            rows.len()
        );
        // Full capacity up front so discovered wrappers never move.
        let columns = Vec::with_capacity(metadata.len());
        Self {
            metadata,
            rows,
            position: 0,
            columns,
            nested_max_len: DEFAULT_NESTED_VALUE_MAX_LENGTH,
        }
    }

    pub fn with_nested_value_max_length(mut self, max_len: usize) -> Self {
        self.nested_max_len = max_len.max(1);
        self
    }

    /// Advance to the next row. Returns whether a row is now available.
    pub fn increment(&mut self) -> bool {
        if self.position <= self.rows.len() {
            self.position += 1;
        }
        self.has_data()
    }

    /// Whether the cursor is on a row.
    pub fn has_data(&self) -> bool {
        self.position >= 1 && self.position <= self.rows.len()
    }

    /// 1-based number of the current row; 0 before the first row.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn metadata(&self) -> &[ColumnInfo] {
        &self.metadata
    }

    pub fn column_count(&self) -> usize {
        self.metadata.len()
    }

    /// Number of column wrappers created so far.
    pub fn discovered_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: u16) -> Option<&Column> {
        self.columns.get(usize::from(index).checked_sub(1)?)
    }

    /// Value of column `index` (1-based) in the current row.
    pub fn value(&self, index: u16) -> Option<&Value> {
        if !self.has_data() {
            return None;
        }
        let row = self.rows.get(self.position - 1)?;
        row.get(usize::from(index).checked_sub(1)?)
    }

    /// Convert column `index` (1-based) of the current row into `buffer`.
    ///
    /// An index outside the column metadata is a `Failure` and discovers
    /// nothing. Reading while not on a row is `NoData`.
    pub fn read_column_to_buffer(
        &mut self,
        index: u16,
        buffer: &mut ApplicationDataBuffer,
    ) -> ConversionResult {
        let wanted = usize::from(index);
        if wanted == 0 || wanted > self.metadata.len() {
            tracing::warn!(
                "Column {} out of range: result has {} columns",
                index,
                self.metadata.len()
            );
            return ConversionResult::Failure;
        }
        if !self.has_data() {
            return ConversionResult::NoData;
        }
        while self.columns.len() < wanted {
            let next = self.columns.len();
            self.columns
                .push(Column::new((next + 1) as u16, self.metadata[next].clone()));
        }
        let null = Value::Null;
        let value = self
            .rows
            .get(self.position - 1)
            .and_then(|row| row.get(wanted - 1))
            .unwrap_or(&null);
        let result = self.columns[wanted - 1].read_to_buffer(value, buffer, self.nested_max_len);
        if !result.is_success() && result != ConversionResult::NoData {
            tracing::debug!(
                "Conversion of row {} column {} to {:?} failed: {:?}",
                self.position,
                index,
                buffer.native_type(),
                result
            );
        }
        result
    }
}
