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

//! Statement implementation: column binding, execution and fetch.
//!
//! Every public operation clears the statement's diagnostics, runs an
//! internal variant returning [`Result`], and converts any error into a
//! diagnostic record plus an `SqlReturn` code.

use crate::app::{ApplicationDataBuffer, CallerPtr, ConversionResult};
use crate::client::{QueryResult, QueryService};
use crate::config::DriverConfig;
use crate::cursor::Cursor;
use crate::descriptor::{
    Descriptor, DescriptorField, DescriptorHandle, DescriptorOwner, DescriptorType,
    DescriptorValue,
};
use crate::diagnostic::Diagnostics;
use crate::error::{DriverErrorHelper, Error, Result, SqlState};
use crate::metadata::{
    build_catalogs_result, build_columns_result, build_schemas_result, build_table_types_result,
    build_tables_result, build_type_info_result, filter_by_pattern, TableInfo,
};
use crate::parameter::substitute_parameters;
use crate::types::native::NativeType;
use crate::types::sql::*;
use crate::types::value::ColumnInfo;
use crate::types::SqlReturn;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::c_void;
use std::rc::Rc;
use std::sync::Arc;
use tokio::runtime::Handle as RuntimeHandle;
use tracing::{debug, info, trace};

/// Search pattern naming every catalog, schema or table type.
const SQL_ALL_PATTERN: &str = "%";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Allocated,
    Prepared,
    /// A result set is open and positioned before its first row.
    Executed,
    /// A result set is open but not positioned on a row.
    Fetching,
    HasRow,
    Closed,
}

/// Value of a statement attribute.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Integer(i64),
    Pointer(CallerPtr<c_void>),
    Descriptor(Option<DescriptorHandle>),
}

impl AttributeValue {
    pub fn pointer<T>(ptr: CallerPtr<T>) -> Self {
        AttributeValue::Pointer(ptr.cast())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<CallerPtr<c_void>> {
        match self {
            AttributeValue::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&DescriptorHandle> {
        match self {
            AttributeValue::Descriptor(d) => d.as_ref(),
            _ => None,
        }
    }
}

/// A statement allocated on a [`Connection`](crate::connection::Connection).
///
/// Holds the four implicit descriptors, the optional explicit application
/// descriptors, the column binding map and the open cursor.
#[derive(Debug)]
pub struct Statement {
    id: u64,
    connection_id: u64,
    service: Arc<dyn QueryService>,
    runtime_handle: RuntimeHandle,
    nested_value_max_length: usize,

    state: StatementState,
    query: Option<String>,
    /// Service-side identifier of the last execution.
    query_id: Option<String>,
    cursor: Option<Cursor>,

    ard: DescriptorHandle,
    apd: DescriptorHandle,
    ird: DescriptorHandle,
    ipd: DescriptorHandle,
    explicit_ard: Option<DescriptorHandle>,
    explicit_apd: Option<DescriptorHandle>,

    /// Bound columns, mirrored from the active ARD.
    bindings: BTreeMap<u16, ApplicationDataBuffer>,
    /// Identity and revision of the ARD the bindings were built from.
    bindings_source: Option<(usize, u64)>,

    diagnostics: Diagnostics,
}

impl Statement {
    pub(crate) fn new(
        connection_id: u64,
        id: u64,
        service: Arc<dyn QueryService>,
        runtime_handle: RuntimeHandle,
        config: &DriverConfig,
    ) -> Self {
        let owner = DescriptorOwner {
            connection_id,
            statement_id: Some(id),
        };
        let mut ard = Descriptor::implicit(DescriptorType::Ard, owner);
        ard.set_array_size(config.row_array_size);
        debug!("Allocated statement {} on connection {}", id, connection_id);
        Self {
            id,
            connection_id,
            service,
            runtime_handle,
            nested_value_max_length: config.nested_value_max_length,
            state: StatementState::Allocated,
            query: None,
            query_id: None,
            cursor: None,
            ard: Descriptor::new_handle(ard),
            apd: Descriptor::new_handle(Descriptor::implicit(DescriptorType::Apd, owner)),
            ird: Descriptor::new_handle(Descriptor::implicit(DescriptorType::Ird, owner)),
            ipd: Descriptor::new_handle(Descriptor::implicit(DescriptorType::Ipd, owner)),
            explicit_ard: None,
            explicit_apd: None,
            bindings: BTreeMap::new(),
            bindings_source: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> StatementState {
        self.state
    }

    /// Returns the current SQL query.
    pub fn sql_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// The descriptor currently serving `role`.
    pub fn descriptor(&self, role: DescriptorType) -> DescriptorHandle {
        self.active(role)
    }

    /// Whether `column` currently has a bound buffer.
    pub fn is_column_bound(&mut self, column: u16) -> bool {
        self.sync_bindings();
        self.bindings.contains_key(&column)
    }

    /// Number of columns in the current result set.
    pub fn num_result_cols(&self) -> u16 {
        self.ird.borrow().count()
    }

    // ---------------------------------------------------------------------
    // Descriptors
    // ---------------------------------------------------------------------

    fn owner(&self) -> DescriptorOwner {
        DescriptorOwner {
            connection_id: self.connection_id,
            statement_id: Some(self.id),
        }
    }

    fn implicit(&self, role: DescriptorType) -> &DescriptorHandle {
        match role {
            DescriptorType::Ard => &self.ard,
            DescriptorType::Apd => &self.apd,
            DescriptorType::Ird => &self.ird,
            DescriptorType::Ipd => &self.ipd,
        }
    }

    /// Explicit descriptor while it is still registered, else the implicit
    /// one.
    fn active(&self, role: DescriptorType) -> DescriptorHandle {
        let explicit = match role {
            DescriptorType::Ard => self.explicit_ard.as_ref(),
            DescriptorType::Apd => self.explicit_apd.as_ref(),
            _ => None,
        };
        match explicit {
            Some(desc) if desc.borrow().is_registered() => Rc::clone(desc),
            _ => Rc::clone(self.implicit(role)),
        }
    }

    fn release_deregistered(&mut self) {
        for (role, slot) in [
            (DescriptorType::Ard, &mut self.explicit_ard),
            (DescriptorType::Apd, &mut self.explicit_apd),
        ] {
            if slot.as_ref().is_some_and(|d| !d.borrow().is_registered()) {
                debug!("Explicit {} was freed; using the implicit descriptor", role);
                *slot = None;
            }
        }
    }

    /// Rebuild the binding map when the active ARD changed since the last
    /// sync.
    fn sync_bindings(&mut self) {
        self.release_deregistered();
        let ard = self.active(DescriptorType::Ard);
        let desc = ard.borrow();
        let source = (Rc::as_ptr(&ard) as usize, desc.revision());
        if self.bindings_source == Some(source) {
            return;
        }
        self.bindings = desc
            .records()
            .filter(|(_, record)| record.is_bound())
            .filter_map(|(n, record)| record.to_data_buffer().map(|buffer| (n, buffer)))
            .collect();
        self.bindings_source = Some(source);
        trace!("Statement {}: {} bound columns", self.id, self.bindings.len());
    }

    /// Use an explicitly allocated descriptor as the ARD; `None` restores the
    /// implicit one.
    pub fn set_ard_desc(&mut self, desc: Option<DescriptorHandle>) -> SqlReturn {
        self.diagnostics.clear();
        let result = self
            .set_app_desc(DescriptorType::Ard, desc)
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    /// Use an explicitly allocated descriptor as the APD; `None` restores the
    /// implicit one.
    pub fn set_apd_desc(&mut self, desc: Option<DescriptorHandle>) -> SqlReturn {
        self.diagnostics.clear();
        let result = self
            .set_app_desc(DescriptorType::Apd, desc)
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    /// Drop any explicit descriptor for `role` and go back to the implicit
    /// one. The binding map is rebuilt from the newly active descriptor.
    pub fn restore_descriptor(&mut self, role: DescriptorType) -> SqlReturn {
        self.diagnostics.clear();
        self.restore(role);
        self.finish(Ok(SqlReturn::Success))
    }

    fn restore(&mut self, role: DescriptorType) {
        match role {
            DescriptorType::Ard => self.explicit_ard = None,
            DescriptorType::Apd => self.explicit_apd = None,
            _ => return,
        }
        debug!("Statement {}: restored implicit {}", self.id, role);
        if role == DescriptorType::Ard {
            self.bindings_source = None;
            self.sync_bindings();
        }
    }

    fn set_app_desc(&mut self, role: DescriptorType, desc: Option<DescriptorHandle>) -> Result<()> {
        let desc = match desc {
            Some(desc) if !Rc::ptr_eq(&desc, self.implicit(role)) => desc,
            _ => {
                self.restore(role);
                return Ok(());
            }
        };
        {
            let current = desc.borrow();
            if current.is_implicit() {
                return Err(DriverErrorHelper::invalid_argument()
                    .state(SqlState::SHY017InvalidUseOfAutoDesc)
                    .message("An implicitly allocated descriptor cannot be set on a statement"));
            }
            if current.owner().connection_id != self.connection_id {
                return Err(DriverErrorHelper::invalid_argument()
                    .message("Descriptor was allocated on another connection"));
            }
            if !current.is_registered() {
                return Err(DriverErrorHelper::invalid_argument()
                    .message("Descriptor has been freed"));
            }
        }
        {
            let mut current = desc.borrow_mut();
            current.assume_role(role);
            current.set_owner(self.owner());
        }
        info!("Statement {}: using explicit {}", self.id, role);
        match role {
            DescriptorType::Ard => {
                self.explicit_ard = Some(desc);
                self.bindings_source = None;
                self.sync_bindings();
            }
            _ => self.explicit_apd = Some(desc),
        }
        Ok(())
    }

    /// Set a field of the active descriptor of `role`.
    pub fn set_descriptor_field(
        &mut self,
        role: DescriptorType,
        rec_number: i16,
        field: DescriptorField,
        value: DescriptorValue,
        buffer_len: isize,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let desc = self.active(role);
        let result = desc
            .borrow_mut()
            .set_field(rec_number, field, value, buffer_len)
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    /// Read a field of the active descriptor of `role` into `value`.
    /// `NoData` when the record does not exist.
    pub fn get_descriptor_field(
        &mut self,
        role: DescriptorType,
        rec_number: i16,
        field: DescriptorField,
        value: &mut Option<DescriptorValue>,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let desc = self.active(role);
        let result = desc.borrow().get_field(rec_number, field).map(|field_value| {
            let code = if field_value.is_some() {
                SqlReturn::Success
            } else {
                SqlReturn::NoData
            };
            *value = field_value;
            code
        });
        self.finish(result)
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    pub fn set_attribute(&mut self, attribute: i32, value: AttributeValue) -> SqlReturn {
        self.diagnostics.clear();
        let result = self
            .set_attribute_impl(attribute, value)
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    fn set_attribute_impl(&mut self, attribute: i32, value: AttributeValue) -> Result<()> {
        debug!("Statement {}: set attribute {}", self.id, attribute);
        match attribute {
            SQL_ATTR_ROW_ARRAY_SIZE => {
                let size = positive_size(attribute, &value)?;
                self.active(DescriptorType::Ard).borrow_mut().set_array_size(size);
            }
            SQL_ATTR_PARAMSET_SIZE => {
                let size = positive_size(attribute, &value)?;
                self.active(DescriptorType::Apd).borrow_mut().set_array_size(size);
            }
            SQL_ATTR_ROW_BIND_TYPE => {
                let bind_type = value
                    .as_integer()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| invalid_attribute_value(attribute))?;
                self.active(DescriptorType::Ard).borrow_mut().set_bind_type(bind_type);
            }
            SQL_ATTR_ROW_BIND_OFFSET_PTR => {
                let ptr = attribute_pointer(attribute, &value)?;
                self.active(DescriptorType::Ard)
                    .borrow_mut()
                    .set_bind_offset_ptr(ptr.cast());
            }
            SQL_ATTR_ROW_STATUS_PTR => {
                let ptr = attribute_pointer(attribute, &value)?;
                self.ird.borrow_mut().set_array_status_ptr(ptr.cast());
            }
            SQL_ATTR_ROWS_FETCHED_PTR => {
                let ptr = attribute_pointer(attribute, &value)?;
                self.ird.borrow_mut().set_rows_processed_ptr(ptr.cast());
            }
            SQL_ATTR_APP_ROW_DESC | SQL_ATTR_APP_PARAM_DESC => {
                let desc = match value {
                    AttributeValue::Descriptor(desc) => desc,
                    _ => return Err(invalid_attribute_value(attribute)),
                };
                let role = if attribute == SQL_ATTR_APP_ROW_DESC {
                    DescriptorType::Ard
                } else {
                    DescriptorType::Apd
                };
                self.set_app_desc(role, desc)?;
            }
            SQL_ATTR_IMP_ROW_DESC | SQL_ATTR_IMP_PARAM_DESC => {
                return Err(DriverErrorHelper::invalid_argument()
                    .state(SqlState::SHY017InvalidUseOfAutoDesc)
                    .message("Implementation descriptors cannot be replaced"));
            }
            _ => return Err(unknown_attribute(attribute)),
        }
        Ok(())
    }

    /// Read a statement attribute into `value`.
    pub fn get_attribute(&mut self, attribute: i32, value: &mut Option<AttributeValue>) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.get_attribute_impl(attribute).map(|v| {
            *value = Some(v);
            SqlReturn::Success
        });
        self.finish(result)
    }

    fn get_attribute_impl(&self, attribute: i32) -> Result<AttributeValue> {
        let ard = self.active(DescriptorType::Ard);
        let ard = ard.borrow();
        let value = match attribute {
            SQL_ATTR_ROW_ARRAY_SIZE => AttributeValue::Integer(ard.header().array_size() as i64),
            SQL_ATTR_ROW_BIND_TYPE => AttributeValue::Integer(ard.header().bind_type() as i64),
            SQL_ATTR_ROW_BIND_OFFSET_PTR => AttributeValue::pointer(ard.header().bind_offset_ptr()),
            SQL_ATTR_PARAMSET_SIZE => AttributeValue::Integer(
                self.active(DescriptorType::Apd).borrow().header().array_size() as i64,
            ),
            SQL_ATTR_ROW_STATUS_PTR => {
                AttributeValue::pointer(self.ird.borrow().header().array_status_ptr())
            }
            SQL_ATTR_ROWS_FETCHED_PTR => {
                AttributeValue::pointer(self.ird.borrow().header().rows_processed_ptr())
            }
            SQL_ATTR_APP_ROW_DESC => {
                AttributeValue::Descriptor(Some(self.active(DescriptorType::Ard)))
            }
            SQL_ATTR_APP_PARAM_DESC => {
                AttributeValue::Descriptor(Some(self.active(DescriptorType::Apd)))
            }
            SQL_ATTR_IMP_ROW_DESC => AttributeValue::Descriptor(Some(Rc::clone(&self.ird))),
            SQL_ATTR_IMP_PARAM_DESC => AttributeValue::Descriptor(Some(Rc::clone(&self.ipd))),
            _ => return Err(unknown_attribute(attribute)),
        };
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // Binding
    // ---------------------------------------------------------------------

    /// Bind an application buffer to result column `column`. A null `ptr`
    /// unbinds the column.
    pub fn bind_column(
        &mut self,
        column: u16,
        c_type: i16,
        ptr: CallerPtr<u8>,
        buffer_len: isize,
        indicator: CallerPtr<isize>,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let result = self
            .bind_column_impl(column, c_type, ptr, buffer_len, indicator)
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    fn bind_column_impl(
        &mut self,
        column: u16,
        c_type: i16,
        ptr: CallerPtr<u8>,
        buffer_len: isize,
        indicator: CallerPtr<isize>,
    ) -> Result<()> {
        if column == 0 {
            return Err(invalid_column(column));
        }
        if ptr.is_null() {
            self.unbind_column(column);
            return Ok(());
        }
        let native = NativeType::from_c_type(c_type).ok_or_else(|| invalid_c_type(c_type))?;
        if buffer_len < 0 {
            return Err(DriverErrorHelper::invalid_argument()
                .state(SqlState::SHY090InvalidBufferLength)
                .message(format!("Invalid buffer length {}", buffer_len)));
        }
        self.sync_bindings();

        let ard = self.active(DescriptorType::Ard);
        let mut desc = ard.borrow_mut();
        let record = desc.record_mut(column);
        record.apply_concise_type(c_type);
        if native.fixed_size().is_none() {
            record.octet_length = buffer_len as i64;
        }
        record.data_ptr = ptr;
        record.indicator_ptr = indicator;
        record.octet_length_ptr = indicator;
        let buffer = ApplicationDataBuffer::new(native, ptr, buffer_len, indicator)
            .with_numeric_scale(record.scale());

        self.bindings.insert(column, buffer);
        self.bindings_source = Some((Rc::as_ptr(&ard) as usize, desc.revision()));
        debug!("Statement {}: bound column {} as {:?}", self.id, column, native);
        Ok(())
    }

    fn unbind_column(&mut self, column: u16) {
        self.sync_bindings();
        let ard = self.active(DescriptorType::Ard);
        let mut desc = ard.borrow_mut();
        if desc.record(column).is_some() {
            desc.record_mut(column).unbind();
        }
        self.bindings.remove(&column);
        self.bindings_source = Some((Rc::as_ptr(&ard) as usize, desc.revision()));
        debug!("Statement {}: unbound column {}", self.id, column);
    }

    /// Remove the binding of `column`, keeping the descriptor record's type
    /// information.
    pub fn safe_unbind_column(&mut self, column: u16) -> SqlReturn {
        self.diagnostics.clear();
        self.unbind_column(column);
        self.finish(Ok(SqlReturn::Success))
    }

    /// Remove every column binding, keeping the descriptor records' type
    /// information.
    pub fn safe_unbind_all_columns(&mut self) -> SqlReturn {
        self.diagnostics.clear();
        self.unbind_all_columns();
        self.finish(Ok(SqlReturn::Success))
    }

    fn unbind_all_columns(&mut self) {
        self.sync_bindings();
        let ard = self.active(DescriptorType::Ard);
        let mut desc = ard.borrow_mut();
        let bound: Vec<u16> = desc
            .records()
            .filter(|(_, record)| record.is_bound())
            .map(|(n, _)| n)
            .collect();
        for n in bound {
            desc.record_mut(n).unbind();
        }
        self.bindings.clear();
        self.bindings_source = Some((Rc::as_ptr(&ard) as usize, desc.revision()));
    }

    /// Bind an application buffer to parameter marker `number`.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_parameter(
        &mut self,
        number: u16,
        io_type: i16,
        c_type: i16,
        sql_type: i16,
        column_size: usize,
        decimal_digits: i16,
        ptr: CallerPtr<u8>,
        buffer_len: isize,
        indicator: CallerPtr<isize>,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let result = self
            .bind_parameter_impl(
                number,
                io_type,
                c_type,
                sql_type,
                column_size,
                decimal_digits,
                ptr,
                buffer_len,
                indicator,
            )
            .map(|_| SqlReturn::Success);
        self.finish(result)
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_parameter_impl(
        &mut self,
        number: u16,
        io_type: i16,
        c_type: i16,
        sql_type: i16,
        column_size: usize,
        decimal_digits: i16,
        ptr: CallerPtr<u8>,
        buffer_len: isize,
        indicator: CallerPtr<isize>,
    ) -> Result<()> {
        if number == 0 {
            return Err(invalid_column(number));
        }
        let native = NativeType::from_c_type(c_type).ok_or_else(|| invalid_c_type(c_type))?;
        if !matches!(
            io_type,
            SQL_PARAM_INPUT | SQL_PARAM_INPUT_OUTPUT | SQL_PARAM_OUTPUT
        ) {
            return Err(DriverErrorHelper::invalid_argument()
                .message(format!("Invalid parameter type {}", io_type)));
        }

        {
            let apd = self.active(DescriptorType::Apd);
            let mut desc = apd.borrow_mut();
            let record = desc.record_mut(number);
            record.apply_concise_type(c_type);
            if native.fixed_size().is_none() {
                record.octet_length = buffer_len as i64;
            }
            record.data_ptr = ptr;
            record.indicator_ptr = indicator;
            record.octet_length_ptr = indicator;
        }

        let mut ipd = self.ipd.borrow_mut();
        let record = ipd.record_mut(number);
        record.apply_concise_type(sql_type);
        record.parameter_type = io_type;
        let size = i16::try_from(column_size).unwrap_or(i16::MAX);
        if is_variable_length_type(sql_type) {
            record.length = column_size as i64;
        } else if matches!(sql_type, SQL_DECIMAL | SQL_NUMERIC) {
            record.precision = size;
            record.scale = decimal_digits;
        } else if is_datetime_type(sql_type) || is_interval_type(sql_type) {
            record.precision = decimal_digits;
        }
        debug!(
            "Statement {}: bound parameter {} as {:?} -> SQL type {}",
            self.id, number, native, sql_type
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Prepare and execute `sql`.
    pub fn execute_sql_query(&mut self, sql: &str) -> SqlReturn {
        self.diagnostics.clear();
        self.prepare(sql);
        let result = self.execute_impl();
        self.finish(result)
    }

    /// Remember `sql` for a later [`execute`](Self::execute).
    pub fn prepare_sql_query(&mut self, sql: &str) -> SqlReturn {
        self.diagnostics.clear();
        self.prepare(sql);
        self.finish(Ok(SqlReturn::Success))
    }

    /// Execute the prepared query.
    pub fn execute(&mut self) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.execute_impl();
        self.finish(result)
    }

    fn prepare(&mut self, sql: &str) {
        self.close_cursor();
        self.query = Some(sql.to_string());
        self.state = StatementState::Prepared;
    }

    fn execute_impl(&mut self) -> Result<SqlReturn> {
        let query = self.query.clone().ok_or_else(|| {
            DriverErrorHelper::invalid_state().message("No query has been prepared")
        })?;
        self.close_cursor();

        let apd = self.active(DescriptorType::Apd);
        let apd = apd.borrow();
        if apd.header().array_size() > 1 {
            return Err(DriverErrorHelper::not_implemented()
                .message("Arrays of parameter values are not supported"));
        }
        let sql = substitute_parameters(&query, &apd, &self.ipd.borrow())?;
        drop(apd);

        info!("Statement {}: executing query", self.id);
        debug!("SQL: {}", sql);
        let result = self
            .runtime_handle
            .block_on(self.service.execute_query(&sql))?;
        self.open_cursor(result);
        Ok(SqlReturn::Success)
    }

    /// Replace the cursor with one over `result` and describe its columns in
    /// the IRD.
    fn open_cursor(&mut self, result: QueryResult) {
        let QueryResult {
            query_id,
            columns,
            rows,
        } = result;
        self.ird.borrow_mut().populate_from_columns(&columns);
        debug!(
            "Statement {}: result set with {} columns, {} rows",
            self.id,
            columns.len(),
            rows.len()
        );
        self.query_id = query_id;
        self.cursor = Some(
            Cursor::new(columns, rows).with_nested_value_max_length(self.nested_value_max_length),
        );
        self.state = StatementState::Executed;
    }

    fn close_cursor(&mut self) {
        if self.cursor.take().is_some() {
            debug!("Statement {}: closed cursor", self.id);
        }
        self.query_id = None;
        self.state = if self.query.is_some() {
            StatementState::Prepared
        } else {
            StatementState::Allocated
        };
    }

    /// Forward a cancel request for the running query to the query service.
    pub fn cancel_sql_query(&mut self) -> SqlReturn {
        self.diagnostics.clear();
        let result = match self.query_id.clone() {
            Some(query_id) => {
                info!("Statement {}: cancelling query {}", self.id, query_id);
                self.runtime_handle
                    .block_on(self.service.cancel_query(&query_id))
                    .map(|_| SqlReturn::Success)
            }
            None => {
                debug!("Statement {}: nothing to cancel", self.id);
                Ok(SqlReturn::Success)
            }
        };
        self.finish(result)
    }

    /// `SQL_CLOSE`, `SQL_UNBIND` or `SQL_RESET_PARAMS`.
    pub fn free_resources(&mut self, option: u16) -> SqlReturn {
        self.diagnostics.clear();
        let result = match option {
            SQL_CLOSE => {
                self.close_cursor();
                Ok(SqlReturn::Success)
            }
            SQL_UNBIND => {
                self.unbind_all_columns();
                self.active(DescriptorType::Ard).borrow_mut().set_count(0);
                Ok(SqlReturn::Success)
            }
            SQL_RESET_PARAMS => {
                self.active(DescriptorType::Apd).borrow_mut().set_count(0);
                self.ipd.borrow_mut().clear_records();
                Ok(SqlReturn::Success)
            }
            _ => Err(DriverErrorHelper::invalid_argument()
                .state(SqlState::SHY092InvalidAttribute)
                .message(format!("Invalid free option {}", option))),
        };
        self.finish(result)
    }

    /// Close the result set. Calling it again is a no-op.
    pub fn close(&mut self) -> SqlReturn {
        self.diagnostics.clear();
        if self.state != StatementState::Closed {
            self.close_cursor();
            self.state = StatementState::Closed;
        }
        self.finish(Ok(SqlReturn::Success))
    }

    // ---------------------------------------------------------------------
    // Fetch
    // ---------------------------------------------------------------------

    /// Fetch the next rowset into the bound columns.
    pub fn fetch_row(&mut self) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.fetch_impl();
        self.finish(result)
    }

    /// Fetch a rowset in the given orientation. The cursor is forward only,
    /// so only `SQL_FETCH_NEXT` is accepted.
    pub fn fetch_scroll(&mut self, orientation: i16, offset: isize) -> SqlReturn {
        self.diagnostics.clear();
        let result = if orientation == SQL_FETCH_NEXT {
            self.fetch_impl()
        } else {
            Err(DriverErrorHelper::invalid_argument()
                .state(SqlState::SHY106FetchTypeOutOfRange)
                .message(format!(
                    "Fetch orientation {} (offset {}) is not supported by a forward-only cursor",
                    orientation, offset
                )))
        };
        self.finish(result)
    }

    fn check_cursor(&self) -> Result<()> {
        match self.state {
            StatementState::Allocated | StatementState::Prepared => {
                Err(DriverErrorHelper::invalid_state()
                    .message("The statement has not been executed"))
            }
            StatementState::Closed => Err(cursor_closed()),
            _ if self.cursor.is_none() => Err(cursor_closed()),
            _ => Ok(()),
        }
    }

    fn fetch_impl(&mut self) -> Result<SqlReturn> {
        self.check_cursor()?;
        self.sync_bindings();

        let (array_size, bind_type, bind_offset) = {
            let ard = self.active(DescriptorType::Ard);
            let desc = ard.borrow();
            let header = desc.header();
            (
                header.array_size().max(1),
                header.bind_type(),
                header.bind_offset(),
            )
        };
        let (status_ptr, fetched_ptr) = {
            let ird = self.ird.borrow();
            (
                ird.header().array_status_ptr(),
                ird.header().rows_processed_ptr(),
            )
        };
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(cursor_closed());
        };

        let mut fetched = 0usize;
        let mut overall = SqlReturn::Success;
        for row in 0..array_size {
            if !cursor.increment() {
                break;
            }
            fetched += 1;
            let mut row_status = SqlReturn::Success;
            for (column, binding) in &self.bindings {
                let mut buffer = binding.clone();
                if bind_type == SQL_BIND_BY_COLUMN {
                    buffer.set_byte_offset(bind_offset);
                    buffer.set_element_offset(row);
                } else {
                    buffer.set_byte_offset(bind_offset + (row * bind_type) as isize);
                }
                let result = cursor.read_column_to_buffer(*column, &mut buffer);
                if let Some(state) = result.sql_state() {
                    self.diagnostics.push(
                        state,
                        conversion_message(result, *column),
                        (row + 1) as i64,
                        i32::from(*column),
                    );
                }
                // A nested row without data leaves the buffer untouched.
                if result != ConversionResult::NoData {
                    row_status = row_status.worst(result.to_sql_return());
                }
            }
            status_ptr.write_at(row, row_status.row_status());
            overall = overall.worst(row_status);
        }
        for row in fetched..array_size {
            status_ptr.write_at(row, SQL_ROW_NOROW);
        }
        fetched_ptr.write(fetched);

        self.state = if fetched > 0 && cursor.has_data() {
            StatementState::HasRow
        } else {
            StatementState::Fetching
        };
        if fetched == 0 {
            debug!("Statement {}: no more rows", self.id);
            return Ok(SqlReturn::NoData);
        }
        trace!("Statement {}: fetched {} rows", self.id, fetched);
        Ok(overall)
    }

    /// Convert column `column` of the current row into `buffer`, for
    /// columns that were not bound.
    pub fn get_column_data(&mut self, column: u16, buffer: &mut ApplicationDataBuffer) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.get_column_data_impl(column, buffer);
        self.finish(result)
    }

    fn get_column_data_impl(
        &mut self,
        column: u16,
        buffer: &mut ApplicationDataBuffer,
    ) -> Result<SqlReturn> {
        self.check_cursor()?;
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(cursor_closed());
        };
        if column == 0 || usize::from(column) > cursor.column_count() {
            return Err(invalid_column(column));
        }
        if !cursor.has_data() {
            return Err(DriverErrorHelper::invalid_state()
                .state(SqlState::S24000InvalidCursorState)
                .message("The cursor is not positioned on a row"));
        }
        let result = cursor.read_column_to_buffer(column, buffer);
        if let Some(state) = result.sql_state() {
            self.diagnostics.push(
                state,
                conversion_message(result, column),
                cursor.position() as i64,
                i32::from(column),
            );
        }
        Ok(result.to_sql_return())
    }

    // ---------------------------------------------------------------------
    // Catalog pseudo-queries
    // ---------------------------------------------------------------------

    /// Table listing filtered by LIKE patterns, with the catalog, schema and
    /// table-type enumeration special cases.
    pub fn execute_get_tables_meta_query(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        table_type: Option<&str>,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.tables_meta_impl(catalog, schema, table, table_type);
        self.finish(result)
    }

    fn tables_meta_impl(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        table_type: Option<&str>,
    ) -> Result<SqlReturn> {
        self.close_cursor();
        let blank = |s: Option<&str>| s == Some("");

        let result = if catalog == Some(SQL_ALL_PATTERN) && blank(schema) && blank(table) {
            let tables = self.list_tables(None, None)?;
            build_catalogs_result(&distinct(tables.iter().filter_map(|t| t.catalog_name.clone())))
        } else if schema == Some(SQL_ALL_PATTERN) && blank(catalog) && blank(table) {
            let tables = self.list_tables(None, None)?;
            build_schemas_result(&distinct(tables.iter().filter_map(|t| t.schema_name.clone())))
        } else if table_type == Some(SQL_ALL_PATTERN)
            && blank(catalog)
            && blank(schema)
            && blank(table)
        {
            let tables = self.list_tables(None, None)?;
            build_table_types_result(&distinct(tables.iter().map(|t| t.table_type.clone())))
        } else {
            let mut tables = self.matching_tables(catalog, schema, table)?;
            let types = parse_table_types(table_type);
            if !types.is_empty() {
                tables.retain(|t| types.iter().any(|ty| ty.eq_ignore_ascii_case(&t.table_type)));
            }
            tables.sort_by(|a, b| {
                (&a.table_type, &a.catalog_name, &a.schema_name, &a.table_name).cmp(&(
                    &b.table_type,
                    &b.catalog_name,
                    &b.schema_name,
                    &b.table_name,
                ))
            });
            build_tables_result(&tables)
        };
        self.open_cursor(result);
        Ok(SqlReturn::Success)
    }

    /// Column listing of every table matching the patterns.
    pub fn execute_get_columns_meta_query(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> SqlReturn {
        self.diagnostics.clear();
        let result = self.columns_meta_impl(catalog, schema, table, column);
        self.finish(result)
    }

    fn columns_meta_impl(
        &mut self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<SqlReturn> {
        self.close_cursor();
        let mut tables = self.matching_tables(catalog, schema, table)?;
        tables.sort_by(|a, b| {
            (&a.catalog_name, &a.schema_name, &a.table_name).cmp(&(
                &b.catalog_name,
                &b.schema_name,
                &b.table_name,
            ))
        });

        let mut listing: Vec<(TableInfo, Vec<(usize, ColumnInfo)>)> = Vec::new();
        for info in tables {
            let columns = self.runtime_handle.block_on(self.service.list_columns(
                info.catalog_name.as_deref(),
                info.schema_name.as_deref(),
                &info.table_name,
            ))?;
            let numbered: Vec<(usize, ColumnInfo)> = columns
                .into_iter()
                .enumerate()
                .map(|(i, c)| (i + 1, c))
                .collect();
            let numbered = filter_by_pattern(numbered, column, |(_, c)| c.name.as_str());
            if !numbered.is_empty() {
                listing.push((info, numbered));
            }
        }
        debug!("Statement {}: columns of {} tables", self.id, listing.len());
        self.open_cursor(build_columns_result(&listing));
        Ok(SqlReturn::Success)
    }

    /// Type listing for `sql_type`, or every type for `SQL_ALL_TYPES`.
    pub fn execute_get_type_info_query(&mut self, sql_type: i16) -> SqlReturn {
        self.diagnostics.clear();
        self.close_cursor();
        self.open_cursor(build_type_info_result(sql_type));
        self.finish(Ok(SqlReturn::Success))
    }

    fn list_tables(&self, catalog: Option<&str>, schema: Option<&str>) -> Result<Vec<TableInfo>> {
        self.runtime_handle
            .block_on(self.service.list_tables(catalog, schema))
    }

    fn matching_tables(
        &self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Result<Vec<TableInfo>> {
        let tables = self.list_tables(literal_name(catalog), literal_name(schema))?;
        let tables = filter_by_pattern(tables, catalog, |t| {
            t.catalog_name.as_deref().unwrap_or_default()
        });
        let tables = filter_by_pattern(tables, schema, |t| {
            t.schema_name.as_deref().unwrap_or_default()
        });
        Ok(filter_by_pattern(tables, table, |t| t.table_name.as_str()))
    }

    fn finish(&mut self, result: Result<SqlReturn>) -> SqlReturn {
        let code = match result {
            Ok(code) => code,
            Err(error) => {
                self.record_error(&error);
                SqlReturn::Error
            }
        };
        self.diagnostics.set_return_code(code)
    }

    fn record_error(&mut self, error: &Error) {
        debug!("Statement {}: {}", self.id, error);
        self.diagnostics.push_error(error);
    }
}

/// A search pattern without wildcards, usable as an exact name.
fn literal_name(pattern: Option<&str>) -> Option<&str> {
    pattern.filter(|p| !p.is_empty() && !p.contains(['%', '_', '\\']))
}

/// Table types from a list such as `'TABLE','VIEW'`. Empty or `%` means all.
fn parse_table_types(table_type: Option<&str>) -> Vec<String> {
    match table_type {
        None => Vec::new(),
        Some(list) => list
            .split(',')
            .map(|t| t.trim().trim_matches('\'').trim())
            .filter(|t| !t.is_empty() && *t != SQL_ALL_PATTERN)
            .map(str::to_string)
            .collect(),
    }
}

fn distinct(names: impl Iterator<Item = String>) -> Vec<String> {
    names.collect::<BTreeSet<_>>().into_iter().collect()
}

fn conversion_message(result: ConversionResult, column: u16) -> String {
    let text = match result {
        ConversionResult::FractionalTruncated => "Fractional truncation",
        ConversionResult::VarlenDataTruncated => "String data, right truncated",
        ConversionResult::UnsupportedConversion => "Restricted data type attribute violation",
        ConversionResult::IndicatorNeeded => "Indicator variable required but not supplied",
        ConversionResult::Success | ConversionResult::NoData | ConversionResult::Failure => {
            "General error"
        }
    };
    format!("{} (column {})", text, column)
}

fn cursor_closed() -> Error {
    DriverErrorHelper::invalid_state()
        .state(SqlState::S24000InvalidCursorState)
        .message("No open cursor")
}

fn invalid_column(column: u16) -> Error {
    DriverErrorHelper::invalid_argument()
        .state(SqlState::S07009InvalidDescriptorIndex)
        .message(format!("Invalid column or parameter number {}", column))
}

fn invalid_c_type(c_type: i16) -> Error {
    DriverErrorHelper::invalid_argument()
        .state(SqlState::SHY003InvalidBufferType)
        .message(format!("Invalid application buffer type {}", c_type))
}

fn unknown_attribute(attribute: i32) -> Error {
    DriverErrorHelper::invalid_argument()
        .state(SqlState::SHY092InvalidAttribute)
        .message(format!("Unknown statement attribute {}", attribute))
}

fn invalid_attribute_value(attribute: i32) -> Error {
    DriverErrorHelper::invalid_argument()
        .message(format!("Invalid value for statement attribute {}", attribute))
}

fn positive_size(attribute: i32, value: &AttributeValue) -> Result<usize> {
    value
        .as_integer()
        .and_then(|v| usize::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid_attribute_value(attribute))
}

fn attribute_pointer(attribute: i32, value: &AttributeValue) -> Result<CallerPtr<c_void>> {
    value
        .as_pointer()
        .ok_or_else(|| invalid_attribute_value(attribute))
}
