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

//! Descriptors: one header plus numbered records, in one of four roles.
//!
//! The role is fixed at construction. Every field access is checked against
//! the role legality table in [`field`] before it reaches the header or a
//! record. Each mutation bumps a revision counter that statements use to
//! notice that their column bindings need to be resynchronised.

pub mod field;
pub mod record;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

pub use field::{DescriptorField, DescriptorType, DescriptorValue, FieldKind};
pub use record::DescriptorRecord;

use crate::app::CallerPtr;
use crate::error::{DriverErrorHelper, Result, SqlState};
use crate::types::sql::{
    SQL_BIND_BY_COLUMN, SQL_DESC_ALLOC_AUTO, SQL_DESC_ALLOC_USER, SQL_IS_SMALLINT, SQL_NTS,
    SQL_NO_TOTAL,
};
use crate::types::traits::type_info;
use crate::types::value::ColumnInfo;

/// Shared handle to a descriptor. Explicit descriptors are shared between
/// the connection that allocated them and every statement they are set on.
pub type DescriptorHandle = Rc<RefCell<Descriptor>>;

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorHeader {
    pub(crate) alloc_type: i16,
    pub(crate) array_size: usize,
    pub(crate) array_status_ptr: CallerPtr<u16>,
    pub(crate) bind_offset_ptr: CallerPtr<isize>,
    pub(crate) bind_type: usize,
    pub(crate) rows_processed_ptr: CallerPtr<usize>,
}

impl DescriptorHeader {
    fn new(alloc_type: i16) -> Self {
        Self {
            alloc_type,
            array_size: 1,
            array_status_ptr: CallerPtr::null(),
            bind_offset_ptr: CallerPtr::null(),
            bind_type: SQL_BIND_BY_COLUMN,
            rows_processed_ptr: CallerPtr::null(),
        }
    }

    pub fn alloc_type(&self) -> i16 {
        self.alloc_type
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    pub fn array_status_ptr(&self) -> CallerPtr<u16> {
        self.array_status_ptr
    }

    pub fn bind_offset_ptr(&self) -> CallerPtr<isize> {
        self.bind_offset_ptr
    }

    /// `SQL_BIND_BY_COLUMN` or the row size in bytes for row-wise binding.
    pub fn bind_type(&self) -> usize {
        self.bind_type
    }

    pub fn rows_processed_ptr(&self) -> CallerPtr<usize> {
        self.rows_processed_ptr
    }

    /// Current bind offset, 0 when no offset pointer is set.
    pub fn bind_offset(&self) -> isize {
        self.bind_offset_ptr.read().unwrap_or(0)
    }
}

/// Connection and statement a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorOwner {
    pub connection_id: u64,
    pub statement_id: Option<u64>,
}

#[derive(Debug)]
pub struct Descriptor {
    role: DescriptorType,
    header: DescriptorHeader,
    records: BTreeMap<u16, DescriptorRecord>,
    owner: DescriptorOwner,
    registered: bool,
    revision: u64,
}

impl Descriptor {
    /// Descriptor allocated implicitly by a statement.
    pub fn implicit(role: DescriptorType, owner: DescriptorOwner) -> Self {
        let mut descriptor = Self {
            role,
            header: DescriptorHeader::new(SQL_DESC_ALLOC_AUTO),
            records: BTreeMap::new(),
            owner,
            registered: true,
            revision: 0,
        };
        descriptor.init_head(true);
        descriptor
    }

    /// Descriptor allocated explicitly by the application. Explicit
    /// descriptors can only serve as application descriptors; they start as
    /// an ARD and take whichever application role they are set in.
    pub fn explicit(owner: DescriptorOwner) -> Self {
        let mut descriptor = Self::implicit(DescriptorType::Ard, owner);
        descriptor.init_app_head(false);
        descriptor
    }

    pub fn new_handle(descriptor: Descriptor) -> DescriptorHandle {
        Rc::new(RefCell::new(descriptor))
    }

    pub fn role(&self) -> DescriptorType {
        self.role
    }

    pub fn header(&self) -> &DescriptorHeader {
        &self.header
    }

    pub fn owner(&self) -> DescriptorOwner {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: DescriptorOwner) {
        self.owner = owner;
    }

    pub fn is_implicit(&self) -> bool {
        self.header.alloc_type == SQL_DESC_ALLOC_AUTO
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn init_head(&mut self, implicit: bool) {
        if self.role.is_application() {
            self.init_app_head(implicit);
        } else {
            self.init_imp_head();
        }
    }

    /// Reset the header to application-descriptor defaults.
    pub fn init_app_head(&mut self, implicit: bool) {
        let alloc_type = if implicit {
            SQL_DESC_ALLOC_AUTO
        } else {
            SQL_DESC_ALLOC_USER
        };
        self.header = DescriptorHeader::new(alloc_type);
        self.touch();
    }

    /// Reset the header to implementation-descriptor defaults.
    pub fn init_imp_head(&mut self) {
        self.header = DescriptorHeader::new(SQL_DESC_ALLOC_AUTO);
        self.touch();
    }

    /// Highest record number in use.
    pub fn count(&self) -> u16 {
        self.records.keys().next_back().copied().unwrap_or(0)
    }

    pub fn record(&self, rec_number: u16) -> Option<&DescriptorRecord> {
        self.records.get(&rec_number)
    }

    /// Record `rec_number`, created with defaults if missing.
    pub(crate) fn record_mut(&mut self, rec_number: u16) -> &mut DescriptorRecord {
        self.touch();
        self.records.entry(rec_number).or_default()
    }

    pub fn records(&self) -> impl Iterator<Item = (u16, &DescriptorRecord)> {
        self.records.iter().map(|(n, r)| (*n, r))
    }

    pub(crate) fn set_count(&mut self, count: u16) {
        self.records.retain(|n, _| *n <= count);
        for n in 1..=count {
            self.records.entry(n).or_default();
        }
        self.touch();
    }

    pub(crate) fn remove_record(&mut self, rec_number: u16) {
        self.records.remove(&rec_number);
        self.touch();
    }

    pub(crate) fn clear_records(&mut self) {
        self.records.clear();
        self.touch();
    }

    /// Header setters used by statement attributes.
    pub(crate) fn set_array_size(&mut self, size: usize) {
        self.header.array_size = size.max(1);
        self.touch();
    }

    pub(crate) fn set_bind_type(&mut self, bind_type: usize) {
        self.header.bind_type = bind_type;
        self.touch();
    }

    pub(crate) fn set_bind_offset_ptr(&mut self, ptr: CallerPtr<isize>) {
        self.header.bind_offset_ptr = ptr;
        self.touch();
    }

    pub(crate) fn set_array_status_ptr(&mut self, ptr: CallerPtr<u16>) {
        self.header.array_status_ptr = ptr;
        self.touch();
    }

    pub(crate) fn set_rows_processed_ptr(&mut self, ptr: CallerPtr<usize>) {
        self.header.rows_processed_ptr = ptr;
        self.touch();
    }

    /// Set a field from its raw identifier.
    pub fn set_field_raw(
        &mut self,
        rec_number: i16,
        field_id: i16,
        value: DescriptorValue,
        buffer_len: isize,
    ) -> Result<()> {
        let field = DescriptorField::from_raw(field_id).ok_or_else(|| {
            DriverErrorHelper::descriptor().message(format!("Unknown descriptor field {}", field_id))
        })?;
        self.set_field(rec_number, field, value, buffer_len)
    }

    /// Set a header or record field.
    ///
    /// `buffer_len` must be non-negative, `SQL_NTS`, or one of the
    /// `SQL_IS_*` markers.
    pub fn set_field(
        &mut self,
        rec_number: i16,
        field: DescriptorField,
        value: DescriptorValue,
        buffer_len: isize,
    ) -> Result<()> {
        if buffer_len < 0 && buffer_len != SQL_NTS && !(SQL_IS_SMALLINT..=SQL_NO_TOTAL).contains(&buffer_len) {
            return Err(DriverErrorHelper::invalid_argument()
                .state(SqlState::SHY090InvalidBufferLength)
                .message(format!("Invalid buffer length {}", buffer_len)));
        }
        if !field.is_writable_by(self.role) {
            let builder = if self.role == DescriptorType::Ird {
                DriverErrorHelper::descriptor().state(SqlState::SHY016CannotModifyIrd)
            } else {
                DriverErrorHelper::descriptor()
            };
            return Err(builder.message(format!("{:?} cannot be set in an {}", field, self.role)));
        }

        if field.is_header() {
            self.set_header_field(field, &value)?;
            self.touch();
            return Ok(());
        }

        let rec_number = record_number(rec_number)?;
        if field == DescriptorField::DataPtr && self.role.is_application() {
            let unbinding = value.as_pointer().is_some_and(|p| p.is_null());
            let consistent = self
                .records
                .get(&rec_number)
                .is_some_and(|r| r.native_type().is_some());
            if !unbinding && !consistent {
                return Err(DriverErrorHelper::descriptor()
                    .state(SqlState::SHY021InconsistentDescriptor)
                    .message(format!("Record {} has no valid C type", rec_number)));
            }
        }
        self.record_mut(rec_number).set_field(field, &value)?;
        debug!("{}: set {:?} of record {}", self.role, field, rec_number);
        Ok(())
    }

    fn set_header_field(&mut self, field: DescriptorField, value: &DescriptorValue) -> Result<()> {
        if value.kind() != field.kind() {
            return Err(DriverErrorHelper::invalid_argument()
                .message(format!("{:?} expects a {:?} value", field, field.kind())));
        }
        let int = value.as_integer().unwrap_or_default();
        let ptr = value.as_pointer().unwrap_or_default();
        let invalid = || {
            DriverErrorHelper::invalid_argument().message(format!("Invalid value {} for {:?}", int, field))
        };
        match field {
            DescriptorField::ArraySize => {
                let size = usize::try_from(int).ok().filter(|s| *s > 0).ok_or_else(invalid)?;
                self.header.array_size = size;
            }
            DescriptorField::BindType => {
                self.header.bind_type = usize::try_from(int).map_err(|_| invalid())?;
            }
            DescriptorField::Count => {
                let count = u16::try_from(int).ok().filter(|c| *c <= i16::MAX as u16).ok_or_else(invalid)?;
                self.set_count(count);
            }
            DescriptorField::ArrayStatusPtr => self.header.array_status_ptr = ptr.cast(),
            DescriptorField::BindOffsetPtr => self.header.bind_offset_ptr = ptr.cast(),
            DescriptorField::RowsProcessedPtr => self.header.rows_processed_ptr = ptr.cast(),
            _ => {
                return Err(DriverErrorHelper::descriptor()
                    .message(format!("{:?} is read-only", field)))
            }
        }
        Ok(())
    }

    /// Read a header or record field. `Ok(None)` when the record does not
    /// exist.
    pub fn get_field(&self, rec_number: i16, field: DescriptorField) -> Result<Option<DescriptorValue>> {
        if !field.is_readable_by(self.role) {
            return Err(DriverErrorHelper::descriptor()
                .message(format!("{:?} cannot be read from an {}", field, self.role)));
        }
        let value = match field {
            DescriptorField::AllocType => DescriptorValue::Integer(self.header.alloc_type as i64),
            DescriptorField::ArraySize => DescriptorValue::Integer(self.header.array_size as i64),
            DescriptorField::BindType => DescriptorValue::Integer(self.header.bind_type as i64),
            DescriptorField::Count => DescriptorValue::Integer(self.count() as i64),
            DescriptorField::ArrayStatusPtr => DescriptorValue::pointer(self.header.array_status_ptr),
            DescriptorField::BindOffsetPtr => DescriptorValue::pointer(self.header.bind_offset_ptr),
            DescriptorField::RowsProcessedPtr => {
                DescriptorValue::pointer(self.header.rows_processed_ptr)
            }
            _ => {
                let rec_number = record_number(rec_number)?;
                return match self.records.get(&rec_number) {
                    Some(record) => record.get_field(field).map(Some),
                    None => Ok(None),
                };
            }
        };
        Ok(Some(value))
    }

    pub fn get_field_raw(&self, rec_number: i16, field_id: i16) -> Result<Option<DescriptorValue>> {
        let field = DescriptorField::from_raw(field_id).ok_or_else(|| {
            DriverErrorHelper::descriptor().message(format!("Unknown descriptor field {}", field_id))
        })?;
        self.get_field(rec_number, field)
    }

    /// Copy header and records into `dst`.
    ///
    /// `dst`'s header is reset for its own role and allocation type first;
    /// the role and owning connection/statement are then copied across.
    pub fn copy_desc(&self, dst: &mut Descriptor) -> Result<()> {
        if dst.role == DescriptorType::Ird {
            return Err(DriverErrorHelper::descriptor()
                .state(SqlState::SHY016CannotModifyIrd)
                .message("Cannot copy into an implementation row descriptor"));
        }
        let implicit = dst.is_implicit();
        dst.init_head(implicit);
        dst.header.array_size = self.header.array_size;
        dst.header.array_status_ptr = self.header.array_status_ptr;
        dst.header.bind_offset_ptr = self.header.bind_offset_ptr;
        dst.header.bind_type = self.header.bind_type;
        dst.header.rows_processed_ptr = self.header.rows_processed_ptr;
        dst.records = self.records.clone();
        let previous_role = dst.role;
        dst.role = self.role;
        dst.owner = self.owner;
        dst.touch();
        debug!(
            "Copied {} ({} records) into former {}",
            self.role,
            self.records.len(),
            previous_role
        );
        Ok(())
    }

    /// Detach from the statement; it falls back to its implicit descriptor.
    pub fn deregister(&mut self) {
        self.registered = false;
        self.touch();
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Rebuild an implementation row descriptor from result metadata.
    pub fn populate_from_columns(&mut self, columns: &[ColumnInfo]) {
        self.records = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let info = type_info(&column.column_type);
                ((i + 1) as u16, DescriptorRecord::from_column(column, &info))
            })
            .collect();
        self.touch();
    }

    /// Adopt an application role; used when an explicit descriptor is set
    /// on a statement.
    pub(crate) fn assume_role(&mut self, role: DescriptorType) {
        if self.role != role && role.is_application() {
            self.role = role;
            self.touch();
        }
    }
}

fn record_number(rec_number: i16) -> Result<u16> {
    u16::try_from(rec_number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            DriverErrorHelper::descriptor()
                .state(SqlState::S07009InvalidDescriptorIndex)
                .message(format!("Invalid record number {}", rec_number))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sql::*;
    use crate::types::value::ScalarType;

    fn ard() -> Descriptor {
        Descriptor::implicit(DescriptorType::Ard, DescriptorOwner::default())
    }

    fn ird() -> Descriptor {
        let mut ird = Descriptor::implicit(DescriptorType::Ird, DescriptorOwner::default());
        ird.populate_from_columns(&[
            ColumnInfo::scalar("id", ScalarType::Bigint),
            ColumnInfo::scalar("name", ScalarType::Varchar),
        ]);
        ird
    }

    #[test]
    fn test_implicit_head_defaults() {
        let d = ard();
        assert_eq!(d.header().alloc_type(), SQL_DESC_ALLOC_AUTO);
        assert_eq!(d.header().array_size(), 1);
        assert_eq!(d.header().bind_type(), SQL_BIND_BY_COLUMN);
        assert!(d.header().array_status_ptr().is_null());
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn test_ird_only_field_on_ard_is_rejected() {
        let mut d = ard();
        d.record_mut(1).apply_concise_type(SQL_C_CHAR);
        let err = d.get_field(1, DescriptorField::CatalogName).unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY091InvalidDescriptorField);
        let err = d.get_field(1, DescriptorField::DisplaySize).unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY091InvalidDescriptorField);
    }

    #[test]
    fn test_ird_is_read_only() {
        let mut d = ird();
        let err = d
            .set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(4), 0)
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY016CannotModifyIrd);
        assert_eq!(
            d.get_field(2, DescriptorField::Name).unwrap(),
            Some(DescriptorValue::Text("name".to_string()))
        );
        assert_eq!(
            d.get_field(1, DescriptorField::ConciseType).unwrap(),
            Some(DescriptorValue::Integer(SQL_BIGINT as i64))
        );
        assert_eq!(d.get_field(3, DescriptorField::Name).unwrap(), None);
    }

    #[test]
    fn test_invalid_buffer_length() {
        let mut d = ard();
        let err = d
            .set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(4), -50)
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY090InvalidBufferLength);
        d.set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(4), SQL_IS_SMALLINT)
            .unwrap();
        d.set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(4), SQL_NTS)
            .unwrap();
    }

    #[test]
    fn test_header_fields() {
        let mut d = ard();
        d.set_field(0, DescriptorField::ArraySize, DescriptorValue::Integer(10), 0)
            .unwrap();
        assert_eq!(d.header().array_size(), 10);
        assert!(d
            .set_field(0, DescriptorField::ArraySize, DescriptorValue::Integer(0), 0)
            .is_err());
        assert_eq!(
            d.get_field(0, DescriptorField::AllocType).unwrap(),
            Some(DescriptorValue::Integer(SQL_DESC_ALLOC_AUTO as i64))
        );
        let err = d
            .set_field(0, DescriptorField::RowsProcessedPtr, DescriptorValue::null_pointer(), 0)
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY091InvalidDescriptorField);
    }

    #[test]
    fn test_count_truncates_and_extends() {
        let mut d = ard();
        d.set_field(0, DescriptorField::Count, DescriptorValue::Integer(3), 0)
            .unwrap();
        assert_eq!(d.count(), 3);
        assert!(d.record(2).is_some());
        d.set_field(0, DescriptorField::Count, DescriptorValue::Integer(1), 0)
            .unwrap();
        assert_eq!(d.count(), 1);
        assert!(d.record(2).is_none());
    }

    #[test]
    fn test_data_ptr_requires_valid_type() {
        let mut d = ard();
        let mut target = 0i32;
        let ptr = unsafe { CallerPtr::new(&mut target as *mut i32) };
        d.record_mut(1).apply_concise_type(12345);
        let err = d
            .set_field(1, DescriptorField::DataPtr, DescriptorValue::pointer(ptr), SQL_IS_POINTER)
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY021InconsistentDescriptor);

        d.set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(SQL_C_SLONG as i64), 0)
            .unwrap();
        d.set_field(1, DescriptorField::DataPtr, DescriptorValue::pointer(ptr), SQL_IS_POINTER)
            .unwrap();
        assert!(d.record(1).unwrap().is_bound());

        d.set_field(1, DescriptorField::DataPtr, DescriptorValue::null_pointer(), SQL_IS_POINTER)
            .unwrap();
        assert!(!d.record(1).unwrap().is_bound());
    }

    #[test]
    fn test_record_zero_is_invalid() {
        let mut d = ard();
        let err = d
            .set_field(0, DescriptorField::ConciseType, DescriptorValue::Integer(4), 0)
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::S07009InvalidDescriptorIndex);
    }

    #[test]
    fn test_copy_desc() {
        let source = ird();
        let mut dst = Descriptor::explicit(DescriptorOwner {
            connection_id: 7,
            statement_id: None,
        });
        dst.set_field(0, DescriptorField::ArraySize, DescriptorValue::Integer(5), 0)
            .unwrap();
        source.copy_desc(&mut dst).unwrap();
        assert_eq!(dst.role(), source.role());
        assert_eq!(dst.role(), DescriptorType::Ird);
        assert_eq!(dst.header().alloc_type(), SQL_DESC_ALLOC_USER);
        assert_eq!(dst.header().array_size(), 1);
        assert_eq!(dst.count(), 2);
        assert_eq!(dst.owner(), source.owner());
        assert_eq!(dst.record(1).unwrap().concise_type(), SQL_BIGINT);
    }

    #[test]
    fn test_copy_into_ird_refused() {
        let source = ard();
        let mut dst = ird();
        let err = source.copy_desc(&mut dst).unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY016CannotModifyIrd);
        assert_eq!(dst.count(), 2);
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut d = ard();
        let before = d.revision();
        d.set_field(1, DescriptorField::ConciseType, DescriptorValue::Integer(4), 0)
            .unwrap();
        assert!(d.revision() > before);
    }

    #[test]
    fn test_deregister() {
        let mut d = Descriptor::explicit(DescriptorOwner::default());
        assert!(d.is_registered());
        d.deregister();
        assert!(!d.is_registered());
    }
}
