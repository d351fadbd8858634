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

//! One descriptor record: the metadata of a single column or parameter.

use super::field::{DescriptorField, DescriptorValue};
use crate::app::{ApplicationDataBuffer, CallerPtr};
use crate::error::{DriverErrorHelper, Result};
use crate::types::native::{IntervalCode, NativeType};
use crate::types::sql::*;
use crate::types::traits::TypeInfo;
use crate::types::value::ColumnInfo;

/// Default precision of exact numerics when only the type is set.
pub const DEFAULT_DECIMAL_PRECISION: i16 = 15;
/// Default fractional-second precision of timestamps and times.
pub const DEFAULT_TIMESTAMP_PRECISION: i16 = 6;
/// Default leading precision of intervals.
pub const DEFAULT_INTERVAL_PRECISION: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorRecord {
    pub(crate) concise_type: i16,
    pub(crate) desc_type: i16,
    pub(crate) datetime_interval_code: i16,
    pub(crate) datetime_interval_precision: i64,
    pub(crate) length: i64,
    pub(crate) octet_length: i64,
    pub(crate) precision: i16,
    pub(crate) scale: i16,
    pub(crate) nullable: i16,
    pub(crate) num_prec_radix: i64,
    pub(crate) display_size: i64,
    pub(crate) parameter_type: i16,

    pub(crate) data_ptr: CallerPtr<u8>,
    pub(crate) indicator_ptr: CallerPtr<isize>,
    pub(crate) octet_length_ptr: CallerPtr<isize>,

    pub(crate) name: String,
    pub(crate) unnamed: i16,
    pub(crate) label: String,
    pub(crate) base_column_name: String,
    pub(crate) base_table_name: String,
    pub(crate) table_name: String,
    pub(crate) schema_name: String,
    pub(crate) catalog_name: String,
    pub(crate) type_name: String,
    pub(crate) local_type_name: String,
    pub(crate) literal_prefix: String,
    pub(crate) literal_suffix: String,

    pub(crate) auto_unique_value: bool,
    pub(crate) case_sensitive: bool,
    pub(crate) fixed_prec_scale: bool,
    pub(crate) unsigned: bool,
    pub(crate) rowver: bool,
    pub(crate) searchable: i16,
    pub(crate) updatable: i16,
}

impl Default for DescriptorRecord {
    fn default() -> Self {
        Self {
            concise_type: SQL_C_DEFAULT,
            desc_type: SQL_C_DEFAULT,
            datetime_interval_code: 0,
            datetime_interval_precision: 0,
            length: 0,
            octet_length: 0,
            precision: 0,
            scale: 0,
            nullable: SQL_NULLABLE_UNKNOWN,
            num_prec_radix: 0,
            display_size: 0,
            parameter_type: SQL_PARAM_INPUT,
            data_ptr: CallerPtr::null(),
            indicator_ptr: CallerPtr::null(),
            octet_length_ptr: CallerPtr::null(),
            name: String::new(),
            unnamed: SQL_UNNAMED,
            label: String::new(),
            base_column_name: String::new(),
            base_table_name: String::new(),
            table_name: String::new(),
            schema_name: String::new(),
            catalog_name: String::new(),
            type_name: String::new(),
            local_type_name: String::new(),
            literal_prefix: String::new(),
            literal_suffix: String::new(),
            auto_unique_value: false,
            case_sensitive: false,
            fixed_prec_scale: false,
            unsigned: false,
            rowver: false,
            searchable: SQL_PRED_NONE,
            updatable: SQL_ATTR_READONLY,
        }
    }
}

impl DescriptorRecord {
    /// Implementation row record describing a result column.
    pub fn from_column(column: &ColumnInfo, info: &TypeInfo) -> Self {
        let mut record = Self::default();
        record.apply_concise_type(info.sql_type);
        record.length = if is_variable_length_type(info.sql_type) {
            info.column_size
        } else {
            info.transfer_length
        };
        record.octet_length = info.transfer_length;
        record.precision = info.column_size.clamp(0, i16::MAX as i64) as i16;
        record.scale = info.decimal_digits;
        record.num_prec_radix = info.num_prec_radix as i64;
        record.display_size = info.display_size;
        record.nullable = SQL_NULLABLE;
        record.name = column.name.clone();
        record.label = column.name.clone();
        record.base_column_name = column.name.clone();
        record.unnamed = if column.name.is_empty() { SQL_UNNAMED } else { SQL_NAMED };
        record.table_name = column.table_name.clone().unwrap_or_default();
        record.base_table_name = record.table_name.clone();
        record.schema_name = column.schema_name.clone().unwrap_or_default();
        record.catalog_name = column.catalog_name.clone().unwrap_or_default();
        record.type_name = info.type_name.to_string();
        record.local_type_name = info.type_name.to_string();
        record.literal_prefix = info.literal_prefix.unwrap_or_default().to_string();
        record.literal_suffix = info.literal_suffix.unwrap_or_default().to_string();
        record.case_sensitive = info.case_sensitive;
        record.unsigned = info.unsigned;
        record.searchable = info.searchable;
        record.updatable = SQL_ATTR_READONLY;
        record
    }

    pub fn concise_type(&self) -> i16 {
        self.concise_type
    }

    pub fn desc_type(&self) -> i16 {
        self.desc_type
    }

    pub fn datetime_interval_code(&self) -> i16 {
        self.datetime_interval_code
    }

    pub fn octet_length(&self) -> i64 {
        self.octet_length
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn precision(&self) -> i16 {
        self.precision
    }

    pub fn scale(&self) -> i16 {
        self.scale
    }

    pub fn nullable(&self) -> i16 {
        self.nullable
    }

    pub fn parameter_type(&self) -> i16 {
        self.parameter_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_ptr(&self) -> CallerPtr<u8> {
        self.data_ptr
    }

    pub fn indicator_ptr(&self) -> CallerPtr<isize> {
        self.indicator_ptr
    }

    pub fn octet_length_ptr(&self) -> CallerPtr<isize> {
        self.octet_length_ptr
    }

    pub fn is_bound(&self) -> bool {
        !self.data_ptr.is_null()
    }

    /// Native type of an application record; `None` for unknown C types.
    pub fn native_type(&self) -> Option<NativeType> {
        NativeType::from_c_type(self.concise_type)
    }

    /// Buffer view of an application record.
    ///
    /// The single length slot is the octet-length pointer, falling back to
    /// the indicator pointer when only that one is bound.
    pub fn to_data_buffer(&self) -> Option<ApplicationDataBuffer> {
        let native_type = self.native_type()?;
        let res_len = if self.octet_length_ptr.is_null() {
            self.indicator_ptr
        } else {
            self.octet_length_ptr
        };
        Some(
            ApplicationDataBuffer::new(
                native_type,
                self.data_ptr,
                self.octet_length as isize,
                res_len,
            )
            .with_numeric_scale(self.scale),
        )
    }

    pub fn unbind(&mut self) {
        self.data_ptr = CallerPtr::null();
        self.indicator_ptr = CallerPtr::null();
        self.octet_length_ptr = CallerPtr::null();
    }

    /// Set the concise type and derive the verbose type, sub-code and
    /// type-dependent defaults.
    pub(crate) fn apply_concise_type(&mut self, concise_type: i16) {
        self.concise_type = concise_type;
        if is_datetime_type(concise_type) {
            self.desc_type = SQL_DATETIME;
            self.datetime_interval_code = match concise_type {
                SQL_TYPE_DATE | SQL_C_DATE => SQL_CODE_DATE,
                SQL_TYPE_TIME | SQL_C_TIME => SQL_CODE_TIME,
                _ => SQL_CODE_TIMESTAMP,
            };
        } else if let Some(code) = IntervalCode::from_concise_type(concise_type) {
            self.desc_type = SQL_INTERVAL;
            self.datetime_interval_code = code.code();
        } else {
            self.desc_type = concise_type;
            self.datetime_interval_code = 0;
        }
        self.apply_type_defaults();
    }

    /// Set the verbose type. For datetime and interval types the concise
    /// type is derived from the current sub-code.
    pub(crate) fn apply_desc_type(&mut self, desc_type: i16) {
        self.desc_type = desc_type;
        match desc_type {
            SQL_DATETIME | SQL_INTERVAL => self.derive_concise_from_code(),
            _ => {
                self.concise_type = desc_type;
                self.datetime_interval_code = 0;
            }
        }
        self.apply_type_defaults();
    }

    fn derive_concise_from_code(&mut self) {
        let code = self.datetime_interval_code;
        match self.desc_type {
            SQL_DATETIME => {
                self.concise_type = match code {
                    SQL_CODE_DATE => SQL_TYPE_DATE,
                    SQL_CODE_TIME => SQL_TYPE_TIME,
                    _ => {
                        self.datetime_interval_code = SQL_CODE_TIMESTAMP;
                        SQL_TYPE_TIMESTAMP
                    }
                }
            }
            SQL_INTERVAL => {
                let interval = IntervalCode::from_code(code).unwrap_or(IntervalCode::YearToMonth);
                self.datetime_interval_code = interval.code();
                self.concise_type = interval.concise_type();
            }
            _ => {}
        }
    }

    fn apply_type_defaults(&mut self) {
        match self.desc_type {
            SQL_CHAR | SQL_VARCHAR | SQL_WCHAR | SQL_WVARCHAR => {
                self.length = 1;
                self.precision = 0;
            }
            SQL_DECIMAL | SQL_NUMERIC => {
                self.precision = DEFAULT_DECIMAL_PRECISION;
                self.scale = 0;
            }
            SQL_FLOAT | SQL_DOUBLE => self.precision = DEFAULT_DECIMAL_PRECISION,
            SQL_DATETIME => {
                self.precision = if self.datetime_interval_code == SQL_CODE_DATE {
                    0
                } else {
                    DEFAULT_TIMESTAMP_PRECISION
                };
            }
            SQL_INTERVAL => {
                self.datetime_interval_precision = DEFAULT_INTERVAL_PRECISION;
                let has_seconds = IntervalCode::from_code(self.datetime_interval_code)
                    .is_some_and(|code| code.has_seconds());
                if has_seconds {
                    self.precision = DEFAULT_TIMESTAMP_PRECISION;
                }
            }
            _ => {}
        }
        if let Some(size) = self.native_type().and_then(|native| native.fixed_size()) {
            self.octet_length = size as i64;
        }
    }

    fn allows_length(&self) -> bool {
        is_variable_length_type(self.concise_type)
            || self.concise_type == SQL_C_DEFAULT
            || self.concise_type == SQL_UNKNOWN_TYPE
    }

    /// Set a record field. Role legality is checked by the owning descriptor.
    pub(crate) fn set_field(&mut self, field: DescriptorField, value: &DescriptorValue) -> Result<()> {
        if field.is_header() {
            return Err(DriverErrorHelper::descriptor()
                .message(format!("{:?} is a header field", field)));
        }
        if value.kind() != field.kind() {
            return Err(DriverErrorHelper::invalid_argument()
                .message(format!("{:?} expects a {:?} value", field, field.kind())));
        }
        let int = value.as_integer().unwrap_or_default();
        let small = || -> Result<i16> {
            i16::try_from(int).map_err(|_| {
                DriverErrorHelper::invalid_argument()
                    .message(format!("{} is out of range for {:?}", int, field))
            })
        };
        let ptr = value.as_pointer().unwrap_or_default();
        let text = value.as_text().unwrap_or_default().to_string();

        use DescriptorField::*;
        match field {
            ConciseType => self.apply_concise_type(small()?),
            Type => self.apply_desc_type(small()?),
            DatetimeIntervalCode => {
                self.datetime_interval_code = small()?;
                self.derive_concise_from_code();
            }
            DatetimeIntervalPrecision => self.datetime_interval_precision = int,
            Length | OctetLength => {
                if !self.allows_length() {
                    return Err(DriverErrorHelper::general().message(format!(
                        "{:?} cannot be set for fixed-length type {}",
                        field, self.concise_type
                    )));
                }
                if field == Length {
                    self.length = int;
                } else {
                    self.octet_length = int;
                }
            }
            Precision => self.precision = small()?,
            Scale => self.scale = small()?,
            NumPrecRadix => self.num_prec_radix = int,
            ParameterType => self.parameter_type = small()?,
            Name => self.name = text,
            Unnamed => self.unnamed = small()?,
            DataPtr => self.data_ptr = ptr.cast(),
            IndicatorPtr => self.indicator_ptr = ptr.cast(),
            OctetLengthPtr => self.octet_length_ptr = ptr.cast(),
            _ => {
                return Err(DriverErrorHelper::descriptor()
                    .message(format!("{:?} is read-only", field)))
            }
        }
        Ok(())
    }

    pub(crate) fn get_field(&self, field: DescriptorField) -> Result<DescriptorValue> {
        use DescriptorField::*;
        let flag = |b: bool| DescriptorValue::Integer(i64::from(if b { SQL_TRUE } else { SQL_FALSE }));
        let int = DescriptorValue::Integer;
        let text = |s: &str| DescriptorValue::Text(s.to_string());
        let value = match field {
            ConciseType => int(self.concise_type as i64),
            Type => int(self.desc_type as i64),
            DatetimeIntervalCode => int(self.datetime_interval_code as i64),
            DatetimeIntervalPrecision => int(self.datetime_interval_precision),
            Length => int(self.length),
            OctetLength => int(self.octet_length),
            Precision => int(self.precision as i64),
            Scale => int(self.scale as i64),
            Nullable => int(self.nullable as i64),
            NumPrecRadix => int(self.num_prec_radix),
            DisplaySize => int(self.display_size),
            ParameterType => int(self.parameter_type as i64),
            Unnamed => int(self.unnamed as i64),
            Searchable => int(self.searchable as i64),
            Updatable => int(self.updatable as i64),
            AutoUniqueValue => flag(self.auto_unique_value),
            CaseSensitive => flag(self.case_sensitive),
            FixedPrecScale => flag(self.fixed_prec_scale),
            Unsigned => flag(self.unsigned),
            Rowver => flag(self.rowver),
            DataPtr => DescriptorValue::pointer(self.data_ptr),
            IndicatorPtr => DescriptorValue::pointer(self.indicator_ptr),
            OctetLengthPtr => DescriptorValue::pointer(self.octet_length_ptr),
            Name => text(&self.name),
            Label => text(&self.label),
            BaseColumnName => text(&self.base_column_name),
            BaseTableName => text(&self.base_table_name),
            TableName => text(&self.table_name),
            SchemaName => text(&self.schema_name),
            CatalogName => text(&self.catalog_name),
            TypeName => text(&self.type_name),
            LocalTypeName => text(&self.local_type_name),
            LiteralPrefix => text(&self.literal_prefix),
            LiteralSuffix => text(&self.literal_suffix),
            AllocType | ArraySize | ArrayStatusPtr | BindOffsetPtr | BindType | Count
            | RowsProcessedPtr => {
                return Err(DriverErrorHelper::descriptor()
                    .message(format!("{:?} is a header field", field)))
            }
        };
        debug_assert_eq!(value.kind(), field.kind());
        Ok(value)
    }
}
