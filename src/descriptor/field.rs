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

//! Descriptor field identifiers and the role legality table.
//!
//! Each field is readable and/or writable in a subset of the four descriptor
//! roles. The table below is the single place that decides; it mirrors the
//! applicability matrix of `SQLSetDescField`.

use std::ffi::c_void;
use std::fmt;

use crate::app::CallerPtr;

// Header fields
pub const SQL_DESC_ARRAY_SIZE: i16 = 20;
pub const SQL_DESC_ARRAY_STATUS_PTR: i16 = 21;
pub const SQL_DESC_BIND_OFFSET_PTR: i16 = 24;
pub const SQL_DESC_BIND_TYPE: i16 = 25;
pub const SQL_DESC_ROWS_PROCESSED_PTR: i16 = 34;
pub const SQL_DESC_COUNT: i16 = 1001;
pub const SQL_DESC_ALLOC_TYPE: i16 = 1099;

// Record fields
pub const SQL_DESC_CONCISE_TYPE: i16 = 2;
pub const SQL_DESC_DISPLAY_SIZE: i16 = 6;
pub const SQL_DESC_UNSIGNED: i16 = 8;
pub const SQL_DESC_FIXED_PREC_SCALE: i16 = 9;
pub const SQL_DESC_UPDATABLE: i16 = 10;
pub const SQL_DESC_AUTO_UNIQUE_VALUE: i16 = 11;
pub const SQL_DESC_CASE_SENSITIVE: i16 = 12;
pub const SQL_DESC_SEARCHABLE: i16 = 13;
pub const SQL_DESC_TYPE_NAME: i16 = 14;
pub const SQL_DESC_TABLE_NAME: i16 = 15;
pub const SQL_DESC_SCHEMA_NAME: i16 = 16;
pub const SQL_DESC_CATALOG_NAME: i16 = 17;
pub const SQL_DESC_LABEL: i16 = 18;
pub const SQL_DESC_BASE_COLUMN_NAME: i16 = 22;
pub const SQL_DESC_BASE_TABLE_NAME: i16 = 23;
pub const SQL_DESC_DATETIME_INTERVAL_PRECISION: i16 = 26;
pub const SQL_DESC_LITERAL_PREFIX: i16 = 27;
pub const SQL_DESC_LITERAL_SUFFIX: i16 = 28;
pub const SQL_DESC_LOCAL_TYPE_NAME: i16 = 29;
pub const SQL_DESC_NUM_PREC_RADIX: i16 = 32;
pub const SQL_DESC_PARAMETER_TYPE: i16 = 33;
pub const SQL_DESC_ROWVER: i16 = 35;
pub const SQL_DESC_TYPE: i16 = 1002;
pub const SQL_DESC_LENGTH: i16 = 1003;
pub const SQL_DESC_OCTET_LENGTH_PTR: i16 = 1004;
pub const SQL_DESC_PRECISION: i16 = 1005;
pub const SQL_DESC_SCALE: i16 = 1006;
pub const SQL_DESC_DATETIME_INTERVAL_CODE: i16 = 1007;
pub const SQL_DESC_NULLABLE: i16 = 1008;
pub const SQL_DESC_INDICATOR_PTR: i16 = 1009;
pub const SQL_DESC_DATA_PTR: i16 = 1010;
pub const SQL_DESC_NAME: i16 = 1011;
pub const SQL_DESC_UNNAMED: i16 = 1012;
pub const SQL_DESC_OCTET_LENGTH: i16 = 1013;

/// The four descriptor roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    /// Application row descriptor
    Ard,
    /// Application parameter descriptor
    Apd,
    /// Implementation row descriptor
    Ird,
    /// Implementation parameter descriptor
    Ipd,
}

impl DescriptorType {
    pub fn is_application(&self) -> bool {
        matches!(self, DescriptorType::Ard | DescriptorType::Apd)
    }

    pub fn is_implementation(&self) -> bool {
        !self.is_application()
    }

    fn bit(&self) -> u8 {
        match self {
            DescriptorType::Ard => ARD,
            DescriptorType::Apd => APD,
            DescriptorType::Ird => IRD,
            DescriptorType::Ipd => IPD,
        }
    }
}

impl fmt::Display for DescriptorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorType::Ard => "ARD",
            DescriptorType::Apd => "APD",
            DescriptorType::Ird => "IRD",
            DescriptorType::Ipd => "IPD",
        };
        f.write_str(name)
    }
}

const ARD: u8 = 0b0001;
const APD: u8 = 0b0010;
const IRD: u8 = 0b0100;
const IPD: u8 = 0b1000;
const NONE: u8 = 0;
const ALL: u8 = ARD | APD | IRD | IPD;
const APP: u8 = ARD | APD;
const IMP: u8 = IRD | IPD;

/// Descriptor field identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorField {
    AllocType,
    ArraySize,
    ArrayStatusPtr,
    BindOffsetPtr,
    BindType,
    Count,
    RowsProcessedPtr,
    AutoUniqueValue,
    BaseColumnName,
    BaseTableName,
    CaseSensitive,
    CatalogName,
    ConciseType,
    DataPtr,
    DatetimeIntervalCode,
    DatetimeIntervalPrecision,
    DisplaySize,
    FixedPrecScale,
    IndicatorPtr,
    Label,
    Length,
    LiteralPrefix,
    LiteralSuffix,
    LocalTypeName,
    Name,
    Nullable,
    NumPrecRadix,
    OctetLength,
    OctetLengthPtr,
    ParameterType,
    Precision,
    Rowver,
    Scale,
    SchemaName,
    Searchable,
    TableName,
    Type,
    TypeName,
    Unnamed,
    Unsigned,
    Updatable,
}

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Pointer,
    Text,
}

impl DescriptorField {
    pub fn from_raw(id: i16) -> Option<Self> {
        use DescriptorField::*;
        let field = match id {
            SQL_DESC_ALLOC_TYPE => AllocType,
            SQL_DESC_ARRAY_SIZE => ArraySize,
            SQL_DESC_ARRAY_STATUS_PTR => ArrayStatusPtr,
            SQL_DESC_BIND_OFFSET_PTR => BindOffsetPtr,
            SQL_DESC_BIND_TYPE => BindType,
            SQL_DESC_COUNT => Count,
            SQL_DESC_ROWS_PROCESSED_PTR => RowsProcessedPtr,
            SQL_DESC_AUTO_UNIQUE_VALUE => AutoUniqueValue,
            SQL_DESC_BASE_COLUMN_NAME => BaseColumnName,
            SQL_DESC_BASE_TABLE_NAME => BaseTableName,
            SQL_DESC_CASE_SENSITIVE => CaseSensitive,
            SQL_DESC_CATALOG_NAME => CatalogName,
            SQL_DESC_CONCISE_TYPE => ConciseType,
            SQL_DESC_DATA_PTR => DataPtr,
            SQL_DESC_DATETIME_INTERVAL_CODE => DatetimeIntervalCode,
            SQL_DESC_DATETIME_INTERVAL_PRECISION => DatetimeIntervalPrecision,
            SQL_DESC_DISPLAY_SIZE => DisplaySize,
            SQL_DESC_FIXED_PREC_SCALE => FixedPrecScale,
            SQL_DESC_INDICATOR_PTR => IndicatorPtr,
            SQL_DESC_LABEL => Label,
            SQL_DESC_LENGTH => Length,
            SQL_DESC_LITERAL_PREFIX => LiteralPrefix,
            SQL_DESC_LITERAL_SUFFIX => LiteralSuffix,
            SQL_DESC_LOCAL_TYPE_NAME => LocalTypeName,
            SQL_DESC_NAME => Name,
            SQL_DESC_NULLABLE => Nullable,
            SQL_DESC_NUM_PREC_RADIX => NumPrecRadix,
            SQL_DESC_OCTET_LENGTH => OctetLength,
            SQL_DESC_OCTET_LENGTH_PTR => OctetLengthPtr,
            SQL_DESC_PARAMETER_TYPE => ParameterType,
            SQL_DESC_PRECISION => Precision,
            SQL_DESC_ROWVER => Rowver,
            SQL_DESC_SCALE => Scale,
            SQL_DESC_SCHEMA_NAME => SchemaName,
            SQL_DESC_SEARCHABLE => Searchable,
            SQL_DESC_TABLE_NAME => TableName,
            SQL_DESC_TYPE => Type,
            SQL_DESC_TYPE_NAME => TypeName,
            SQL_DESC_UNNAMED => Unnamed,
            SQL_DESC_UNSIGNED => Unsigned,
            SQL_DESC_UPDATABLE => Updatable,
            _ => return None,
        };
        Some(field)
    }

    pub fn is_header(&self) -> bool {
        use DescriptorField::*;
        matches!(
            self,
            AllocType | ArraySize | ArrayStatusPtr | BindOffsetPtr | BindType | Count | RowsProcessedPtr
        )
    }

    pub fn kind(&self) -> FieldKind {
        use DescriptorField::*;
        match self {
            ArrayStatusPtr | BindOffsetPtr | RowsProcessedPtr | DataPtr | IndicatorPtr
            | OctetLengthPtr => FieldKind::Pointer,
            BaseColumnName | BaseTableName | CatalogName | Label | LiteralPrefix | LiteralSuffix
            | LocalTypeName | Name | SchemaName | TableName | TypeName => FieldKind::Text,
            _ => FieldKind::Integer,
        }
    }

    /// `(readable, writable)` role masks.
    fn access(&self) -> (u8, u8) {
        use DescriptorField::*;
        match self {
            AllocType => (ALL, NONE),
            ArraySize => (APP, APP),
            ArrayStatusPtr => (ALL, ALL),
            BindOffsetPtr => (APP, APP),
            BindType => (APP, APP),
            Count => (ALL, APP | IPD),
            RowsProcessedPtr => (IMP, IMP),

            AutoUniqueValue | BaseColumnName | BaseTableName | CatalogName | DisplaySize
            | Label | LiteralPrefix | LiteralSuffix | SchemaName | Searchable | TableName
            | Updatable => (IRD, NONE),

            CaseSensitive | FixedPrecScale | LocalTypeName | Nullable | Rowver | TypeName
            | Unsigned => (IMP, NONE),

            ConciseType | DatetimeIntervalCode | DatetimeIntervalPrecision | Length
            | NumPrecRadix | OctetLength | Precision | Scale | Type => (ALL, APP | IPD),

            DataPtr | IndicatorPtr | OctetLengthPtr => (APP, APP),

            Name | Unnamed => (IMP, IPD),

            ParameterType => (IPD, IPD),
        }
    }

    pub fn is_readable_by(&self, role: DescriptorType) -> bool {
        self.access().0 & role.bit() != 0
    }

    pub fn is_writable_by(&self, role: DescriptorType) -> bool {
        self.access().1 & role.bit() != 0
    }
}

/// Value stored in, or read from, a descriptor field.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorValue {
    Integer(i64),
    Pointer(CallerPtr<c_void>),
    Text(String),
}

impl DescriptorValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            DescriptorValue::Integer(_) => FieldKind::Integer,
            DescriptorValue::Pointer(_) => FieldKind::Pointer,
            DescriptorValue::Text(_) => FieldKind::Text,
        }
    }

    pub fn null_pointer() -> Self {
        DescriptorValue::Pointer(CallerPtr::null())
    }

    pub fn pointer<T>(ptr: CallerPtr<T>) -> Self {
        DescriptorValue::Pointer(ptr.cast())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DescriptorValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<CallerPtr<c_void>> {
        match self {
            DescriptorValue::Pointer(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DescriptorValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [DescriptorType; 4] = [
        DescriptorType::Ard,
        DescriptorType::Apd,
        DescriptorType::Ird,
        DescriptorType::Ipd,
    ];

    fn readers(field: DescriptorField) -> Vec<DescriptorType> {
        ROLES.into_iter().filter(|r| field.is_readable_by(*r)).collect()
    }

    fn writers(field: DescriptorField) -> Vec<DescriptorType> {
        ROLES.into_iter().filter(|r| field.is_writable_by(*r)).collect()
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(DescriptorField::from_raw(1002), Some(DescriptorField::Type));
        assert_eq!(DescriptorField::from_raw(2), Some(DescriptorField::ConciseType));
        assert_eq!(DescriptorField::from_raw(9999), None);
    }

    #[test]
    fn test_ird_only_fields() {
        use DescriptorType::*;
        for field in [
            DescriptorField::CatalogName,
            DescriptorField::Searchable,
            DescriptorField::DisplaySize,
            DescriptorField::Label,
        ] {
            assert_eq!(readers(field), vec![Ird]);
            assert!(writers(field).is_empty());
        }
    }

    #[test]
    fn test_application_pointer_fields() {
        use DescriptorType::*;
        for field in [
            DescriptorField::DataPtr,
            DescriptorField::IndicatorPtr,
            DescriptorField::OctetLengthPtr,
        ] {
            assert_eq!(readers(field), vec![Ard, Apd]);
            assert_eq!(writers(field), vec![Ard, Apd]);
            assert_eq!(field.kind(), FieldKind::Pointer);
        }
    }

    #[test]
    fn test_type_fields() {
        use DescriptorType::*;
        assert_eq!(readers(DescriptorField::ConciseType), vec![Ard, Apd, Ird, Ipd]);
        assert_eq!(writers(DescriptorField::ConciseType), vec![Ard, Apd, Ipd]);
        assert_eq!(writers(DescriptorField::ParameterType), vec![Ipd]);
        assert_eq!(readers(DescriptorField::Name), vec![Ird, Ipd]);
        assert_eq!(writers(DescriptorField::Name), vec![Ipd]);
    }

    #[test]
    fn test_header_fields() {
        use DescriptorType::*;
        assert!(DescriptorField::ArraySize.is_header());
        assert!(!DescriptorField::DataPtr.is_header());
        assert_eq!(readers(DescriptorField::RowsProcessedPtr), vec![Ird, Ipd]);
        assert_eq!(writers(DescriptorField::Count), vec![Ard, Apd, Ipd]);
        assert!(writers(DescriptorField::AllocType).is_empty());
    }

    #[test]
    fn test_nothing_is_writable_in_ird_but_status() {
        let writable: Vec<_> = [
            DescriptorField::AllocType,
            DescriptorField::ArraySize,
            DescriptorField::ArrayStatusPtr,
            DescriptorField::Count,
            DescriptorField::ConciseType,
            DescriptorField::Name,
            DescriptorField::RowsProcessedPtr,
        ]
        .into_iter()
        .filter(|f| f.is_writable_by(DescriptorType::Ird))
        .collect();
        assert_eq!(
            writable,
            vec![DescriptorField::ArrayStatusPtr, DescriptorField::RowsProcessedPtr]
        );
    }
}
