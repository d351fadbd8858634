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

//! Numeric constants of the ODBC call-level interface.
//!
//! Only the codes the core actually reads or writes are listed. Values match
//! `sql.h` / `sqlext.h` so they can cross the C ABI unchanged.

// Length / indicator sentinels
pub const SQL_NULL_DATA: isize = -1;
pub const SQL_DATA_AT_EXEC: isize = -2;
pub const SQL_NTS: isize = -3;
pub const SQL_LEN_DATA_AT_EXEC_OFFSET: isize = -100;
pub const SQL_NO_TOTAL: isize = -4;

// Implicit buffer-length markers accepted by SQLSetDescField
pub const SQL_IS_POINTER: isize = -4;
pub const SQL_IS_UINTEGER: isize = -5;
pub const SQL_IS_INTEGER: isize = -6;
pub const SQL_IS_USMALLINT: isize = -7;
pub const SQL_IS_SMALLINT: isize = -8;

pub const SQL_TRUE: i16 = 1;
pub const SQL_FALSE: i16 = 0;

// SQL data types
pub const SQL_UNKNOWN_TYPE: i16 = 0;
pub const SQL_ALL_TYPES: i16 = 0;
pub const SQL_CHAR: i16 = 1;
pub const SQL_NUMERIC: i16 = 2;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_FLOAT: i16 = 6;
pub const SQL_REAL: i16 = 7;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_DATETIME: i16 = 9;
pub const SQL_INTERVAL: i16 = 10;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_TYPE_TIME: i16 = 92;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_BINARY: i16 = -2;
pub const SQL_VARBINARY: i16 = -3;
pub const SQL_LONGVARBINARY: i16 = -4;
pub const SQL_BIGINT: i16 = -5;
pub const SQL_TINYINT: i16 = -6;
pub const SQL_BIT: i16 = -7;
pub const SQL_WCHAR: i16 = -8;
pub const SQL_WVARCHAR: i16 = -9;
pub const SQL_WLONGVARCHAR: i16 = -10;

pub const SQL_INTERVAL_YEAR: i16 = 101;
pub const SQL_INTERVAL_MONTH: i16 = 102;
pub const SQL_INTERVAL_DAY: i16 = 103;
pub const SQL_INTERVAL_HOUR: i16 = 104;
pub const SQL_INTERVAL_MINUTE: i16 = 105;
pub const SQL_INTERVAL_SECOND: i16 = 106;
pub const SQL_INTERVAL_YEAR_TO_MONTH: i16 = 107;
pub const SQL_INTERVAL_DAY_TO_HOUR: i16 = 108;
pub const SQL_INTERVAL_DAY_TO_MINUTE: i16 = 109;
pub const SQL_INTERVAL_DAY_TO_SECOND: i16 = 110;
pub const SQL_INTERVAL_HOUR_TO_MINUTE: i16 = 111;
pub const SQL_INTERVAL_HOUR_TO_SECOND: i16 = 112;
pub const SQL_INTERVAL_MINUTE_TO_SECOND: i16 = 113;

// Datetime sub-codes
pub const SQL_CODE_DATE: i16 = 1;
pub const SQL_CODE_TIME: i16 = 2;
pub const SQL_CODE_TIMESTAMP: i16 = 3;

// C data types (those that do not share a value with an SQL type above)
pub const SQL_C_DEFAULT: i16 = 99;
pub const SQL_C_CHAR: i16 = SQL_CHAR;
pub const SQL_C_WCHAR: i16 = SQL_WCHAR;
pub const SQL_C_BINARY: i16 = SQL_BINARY;
pub const SQL_C_BIT: i16 = SQL_BIT;
pub const SQL_C_NUMERIC: i16 = SQL_NUMERIC;
pub const SQL_C_FLOAT: i16 = SQL_REAL;
pub const SQL_C_DOUBLE: i16 = SQL_DOUBLE;
pub const SQL_C_TINYINT: i16 = SQL_TINYINT;
pub const SQL_C_STINYINT: i16 = -26;
pub const SQL_C_UTINYINT: i16 = -28;
pub const SQL_C_SHORT: i16 = SQL_SMALLINT;
pub const SQL_C_SSHORT: i16 = -15;
pub const SQL_C_USHORT: i16 = -17;
pub const SQL_C_LONG: i16 = SQL_INTEGER;
pub const SQL_C_SLONG: i16 = -16;
pub const SQL_C_ULONG: i16 = -18;
pub const SQL_C_SBIGINT: i16 = -25;
pub const SQL_C_UBIGINT: i16 = -27;
pub const SQL_C_DATE: i16 = 9;
pub const SQL_C_TIME: i16 = 10;
pub const SQL_C_TIMESTAMP: i16 = 11;
pub const SQL_C_TYPE_DATE: i16 = SQL_TYPE_DATE;
pub const SQL_C_TYPE_TIME: i16 = SQL_TYPE_TIME;
pub const SQL_C_TYPE_TIMESTAMP: i16 = SQL_TYPE_TIMESTAMP;

// Descriptor allocation
pub const SQL_DESC_ALLOC_AUTO: i16 = 1;
pub const SQL_DESC_ALLOC_USER: i16 = 2;

// Binding orientation
pub const SQL_BIND_BY_COLUMN: usize = 0;

// Nullability
pub const SQL_NO_NULLS: i16 = 0;
pub const SQL_NULLABLE: i16 = 1;
pub const SQL_NULLABLE_UNKNOWN: i16 = 2;

// Naming
pub const SQL_NAMED: i16 = 0;
pub const SQL_UNNAMED: i16 = 1;

// Searchability
pub const SQL_PRED_NONE: i16 = 0;
pub const SQL_PRED_CHAR: i16 = 1;
pub const SQL_PRED_BASIC: i16 = 2;
pub const SQL_SEARCHABLE: i16 = 3;

// Updatability
pub const SQL_ATTR_READONLY: i16 = 0;

// Parameter direction
pub const SQL_PARAM_INPUT: i16 = 1;
pub const SQL_PARAM_INPUT_OUTPUT: i16 = 2;
pub const SQL_PARAM_OUTPUT: i16 = 4;

// Row status values
pub const SQL_ROW_SUCCESS: u16 = 0;
pub const SQL_ROW_NOROW: u16 = 3;
pub const SQL_ROW_ERROR: u16 = 5;
pub const SQL_ROW_SUCCESS_WITH_INFO: u16 = 6;

// Fetch orientation
pub const SQL_FETCH_NEXT: i16 = 1;
pub const SQL_FETCH_FIRST: i16 = 2;
pub const SQL_FETCH_LAST: i16 = 3;
pub const SQL_FETCH_PRIOR: i16 = 4;
pub const SQL_FETCH_ABSOLUTE: i16 = 5;
pub const SQL_FETCH_RELATIVE: i16 = 6;

// Statement attributes
pub const SQL_ATTR_ROW_BIND_TYPE: i32 = 5;
pub const SQL_ATTR_PARAMSET_SIZE: i32 = 22;
pub const SQL_ATTR_ROW_BIND_OFFSET_PTR: i32 = 23;
pub const SQL_ATTR_ROW_STATUS_PTR: i32 = 25;
pub const SQL_ATTR_ROWS_FETCHED_PTR: i32 = 26;
pub const SQL_ATTR_ROW_ARRAY_SIZE: i32 = 27;
pub const SQL_ATTR_APP_ROW_DESC: i32 = 10010;
pub const SQL_ATTR_APP_PARAM_DESC: i32 = 10011;
pub const SQL_ATTR_IMP_ROW_DESC: i32 = 10012;
pub const SQL_ATTR_IMP_PARAM_DESC: i32 = 10013;

// SQLFreeStmt options
pub const SQL_CLOSE: u16 = 0;
pub const SQL_UNBIND: u16 = 2;
pub const SQL_RESET_PARAMS: u16 = 3;

pub const SQL_MAX_NUMERIC_LEN: usize = 16;

/// Return code of a call-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i16)]
pub enum SqlReturn {
    Success = 0,
    SuccessWithInfo = 1,
    NoData = 100,
    Error = -1,
}

impl SqlReturn {
    /// Raw `SQLRETURN` value.
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Severity rank used when aggregating several results.
    pub(crate) fn severity(self) -> u8 {
        match self {
            SqlReturn::Success => 0,
            SqlReturn::NoData => 1,
            SqlReturn::SuccessWithInfo => 2,
            SqlReturn::Error => 3,
        }
    }

    /// The more severe of two results.
    pub fn worst(self, other: SqlReturn) -> SqlReturn {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, SqlReturn::Success | SqlReturn::SuccessWithInfo)
    }

    /// Row status written to the application's row status array.
    pub fn row_status(self) -> u16 {
        match self {
            SqlReturn::Success => SQL_ROW_SUCCESS,
            SqlReturn::SuccessWithInfo => SQL_ROW_SUCCESS_WITH_INFO,
            SqlReturn::NoData => SQL_ROW_NOROW,
            SqlReturn::Error => SQL_ROW_ERROR,
        }
    }
}

/// Whether a concise type code names a variable-length character or binary type.
pub fn is_variable_length_type(concise_type: i16) -> bool {
    matches!(
        concise_type,
        SQL_CHAR
            | SQL_VARCHAR
            | SQL_LONGVARCHAR
            | SQL_WCHAR
            | SQL_WVARCHAR
            | SQL_WLONGVARCHAR
            | SQL_BINARY
            | SQL_VARBINARY
            | SQL_LONGVARBINARY
    )
}

/// Whether a concise type code is one of the datetime types.
pub fn is_datetime_type(concise_type: i16) -> bool {
    matches!(
        concise_type,
        SQL_TYPE_DATE
            | SQL_TYPE_TIME
            | SQL_TYPE_TIMESTAMP
            | SQL_C_DATE
            | SQL_C_TIME
            | SQL_C_TIMESTAMP
    )
}

/// Whether a concise type code is one of the thirteen interval types.
pub fn is_interval_type(concise_type: i16) -> bool {
    (SQL_INTERVAL_YEAR..=SQL_INTERVAL_MINUTE_TO_SECOND).contains(&concise_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_prefers_error() {
        assert_eq!(
            SqlReturn::Success.worst(SqlReturn::SuccessWithInfo),
            SqlReturn::SuccessWithInfo
        );
        assert_eq!(
            SqlReturn::SuccessWithInfo.worst(SqlReturn::Error),
            SqlReturn::Error
        );
        assert_eq!(SqlReturn::Error.worst(SqlReturn::Success), SqlReturn::Error);
    }

    #[test]
    fn test_type_families() {
        assert!(is_variable_length_type(SQL_WVARCHAR));
        assert!(!is_variable_length_type(SQL_INTEGER));
        assert!(is_datetime_type(SQL_TYPE_TIMESTAMP));
        assert!(is_interval_type(SQL_INTERVAL_DAY_TO_SECOND));
        assert!(!is_interval_type(SQL_TYPE_DATE));
    }

    #[test]
    fn test_row_status_mapping() {
        assert_eq!(SqlReturn::Error.row_status(), SQL_ROW_ERROR);
        assert_eq!(SqlReturn::SuccessWithInfo.row_status(), SQL_ROW_SUCCESS_WITH_INFO);
        assert_eq!(SqlReturn::Success.code(), 0);
        assert_eq!(SqlReturn::NoData.code(), 100);
    }
}
