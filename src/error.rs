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

//! Error types for the driver core.
//!
//! Errors are built through [`DriverErrorHelper`], one constructor per error
//! kind, each returning an [`ErrorBuilder`] that is finished with `.message()`:
//!
//! ```ignore
//! return Err(DriverErrorHelper::invalid_state().message("No query set"));
//! ```
//!
//! Every error carries the SQLSTATE that ends up in the diagnostic record.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of a driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    General,
    InvalidArgument,
    InvalidState,
    NotImplemented,
    /// Failure reported by the query service transport.
    Io,
    /// Illegal descriptor access or inconsistent descriptor contents.
    Descriptor,
    /// Conversion of a bound value failed.
    Conversion,
}

/// Five-character SQLSTATE codes raised by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlState {
    /// 01004 string data, right truncated
    S01004DataTruncated,
    /// 01S07 fractional truncation
    S01S07FractionalTruncation,
    /// 07002 COUNT field incorrect
    S07002CountFieldIncorrect,
    /// 07006 restricted data type attribute violation
    S07006RestrictedDataType,
    /// 07009 invalid descriptor index
    S07009InvalidDescriptorIndex,
    /// 08S01 communication link failure
    S08S01CommunicationFailure,
    /// 22002 indicator variable required but not supplied
    S22002IndicatorRequired,
    /// 24000 invalid cursor state
    S24000InvalidCursorState,
    /// HY000 general error
    SHY000GeneralError,
    /// HY003 invalid application buffer type
    SHY003InvalidBufferType,
    /// HY008 operation canceled
    SHY008OperationCanceled,
    /// HY010 function sequence error
    SHY010SequenceError,
    /// HY016 cannot modify an implementation row descriptor
    SHY016CannotModifyIrd,
    /// HY017 invalid use of an automatically allocated descriptor handle
    SHY017InvalidUseOfAutoDesc,
    /// HY021 inconsistent descriptor information
    SHY021InconsistentDescriptor,
    /// HY024 invalid attribute value
    SHY024InvalidAttributeValue,
    /// HY090 invalid string or buffer length
    SHY090InvalidBufferLength,
    /// HY091 invalid descriptor field identifier
    SHY091InvalidDescriptorField,
    /// HY092 invalid attribute/option identifier
    SHY092InvalidAttribute,
    /// HY106 fetch type out of range
    SHY106FetchTypeOutOfRange,
    /// HYC00 optional feature not implemented
    SHYC00NotImplemented,
}

impl SqlState {
    /// The five-character code as it appears in a diagnostic record.
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlState::S01004DataTruncated => "01004",
            SqlState::S01S07FractionalTruncation => "01S07",
            SqlState::S07002CountFieldIncorrect => "07002",
            SqlState::S07006RestrictedDataType => "07006",
            SqlState::S07009InvalidDescriptorIndex => "07009",
            SqlState::S08S01CommunicationFailure => "08S01",
            SqlState::S22002IndicatorRequired => "22002",
            SqlState::S24000InvalidCursorState => "24000",
            SqlState::SHY000GeneralError => "HY000",
            SqlState::SHY003InvalidBufferType => "HY003",
            SqlState::SHY008OperationCanceled => "HY008",
            SqlState::SHY010SequenceError => "HY010",
            SqlState::SHY016CannotModifyIrd => "HY016",
            SqlState::SHY017InvalidUseOfAutoDesc => "HY017",
            SqlState::SHY021InconsistentDescriptor => "HY021",
            SqlState::SHY024InvalidAttributeValue => "HY024",
            SqlState::SHY090InvalidBufferLength => "HY090",
            SqlState::SHY091InvalidDescriptorField => "HY091",
            SqlState::SHY092InvalidAttribute => "HY092",
            SqlState::SHY106FetchTypeOutOfRange => "HY106",
            SqlState::SHYC00NotImplemented => "HYC00",
        }
    }

    /// Whether the state is a warning class (`01xxx`).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with("01")
    }
}

impl fmt::Display for SqlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by the driver core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{sql_state}] {message}")]
pub struct Error {
    kind: ErrorKind,
    sql_state: SqlState,
    message: String,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn sql_state(&self) -> SqlState {
        self.sql_state
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Partially built error; finished with [`ErrorBuilder::message`].
#[derive(Debug, Clone, Copy)]
pub struct ErrorBuilder {
    kind: ErrorKind,
    sql_state: SqlState,
}

impl ErrorBuilder {
    /// Override the default SQLSTATE of the error kind.
    pub fn state(mut self, sql_state: SqlState) -> Self {
        self.sql_state = sql_state;
        self
    }

    pub fn message(self, message: impl Into<String>) -> Error {
        Error {
            kind: self.kind,
            sql_state: self.sql_state,
            message: message.into(),
        }
    }
}

/// Entry point for constructing driver errors.
pub struct DriverErrorHelper;

impl DriverErrorHelper {
    pub fn general() -> ErrorBuilder {
        Self::builder(ErrorKind::General, SqlState::SHY000GeneralError)
    }

    pub fn invalid_argument() -> ErrorBuilder {
        Self::builder(ErrorKind::InvalidArgument, SqlState::SHY024InvalidAttributeValue)
    }

    pub fn invalid_state() -> ErrorBuilder {
        Self::builder(ErrorKind::InvalidState, SqlState::SHY010SequenceError)
    }

    pub fn not_implemented() -> ErrorBuilder {
        Self::builder(ErrorKind::NotImplemented, SqlState::SHYC00NotImplemented)
    }

    pub fn io() -> ErrorBuilder {
        Self::builder(ErrorKind::Io, SqlState::S08S01CommunicationFailure)
    }

    pub fn descriptor() -> ErrorBuilder {
        Self::builder(ErrorKind::Descriptor, SqlState::SHY091InvalidDescriptorField)
    }

    pub fn conversion() -> ErrorBuilder {
        Self::builder(ErrorKind::Conversion, SqlState::S07006RestrictedDataType)
    }

    fn builder(kind: ErrorKind, sql_state: SqlState) -> ErrorBuilder {
        ErrorBuilder { kind, sql_state }
    }
}
