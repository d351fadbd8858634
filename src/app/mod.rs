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

//! Application data buffers.
//!
//! An [`ApplicationDataBuffer`] is a view of one caller-owned buffer together
//! with its declared [`NativeType`](crate::types::NativeType) and length slot.
//! Values coming from the query service are written with the `put_*` family;
//! values supplied by the application (bound parameters) are read back with
//! the `get_*` family. Every conversion reports a [`ConversionResult`].

mod data_buffer;
mod get;
pub mod memory;
mod number;

pub use data_buffer::{ApplicationDataBuffer, ScratchBuffer};
pub use get::GetResult;
pub use memory::CallerPtr;
pub(crate) use number::parse_decimal;

use crate::error::SqlState;
use crate::types::SqlReturn;

/// Outcome of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionResult {
    Success,
    /// Digits after the decimal point, or trailing interval fields, were lost.
    FractionalTruncated,
    /// The rendering did not fit, or an integer did not fit its destination.
    VarlenDataTruncated,
    UnsupportedConversion,
    /// SQL NULL was fetched but no length/indicator slot was bound.
    IndicatorNeeded,
    NoData,
    Failure,
}

impl ConversionResult {
    /// Return code a fetched column contributes to its row.
    pub fn to_sql_return(self) -> SqlReturn {
        match self {
            ConversionResult::Success => SqlReturn::Success,
            ConversionResult::FractionalTruncated | ConversionResult::VarlenDataTruncated => {
                SqlReturn::SuccessWithInfo
            }
            ConversionResult::NoData => SqlReturn::NoData,
            ConversionResult::UnsupportedConversion
            | ConversionResult::IndicatorNeeded
            | ConversionResult::Failure => SqlReturn::Error,
        }
    }

    /// SQLSTATE of the diagnostic record raised for this result, if any.
    pub fn sql_state(self) -> Option<SqlState> {
        match self {
            ConversionResult::Success | ConversionResult::NoData => None,
            ConversionResult::FractionalTruncated => Some(SqlState::S01S07FractionalTruncation),
            ConversionResult::VarlenDataTruncated => Some(SqlState::S01004DataTruncated),
            ConversionResult::UnsupportedConversion => Some(SqlState::S07006RestrictedDataType),
            ConversionResult::IndicatorNeeded => Some(SqlState::S22002IndicatorRequired),
            ConversionResult::Failure => Some(SqlState::SHY000GeneralError),
        }
    }

    pub fn is_success(self) -> bool {
        self.to_sql_return().is_success()
    }

    /// The more severe of two results; ties keep `self`.
    pub fn worst(self, other: ConversionResult) -> ConversionResult {
        if other.to_sql_return().severity() > self.to_sql_return().severity() {
            other
        } else {
            self
        }
    }
}
