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

//! The `put_*` side of [`ApplicationDataBuffer`]: service value → caller memory.
//!
//! Character output is truncated to fit (one unit reserved for the null
//! terminator) and the length slot always receives the untruncated length,
//! in bytes for narrow buffers and in UTF-16 units for wide ones. Fixed-width
//! output writes exactly the native size and reports that size.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;
use widestring::U16String;

use super::memory::CallerPtr;
use super::number::{self, Number};
use super::ConversionResult;
use crate::types::interval::{
    IntervalDaySecond, IntervalYearMonth, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE,
    NANOS_PER_SECOND,
};
use crate::types::native::{
    FixedLayout, IntervalCode, IntervalUnit, NativeType, SqlDateStruct, SqlDaySecondStruct,
    SqlIntervalStruct, SqlIntervalValue, SqlTimeStruct, SqlTimestampStruct, SqlYearMonthStruct,
};
use crate::types::sql::{
    SQL_DATA_AT_EXEC, SQL_FALSE, SQL_LEN_DATA_AT_EXEC_OFFSET, SQL_NULL_DATA, SQL_TRUE,
};
use crate::types::temporal;

/// View of one application buffer and its length/indicator slot.
#[derive(Debug, Clone)]
pub struct ApplicationDataBuffer {
    native_type: NativeType,
    buffer: CallerPtr<u8>,
    buffer_len: isize,
    res_len: CallerPtr<isize>,
    byte_offset: isize,
    element_offset: usize,
    /// Scale requested for `SQL_C_NUMERIC` output.
    numeric_scale: i16,
}

impl ApplicationDataBuffer {
    pub fn new(
        native_type: NativeType,
        buffer: CallerPtr<u8>,
        buffer_len: isize,
        res_len: CallerPtr<isize>,
    ) -> Self {
        Self {
            native_type,
            buffer,
            buffer_len,
            res_len,
            byte_offset: 0,
            element_offset: 0,
            numeric_scale: 0,
        }
    }

    pub fn with_numeric_scale(mut self, scale: i16) -> Self {
        self.numeric_scale = scale;
        self
    }

    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    pub fn buffer(&self) -> CallerPtr<u8> {
        self.buffer
    }

    pub fn buffer_len(&self) -> isize {
        self.buffer_len
    }

    pub fn res_len_ptr(&self) -> CallerPtr<isize> {
        self.res_len
    }

    pub fn byte_offset(&self) -> isize {
        self.byte_offset
    }

    pub fn element_offset(&self) -> usize {
        self.element_offset
    }

    pub fn set_byte_offset(&mut self, offset: isize) {
        self.byte_offset = offset;
    }

    pub fn set_element_offset(&mut self, offset: usize) {
        self.element_offset = offset;
    }

    /// Stride between consecutive elements of a column-wise bound array.
    pub fn element_size(&self) -> isize {
        match self.native_type.fixed_size() {
            Some(size) => size as isize,
            None => self.buffer_len.max(0),
        }
    }

    /// Data pointer with both offsets applied.
    pub(crate) fn data(&self) -> CallerPtr<u8> {
        self.buffer
            .byte_offset(self.byte_offset + self.element_offset as isize * self.element_size())
    }

    /// Length slot with both offsets applied.
    pub(crate) fn len_slot(&self) -> CallerPtr<isize> {
        self.res_len
            .byte_offset(self.byte_offset)
            .element_offset(self.element_offset)
    }

    /// Current content of the length slot.
    pub fn res_len(&self) -> Option<isize> {
        self.len_slot().read()
    }

    fn set_res_len(&self, len: isize) {
        self.len_slot().write(len);
    }

    /// Whether the value will be supplied at execution time.
    pub fn is_data_at_exec(&self) -> bool {
        matches!(self.res_len(), Some(len) if len == SQL_DATA_AT_EXEC || len <= SQL_LEN_DATA_AT_EXEC_OFFSET)
    }

    /// Size of the input value; 0 for data-at-execution.
    pub fn get_input_size(&self) -> isize {
        if self.is_data_at_exec() {
            0
        } else {
            self.buffer_len
        }
    }

    fn target(&self, natural: NativeType) -> NativeType {
        match self.native_type {
            NativeType::Default => natural,
            native => native,
        }
    }

    /// Record SQL NULL. Needs a length/indicator slot.
    pub fn put_null(&mut self) -> ConversionResult {
        if self.len_slot().write(SQL_NULL_DATA) {
            ConversionResult::Success
        } else {
            ConversionResult::IndicatorNeeded
        }
    }

    pub fn put_i8(&mut self, value: i8) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::SignedTinyInt)
    }

    pub fn put_u8(&mut self, value: u8) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::UnsignedTinyInt)
    }

    pub fn put_i16(&mut self, value: i16) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::SignedShort)
    }

    pub fn put_u16(&mut self, value: u16) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::UnsignedShort)
    }

    pub fn put_i32(&mut self, value: i32) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::SignedLong)
    }

    pub fn put_u32(&mut self, value: u32) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::UnsignedLong)
    }

    pub fn put_i64(&mut self, value: i64) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::SignedBigInt)
    }

    pub fn put_u64(&mut self, value: u64) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::UnsignedBigInt)
    }

    pub fn put_bool(&mut self, value: bool) -> ConversionResult {
        self.put_number(Number::Int(value as i128), NativeType::Bit)
    }

    pub fn put_f32(&mut self, value: f32) -> ConversionResult {
        self.put_number(Number::Real(value), NativeType::Float)
    }

    pub fn put_f64(&mut self, value: f64) -> ConversionResult {
        self.put_number(Number::Float(value), NativeType::Double)
    }

    pub(crate) fn put_number(&mut self, value: Number, natural: NativeType) -> ConversionResult {
        let target = self.target(natural);
        if let Some((min, max, size)) = integer_bounds(target) {
            let (whole, result) = value.narrow(min, max);
            self.write_integer(whole, size);
            return result;
        }
        match target {
            NativeType::Char | NativeType::WChar => self.put_text(&value.to_string(), target),
            NativeType::Bit => self.put_bit(value.as_f64()),
            NativeType::Float => {
                let v = value.as_f32();
                self.write_fixed(&v.to_ne_bytes());
                truncation_result(value.as_f64().is_finite() && !v.is_finite())
            }
            NativeType::Double => {
                self.write_fixed(&value.as_f64().to_ne_bytes());
                ConversionResult::Success
            }
            NativeType::Numeric => match value.to_decimal() {
                Some(decimal) => self.put_numeric(decimal),
                None => ConversionResult::VarlenDataTruncated,
            },
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    /// Write text; parsed into the destination type for non-character buffers.
    pub fn put_str(&mut self, value: &str) -> ConversionResult {
        let target = self.target(NativeType::Char);
        match target {
            NativeType::Char | NativeType::WChar | NativeType::Binary => {
                self.put_text(value, target)
            }
            NativeType::Numeric => match number::parse_decimal(value) {
                Some(decimal) => self.put_numeric(decimal),
                None => ConversionResult::UnsupportedConversion,
            },
            NativeType::Date => {
                if let Some(date) = temporal::parse_date(value) {
                    self.put_date(date)
                } else if let Some(ts) = temporal::parse_timestamp(value) {
                    self.put_timestamp(ts)
                } else {
                    ConversionResult::UnsupportedConversion
                }
            }
            NativeType::Time => {
                if let Some(time) = temporal::parse_time(value) {
                    self.put_time(time)
                } else if let Some(ts) = temporal::parse_timestamp(value) {
                    self.put_timestamp(ts)
                } else {
                    ConversionResult::UnsupportedConversion
                }
            }
            NativeType::Timestamp => {
                if let Some(ts) = temporal::parse_timestamp(value) {
                    self.put_timestamp(ts)
                } else if let Some(date) = temporal::parse_date(value) {
                    self.put_date(date)
                } else {
                    ConversionResult::UnsupportedConversion
                }
            }
            NativeType::Interval(code) if code.is_year_month() => {
                match IntervalYearMonth::parse(value) {
                    Some(interval) => self.put_interval_year_month(interval),
                    None => ConversionResult::UnsupportedConversion,
                }
            }
            NativeType::Interval(_) => match IntervalDaySecond::parse(value) {
                Some(interval) => self.put_interval_day_second(interval),
                None => ConversionResult::UnsupportedConversion,
            },
            _ => match Number::parse(value) {
                Some(number) => self.put_number(number, target),
                None => ConversionResult::UnsupportedConversion,
            },
        }
    }

    pub fn put_decimal(&mut self, value: Decimal) -> ConversionResult {
        let target = self.target(NativeType::Char);
        if let Some((min, max, size)) = integer_bounds(target) {
            let whole = value.trunc().to_i128().unwrap_or_default();
            let (whole, result) = number::narrow_whole(whole, !value.fract().is_zero(), min, max);
            self.write_integer(whole, size);
            return result;
        }
        match target {
            NativeType::Char | NativeType::WChar => self.put_text(&value.to_string(), target),
            NativeType::Numeric => self.put_numeric(value),
            NativeType::Float | NativeType::Double | NativeType::Bit => {
                self.put_number(Number::Float(value.to_f64().unwrap_or_default()), target)
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    pub fn put_date(&mut self, value: NaiveDate) -> ConversionResult {
        match self.target(NativeType::Date) {
            target @ (NativeType::Char | NativeType::WChar) => {
                self.put_text(&temporal::format_date(&value), target)
            }
            NativeType::Date => {
                self.write_struct(&date_struct(&value));
                ConversionResult::Success
            }
            NativeType::Timestamp => {
                self.write_struct(&timestamp_struct(&value.and_time(NaiveTime::MIN)));
                ConversionResult::Success
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    pub fn put_time(&mut self, value: NaiveTime) -> ConversionResult {
        match self.target(NativeType::Time) {
            target @ (NativeType::Char | NativeType::WChar) => {
                self.put_text(&temporal::format_time(&value), target)
            }
            NativeType::Time => {
                self.write_struct(&time_struct(&value));
                fraction_result(temporal::nanos_of(&value) != 0)
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    pub fn put_timestamp(&mut self, value: NaiveDateTime) -> ConversionResult {
        match self.target(NativeType::Timestamp) {
            // Reported length is the 29-character rendering, terminator excluded.
            target @ (NativeType::Char | NativeType::WChar) => {
                self.put_text(&temporal::format_timestamp(&value), target)
            }
            NativeType::Timestamp => {
                self.write_struct(&timestamp_struct(&value));
                ConversionResult::Success
            }
            NativeType::Date => {
                self.write_struct(&date_struct(&value.date()));
                fraction_result(value.time() != NaiveTime::MIN)
            }
            NativeType::Time => {
                self.write_struct(&time_struct(&value.time()));
                fraction_result(temporal::nanos_of(&value.time()) != 0)
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    pub fn put_interval_year_month(&mut self, value: IntervalYearMonth) -> ConversionResult {
        match self.target(NativeType::Interval(IntervalCode::YearToMonth)) {
            target @ (NativeType::Char | NativeType::WChar) => {
                self.put_text(&value.to_string(), target)
            }
            NativeType::Interval(code) if code.is_year_month() => {
                let (packed, result) = pack_year_month(&value, code);
                self.write_struct(&packed);
                result
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    pub fn put_interval_day_second(&mut self, value: IntervalDaySecond) -> ConversionResult {
        match self.target(NativeType::Interval(IntervalCode::DayToSecond)) {
            target @ (NativeType::Char | NativeType::WChar) => {
                self.put_text(&value.to_string(), target)
            }
            NativeType::Interval(code) if !code.is_year_month() => {
                let (packed, result) = pack_day_second(&value, code);
                self.write_struct(&packed);
                result
            }
            _ => ConversionResult::UnsupportedConversion,
        }
    }

    fn put_numeric(&mut self, value: Decimal) -> ConversionResult {
        let (numeric, result) = number::pack_numeric(value, self.numeric_scale);
        self.write_struct(&numeric);
        result
    }

    fn put_bit(&mut self, value: f64) -> ConversionResult {
        self.write_fixed(&[(value != 0.0) as u8]);
        if value == 0.0 || value == 1.0 {
            ConversionResult::Success
        } else if value > 0.0 && value < 2.0 {
            ConversionResult::FractionalTruncated
        } else {
            ConversionResult::VarlenDataTruncated
        }
    }

    fn put_text(&mut self, value: &str, target: NativeType) -> ConversionResult {
        match target {
            NativeType::WChar => self.put_wide(value),
            NativeType::Binary => self.put_binary(value.as_bytes()),
            _ => self.put_narrow(value),
        }
    }

    fn put_narrow(&mut self, value: &str) -> ConversionResult {
        self.set_res_len(value.len() as isize);
        let data = self.data();
        if data.is_null() {
            return ConversionResult::Success;
        }
        let capacity = self.buffer_len.max(0) as usize;
        if capacity == 0 {
            return truncation_result(!value.is_empty());
        }
        let mut n = value.len().min(capacity - 1);
        while !value.is_char_boundary(n) {
            n -= 1;
        }
        data.with_slice_mut(n + 1, |out| {
            out[..n].copy_from_slice(&value.as_bytes()[..n]);
            out[n] = 0;
        });
        if n < value.len() {
            trace!("Character data truncated from {} to {} bytes", value.len(), n);
        }
        truncation_result(n < value.len())
    }

    fn put_wide(&mut self, value: &str) -> ConversionResult {
        let units = U16String::from_str(value).into_vec();
        self.set_res_len(units.len() as isize);
        let data = self.data();
        if data.is_null() {
            return ConversionResult::Success;
        }
        let capacity = self.buffer_len.max(0) as usize / 2;
        if capacity == 0 {
            return truncation_result(!units.is_empty());
        }
        let mut n = units.len().min(capacity - 1);
        // Do not split a surrogate pair.
        if n > 0 && n < units.len() && (0xD800..0xDC00).contains(&units[n - 1]) {
            n -= 1;
        }
        data.with_slice_mut((n + 1) * 2, |out| {
            for (i, unit) in units[..n].iter().chain(std::iter::once(&0)).enumerate() {
                out[i * 2..i * 2 + 2].copy_from_slice(&unit.to_ne_bytes());
            }
        });
        truncation_result(n < units.len())
    }

    fn put_binary(&mut self, value: &[u8]) -> ConversionResult {
        self.set_res_len(value.len() as isize);
        let data = self.data();
        if data.is_null() {
            return ConversionResult::Success;
        }
        let n = value.len().min(self.buffer_len.max(0) as usize);
        data.with_slice_mut(n, |out| out.copy_from_slice(&value[..n]));
        truncation_result(n < value.len())
    }

    fn write_fixed(&mut self, bytes: &[u8]) {
        self.data()
            .with_slice_mut(bytes.len(), |out| out.copy_from_slice(bytes));
        self.set_res_len(bytes.len() as isize);
    }

    /// Low `size` bytes of the two's-complement value, native byte order.
    fn write_integer(&mut self, value: i128, size: usize) {
        let mut bytes = [0u8; 8];
        bytes[..size].copy_from_slice(&value.to_le_bytes()[..size]);
        if cfg!(target_endian = "big") {
            bytes[..size].reverse();
        }
        self.write_fixed(&bytes[..size]);
    }

    fn write_struct<S: FixedLayout>(&mut self, value: &S) {
        let mut bytes = [0u8; SqlIntervalStruct::SIZE];
        value.write_to(&mut bytes[..S::SIZE]);
        self.write_fixed(&bytes[..S::SIZE]);
    }
}

fn integer_bounds(target: NativeType) -> Option<(i128, i128, usize)> {
    let bounds = match target {
        NativeType::SignedTinyInt => (i8::MIN as i128, i8::MAX as i128, 1),
        NativeType::UnsignedTinyInt => (0, u8::MAX as i128, 1),
        NativeType::SignedShort => (i16::MIN as i128, i16::MAX as i128, 2),
        NativeType::UnsignedShort => (0, u16::MAX as i128, 2),
        NativeType::SignedLong => (i32::MIN as i128, i32::MAX as i128, 4),
        NativeType::UnsignedLong => (0, u32::MAX as i128, 4),
        NativeType::SignedBigInt => (i64::MIN as i128, i64::MAX as i128, 8),
        NativeType::UnsignedBigInt => (0, u64::MAX as i128, 8),
        _ => return None,
    };
    Some(bounds)
}

fn truncation_result(truncated: bool) -> ConversionResult {
    if truncated {
        ConversionResult::VarlenDataTruncated
    } else {
        ConversionResult::Success
    }
}

fn fraction_result(dropped: bool) -> ConversionResult {
    if dropped {
        ConversionResult::FractionalTruncated
    } else {
        ConversionResult::Success
    }
}

fn date_struct(date: &NaiveDate) -> SqlDateStruct {
    SqlDateStruct {
        year: date.year() as i16,
        month: date.month() as u16,
        day: date.day() as u16,
    }
}

fn time_struct(time: &NaiveTime) -> SqlTimeStruct {
    SqlTimeStruct {
        hour: time.hour() as u16,
        minute: time.minute() as u16,
        second: time.second() as u16,
    }
}

fn timestamp_struct(ts: &NaiveDateTime) -> SqlTimestampStruct {
    let date = date_struct(&ts.date());
    let time = time_struct(&ts.time());
    SqlTimestampStruct {
        year: date.year,
        month: date.month,
        day: date.day,
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        fraction: temporal::nanos_of(&ts.time()),
    }
}

fn interval_sign(negative: bool) -> i16 {
    if negative {
        SQL_FALSE
    } else {
        SQL_TRUE
    }
}

/// Narrow an interval field, reporting overflow.
fn field(value: u128, overflowed: &mut bool) -> u32 {
    match u32::try_from(value) {
        Ok(v) => v,
        Err(_) => {
            *overflowed = true;
            u32::MAX
        }
    }
}

/// Sign-and-magnitude year/month struct restricted to the fields of `code`;
/// the leading field absorbs larger units.
pub(crate) fn pack_year_month(
    value: &IntervalYearMonth,
    code: IntervalCode,
) -> (SqlIntervalStruct, ConversionResult) {
    let total = value.total_months().unsigned_abs() as u128;
    let (years, months, dropped) = match code {
        IntervalCode::Year => (total / 12, 0, total % 12 != 0),
        IntervalCode::Month => (0, total, false),
        _ => (total / 12, total % 12, false),
    };
    let mut overflowed = false;
    let ym = SqlYearMonthStruct {
        year: field(years, &mut overflowed),
        month: field(months, &mut overflowed),
    };
    let packed = SqlIntervalStruct {
        interval_type: code.code() as i32,
        interval_sign: interval_sign(value.is_negative()),
        intval: SqlIntervalValue::from_year_month(ym),
    };
    let result = if overflowed {
        ConversionResult::VarlenDataTruncated
    } else {
        fraction_result(dropped)
    };
    (packed, result)
}

/// Sign-and-magnitude day/second struct restricted to the fields of `code`;
/// the leading field absorbs larger units and anything below the trailing
/// field is dropped.
pub(crate) fn pack_day_second(
    value: &IntervalDaySecond,
    code: IntervalCode,
) -> (SqlIntervalStruct, ConversionResult) {
    let (leading, trailing) = code.bounds();
    let units = [
        (IntervalUnit::Day, NANOS_PER_DAY as u128),
        (IntervalUnit::Hour, NANOS_PER_HOUR as u128),
        (IntervalUnit::Minute, NANOS_PER_MINUTE as u128),
        (IntervalUnit::Second, NANOS_PER_SECOND as u128),
    ];
    let mut rest = value.total_nanos().unsigned_abs();
    let mut fields = [0u128; 5];
    for (i, (unit, size)) in units.iter().enumerate() {
        if *unit >= leading && *unit <= trailing {
            fields[i] = rest / size;
            rest %= size;
        }
    }
    if trailing == IntervalUnit::Second {
        fields[4] = rest;
        rest = 0;
    }

    let mut overflowed = false;
    let ds = SqlDaySecondStruct {
        day: field(fields[0], &mut overflowed),
        hour: field(fields[1], &mut overflowed),
        minute: field(fields[2], &mut overflowed),
        second: field(fields[3], &mut overflowed),
        fraction: field(fields[4], &mut overflowed),
    };
    let packed = SqlIntervalStruct {
        interval_type: code.code() as i32,
        interval_sign: interval_sign(value.is_negative()),
        intval: SqlIntervalValue::from_day_second(ds),
    };
    let result = if overflowed {
        ConversionResult::VarlenDataTruncated
    } else {
        fraction_result(rest != 0)
    };
    (packed, result)
}

/// Caller-style buffer over driver-owned memory, used to render nested values.
#[derive(Debug)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    len: isize,
}

impl ScratchBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    /// Run a conversion into a narrow character view of the scratch memory
    /// and return the text it produced.
    pub fn render(
        &mut self,
        convert: impl FnOnce(&mut ApplicationDataBuffer) -> ConversionResult,
    ) -> (String, ConversionResult) {
        self.data.fill(0);
        self.len = 0;
        let capacity = self.data.len() as isize;
        // SAFETY: both regions are owned by `self`, sized as declared, and
        // outlive the view, which is dropped before they are read back.
        let (data, len) = unsafe {
            (
                CallerPtr::new(self.data.as_mut_ptr()),
                CallerPtr::new(&mut self.len as *mut isize),
            )
        };
        let mut view = ApplicationDataBuffer::new(NativeType::Char, data, capacity, len);
        let result = convert(&mut view);
        drop(view);
        if self.len == SQL_NULL_DATA {
            return (String::new(), result);
        }
        let end = self.data.iter().position(|b| *b == 0).unwrap_or(self.data.len());
        (String::from_utf8_lossy(&self.data[..end]).into_owned(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::native::SqlNumericStruct;

    fn bind(native_type: NativeType, data: &mut [u8], len: &mut isize) -> ApplicationDataBuffer {
        unsafe {
            ApplicationDataBuffer::new(
                native_type,
                CallerPtr::new(data.as_mut_ptr()),
                data.len() as isize,
                CallerPtr::new(len as *mut isize),
            )
        }
    }

    fn text(data: &[u8]) -> &str {
        let end = data.iter().position(|b| *b == 0).unwrap();
        std::str::from_utf8(&data[..end]).unwrap()
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 11, 1)
            .unwrap()
            .and_hms_nano_opt(17, 45, 59, 123_456_789)
            .unwrap()
    }

    #[test]
    fn test_timestamp_truncated_into_char() {
        let mut data = [0xAAu8; 29];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        let result = buffer.put_timestamp(timestamp());
        assert_eq!(result, ConversionResult::VarlenDataTruncated);
        assert_eq!(text(&data), "2018-11-01 17:45:59.12345678");
        assert_eq!(len, 29);
    }

    #[test]
    fn test_timestamp_fits_char() {
        let mut data = [0u8; 30];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        assert_eq!(buffer.put_timestamp(timestamp()), ConversionResult::Success);
        assert_eq!(text(&data), "2018-11-01 17:45:59.123456789");
        assert_eq!(len, 29);
    }

    #[test]
    fn test_timestamp_struct() {
        let mut data = [0u8; SqlTimestampStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Timestamp, &mut data, &mut len);
        assert_eq!(buffer.put_timestamp(timestamp()), ConversionResult::Success);
        let ts = SqlTimestampStruct::read_from(&data);
        assert_eq!((ts.year, ts.month, ts.day), (2018, 11, 1));
        assert_eq!((ts.hour, ts.minute, ts.second), (17, 45, 59));
        assert_eq!(ts.fraction, 123_456_789);
        assert_eq!(len, SqlTimestampStruct::SIZE as isize);
    }

    #[test]
    fn test_timestamp_into_date_drops_time() {
        let mut data = [0u8; SqlDateStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Date, &mut data, &mut len);
        assert_eq!(
            buffer.put_timestamp(timestamp()),
            ConversionResult::FractionalTruncated
        );
        let date = SqlDateStruct::read_from(&data);
        assert_eq!((date.year, date.month, date.day), (2018, 11, 1));
    }

    #[test]
    fn test_integer_narrowing() {
        let mut data = [0u8; 1];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::SignedTinyInt, &mut data, &mut len);
        assert_eq!(buffer.put_i64(-5), ConversionResult::Success);
        assert_eq!(data[0] as i8, -5);

        let mut buffer = bind(NativeType::SignedTinyInt, &mut data, &mut len);
        assert_eq!(buffer.put_i64(300), ConversionResult::VarlenDataTruncated);
        assert_eq!(data[0] as i8, 44);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_double_into_integer_drops_fraction() {
        let mut data = [0u8; 4];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::SignedLong, &mut data, &mut len);
        assert_eq!(buffer.put_f64(-42.75), ConversionResult::FractionalTruncated);
        assert_eq!(i32::from_ne_bytes(data), -42);

        let mut buffer = bind(NativeType::SignedLong, &mut data, &mut len);
        assert_eq!(buffer.put_f64(42.0), ConversionResult::Success);
        assert_eq!(i32::from_ne_bytes(data), 42);
    }

    #[test]
    fn test_numbers_to_string_and_back() {
        for value in [0i64, 1, -1, 42, i64::MAX, i64::MIN] {
            let mut data = [0u8; 32];
            let mut len = 0isize;
            let mut buffer = bind(NativeType::Char, &mut data, &mut len);
            assert_eq!(buffer.put_i64(value), ConversionResult::Success);
            assert_eq!(buffer.get_i64(), Ok(Some(value)));
        }
        for value in [0.1f64, -2.5, 1e20, 123456.789, 3.0e-5] {
            let mut data = [0u8; 64];
            let mut len = 0isize;
            let mut buffer = bind(NativeType::Char, &mut data, &mut len);
            assert_eq!(buffer.put_f64(value), ConversionResult::Success);
            assert_eq!(buffer.get_f64(), Ok(Some(value)));
        }
    }

    #[test]
    fn test_float_renders_shortest() {
        let mut data = [0u8; 32];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        buffer.put_f32(0.1);
        assert_eq!(text(&data), "0.1");
        assert_eq!(len, 3);
    }

    #[test]
    fn test_string_into_integer() {
        let mut data = [0u8; 8];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::SignedBigInt, &mut data, &mut len);
        assert_eq!(buffer.put_str("  1234 "), ConversionResult::Success);
        assert_eq!(i64::from_ne_bytes(data), 1234);

        let mut buffer = bind(NativeType::SignedBigInt, &mut data, &mut len);
        assert_eq!(buffer.put_str("12x"), ConversionResult::UnsupportedConversion);
    }

    #[test]
    fn test_decimal_into_numeric() {
        let mut data = [0u8; SqlNumericStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Numeric, &mut data, &mut len);
        buffer.put_decimal(Decimal::new(12345, 2));
        let numeric = SqlNumericStruct::read_from(&data);
        assert_eq!(numeric.sign, 1);
        assert_eq!(numeric.scale, 0);
        assert_eq!(numeric.precision, 3);
        assert_eq!(numeric.val[0], 0x7B);
        assert!(numeric.val[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decimal_into_numeric_with_scale() {
        let mut data = [0u8; SqlNumericStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Numeric, &mut data, &mut len).with_numeric_scale(2);
        assert_eq!(buffer.put_decimal(Decimal::new(-12345, 2)), ConversionResult::Success);
        let numeric = SqlNumericStruct::read_from(&data);
        assert_eq!(numeric.sign, 0);
        assert_eq!(numeric.scale, 2);
        assert_eq!(u128::from_le_bytes(numeric.val), 12345);
    }

    #[test]
    fn test_decimal_into_date_unsupported() {
        let mut data = [0u8; SqlDateStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Date, &mut data, &mut len);
        assert_eq!(
            buffer.put_decimal(Decimal::new(1, 0)),
            ConversionResult::UnsupportedConversion
        );
    }

    #[test]
    fn test_negative_fraction_interval() {
        let mut data = [0u8; SqlIntervalStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(
            NativeType::Interval(IntervalCode::DayToSecond),
            &mut data,
            &mut len,
        );
        let result = buffer.put_interval_day_second(IntervalDaySecond::new(0, 0, 0, 0, -123_456_789));
        assert_eq!(result, ConversionResult::Success);
        let packed = SqlIntervalStruct::read_from(&data);
        assert!(!packed.is_non_negative());
        assert_eq!(packed.interval_sign, SQL_FALSE);
        let ds = packed.intval.day_second();
        assert_eq!((ds.day, ds.hour, ds.minute, ds.second), (0, 0, 0, 0));
        assert_eq!(ds.fraction, 123_456_789);
    }

    #[test]
    fn test_interval_leading_field_absorbs() {
        let value = IntervalDaySecond::new(1, 2, 3, 4, 0);
        let (packed, result) = pack_day_second(&value, IntervalCode::HourToMinute);
        assert_eq!(result, ConversionResult::FractionalTruncated);
        let ds = packed.intval.day_second();
        assert_eq!((ds.day, ds.hour, ds.minute, ds.second), (0, 26, 3, 0));
        assert!(packed.is_non_negative());

        let (packed, result) = pack_year_month(&IntervalYearMonth::new(-2, -3), IntervalCode::Month);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(packed.intval.year_month().month, 27);
        assert_eq!(packed.interval_sign, SQL_FALSE);
    }

    #[test]
    fn test_interval_family_mismatch() {
        let mut data = [0u8; SqlIntervalStruct::SIZE];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Interval(IntervalCode::Year), &mut data, &mut len);
        assert_eq!(
            buffer.put_interval_day_second(IntervalDaySecond::new(1, 0, 0, 0, 0)),
            ConversionResult::UnsupportedConversion
        );
    }

    #[test]
    fn test_interval_text() {
        let mut data = [0u8; 32];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        buffer.put_interval_day_second(IntervalDaySecond::new(1, 2, 3, 4, 5));
        assert_eq!(text(&data), "1 02:03:04.000000005");
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        buffer.put_interval_year_month(IntervalYearMonth::new(1, 2));
        assert_eq!(text(&data), "1-2");
    }

    #[test]
    fn test_null_requires_indicator() {
        let mut data = [0u8; 4];
        let mut buffer = unsafe {
            ApplicationDataBuffer::new(
                NativeType::SignedLong,
                CallerPtr::new(data.as_mut_ptr()),
                4,
                CallerPtr::null(),
            )
        };
        assert_eq!(buffer.put_null(), ConversionResult::IndicatorNeeded);

        let mut len = 0isize;
        let mut buffer = bind(NativeType::SignedLong, &mut data, &mut len);
        assert_eq!(buffer.put_null(), ConversionResult::Success);
        assert_eq!(len, SQL_NULL_DATA);
    }

    #[test]
    fn test_wide_output_counts_units() {
        let mut data = [0u8; 8];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::WChar, &mut data, &mut len);
        assert_eq!(buffer.put_str("héllo"), ConversionResult::VarlenDataTruncated);
        assert_eq!(len, 5);
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(units, vec![b'h' as u16, 0xE9, b'l' as u16, 0]);
    }

    #[test]
    fn test_narrow_truncation_respects_char_boundary() {
        let mut data = [0xFFu8; 3];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Char, &mut data, &mut len);
        assert_eq!(buffer.put_str("aé"), ConversionResult::VarlenDataTruncated);
        assert_eq!(&data[..2], b"a\0");
        assert_eq!(len, 3);
    }

    #[test]
    fn test_element_offset_addresses_rows() {
        let mut data = [0i32; 3];
        let mut lens = [0isize; 3];
        let mut buffer = unsafe {
            ApplicationDataBuffer::new(
                NativeType::SignedLong,
                CallerPtr::new(data.as_mut_ptr().cast()),
                4,
                CallerPtr::new(lens.as_mut_ptr()),
            )
        };
        for (row, value) in [10, 20, 30].into_iter().enumerate() {
            buffer.set_element_offset(row);
            assert_eq!(buffer.put_i32(value), ConversionResult::Success);
        }
        assert_eq!(data, [10, 20, 30]);
        assert_eq!(lens, [4, 4, 4]);
    }

    #[test]
    fn test_byte_offset_addresses_rows() {
        #[repr(C)]
        #[derive(Default, Clone, Copy)]
        struct RowBuf {
            value: i64,
            len: isize,
        }
        let mut rows = [RowBuf::default(); 2];
        let base = rows.as_mut_ptr();
        let mut buffer = unsafe {
            ApplicationDataBuffer::new(
                NativeType::SignedBigInt,
                CallerPtr::new(std::ptr::addr_of_mut!((*base).value).cast()),
                8,
                CallerPtr::new(std::ptr::addr_of_mut!((*base).len)),
            )
        };
        buffer.set_byte_offset(std::mem::size_of::<RowBuf>() as isize);
        buffer.put_i64(99);
        assert_eq!(rows[1].value, 99);
        assert_eq!(rows[1].len, 8);
        assert_eq!(rows[0].value, 0);
    }

    #[test]
    fn test_data_at_exec() {
        let mut data = [0u8; 4];
        for (len, expected) in [(SQL_DATA_AT_EXEC, true), (-105, true), (SQL_NULL_DATA, false), (4, false)] {
            let mut len = len;
            let buffer = bind(NativeType::SignedLong, &mut data, &mut len);
            assert_eq!(buffer.is_data_at_exec(), expected);
            assert_eq!(buffer.get_input_size(), if expected { 0 } else { 4 });
        }
    }

    #[test]
    fn test_default_picks_natural_type() {
        let mut data = [0u8; 8];
        let mut len = 0isize;
        let mut buffer = bind(NativeType::Default, &mut data, &mut len);
        assert_eq!(buffer.put_f64(2.5), ConversionResult::Success);
        assert_eq!(f64::from_ne_bytes(data), 2.5);
        assert_eq!(len, 8);
    }

    #[test]
    fn test_scratch_render() {
        let mut scratch = ScratchBuffer::new(8);
        let (text, result) = scratch.render(|b| b.put_str("abc"));
        assert_eq!(text, "abc");
        assert_eq!(result, ConversionResult::Success);
        let (text, result) = scratch.render(|b| b.put_str("abcdefghij"));
        assert_eq!(text, "abcdefg");
        assert_eq!(result, ConversionResult::VarlenDataTruncated);
    }
}
