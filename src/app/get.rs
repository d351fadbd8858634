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

//! The `get_*` side of [`ApplicationDataBuffer`]: caller memory → value.
//!
//! Used to read bound parameter values. `Ok(None)` means the application
//! supplied SQL NULL. Character input honours an explicit length or, when the
//! length slot is absent or `SQL_NTS`, scans for the terminator.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use widestring::U16String;

use super::data_buffer::ApplicationDataBuffer;
use super::number::{self, Number};
use super::ConversionResult;
use crate::types::interval::{
    IntervalDaySecond, IntervalYearMonth, NANOS_PER_DAY, NANOS_PER_HOUR, NANOS_PER_MINUTE,
    NANOS_PER_SECOND,
};
use crate::types::native::{
    FixedLayout, NativeType, SqlDateStruct, SqlIntervalStruct, SqlNumericStruct, SqlTimeStruct,
    SqlTimestampStruct,
};
use crate::types::sql::SQL_NULL_DATA;
use crate::types::temporal;

/// Value read from an application buffer; `Ok(None)` is SQL NULL.
pub type GetResult<T> = std::result::Result<Option<T>, ConversionResult>;

impl ApplicationDataBuffer {
    pub fn is_null_input(&self) -> bool {
        self.res_len() == Some(SQL_NULL_DATA)
    }

    fn read_bytes<const N: usize>(&self) -> std::result::Result<[u8; N], ConversionResult> {
        self.data()
            .with_slice(N, |bytes| {
                let mut out = [0u8; N];
                out.copy_from_slice(bytes);
                out
            })
            .ok_or(ConversionResult::Failure)
    }

    fn read_struct<S: FixedLayout>(&self) -> std::result::Result<S, ConversionResult> {
        self.data()
            .with_slice(S::SIZE, S::read_from)
            .ok_or(ConversionResult::Failure)
    }

    /// Number of `unit`-byte code units of character input.
    fn text_units(&self, unit: usize) -> usize {
        let capacity = (self.buffer_len() > 0).then(|| self.buffer_len() as usize / unit);
        match self.res_len() {
            Some(len) if len >= 0 => {
                let len = len as usize;
                capacity.map_or(len, |cap| len.min(cap))
            }
            _ => self
                .data()
                .terminated_len(unit, capacity.unwrap_or(usize::MAX)),
        }
    }

    fn read_text(&self) -> std::result::Result<String, ConversionResult> {
        let data = self.data();
        if data.is_null() {
            return Err(ConversionResult::Failure);
        }
        match self.native_type() {
            NativeType::WChar => {
                let units = self.text_units(2);
                data.with_slice(units * 2, |bytes| {
                    let wide: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                        .collect();
                    U16String::from_vec(wide).to_string_lossy()
                })
                .ok_or(ConversionResult::Failure)
            }
            _ => {
                let len = self.text_units(1);
                data.with_slice(len, |bytes| String::from_utf8_lossy(bytes).into_owned())
                    .ok_or(ConversionResult::Failure)
            }
        }
    }

    fn read_number(&self) -> GetResult<Number> {
        if self.is_null_input() {
            return Ok(None);
        }
        let number = match self.native_type() {
            NativeType::SignedTinyInt => Number::Int(i8::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::UnsignedTinyInt | NativeType::Bit => {
                Number::Int(u8::from_ne_bytes(self.read_bytes()?) as i128)
            }
            NativeType::SignedShort => Number::Int(i16::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::UnsignedShort => Number::Int(u16::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::SignedLong => Number::Int(i32::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::UnsignedLong => Number::Int(u32::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::SignedBigInt => Number::Int(i64::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::UnsignedBigInt => Number::Int(u64::from_ne_bytes(self.read_bytes()?) as i128),
            NativeType::Float => Number::Real(f32::from_ne_bytes(self.read_bytes()?)),
            NativeType::Double => Number::Float(f64::from_ne_bytes(self.read_bytes()?)),
            NativeType::Numeric => {
                let numeric: SqlNumericStruct = self.read_struct()?;
                let decimal = number::unpack_numeric(&numeric).ok_or(ConversionResult::Failure)?;
                Number::from_decimal(decimal).0
            }
            NativeType::Char | NativeType::WChar => {
                Number::parse(&self.read_text()?).ok_or(ConversionResult::UnsupportedConversion)?
            }
            _ => return Err(ConversionResult::UnsupportedConversion),
        };
        Ok(Some(number))
    }

    fn get_integer(&self, min: i128, max: i128) -> GetResult<i128> {
        Ok(self.read_number()?.map(|n| n.narrow(min, max).0))
    }

    pub fn get_i8(&self) -> GetResult<i8> {
        Ok(self.get_integer(i8::MIN as i128, i8::MAX as i128)?.map(|v| v as i8))
    }

    pub fn get_i16(&self) -> GetResult<i16> {
        Ok(self.get_integer(i16::MIN as i128, i16::MAX as i128)?.map(|v| v as i16))
    }

    pub fn get_i32(&self) -> GetResult<i32> {
        Ok(self.get_integer(i32::MIN as i128, i32::MAX as i128)?.map(|v| v as i32))
    }

    pub fn get_i64(&self) -> GetResult<i64> {
        Ok(self.get_integer(i64::MIN as i128, i64::MAX as i128)?.map(|v| v as i64))
    }

    pub fn get_u64(&self) -> GetResult<u64> {
        Ok(self.get_integer(0, u64::MAX as i128)?.map(|v| v as u64))
    }

    pub fn get_f32(&self) -> GetResult<f32> {
        Ok(self.read_number()?.map(Number::as_f32))
    }

    pub fn get_f64(&self) -> GetResult<f64> {
        Ok(self.read_number()?.map(Number::as_f64))
    }

    pub fn get_decimal(&self) -> GetResult<Decimal> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Numeric => {
                let numeric: SqlNumericStruct = self.read_struct()?;
                number::unpack_numeric(&numeric)
                    .map(Some)
                    .ok_or(ConversionResult::Failure)
            }
            NativeType::Char | NativeType::WChar => number::parse_decimal(&self.read_text()?)
                .map(Some)
                .ok_or(ConversionResult::UnsupportedConversion),
            _ => match self.read_number()? {
                Some(n) => n.to_decimal().map(Some).ok_or(ConversionResult::Failure),
                None => Ok(None),
            },
        }
    }

    /// Character input as text; other types are rendered canonically.
    pub fn get_string(&self) -> GetResult<String> {
        if self.is_null_input() {
            return Ok(None);
        }
        let text = match self.native_type() {
            NativeType::Char | NativeType::WChar | NativeType::Default => self.read_text()?,
            NativeType::Binary => return Err(ConversionResult::UnsupportedConversion),
            NativeType::Numeric => self.get_decimal()?.map(|d| d.to_string()).unwrap_or_default(),
            NativeType::Date => self.get_date()?.map(|d| temporal::format_date(&d)).unwrap_or_default(),
            NativeType::Time => self.get_time()?.map(|t| temporal::format_time(&t)).unwrap_or_default(),
            NativeType::Timestamp => self
                .get_timestamp()?
                .map(|ts| temporal::format_timestamp(&ts))
                .unwrap_or_default(),
            NativeType::Interval(code) if code.is_year_month() => self
                .get_interval_year_month()?
                .map(|iv| iv.to_string())
                .unwrap_or_default(),
            NativeType::Interval(_) => self
                .get_interval_day_second()?
                .map(|iv| iv.to_string())
                .unwrap_or_default(),
            _ => self.read_number()?.map(|n| n.to_string()).unwrap_or_default(),
        };
        Ok(Some(text))
    }

    pub fn get_date(&self) -> GetResult<NaiveDate> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Date => {
                let d: SqlDateStruct = self.read_struct()?;
                date_of(d.year, d.month, d.day).map(Some)
            }
            NativeType::Timestamp => Ok(self.get_timestamp()?.map(|ts| ts.date())),
            NativeType::Char | NativeType::WChar => {
                let text = self.read_text()?;
                temporal::parse_date(&text)
                    .or_else(|| temporal::parse_timestamp(&text).map(|ts| ts.date()))
                    .map(Some)
                    .ok_or(ConversionResult::UnsupportedConversion)
            }
            _ => Err(ConversionResult::UnsupportedConversion),
        }
    }

    pub fn get_time(&self) -> GetResult<NaiveTime> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Time => {
                let t: SqlTimeStruct = self.read_struct()?;
                time_of(t.hour, t.minute, t.second, 0).map(Some)
            }
            NativeType::Timestamp => Ok(self.get_timestamp()?.map(|ts| ts.time())),
            NativeType::Char | NativeType::WChar => {
                let text = self.read_text()?;
                temporal::parse_time(&text)
                    .or_else(|| temporal::parse_timestamp(&text).map(|ts| ts.time()))
                    .map(Some)
                    .ok_or(ConversionResult::UnsupportedConversion)
            }
            _ => Err(ConversionResult::UnsupportedConversion),
        }
    }

    pub fn get_timestamp(&self) -> GetResult<NaiveDateTime> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Timestamp => {
                let ts: SqlTimestampStruct = self.read_struct()?;
                let date = date_of(ts.year, ts.month, ts.day)?;
                let time = time_of(ts.hour, ts.minute, ts.second, ts.fraction)?;
                Ok(Some(NaiveDateTime::new(date, time)))
            }
            NativeType::Date => Ok(self.get_date()?.map(|d| d.and_time(NaiveTime::MIN))),
            NativeType::Char | NativeType::WChar => {
                let text = self.read_text()?;
                temporal::parse_timestamp(&text)
                    .or_else(|| temporal::parse_date(&text).map(|d| d.and_time(NaiveTime::MIN)))
                    .map(Some)
                    .ok_or(ConversionResult::UnsupportedConversion)
            }
            _ => Err(ConversionResult::UnsupportedConversion),
        }
    }

    pub fn get_interval_year_month(&self) -> GetResult<IntervalYearMonth> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Interval(code) if code.is_year_month() => {
                let packed: SqlIntervalStruct = self.read_struct()?;
                let ym = packed.intval.year_month();
                let total = ym.year as i64 * 12 + ym.month as i64;
                let total = if packed.is_non_negative() { total } else { -total };
                IntervalYearMonth::from_total_months(total)
                    .map(Some)
                    .ok_or(ConversionResult::Failure)
            }
            NativeType::Char | NativeType::WChar => IntervalYearMonth::parse(&self.read_text()?)
                .map(Some)
                .ok_or(ConversionResult::UnsupportedConversion),
            _ => Err(ConversionResult::UnsupportedConversion),
        }
    }

    pub fn get_interval_day_second(&self) -> GetResult<IntervalDaySecond> {
        if self.is_null_input() {
            return Ok(None);
        }
        match self.native_type() {
            NativeType::Interval(code) if !code.is_year_month() => {
                let packed: SqlIntervalStruct = self.read_struct()?;
                let ds = packed.intval.day_second();
                let total = ds.day as i128 * NANOS_PER_DAY
                    + ds.hour as i128 * NANOS_PER_HOUR
                    + ds.minute as i128 * NANOS_PER_MINUTE
                    + ds.second as i128 * NANOS_PER_SECOND
                    + ds.fraction as i128;
                let total = if packed.is_non_negative() { total } else { -total };
                IntervalDaySecond::from_total_nanos(total)
                    .map(Some)
                    .ok_or(ConversionResult::Failure)
            }
            NativeType::Char | NativeType::WChar => IntervalDaySecond::parse(&self.read_text()?)
                .map(Some)
                .ok_or(ConversionResult::UnsupportedConversion),
            _ => Err(ConversionResult::UnsupportedConversion),
        }
    }
}

fn date_of(year: i16, month: u16, day: u16) -> std::result::Result<NaiveDate, ConversionResult> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .ok_or(ConversionResult::UnsupportedConversion)
}

fn time_of(
    hour: u16,
    minute: u16,
    second: u16,
    nanos: u32,
) -> std::result::Result<NaiveTime, ConversionResult> {
    NaiveTime::from_hms_nano_opt(hour as u32, minute as u32, second as u32, nanos)
        .ok_or(ConversionResult::UnsupportedConversion)
}

#[cfg(test)]
mod tests {
    use crate::app::{ApplicationDataBuffer, CallerPtr, ConversionResult};
    use crate::types::interval::IntervalDaySecond;
    use crate::types::native::{
        FixedLayout, IntervalCode, NativeType, SqlIntervalStruct, SqlIntervalValue,
        SqlDaySecondStruct, SqlTimestampStruct,
    };
    use crate::types::sql::{SQL_FALSE, SQL_NTS, SQL_NULL_DATA};
    use rust_decimal::Decimal;

    fn view(native_type: NativeType, data: &mut [u8], len: &mut isize) -> ApplicationDataBuffer {
        unsafe {
            ApplicationDataBuffer::new(
                native_type,
                CallerPtr::new(data.as_mut_ptr()),
                data.len() as isize,
                CallerPtr::new(len as *mut isize),
            )
        }
    }

    #[test]
    fn test_get_string_nts() {
        let mut data = *b"hello\0garbage";
        let mut len = SQL_NTS;
        let buffer = view(NativeType::Char, &mut data, &mut len);
        assert_eq!(buffer.get_string(), Ok(Some("hello".to_string())));
    }

    #[test]
    fn test_get_string_explicit_length() {
        let mut data = *b"hello world";
        let mut len = 5isize;
        let buffer = view(NativeType::Char, &mut data, &mut len);
        assert_eq!(buffer.get_string(), Ok(Some("hello".to_string())));
    }

    #[test]
    fn test_get_null() {
        let mut data = [0u8; 4];
        let mut len = SQL_NULL_DATA;
        let buffer = view(NativeType::SignedLong, &mut data, &mut len);
        assert_eq!(buffer.get_i32(), Ok(None));
        assert_eq!(buffer.get_string(), Ok(None));
    }

    #[test]
    fn test_get_integer_from_native() {
        let mut data = (-1234i32).to_ne_bytes();
        let mut len = 4isize;
        let buffer = view(NativeType::SignedLong, &mut data, &mut len);
        assert_eq!(buffer.get_i64(), Ok(Some(-1234)));
        assert_eq!(buffer.get_string(), Ok(Some("-1234".to_string())));
        assert_eq!(buffer.get_decimal(), Ok(Some(Decimal::new(-1234, 0))));
    }

    #[test]
    fn test_get_number_from_malformed_text() {
        let mut data = *b"12,5\0";
        let mut len = SQL_NTS;
        let buffer = view(NativeType::Char, &mut data, &mut len);
        assert_eq!(buffer.get_f64(), Err(ConversionResult::UnsupportedConversion));
    }

    #[test]
    fn test_get_timestamp_struct() {
        let ts = SqlTimestampStruct {
            year: 2020,
            month: 2,
            day: 29,
            hour: 23,
            minute: 59,
            second: 58,
            fraction: 5000,
        };
        let mut data = [0u8; SqlTimestampStruct::SIZE];
        ts.write_to(&mut data);
        let mut len = data.len() as isize;
        let buffer = view(NativeType::Timestamp, &mut data, &mut len);
        let value = buffer.get_timestamp().unwrap().unwrap();
        assert_eq!(
            crate::types::temporal::format_timestamp(&value),
            "2020-02-29 23:59:58.000005000"
        );
        assert_eq!(buffer.get_date().unwrap().unwrap().to_string(), "2020-02-29");
    }

    #[test]
    fn test_get_negative_interval() {
        let packed = SqlIntervalStruct {
            interval_type: IntervalCode::DayToSecond.code() as i32,
            interval_sign: SQL_FALSE,
            intval: SqlIntervalValue::from_day_second(SqlDaySecondStruct {
                day: 1,
                hour: 2,
                minute: 0,
                second: 0,
                fraction: 0,
            }),
        };
        let mut data = [0u8; SqlIntervalStruct::SIZE];
        packed.write_to(&mut data);
        let mut len = data.len() as isize;
        let buffer = view(NativeType::Interval(IntervalCode::DayToSecond), &mut data, &mut len);
        assert_eq!(
            buffer.get_interval_day_second(),
            Ok(Some(IntervalDaySecond::new(-1, -2, 0, 0, 0)))
        );
    }

    #[test]
    fn test_get_wide_string() {
        let units: Vec<u16> = "día\0".encode_utf16().collect();
        let mut data: Vec<u8> = units.iter().flat_map(|u| u.to_ne_bytes()).collect();
        let mut len = SQL_NTS;
        let buffer = view(NativeType::WChar, &mut data, &mut len);
        assert_eq!(buffer.get_string(), Ok(Some("día".to_string())));
    }
}
