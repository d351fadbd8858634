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

//! Native (C-level) buffer shapes an application can bind.
//!
//! [`NativeType`] is the closed set of buffer types the driver understands.
//! The `Sql*Struct` types mirror the fixed-layout structs of `sqltypes.h`;
//! they are written to and read from caller memory byte by byte through
//! [`FixedLayout`], so no unaligned pointer casts are needed.

use crate::types::sql::*;

/// Caller-declared shape of a bound buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Driver picks the natural shape of each value written.
    Default,
    Char,
    WChar,
    Binary,
    Bit,
    SignedTinyInt,
    UnsignedTinyInt,
    SignedShort,
    UnsignedShort,
    SignedLong,
    UnsignedLong,
    SignedBigInt,
    UnsignedBigInt,
    Float,
    Double,
    Numeric,
    Date,
    Time,
    Timestamp,
    Interval(IntervalCode),
}

impl NativeType {
    /// Map a `SQL_C_*` code to a native type. Unknown codes yield `None`.
    pub fn from_c_type(c_type: i16) -> Option<Self> {
        let native = match c_type {
            SQL_C_DEFAULT => NativeType::Default,
            SQL_C_CHAR => NativeType::Char,
            SQL_C_WCHAR => NativeType::WChar,
            SQL_C_BINARY => NativeType::Binary,
            SQL_C_BIT => NativeType::Bit,
            SQL_C_TINYINT | SQL_C_STINYINT => NativeType::SignedTinyInt,
            SQL_C_UTINYINT => NativeType::UnsignedTinyInt,
            SQL_C_SHORT | SQL_C_SSHORT => NativeType::SignedShort,
            SQL_C_USHORT => NativeType::UnsignedShort,
            SQL_C_LONG | SQL_C_SLONG => NativeType::SignedLong,
            SQL_C_ULONG => NativeType::UnsignedLong,
            SQL_C_SBIGINT => NativeType::SignedBigInt,
            SQL_C_UBIGINT => NativeType::UnsignedBigInt,
            SQL_C_FLOAT => NativeType::Float,
            SQL_C_DOUBLE => NativeType::Double,
            SQL_C_NUMERIC => NativeType::Numeric,
            SQL_C_DATE | SQL_C_TYPE_DATE => NativeType::Date,
            SQL_C_TIME | SQL_C_TYPE_TIME => NativeType::Time,
            SQL_C_TIMESTAMP | SQL_C_TYPE_TIMESTAMP => NativeType::Timestamp,
            code => NativeType::Interval(IntervalCode::from_concise_type(code)?),
        };
        Some(native)
    }

    /// Canonical `SQL_C_*` code of this native type.
    pub fn c_type(&self) -> i16 {
        match self {
            NativeType::Default => SQL_C_DEFAULT,
            NativeType::Char => SQL_C_CHAR,
            NativeType::WChar => SQL_C_WCHAR,
            NativeType::Binary => SQL_C_BINARY,
            NativeType::Bit => SQL_C_BIT,
            NativeType::SignedTinyInt => SQL_C_STINYINT,
            NativeType::UnsignedTinyInt => SQL_C_UTINYINT,
            NativeType::SignedShort => SQL_C_SSHORT,
            NativeType::UnsignedShort => SQL_C_USHORT,
            NativeType::SignedLong => SQL_C_SLONG,
            NativeType::UnsignedLong => SQL_C_ULONG,
            NativeType::SignedBigInt => SQL_C_SBIGINT,
            NativeType::UnsignedBigInt => SQL_C_UBIGINT,
            NativeType::Float => SQL_C_FLOAT,
            NativeType::Double => SQL_C_DOUBLE,
            NativeType::Numeric => SQL_C_NUMERIC,
            NativeType::Date => SQL_C_TYPE_DATE,
            NativeType::Time => SQL_C_TYPE_TIME,
            NativeType::Timestamp => SQL_C_TYPE_TIMESTAMP,
            NativeType::Interval(code) => code.concise_type(),
        }
    }

    /// Size in bytes of one element for fixed-width types; `None` for
    /// character, binary and default buffers whose element size is the
    /// bound buffer length.
    pub fn fixed_size(&self) -> Option<usize> {
        let size = match self {
            NativeType::Default | NativeType::Char | NativeType::WChar | NativeType::Binary => {
                return None
            }
            NativeType::Bit | NativeType::SignedTinyInt | NativeType::UnsignedTinyInt => 1,
            NativeType::SignedShort | NativeType::UnsignedShort => 2,
            NativeType::SignedLong | NativeType::UnsignedLong | NativeType::Float => 4,
            NativeType::SignedBigInt | NativeType::UnsignedBigInt | NativeType::Double => 8,
            NativeType::Numeric => SqlNumericStruct::SIZE,
            NativeType::Date => SqlDateStruct::SIZE,
            NativeType::Time => SqlTimeStruct::SIZE,
            NativeType::Timestamp => SqlTimestampStruct::SIZE,
            NativeType::Interval(_) => SqlIntervalStruct::SIZE,
        };
        Some(size)
    }

    pub fn is_character(&self) -> bool {
        matches!(self, NativeType::Char | NativeType::WChar)
    }
}

/// Interval field granularity, numbered like `SQL_CODE_YEAR` .. `SQL_CODE_MINUTE_TO_SECOND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalCode {
    Year = 1,
    Month = 2,
    Day = 3,
    Hour = 4,
    Minute = 5,
    Second = 6,
    YearToMonth = 7,
    DayToHour = 8,
    DayToMinute = 9,
    DayToSecond = 10,
    HourToMinute = 11,
    HourToSecond = 12,
    MinuteToSecond = 13,
}

/// A single interval field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntervalUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl IntervalCode {
    pub fn from_code(code: i16) -> Option<Self> {
        let interval = match code {
            1 => IntervalCode::Year,
            2 => IntervalCode::Month,
            3 => IntervalCode::Day,
            4 => IntervalCode::Hour,
            5 => IntervalCode::Minute,
            6 => IntervalCode::Second,
            7 => IntervalCode::YearToMonth,
            8 => IntervalCode::DayToHour,
            9 => IntervalCode::DayToMinute,
            10 => IntervalCode::DayToSecond,
            11 => IntervalCode::HourToMinute,
            12 => IntervalCode::HourToSecond,
            13 => IntervalCode::MinuteToSecond,
            _ => return None,
        };
        Some(interval)
    }

    /// Parse an `SQL_INTERVAL_*` / `SQL_C_INTERVAL_*` concise type code.
    pub fn from_concise_type(concise_type: i16) -> Option<Self> {
        if is_interval_type(concise_type) {
            Self::from_code(concise_type - 100)
        } else {
            None
        }
    }

    pub fn code(&self) -> i16 {
        *self as i16
    }

    pub fn concise_type(&self) -> i16 {
        self.code() + 100
    }

    /// Leading and trailing field of the interval.
    pub fn bounds(&self) -> (IntervalUnit, IntervalUnit) {
        use IntervalUnit::*;
        match self {
            IntervalCode::Year => (Year, Year),
            IntervalCode::Month => (Month, Month),
            IntervalCode::Day => (Day, Day),
            IntervalCode::Hour => (Hour, Hour),
            IntervalCode::Minute => (Minute, Minute),
            IntervalCode::Second => (Second, Second),
            IntervalCode::YearToMonth => (Year, Month),
            IntervalCode::DayToHour => (Day, Hour),
            IntervalCode::DayToMinute => (Day, Minute),
            IntervalCode::DayToSecond => (Day, Second),
            IntervalCode::HourToMinute => (Hour, Minute),
            IntervalCode::HourToSecond => (Hour, Second),
            IntervalCode::MinuteToSecond => (Minute, Second),
        }
    }

    pub fn is_year_month(&self) -> bool {
        matches!(
            self,
            IntervalCode::Year | IntervalCode::Month | IntervalCode::YearToMonth
        )
    }

    pub fn has_seconds(&self) -> bool {
        self.bounds().1 == IntervalUnit::Second
    }
}

/// Byte-level layout shared with C callers.
pub trait FixedLayout: Sized {
    /// `sizeof` of the C struct.
    const SIZE: usize;

    /// Serialize in native byte order into `out[..SIZE]`.
    fn write_to(&self, out: &mut [u8]);

    /// Deserialize from `bytes[..SIZE]`.
    fn read_from(bytes: &[u8]) -> Self;
}

fn put_u16(out: &mut [u8], at: usize, v: u16) {
    out[at..at + 2].copy_from_slice(&v.to_ne_bytes());
}

fn put_i16(out: &mut [u8], at: usize, v: i16) {
    out[at..at + 2].copy_from_slice(&v.to_ne_bytes());
}

fn put_u32(out: &mut [u8], at: usize, v: u32) {
    out[at..at + 4].copy_from_slice(&v.to_ne_bytes());
}

fn get_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

fn get_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

fn get_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// `SQL_DATE_STRUCT`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlDateStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

impl FixedLayout for SqlDateStruct {
    const SIZE: usize = 6;

    fn write_to(&self, out: &mut [u8]) {
        put_i16(out, 0, self.year);
        put_u16(out, 2, self.month);
        put_u16(out, 4, self.day);
    }

    fn read_from(bytes: &[u8]) -> Self {
        Self {
            year: get_i16(bytes, 0),
            month: get_u16(bytes, 2),
            day: get_u16(bytes, 4),
        }
    }
}

/// `SQL_TIME_STRUCT`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlTimeStruct {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl FixedLayout for SqlTimeStruct {
    const SIZE: usize = 6;

    fn write_to(&self, out: &mut [u8]) {
        put_u16(out, 0, self.hour);
        put_u16(out, 2, self.minute);
        put_u16(out, 4, self.second);
    }

    fn read_from(bytes: &[u8]) -> Self {
        Self {
            hour: get_u16(bytes, 0),
            minute: get_u16(bytes, 2),
            second: get_u16(bytes, 4),
        }
    }
}

/// `SQL_TIMESTAMP_STRUCT`; `fraction` is in nanoseconds.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlTimestampStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub fraction: u32,
}

impl FixedLayout for SqlTimestampStruct {
    const SIZE: usize = 16;

    fn write_to(&self, out: &mut [u8]) {
        put_i16(out, 0, self.year);
        put_u16(out, 2, self.month);
        put_u16(out, 4, self.day);
        put_u16(out, 6, self.hour);
        put_u16(out, 8, self.minute);
        put_u16(out, 10, self.second);
        put_u32(out, 12, self.fraction);
    }

    fn read_from(bytes: &[u8]) -> Self {
        Self {
            year: get_i16(bytes, 0),
            month: get_u16(bytes, 2),
            day: get_u16(bytes, 4),
            hour: get_u16(bytes, 6),
            minute: get_u16(bytes, 8),
            second: get_u16(bytes, 10),
            fraction: get_u32(bytes, 12),
        }
    }
}

/// `SQL_NUMERIC_STRUCT`: little-endian magnitude with a separate sign
/// (1 = positive, 0 = negative).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlNumericStruct {
    pub precision: u8,
    pub scale: i8,
    pub sign: u8,
    pub val: [u8; SQL_MAX_NUMERIC_LEN],
}

impl FixedLayout for SqlNumericStruct {
    const SIZE: usize = 3 + SQL_MAX_NUMERIC_LEN;

    fn write_to(&self, out: &mut [u8]) {
        out[0] = self.precision;
        out[1] = self.scale as u8;
        out[2] = self.sign;
        out[3..Self::SIZE].copy_from_slice(&self.val);
    }

    fn read_from(bytes: &[u8]) -> Self {
        let mut val = [0u8; SQL_MAX_NUMERIC_LEN];
        val.copy_from_slice(&bytes[3..Self::SIZE]);
        Self {
            precision: bytes[0],
            scale: bytes[1] as i8,
            sign: bytes[2],
            val,
        }
    }
}

/// `SQL_YEAR_MONTH_STRUCT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlYearMonthStruct {
    pub year: u32,
    pub month: u32,
}

/// `SQL_DAY_SECOND_STRUCT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlDaySecondStruct {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub fraction: u32,
}

/// Storage of the `intval` union: year/month use the first two words,
/// day/second use all five.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlIntervalValue {
    words: [u32; 5],
}

impl SqlIntervalValue {
    pub fn from_year_month(ym: SqlYearMonthStruct) -> Self {
        Self {
            words: [ym.year, ym.month, 0, 0, 0],
        }
    }

    pub fn from_day_second(ds: SqlDaySecondStruct) -> Self {
        Self {
            words: [ds.day, ds.hour, ds.minute, ds.second, ds.fraction],
        }
    }

    pub fn year_month(&self) -> SqlYearMonthStruct {
        SqlYearMonthStruct {
            year: self.words[0],
            month: self.words[1],
        }
    }

    pub fn day_second(&self) -> SqlDaySecondStruct {
        SqlDaySecondStruct {
            day: self.words[0],
            hour: self.words[1],
            minute: self.words[2],
            second: self.words[3],
            fraction: self.words[4],
        }
    }
}

/// `SQL_INTERVAL_STRUCT`.
///
/// `interval_sign` is `SQL_TRUE` for a non-negative interval and `SQL_FALSE`
/// for a negative one; the magnitude fields are always unsigned.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlIntervalStruct {
    pub interval_type: i32,
    pub interval_sign: i16,
    pub intval: SqlIntervalValue,
}

impl SqlIntervalStruct {
    pub fn is_non_negative(&self) -> bool {
        self.interval_sign == SQL_TRUE
    }

    pub fn interval_code(&self) -> Option<IntervalCode> {
        i16::try_from(self.interval_type)
            .ok()
            .and_then(IntervalCode::from_code)
    }
}

impl FixedLayout for SqlIntervalStruct {
    const SIZE: usize = 28;

    fn write_to(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.interval_type.to_ne_bytes());
        put_i16(out, 4, self.interval_sign);
        put_u16(out, 6, 0);
        for (i, word) in self.intval.words.iter().enumerate() {
            put_u32(out, 8 + i * 4, *word);
        }
    }

    fn read_from(bytes: &[u8]) -> Self {
        let mut words = [0u32; 5];
        for (i, word) in words.iter_mut().enumerate() {
            *word = get_u32(bytes, 8 + i * 4);
        }
        Self {
            interval_type: i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            interval_sign: get_i16(bytes, 4),
            intval: SqlIntervalValue { words },
        }
    }
}
