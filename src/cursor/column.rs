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

//! Conversion of one result cell into an application buffer.
//!
//! Scalars arrive as text and are parsed according to the column's scalar
//! type before being written. Nested values (arrays, rows, time series) are
//! rendered to text element by element through a [`ScratchBuffer`] and the
//! joined rendering is written as a string.

use crate::app::{parse_decimal, ApplicationDataBuffer, ConversionResult, ScratchBuffer};
use crate::types::interval::{IntervalDaySecond, IntervalYearMonth};
use crate::types::temporal;
use crate::types::value::{ColumnInfo, ColumnType, ScalarType, TimeSeriesPoint, Value};

/// Rendering of a nested null, an empty array and an empty time series.
pub const NULL_DISPLAY: &str = "-";

/// A result column: its 1-based index and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    index: u16,
    info: ColumnInfo,
}

impl Column {
    pub fn new(index: u16, info: ColumnInfo) -> Self {
        Self { index, info }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn info(&self) -> &ColumnInfo {
        &self.info
    }

    /// Convert `value` into `buffer`.
    ///
    /// A top-level null is SQL NULL and goes through the length slot.
    /// `nested_max_len` bounds the rendering of each nested element.
    pub fn read_to_buffer(
        &self,
        value: &Value,
        buffer: &mut ApplicationDataBuffer,
        nested_max_len: usize,
    ) -> ConversionResult {
        if value.is_null() {
            return buffer.put_null();
        }
        write_value(&self.info.column_type, value, buffer, nested_max_len)
    }
}

fn write_value(
    column_type: &ColumnType,
    value: &Value,
    buffer: &mut ApplicationDataBuffer,
    nested_max_len: usize,
) -> ConversionResult {
    match (column_type, value) {
        (ColumnType::Unset, _) | (ColumnType::Scalar(ScalarType::Unknown), _) => {
            ConversionResult::Failure
        }
        (_, Value::Null) => buffer.put_str(NULL_DISPLAY),
        (ColumnType::Scalar(scalar), Value::Scalar(text)) => put_scalar(*scalar, text, buffer),
        (ColumnType::Array(element), Value::Array(items)) => {
            if items.is_empty() {
                return buffer.put_str(NULL_DISPLAY);
            }
            let types = std::iter::repeat(element.as_ref());
            match render_elements(types, items, nested_max_len) {
                Ok((parts, result)) => {
                    result.worst(buffer.put_str(&format!("[{}]", parts.join(","))))
                }
                Err(result) => result,
            }
        }
        (ColumnType::Row(fields), Value::Row(items)) => {
            if items.is_empty() {
                return ConversionResult::NoData;
            }
            let types = fields
                .iter()
                .map(|f| &f.column_type)
                .chain(std::iter::repeat(&ColumnType::Unset));
            match render_elements(types, items, nested_max_len) {
                Ok((parts, result)) => {
                    result.worst(buffer.put_str(&format!("({})", parts.join(","))))
                }
                Err(result) => result,
            }
        }
        (ColumnType::TimeSeries(element), Value::TimeSeries(points)) => {
            if points.is_empty() {
                return buffer.put_str(NULL_DISPLAY);
            }
            match render_time_series(element, points, nested_max_len) {
                Ok((text, result)) => result.worst(buffer.put_str(&text)),
                Err(result) => result,
            }
        }
        _ => ConversionResult::Failure,
    }
}

fn put_scalar(scalar: ScalarType, text: &str, buffer: &mut ApplicationDataBuffer) -> ConversionResult {
    let trimmed = text.trim();
    let unsupported = ConversionResult::UnsupportedConversion;
    match scalar {
        ScalarType::Varchar => buffer.put_str(text),
        ScalarType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => buffer.put_bool(true),
            "false" | "0" => buffer.put_bool(false),
            _ => unsupported,
        },
        ScalarType::Integer => trimmed.parse::<i32>().map_or(unsupported, |v| buffer.put_i32(v)),
        ScalarType::Bigint => trimmed.parse::<i64>().map_or(unsupported, |v| buffer.put_i64(v)),
        ScalarType::Double => trimmed.parse::<f64>().map_or(unsupported, |v| buffer.put_f64(v)),
        ScalarType::Decimal => parse_decimal(trimmed).map_or(unsupported, |v| buffer.put_decimal(v)),
        ScalarType::Date => temporal::parse_date(trimmed).map_or(unsupported, |v| buffer.put_date(v)),
        ScalarType::Time => temporal::parse_time(trimmed).map_or(unsupported, |v| buffer.put_time(v)),
        ScalarType::Timestamp => {
            temporal::parse_timestamp(trimmed).map_or(unsupported, |v| buffer.put_timestamp(v))
        }
        ScalarType::IntervalDayToSecond => IntervalDaySecond::parse(trimmed)
            .map_or(unsupported, |v| buffer.put_interval_day_second(v)),
        ScalarType::IntervalYearToMonth => IntervalYearMonth::parse(trimmed)
            .map_or(unsupported, |v| buffer.put_interval_year_month(v)),
        ScalarType::Unknown => ConversionResult::Failure,
    }
}

/// Render one nested element to text. A nested row without data renders as
/// the null-display token.
fn render_element(
    column_type: &ColumnType,
    value: &Value,
    nested_max_len: usize,
) -> std::result::Result<(String, ConversionResult), ConversionResult> {
    let mut scratch = ScratchBuffer::new(nested_max_len);
    let (text, result) =
        scratch.render(|view| write_value(column_type, value, view, nested_max_len));
    match result {
        ConversionResult::NoData => Ok((NULL_DISPLAY.to_string(), ConversionResult::Success)),
        r if r.is_success() => Ok((text, r)),
        r => Err(r),
    }
}

fn render_elements<'a>(
    types: impl Iterator<Item = &'a ColumnType>,
    items: &[Value],
    nested_max_len: usize,
) -> std::result::Result<(Vec<String>, ConversionResult), ConversionResult> {
    let mut worst = ConversionResult::Success;
    let mut parts = Vec::with_capacity(items.len());
    for (column_type, item) in types.zip(items) {
        let (text, result) = render_element(column_type, item, nested_max_len)?;
        worst = worst.worst(result);
        parts.push(text);
    }
    Ok((parts, worst))
}

fn render_time_series(
    element: &ColumnType,
    points: &[TimeSeriesPoint],
    nested_max_len: usize,
) -> std::result::Result<(String, ConversionResult), ConversionResult> {
    let mut worst = ConversionResult::Success;
    let mut parts = Vec::with_capacity(points.len());
    for point in points {
        let (value, result) = render_element(element, &point.value, nested_max_len)?;
        worst = worst.worst(result);
        parts.push(format!("{{time: {}, value: {}}}", point.time, value));
    }
    Ok((format!("[{}]", parts.join(", ")), worst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CallerPtr;
    use crate::types::native::NativeType;
    use crate::types::sql::SQL_NULL_DATA;

    const MAX: usize = 1024;

    fn read(column_type: ColumnType, value: &Value, capacity: usize) -> (String, isize, ConversionResult) {
        let column = Column::new(1, ColumnInfo::new("c", column_type));
        let mut data = vec![0u8; capacity];
        let mut len = 0isize;
        let mut buffer = unsafe {
            ApplicationDataBuffer::new(
                NativeType::Char,
                CallerPtr::new(data.as_mut_ptr()),
                capacity as isize,
                CallerPtr::new(&mut len as *mut isize),
            )
        };
        let result = column.read_to_buffer(value, &mut buffer, MAX);
        let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
        (String::from_utf8_lossy(&data[..end]).into_owned(), len, result)
    }

    fn scalar(t: ScalarType) -> ColumnType {
        ColumnType::Scalar(t)
    }

    fn array(t: ScalarType) -> ColumnType {
        ColumnType::Array(Box::new(scalar(t)))
    }

    #[test]
    fn test_top_level_null() {
        let (_, len, result) = read(scalar(ScalarType::Integer), &Value::Null, 16);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(len, SQL_NULL_DATA);
    }

    #[test]
    fn test_scalar_rendering() {
        let (text, _, result) = read(scalar(ScalarType::Double), &Value::scalar(" 2.5 "), 16);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(text, "2.5");
        let (text, _, _) = read(scalar(ScalarType::Boolean), &Value::scalar("true"), 16);
        assert_eq!(text, "1");
        let (text, len, result) = read(
            scalar(ScalarType::Timestamp),
            &Value::scalar("2018-11-01 17:45:59.123456789"),
            64,
        );
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(text, "2018-11-01 17:45:59.123456789");
        assert_eq!(len, 29);
    }

    #[test]
    fn test_malformed_scalar_is_unsupported() {
        let (_, _, result) = read(scalar(ScalarType::Integer), &Value::scalar("12x"), 16);
        assert_eq!(result, ConversionResult::UnsupportedConversion);
        let (_, _, result) = read(scalar(ScalarType::Date), &Value::scalar("2018-13-01"), 16);
        assert_eq!(result, ConversionResult::UnsupportedConversion);
    }

    #[test]
    fn test_unset_and_unknown_fail() {
        let (_, _, result) = read(ColumnType::Unset, &Value::scalar("1"), 16);
        assert_eq!(result, ConversionResult::Failure);
        let (_, _, result) = read(scalar(ScalarType::Unknown), &Value::scalar("1"), 16);
        assert_eq!(result, ConversionResult::Failure);
    }

    #[test]
    fn test_array_rendering() {
        let empty = Value::Array(vec![]);
        let (text, _, result) = read(array(ScalarType::Varchar), &empty, 16);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(text, "-");

        let pair = Value::Array(vec![Value::scalar("A"), Value::scalar("B")]);
        let (text, len, _) = read(array(ScalarType::Varchar), &pair, 16);
        assert_eq!(text, "[A,B]");
        assert_eq!(len, 5);

        let with_null = Value::Array(vec![Value::scalar("1"), Value::Null]);
        let (text, _, _) = read(array(ScalarType::Integer), &with_null, 16);
        assert_eq!(text, "[1,-]");
    }

    #[test]
    fn test_array_truncation() {
        let value = Value::Array(vec![Value::scalar("abc"), Value::scalar("def")]);
        let (text, len, result) = read(array(ScalarType::Varchar), &value, 5);
        assert_eq!(result, ConversionResult::VarlenDataTruncated);
        assert_eq!(text, "[abc");
        assert_eq!(len, 9);
    }

    #[test]
    fn test_row_rendering() {
        let row_type = ColumnType::Row(vec![
            ColumnInfo::scalar("a", ScalarType::Integer),
            ColumnInfo::scalar("b", ScalarType::Varchar),
        ]);
        let value = Value::Row(vec![Value::scalar("7"), Value::scalar("x")]);
        let (text, _, result) = read(row_type.clone(), &value, 32);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(text, "(7,x)");

        let (text, _, result) = read(row_type, &Value::Row(vec![]), 32);
        assert_eq!(result, ConversionResult::NoData);
        assert_eq!(text, "");
    }

    #[test]
    fn test_nested_array_of_rows() {
        let row_type = ColumnType::Row(vec![ColumnInfo::scalar("a", ScalarType::Integer)]);
        let column_type = ColumnType::Array(Box::new(row_type));
        let value = Value::Array(vec![
            Value::Row(vec![Value::scalar("1")]),
            Value::Row(vec![]),
        ]);
        let (text, _, result) = read(column_type, &value, 32);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(text, "[(1),-]");
    }

    #[test]
    fn test_nested_failure_propagates() {
        let value = Value::Array(vec![Value::scalar("1"), Value::scalar("oops")]);
        let (_, _, result) = read(array(ScalarType::Integer), &value, 32);
        assert_eq!(result, ConversionResult::UnsupportedConversion);
    }

    #[test]
    fn test_time_series_rendering() {
        let column_type = ColumnType::TimeSeries(Box::new(scalar(ScalarType::Double)));
        let value = Value::TimeSeries(vec![
            TimeSeriesPoint {
                time: "2019-01-01 00:00:00.000000000".to_string(),
                value: Value::scalar("1.5"),
            },
            TimeSeriesPoint {
                time: "2019-01-01 00:00:01.000000000".to_string(),
                value: Value::Null,
            },
        ]);
        let (text, _, result) = read(column_type.clone(), &value, 128);
        assert_eq!(result, ConversionResult::Success);
        assert_eq!(
            text,
            "[{time: 2019-01-01 00:00:00.000000000, value: 1.5}, \
             {time: 2019-01-01 00:00:01.000000000, value: -}]"
        );

        let (text, _, _) = read(column_type, &Value::TimeSeries(vec![]), 16);
        assert_eq!(text, "-");
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let (_, _, result) = read(array(ScalarType::Varchar), &Value::scalar("a"), 16);
        assert_eq!(result, ConversionResult::Failure);
    }
}
