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

//! Parameter marker substitution.
//!
//! The query service takes plain SQL text, so every `?` marker outside a
//! quoted literal or identifier is replaced by a literal read back from the
//! application's bound parameter buffer. The APD supplies the buffer, the IPD
//! the SQL type that decides how the literal is written.

use crate::app::{ApplicationDataBuffer, ConversionResult, GetResult};
use crate::descriptor::{Descriptor, DescriptorRecord};
use crate::error::{DriverErrorHelper, Result, SqlState};
use crate::types::native::NativeType;
use crate::types::sql::*;
use crate::types::temporal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Text,
    Number,
    Bool,
    Date,
    Time,
    Timestamp,
}

impl LiteralKind {
    fn from_sql_type(sql_type: i16) -> Option<Self> {
        let kind = match sql_type {
            SQL_CHAR | SQL_VARCHAR | SQL_LONGVARCHAR | SQL_WCHAR | SQL_WVARCHAR
            | SQL_WLONGVARCHAR => LiteralKind::Text,
            SQL_BIT => LiteralKind::Bool,
            SQL_TINYINT | SQL_SMALLINT | SQL_INTEGER | SQL_BIGINT | SQL_REAL | SQL_FLOAT
            | SQL_DOUBLE | SQL_DECIMAL | SQL_NUMERIC => LiteralKind::Number,
            SQL_TYPE_DATE => LiteralKind::Date,
            SQL_TYPE_TIME => LiteralKind::Time,
            SQL_TYPE_TIMESTAMP => LiteralKind::Timestamp,
            t if is_interval_type(t) => LiteralKind::Text,
            _ => return None,
        };
        Some(kind)
    }

    fn from_native_type(native: NativeType) -> Self {
        match native {
            NativeType::Bit => LiteralKind::Bool,
            NativeType::Date => LiteralKind::Date,
            NativeType::Time => LiteralKind::Time,
            NativeType::Timestamp => LiteralKind::Timestamp,
            NativeType::Char | NativeType::WChar | NativeType::Default | NativeType::Binary => {
                LiteralKind::Text
            }
            NativeType::Interval(_) => LiteralKind::Text,
            _ => LiteralKind::Number,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Byte positions of the `?` markers outside quoted text and comments.
pub fn marker_positions(sql: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut state = Scan::Code;
    let mut chars = sql.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        let next = chars.peek().map(|(_, c)| *c);
        state = match (state, ch) {
            (Scan::Quoted(q), c) if c == q => Scan::Code,
            (Scan::LineComment, '\n') => Scan::Code,
            (Scan::BlockComment, '*') if next == Some('/') => {
                chars.next();
                Scan::Code
            }
            (Scan::Code, '\'' | '"') => Scan::Quoted(ch),
            (Scan::Code, '-') if next == Some('-') => {
                chars.next();
                Scan::LineComment
            }
            (Scan::Code, '/') if next == Some('*') => {
                chars.next();
                Scan::BlockComment
            }
            (Scan::Code, '?') => {
                positions.push(i);
                Scan::Code
            }
            (state, _) => state,
        };
    }
    positions
}

/// Replace every marker in `sql` with the literal of its bound parameter.
pub fn substitute_parameters(sql: &str, apd: &Descriptor, ipd: &Descriptor) -> Result<String> {
    let positions = marker_positions(sql);
    if positions.is_empty() {
        return Ok(sql.to_string());
    }
    let bind_offset = apd.header().bind_offset();
    let mut out = String::with_capacity(sql.len() + positions.len() * 8);
    let mut last = 0;
    for (i, pos) in positions.iter().enumerate() {
        let number = (i + 1) as u16;
        let literal = render_parameter(number, apd.record(number), ipd.record(number), bind_offset)?;
        out.push_str(&sql[last..*pos]);
        out.push_str(&literal);
        last = pos + 1;
    }
    out.push_str(&sql[last..]);
    tracing::trace!("Substituted {} parameters", positions.len());
    Ok(out)
}

fn render_parameter(
    number: u16,
    apd: Option<&DescriptorRecord>,
    ipd: Option<&DescriptorRecord>,
    bind_offset: isize,
) -> Result<String> {
    let unbound = || {
        DriverErrorHelper::invalid_state()
            .state(SqlState::S07002CountFieldIncorrect)
            .message(format!("Parameter {} is not bound", number))
    };
    let apd = apd.ok_or_else(unbound)?;
    if ipd.is_some_and(|r| r.parameter_type() != SQL_PARAM_INPUT) {
        return Err(DriverErrorHelper::not_implemented()
            .message(format!("Parameter {} is not an input parameter", number)));
    }
    let mut buffer = apd.to_data_buffer().ok_or_else(|| {
        DriverErrorHelper::conversion()
            .state(SqlState::SHY003InvalidBufferType)
            .message(format!("Parameter {} has an invalid C type", number))
    })?;
    buffer.set_byte_offset(bind_offset);
    if buffer.is_null_input() {
        return Ok("NULL".to_string());
    }
    if buffer.is_data_at_exec() {
        return Err(DriverErrorHelper::not_implemented()
            .message(format!("Parameter {} uses data-at-execution", number)));
    }
    if buffer.buffer().is_null() {
        return Err(unbound());
    }

    let kind = ipd
        .and_then(|r| LiteralKind::from_sql_type(r.concise_type()))
        .unwrap_or_else(|| LiteralKind::from_native_type(buffer.native_type()));
    let converted = match kind {
        LiteralKind::Text => read(&buffer, ApplicationDataBuffer::get_string, quote),
        LiteralKind::Number => read_number(&buffer),
        LiteralKind::Bool => read(&buffer, ApplicationDataBuffer::get_i64, |v| {
            let text = if v != 0 { "TRUE" } else { "FALSE" };
            text.to_string()
        }),
        LiteralKind::Date => read(&buffer, ApplicationDataBuffer::get_date, |d| {
            format!("DATE '{}'", temporal::format_date(&d))
        }),
        LiteralKind::Time => read(&buffer, ApplicationDataBuffer::get_time, |t| {
            format!("TIME '{}'", temporal::format_time(&t))
        }),
        LiteralKind::Timestamp => read(&buffer, ApplicationDataBuffer::get_timestamp, |ts| {
            format!("TIMESTAMP '{}'", temporal::format_timestamp(&ts))
        }),
    };
    converted.map_err(|result| {
        DriverErrorHelper::conversion()
            .state(result.sql_state().unwrap_or(SqlState::S07006RestrictedDataType))
            .message(format!(
                "Cannot convert parameter {} from {:?}: {:?}",
                number,
                buffer.native_type(),
                result
            ))
    })
}

fn read<T>(
    buffer: &ApplicationDataBuffer,
    get: impl Fn(&ApplicationDataBuffer) -> GetResult<T>,
    render: impl Fn(T) -> String,
) -> std::result::Result<String, ConversionResult> {
    Ok(get(buffer)?.map_or_else(|| "NULL".to_string(), render))
}

fn read_number(buffer: &ApplicationDataBuffer) -> std::result::Result<String, ConversionResult> {
    match buffer.get_decimal() {
        Ok(value) => Ok(value.map_or_else(|| "NULL".to_string(), |d| d.normalize().to_string())),
        Err(_) => read(buffer, ApplicationDataBuffer::get_f64, |v| {
            if v.is_finite() {
                v.to_string()
            } else {
                "NULL".to_string()
            }
        }),
    }
}

fn quote(text: String) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
