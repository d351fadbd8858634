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

//! Fixed-format parsing and rendering of dates, times and timestamps.
//!
//! Accepted input grammars (surrounding whitespace is ignored):
//!
//! | Type | Grammar |
//! |------|---------|
//! | date | `YYYY-MM-DD` |
//! | time | `HH:MM:SS` optionally followed by `.` and 1-9 fraction digits |
//! | timestamp | date, a space or `T`, then time |
//!
//! Anything else (missing fields, a dangling `.`, out-of-range components)
//! is rejected with `None`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Parse exactly `width` ASCII digits.
fn parse_digits(text: &str, width: usize) -> Option<u32> {
    if text.len() != width || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse a fraction of 1-9 digits into nanoseconds.
fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: u32 = text.parse().ok()?;
    Some(digits * 10u32.pow(9 - text.len() as u32))
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let mut parts = text.splitn(3, '-');
    let year = parse_digits(parts.next()?, 4)?;
    let month = parse_digits(parts.next()?, 2)?;
    let day = parse_digits(parts.next()?, 2)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    let (clock, nanos) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, parse_fraction(fraction)?),
        None => (text, 0),
    };
    let mut parts = clock.splitn(3, ':');
    let hour = parse_digits(parts.next()?, 2)?;
    let minute = parse_digits(parts.next()?, 2)?;
    let second = parse_digits(parts.next()?, 2)?;
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let split = text.find([' ', 'T'])?;
    let date = parse_date(&text[..split])?;
    let time = parse_time(&text[split + 1..])?;
    Some(NaiveDateTime::new(date, time))
}

/// `YYYY-MM-DD`
pub fn format_date(date: &NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// `HH:MM:SS.nnnnnnnnn`
pub fn format_time(time: &NaiveTime) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:09}",
        time.hour(),
        time.minute(),
        time.second(),
        nanos_of(time)
    )
}

/// `YYYY-MM-DD HH:MM:SS.nnnnnnnnn`
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    format!("{} {}", format_date(&ts.date()), format_time(&ts.time()))
}

/// Sub-second nanoseconds, folding a leap second back into range.
pub fn nanos_of(time: &NaiveTime) -> u32 {
    time.nanosecond() % 1_000_000_000
}
