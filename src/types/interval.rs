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

//! Interval values produced by the query service.
//!
//! Components may individually carry a sign; all arithmetic goes through the
//! normalized totals ([`IntervalYearMonth::total_months`],
//! [`IntervalDaySecond::total_nanos`]) so mixed signs behave as a sum.
//!
//! Text forms:
//! - year to month: `[-]Y-M`, e.g. `1-2`
//! - day to second: `[-]D HH:MM:SS[.f]`, rendered with nine fraction digits

pub const NANOS_PER_SECOND: i128 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
pub const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalYearMonth {
    pub years: i32,
    pub months: i32,
}

impl IntervalYearMonth {
    pub fn new(years: i32, months: i32) -> Self {
        Self { years, months }
    }

    pub fn total_months(&self) -> i64 {
        self.years as i64 * 12 + self.months as i64
    }

    pub fn is_negative(&self) -> bool {
        self.total_months() < 0
    }

    /// Parse `[-]Y-M`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = strip_sign(text);
        let (years, months) = body.split_once('-')?;
        let years: u32 = parse_unsigned(years)?;
        let months: u32 = parse_unsigned(months)?;
        if months >= 12 {
            return None;
        }
        let total = years as i64 * 12 + months as i64;
        let total = if negative { -total } else { total };
        Self::from_total_months(total)
    }

    pub fn from_total_months(total: i64) -> Option<Self> {
        let years = i32::try_from(total / 12).ok()?;
        Some(Self {
            years,
            months: (total % 12) as i32,
        })
    }
}

impl std::fmt::Display for IntervalYearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.total_months();
        let sign = if total < 0 { "-" } else { "" };
        let magnitude = total.unsigned_abs();
        write!(f, "{}{}-{}", sign, magnitude / 12, magnitude % 12)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalDaySecond {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub nanos: i64,
}

/// Unsigned breakdown of a day-to-second interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaySecondParts {
    pub days: u128,
    pub hours: u128,
    pub minutes: u128,
    pub seconds: u128,
    pub nanos: u128,
}

impl IntervalDaySecond {
    pub fn new(days: i64, hours: i64, minutes: i64, seconds: i64, nanos: i64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
            nanos,
        }
    }

    pub fn from_total_nanos(total: i128) -> Option<Self> {
        let negative = total < 0;
        let parts = split_nanos(total.unsigned_abs());
        let signed = |v: u128| -> Option<i64> {
            let v = i64::try_from(v).ok()?;
            Some(if negative { -v } else { v })
        };
        Some(Self {
            days: signed(parts.days)?,
            hours: signed(parts.hours)?,
            minutes: signed(parts.minutes)?,
            seconds: signed(parts.seconds)?,
            nanos: signed(parts.nanos)?,
        })
    }

    pub fn total_nanos(&self) -> i128 {
        self.days as i128 * NANOS_PER_DAY
            + self.hours as i128 * NANOS_PER_HOUR
            + self.minutes as i128 * NANOS_PER_MINUTE
            + self.seconds as i128 * NANOS_PER_SECOND
            + self.nanos as i128
    }

    pub fn is_negative(&self) -> bool {
        self.total_nanos() < 0
    }

    /// Magnitude broken into day/hour/minute/second/nanosecond fields.
    pub fn parts(&self) -> DaySecondParts {
        split_nanos(self.total_nanos().unsigned_abs())
    }

    /// Parse `[-]D HH:MM:SS[.f]`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = strip_sign(text);
        let (days, clock) = body.split_once(' ')?;
        let days: u64 = parse_unsigned(days)?;
        let (clock, nanos) = match clock.split_once('.') {
            Some((clock, fraction)) => (clock, parse_fraction(fraction)?),
            None => (clock, 0),
        };
        let mut fields = clock.splitn(3, ':');
        let hours = parse_two_digits(fields.next()?, 24)?;
        let minutes = parse_two_digits(fields.next()?, 60)?;
        let seconds = parse_two_digits(fields.next()?, 60)?;
        let total = days as i128 * NANOS_PER_DAY
            + hours as i128 * NANOS_PER_HOUR
            + minutes as i128 * NANOS_PER_MINUTE
            + seconds as i128 * NANOS_PER_SECOND
            + nanos as i128;
        Self::from_total_nanos(if negative { -total } else { total })
    }
}

impl std::fmt::Display for IntervalDaySecond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let p = self.parts();
        write!(
            f,
            "{}{} {:02}:{:02}:{:02}.{:09}",
            sign, p.days, p.hours, p.minutes, p.seconds, p.nanos
        )
    }
}

fn split_nanos(mut rest: u128) -> DaySecondParts {
    let days = rest / NANOS_PER_DAY as u128;
    rest %= NANOS_PER_DAY as u128;
    let hours = rest / NANOS_PER_HOUR as u128;
    rest %= NANOS_PER_HOUR as u128;
    let minutes = rest / NANOS_PER_MINUTE as u128;
    rest %= NANOS_PER_MINUTE as u128;
    let seconds = rest / NANOS_PER_SECOND as u128;
    DaySecondParts {
        days,
        hours,
        minutes,
        seconds,
        nanos: rest % NANOS_PER_SECOND as u128,
    }
}

fn strip_sign(text: &str) -> (bool, &str) {
    match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    }
}

fn parse_unsigned<T: std::str::FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_two_digits(text: &str, limit: u32) -> Option<u32> {
    if text.len() != 2 {
        return None;
    }
    let value: u32 = parse_unsigned(text)?;
    (value < limit).then_some(value)
}

fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 {
        return None;
    }
    let digits: u32 = parse_unsigned(text)?;
    Some(digits * 10u32.pow(9 - text.len() as u32))
}
