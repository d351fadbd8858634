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

//! Numeric plumbing shared by the put and get paths.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use super::ConversionResult;
use crate::types::native::SqlNumericStruct;
use crate::types::sql::SQL_MAX_NUMERIC_LEN;

/// A numeric source value before it is narrowed into a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i128),
    Real(f32),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Real(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub(crate) fn as_f32(self) -> f32 {
        match self {
            Number::Int(v) => v as f32,
            Number::Real(v) => v,
            Number::Float(v) => v as f32,
        }
    }

    /// Whole part and whether a fraction was dropped; `None` for NaN.
    fn whole(self) -> Option<(i128, bool)> {
        match self {
            Number::Int(v) => Some((v, false)),
            Number::Real(_) | Number::Float(_) => {
                let v = self.as_f64();
                if v.is_nan() {
                    return None;
                }
                let t = v.trunc();
                // `as` saturates at the i128 bounds for infinities.
                Some((t as i128, t != v))
            }
        }
    }

    /// Narrow to an integer destination of range `[min, max]`.
    ///
    /// Out-of-range values wrap when the caller casts the returned value and
    /// report `VarlenDataTruncated`; a dropped fraction reports
    /// `FractionalTruncated`.
    pub(crate) fn narrow(self, min: i128, max: i128) -> (i128, ConversionResult) {
        match self.whole() {
            None => (0, ConversionResult::VarlenDataTruncated),
            Some((whole, fractional)) => narrow_whole(whole, fractional, min, max),
        }
    }

    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Number::Int(v) => Decimal::try_from_i128_with_scale(v, 0).ok(),
            Number::Real(v) => Decimal::from_str(&v.to_string())
                .ok()
                .or_else(|| Decimal::from_f32(v)),
            Number::Float(v) => Decimal::from_str(&v.to_string())
                .ok()
                .or_else(|| Decimal::from_f64(v)),
        }
    }

    pub(crate) fn from_decimal(value: Decimal) -> (Number, bool) {
        let fractional = !value.fract().is_zero();
        match value.trunc().to_i128() {
            Some(whole) if !fractional => (Number::Int(whole), false),
            _ => (Number::Float(value.to_f64().unwrap_or(0.0)), fractional),
        }
    }

    /// Parse the textual form of a number.
    pub(crate) fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(v) = text.parse::<i128>() {
            return Some(Number::Int(v));
        }
        let lower = text.to_ascii_lowercase();
        if lower.contains("inf") || lower.contains("nan") {
            return None;
        }
        text.parse::<f64>().ok().map(Number::Float)
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Real(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

pub(crate) fn narrow_whole(
    whole: i128,
    fractional: bool,
    min: i128,
    max: i128,
) -> (i128, ConversionResult) {
    if whole < min || whole > max {
        (whole, ConversionResult::VarlenDataTruncated)
    } else if fractional {
        (whole, ConversionResult::FractionalTruncated)
    } else {
        (whole, ConversionResult::Success)
    }
}

/// Parse a decimal in plain or scientific notation.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Pack a decimal into `SQL_NUMERIC_STRUCT` at the destination scale.
///
/// Digits beyond `scale` are truncated toward zero and reported as
/// `FractionalTruncated`.
pub(crate) fn pack_numeric(value: Decimal, scale: i16) -> (SqlNumericStruct, ConversionResult) {
    let scale = scale.clamp(0, 28) as u32;
    let mut scaled = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
    let result = if scaled != value {
        ConversionResult::FractionalTruncated
    } else {
        ConversionResult::Success
    };
    scaled.rescale(scale);

    let magnitude = scaled.mantissa().unsigned_abs();
    let mut val = [0u8; SQL_MAX_NUMERIC_LEN];
    val.copy_from_slice(&magnitude.to_le_bytes()[..SQL_MAX_NUMERIC_LEN]);
    let negative = scaled.is_sign_negative() && !scaled.is_zero();

    let numeric = SqlNumericStruct {
        precision: digit_count(magnitude).min(u8::MAX as u32) as u8,
        scale: scaled.scale() as i8,
        sign: if negative { 0 } else { 1 },
        val,
    };
    (numeric, result)
}

/// Decimal value of a `SQL_NUMERIC_STRUCT`; `None` when the magnitude or
/// scale cannot be represented.
pub(crate) fn unpack_numeric(numeric: &SqlNumericStruct) -> Option<Decimal> {
    let magnitude = u128::from_le_bytes(numeric.val);
    let signed = i128::try_from(magnitude).ok()?;
    let signed = if numeric.sign == 0 { -signed } else { signed };
    if numeric.scale >= 0 {
        Decimal::try_from_i128_with_scale(signed, numeric.scale as u32).ok()
    } else {
        let exponent = numeric.scale.unsigned_abs() as u32;
        let factor = Decimal::try_from_i128_with_scale(10i128.checked_pow(exponent)?, 0).ok()?;
        Decimal::try_from_i128_with_scale(signed, 0)
            .ok()?
            .checked_mul(factor)
    }
}

fn digit_count(mut v: u128) -> u32 {
    let mut digits = 1;
    while v >= 10 {
        v /= 10;
        digits += 1;
    }
    digits
}
