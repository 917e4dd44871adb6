//! Lenient coercion of user-typed text into calculator inputs.
//!
//! Form fields and sliders hand over raw text. Anything that does not start
//! with a number becomes zero instead of an error, so the engine's guards
//! take care of it downstream.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::Money;

/// Largest exponent magnitude a decimal can take (its maximum scale).
const MAX_EXPONENT: u32 = 28;

/// Parse the leading numeric prefix of `text` as a decimal amount.
///
/// Leading whitespace and trailing garbage are ignored (`" 12.5kg"` → 12.5).
/// An optional exponent is honoured (`"1.5e5"` → 150000). No numeric prefix,
/// or a value outside the decimal range, yields zero.
pub fn parse_amount(text: &str) -> Money {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = &s[int_start..i];

    let mut frac_digits = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = &s[frac_start..j];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            i = j;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Decimal::ZERO;
    }

    let mut exponent: i64 = 0;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        let exp_negative = match bytes.get(j) {
            Some(b'-') => {
                j += 1;
                true
            }
            Some(b'+') => {
                j += 1;
                false
            }
            _ => false,
        };
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            let magnitude = s[exp_start..j].parse::<i64>().unwrap_or(i64::MAX);
            exponent = if exp_negative { -magnitude } else { magnitude };
        }
    }

    let int_part = if int_digits.is_empty() { "0" } else { int_digits };
    let normalized = if frac_digits.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_digits}")
    };

    let mantissa = match Decimal::from_str(&normalized) {
        Ok(m) => m,
        Err(_) => return Decimal::ZERO,
    };

    let magnitude = if mantissa.is_zero() || exponent == 0 {
        mantissa
    } else if exponent.unsigned_abs() > u64::from(MAX_EXPONENT) {
        return Decimal::ZERO;
    } else {
        // overflow and sub-precision underflow both land on zero
        match Decimal::from_scientific(&format!("{normalized}e{exponent}")) {
            Ok(v) => v,
            Err(_) => return Decimal::ZERO,
        }
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Parse the leading integer prefix of `text` as a number of years.
///
/// Fractions are truncated (`"7.9"` → 7). Negative, non-numeric or
/// out-of-range text yields zero.
pub fn parse_years(text: &str) -> u32 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return 0;
    }

    digits[..end].parse::<u32>().unwrap_or(0)
}
