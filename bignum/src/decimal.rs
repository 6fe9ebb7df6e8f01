//! Radix-10 text conversion.
//!
//! Parsing accumulates base-10^9 groups with a single-limb multiply-add.
//! Formatting peels off base-10^13 chunks. Each chunk takes one limb
//! division by `5^13` followed by a 13-bit shift: with `v = q5 * 5^13 + r5`
//! and `q5 = q * 2^13 + t`, the chunk is `t * 5^13 + r5` and the new value is
//! `q`, so no 64-bit divisor is ever needed.

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::div::div_rem_limb;
use crate::error::BigIntError;
use crate::storage::trim;
use crate::BigInt;

const GROUP_DIGITS: usize = 9;
const GROUP_BASE: u32 = 1_000_000_000;

/// `log2(10) * 2^32`, rounded up.
const LOG2_10_Q32: u128 = 14_267_572_528;

/// Limbs needed by any number of `digits` decimal digits.
fn limbs_for_digits(digits: usize) -> usize {
    let bits = ((digits as u128 * LOG2_10_Q32) >> 32) + 1;
    bits.div_ceil(32).min(usize::MAX as u128) as usize
}

/// `5^13`, the odd factor of `10^13`.
const POW5_13: u32 = 1_220_703_125;
const CHUNK_SHIFT: u32 = 13;

/// Split off the sign and check that the rest is a non-empty run of ASCII
/// digits.
fn split_digits(s: &str) -> Result<(bool, &[u8]), BigIntError> {
    let (negative, rest, offset) = match s.strip_prefix('-') {
        Some(rest) => (true, rest, 1),
        None => (false, s, 0),
    };
    if rest.is_empty() {
        return Err(BigIntError::Empty);
    }
    if let Some((i, found)) = rest.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        return Err(BigIntError::InvalidDigit {
            index: offset + i,
            found,
        });
    }
    Ok((negative, rest.as_bytes()))
}

#[inline]
fn group_value(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0u32, |acc, &d| acc * 10 + (d - b'0') as u32)
}

/// `mag >>= s` for `s < 32`.
fn shr_small(mag: &mut [u32], s: u32) {
    let n = mag.len();
    for i in 0..n {
        let hi = if i + 1 < n { mag[i + 1] << (32 - s) } else { 0 };
        mag[i] = (mag[i] >> s) | hi;
    }
}

/// Base-10^13 chunks of `mag`, least significant first.
fn decimal_chunks(mag: &[u32]) -> Vec<u64> {
    let mut mag = trim(mag).to_vec();
    let mut chunks = Vec::with_capacity(mag.len() * 32 / 43 + 1);
    while !mag.is_empty() {
        let r5 = div_rem_limb(&mut mag, POW5_13);
        let t = mag[0] & ((1 << CHUNK_SHIFT) - 1);
        shr_small(&mut mag, CHUNK_SHIFT);
        chunks.push(t as u64 * POW5_13 as u64 + r5 as u64);
        let live = trim(&mag).len();
        mag.truncate(live);
    }
    chunks
}

impl BigInt {
    /// Parse decimal text: an optional `-` followed by ASCII digits.
    ///
    /// ```
    /// use bignum::{BigInt, BigIntError};
    ///
    /// let v = BigInt::parse_decimal("-000123").unwrap();
    /// assert_eq!(v.to_string(), "-123");
    /// assert_eq!(BigInt::parse_decimal("-"), Err(BigIntError::Empty));
    /// assert_eq!(
    ///     BigInt::parse_decimal("12a"),
    ///     Err(BigIntError::InvalidDigit { index: 2, found: 'a' })
    /// );
    /// ```
    pub fn parse_decimal(s: &str) -> Result<BigInt, BigIntError> {
        let mut v = BigInt::new();
        v.assign_decimal(s)?;
        Ok(v)
    }

    /// Parse decimal text into this value, reusing its buffer. On error the
    /// value is left unchanged.
    pub fn assign_decimal(&mut self, s: &str) -> Result<(), BigIntError> {
        let (negative, digits) = split_digits(s)?;
        let start = digits.iter().position(|&d| d != b'0').unwrap_or(digits.len());
        let digits = &digits[start..];
        if digits.is_empty() {
            self.set_zero();
            return Ok(());
        }

        self.reserve_limbs(limbs_for_digits(digits.len()))?;

        let groups = digits.len().div_ceil(GROUP_DIGITS);

        let first = digits.len() - (groups - 1) * GROUP_DIGITS;
        self.assign_wide(group_value(&digits[..first]) as u64, false);
        for group in digits[first..].chunks(GROUP_DIGITS) {
            self.mul_add_mag(GROUP_BASE, group_value(group))?;
        }
        if negative {
            self.neg();
        }
        Ok(())
    }

    /// Decimal text of the value, `-` prefixed when negative.
    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }

    fn write_magnitude(&self, out: &mut String) -> fmt::Result {
        let chunks = decimal_chunks(self.limbs());
        let mut iter = chunks.iter().rev();
        match iter.next() {
            Some(top) => write!(out, "{top}")?,
            None => out.push('0'),
        }
        for chunk in iter {
            write!(out, "{chunk:013}")?;
        }
        Ok(())
    }
}

impl FromStr for BigInt {
    type Err = BigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::parse_decimal(s)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut digits = String::with_capacity(self.len_limbs() * 10 + 1);
        self.write_magnitude(&mut digits)?;
        f.pad_integral(!self.is_negative(), "", &digits)
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MAX_LIMBS;

    #[test]
    fn test_zero_forms() {
        assert_eq!(BigInt::new().to_string(), "0");
        let z = BigInt::parse_decimal("-0").unwrap();
        assert!(z.is_zero());
        assert_eq!(z.as_raw(), &[0]);
        assert_eq!(BigInt::parse_decimal("0000").unwrap().to_string(), "0");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(BigInt::parse_decimal(""), Err(BigIntError::Empty));
        assert_eq!(
            BigInt::parse_decimal("+5"),
            Err(BigIntError::InvalidDigit { index: 0, found: '+' })
        );
        assert_eq!(
            BigInt::parse_decimal("--5"),
            Err(BigIntError::InvalidDigit { index: 1, found: '-' })
        );
        assert_eq!(
            BigInt::parse_decimal("12 3"),
            Err(BigIntError::InvalidDigit { index: 2, found: ' ' })
        );
        assert_eq!(
            BigInt::parse_decimal("1é"),
            Err(BigIntError::InvalidDigit { index: 1, found: 'é' })
        );
    }

    #[test]
    fn test_assign_decimal_keeps_value_on_error() {
        let mut v = BigInt::from(42u32);
        assert!(v.assign_decimal("4x2").is_err());
        assert_eq!(v, BigInt::from(42u32));
        v.assign_decimal("-18446744073709551616").unwrap();
        assert_eq!(v.limbs(), &[0, 0, 1]);
        assert!(v.is_negative());
    }

    #[test]
    fn test_group_boundaries() {
        // Lengths on both sides of the 9-digit group and 13-digit chunk.
        for n in [1, 8, 9, 10, 12, 13, 14, 18, 26, 27, 40] {
            let s = format!("7{}", "0".repeat(n - 1));
            assert_eq!(BigInt::parse_decimal(&s).unwrap().to_string(), s);
            let s = format!("-{}", "9".repeat(n));
            assert_eq!(BigInt::parse_decimal(&s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_limbs_for_digits_is_tight() {
        assert_eq!(limbs_for_digits(1), 1);
        assert_eq!(limbs_for_digits(9), 1);
        // 10^10 - 1 > 2^32
        assert_eq!(limbs_for_digits(10), 2);
        // Both lie between 2^128 and 2^160.
        assert_eq!(limbs_for_digits(39), 5);
        assert_eq!(limbs_for_digits(40), 5);
        // The longest digit string that still fits, and one more.
        assert_eq!(limbs_for_digits(646_456_993), MAX_LIMBS);
        assert_eq!(limbs_for_digits(646_456_994), MAX_LIMBS + 1);
        for n in [1usize, 5, 9, 10, 19, 20, 38, 39, 77, 100, 500] {
            let v = BigInt::parse_decimal(&"9".repeat(n)).unwrap();
            assert_eq!(v.len_limbs(), limbs_for_digits(n), "{n} digits");
        }
    }

    #[test]
    fn test_chunks_pad_inner_zeros() {
        let v = BigInt::parse_decimal("100000000000000000000000000001").unwrap();
        assert_eq!(v.to_string(), "100000000000000000000000000001");
        assert_eq!(decimal_chunks(v.limbs()), vec![1, 0, 1000]);
    }

    #[test]
    fn test_format_flags_and_debug() {
        let v = BigInt::from(-42i64);
        assert_eq!(format!("{v:>6}"), "   -42");
        assert_eq!(format!("{:+}", BigInt::from(7u32)), "+7");
        assert_eq!(format!("{v:?}"), "BigInt(-42)");
    }

    #[test]
    fn test_known_power() {
        let mut v = BigInt::from(2u32);
        v.pow(200).unwrap();
        assert_eq!(
            v.to_decimal_string(),
            "1606938044258990275541962092341162602522202993782792835301376"
        );
    }
}
