//! Single-bit access and bit statistics.
//!
//! Bit `n` is read from the infinite two's-complement pattern, so every bit
//! above the top limb of a negative value is set. Changing bit `n` from 0 to
//! 1 adds `2^n` to the value whatever its sign, and clearing it subtracts
//! `2^n`; the setters are built on that.

use crate::cmp::cmp_mag;
use crate::error::BigIntError;
use crate::mul::ten_pow;
use crate::storage::{check_limbs, MAX_LIMBS};
use crate::BigInt;

/// Limb index of bit `n`, or an overflow error when no buffer can reach it.
fn limb_index(n: u64) -> Result<usize, BigIntError> {
    let idx = n / 32;
    if idx >= MAX_LIMBS as u64 {
        return Err(BigIntError::CapacityOverflow {
            requested: idx.saturating_add(1).min(usize::MAX as u64) as usize,
            max: MAX_LIMBS,
        });
    }
    Ok(idx as usize)
}

impl BigInt {
    /// Whether bit `n` of the two's-complement form is set.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let v = BigInt::from(-4i64); // ...11100
    /// assert!(!v.test_bit(1));
    /// assert!(v.test_bit(2));
    /// assert!(v.test_bit(1000));
    /// ```
    pub fn test_bit(&self, n: u64) -> bool {
        let idx = n / 32;
        if idx >= self.len_limbs() as u64 {
            return self.is_negative();
        }
        let idx = idx as usize;
        (self.twos_at(idx, self.nz_limb()) >> (n % 32)) & 1 == 1
    }

    pub fn set_bit(&mut self, n: u64) -> Result<(), BigIntError> {
        if self.test_bit(n) {
            return Ok(());
        }
        self.add_pow2(n, false)
    }

    pub fn clear_bit(&mut self, n: u64) -> Result<(), BigIntError> {
        if !self.test_bit(n) {
            return Ok(());
        }
        self.add_pow2(n, true)
    }

    pub fn flip_bit(&mut self, n: u64) -> Result<(), BigIntError> {
        let set = self.test_bit(n);
        self.add_pow2(n, set)
    }

    /// `self += 2^n`, or `self -= 2^n` when `subtract` is set.
    fn add_pow2(&mut self, n: u64, subtract: bool) -> Result<(), BigIntError> {
        let idx = limb_index(n)?;
        let bit = 1u32 << (n % 32);
        let len = self.len_limbs();

        // Non-negative value gaining a clear bit: write it in place.
        if !subtract && !self.is_negative() {
            check_limbs(idx + 1)?;
            let new_len = len.max(idx + 1);
            self.ensure_slots(new_len + 1);
            self.zero_slots(len + 1, new_len + 1);
            self.val[idx + 1] |= bit;
            self.set_header(new_len, false);
            return Ok(());
        }

        let mut mag = vec![0u32; idx + 1];
        mag[idx] = bit;
        self.add_mag(&mag, subtract)
    }

    /// Bits in the minimal two's-complement form, excluding the sign bit.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// assert_eq!(BigInt::from(255u32).bit_length(), 8);
    /// assert_eq!(BigInt::from(-256i64).bit_length(), 8);
    /// assert_eq!(BigInt::from(-257i64).bit_length(), 9);
    /// assert_eq!(BigInt::new().bit_length(), 0);
    /// ```
    pub fn bit_length(&self) -> u64 {
        let len = self.len_limbs();
        if len == 0 {
            return 0;
        }
        let top = self.val[len];
        let bits = len as u64 * 32 - top.leading_zeros() as u64;
        if self.is_negative() && self.is_pow2_mag() {
            bits - 1
        } else {
            bits
        }
    }

    /// Bits that differ from the sign bit.
    pub fn bit_count(&self) -> u64 {
        let ones: u64 = self.limbs().iter().map(|l| l.count_ones() as u64).sum();
        match self.lowest_set_bit() {
            // |v| - 1 clears the lowest one and sets every bit below it.
            Some(tz) if self.is_negative() => ones - 1 + tz,
            _ => ones,
        }
    }

    /// Index of the lowest set bit; `None` for zero. The same for `v` and `-v`.
    pub fn lowest_set_bit(&self) -> Option<u64> {
        if self.is_zero() {
            return None;
        }
        let nz = self.nz_limb();
        Some(nz as u64 * 32 + self.val[nz + 1].trailing_zeros() as u64)
    }

    /// Number of decimal digits in `|self|`; one for zero.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// assert_eq!(BigInt::new().precision(), 1);
    /// assert_eq!(BigInt::from(-99_999i64).precision(), 5);
    /// let v: BigInt = "100000000000000000000000000000".parse().unwrap();
    /// assert_eq!(v.precision(), 30);
    /// ```
    pub fn precision(&self) -> u64 {
        let len = self.len_limbs();
        if len <= 2 {
            return match self.low_u64() {
                0 => 1,
                m => m.ilog10() as u64 + 1,
            };
        }
        // floor((bits + 1) * log10(2)) is either the digit count or one less.
        let p = ((self.bit_length_mag() + 1) * 646_456_993) >> 31;
        if cmp_mag(self.limbs(), ten_pow(p).limbs()).is_lt() {
            p
        } else {
            p + 1
        }
    }

    /// Bit length of the magnitude.
    pub(crate) fn bit_length_mag(&self) -> u64 {
        let len = self.len_limbs();
        if len == 0 {
            return 0;
        }
        len as u64 * 32 - self.val[len].leading_zeros() as u64
    }

    /// Whether the magnitude is a power of two.
    pub(crate) fn is_pow2_mag(&self) -> bool {
        let limbs = self.limbs();
        match limbs.split_last() {
            Some((top, rest)) => top.is_power_of_two() && rest.iter().all(|&l| l == 0),
            None => false,
        }
    }
}
