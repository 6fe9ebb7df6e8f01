//! Bitwise logic and shifts over the infinite two's-complement form of the
//! value.
//!
//! A negative magnitude `m` reads in two's complement as `!m + 1`. Limbs
//! below the lowest non-zero limb of `m` stay zero, that limb is negated,
//! and every limb above it is inverted; beyond the top the pattern is all
//! ones. [`twos_limb`] produces limb `i` of that pattern on the fly, so the
//! operators combine limbs in a single pass without materializing either
//! operand and convert the result back to sign-magnitude the same way.

use crate::error::BigIntError;
use crate::storage::{check_limbs, first_nonzero, MAX_LIMBS};
use crate::BigInt;

/// Limb `i` of the two's-complement form of a value whose limb `i` of
/// magnitude is `limb`. `nz` is the index of the lowest non-zero limb.
#[inline(always)]
pub(crate) fn twos_limb(limb: u32, negative: bool, nz: usize, i: usize) -> u32 {
    if !negative || i < nz {
        limb
    } else if i == nz {
        limb.wrapping_neg()
    } else {
        !limb
    }
}

/// Negate a two's-complement limb string in place.
pub(crate) fn negate_twos(limbs: &mut [u32]) {
    let nz = first_nonzero(limbs);
    for (i, x) in limbs.iter_mut().enumerate().skip(nz) {
        *x = if i == nz { x.wrapping_neg() } else { !*x };
    }
}

impl BigInt {
    /// Limb `i` of the two's-complement form, sign-extended past the top.
    #[inline]
    pub(crate) fn twos_at(&self, i: usize, nz: usize) -> u32 {
        let len = self.len_limbs();
        if i < len {
            twos_limb(self.val[i + 1], self.is_negative(), nz, i)
        } else if self.is_negative() {
            u32::MAX
        } else {
            0
        }
    }

    /// Index of the lowest non-zero magnitude limb.
    #[inline]
    pub(crate) fn nz_limb(&self) -> usize {
        first_nonzero(self.limbs())
    }

    /// Combine with `rhs` limb by limb in two's complement. `sign` maps the
    /// operand signs to the sign of the result.
    fn bitwise(
        &mut self,
        rhs: &BigInt,
        op: impl Fn(u32, u32) -> u32,
        sign: impl Fn(bool, bool) -> bool,
    ) -> Result<(), BigIntError> {
        let a_len = self.len_limbs();
        let a_neg = self.is_negative();
        let b_neg = rhs.is_negative();
        let negative = sign(a_neg, b_neg);

        let m = a_len.max(rhs.len_limbs());
        check_limbs(m)?;
        let a_nz = self.nz_limb();
        let b_nz = rhs.nz_limb();

        // A negative result needs one more limb when its low `m` limbs are
        // all zero, as in -2^(32m).
        let n = if negative { m + 1 } else { m };
        if n > MAX_LIMBS
            && (0..m).all(|i| op(self.twos_at(i, a_nz), rhs.twos_at(i, b_nz)) == 0)
        {
            check_limbs(n)?;
        }
        self.ensure_slots(n + 1);

        for i in 0..n {
            let x = if i < a_len {
                twos_limb(self.val[i + 1], a_neg, a_nz, i)
            } else if a_neg {
                u32::MAX
            } else {
                0
            };
            self.val[i + 1] = op(x, rhs.twos_at(i, b_nz));
        }

        if negative {
            negate_twos(&mut self.val[1..=n]);
        }
        self.canonicalize(n, negative);
        Ok(())
    }

    /// `self &= rhs`
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(-1i64);
    /// v.and(&BigInt::from(5i64)).unwrap();
    /// assert_eq!(v, BigInt::from(5i64));
    /// ```
    pub fn and(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.bitwise(rhs, |x, y| x & y, |a, b| a && b)
    }

    /// `self |= rhs`
    pub fn or(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.bitwise(rhs, |x, y| x | y, |a, b| a || b)
    }

    /// `self ^= rhs`
    pub fn xor(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.bitwise(rhs, |x, y| x ^ y, |a, b| a != b)
    }

    /// `self &= !rhs`
    pub fn and_not(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.bitwise(rhs, |x, y| x & !y, |a, b| a && !b)
    }

    /// `self = !self`, that is `-self - 1`.
    pub fn not(&mut self) -> Result<(), BigIntError> {
        if self.is_negative() {
            // !(-m) = m - 1
            self.abs();
            self.sub_u32(1)
        } else {
            // !m = -(m + 1)
            self.add_u32(1)?;
            self.neg();
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // Shifts
    // ------------------------------------------------------------------------

    /// `self <<= n`. A negative count shifts right.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(-3i64);
    /// v.shl(65).unwrap();
    /// assert_eq!(v.to_string(), "-110680464442257309696");
    /// v.shl(-65).unwrap();
    /// assert_eq!(v, BigInt::from(-3i64));
    /// ```
    pub fn shl(&mut self, n: i64) -> Result<(), BigIntError> {
        if n < 0 {
            self.shr_bits(n.unsigned_abs());
            Ok(())
        } else {
            self.shl_bits(n as u64)
        }
    }

    /// `self >>= n`, rounding toward negative infinity. A negative count
    /// shifts left.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(-1i64);
    /// v.shr(100).unwrap();
    /// assert_eq!(v, BigInt::from(-1i64));
    ///
    /// let mut v = BigInt::from(-5i64);
    /// v.shr(1).unwrap();
    /// assert_eq!(v, BigInt::from(-3i64));
    /// ```
    pub fn shr(&mut self, n: i64) -> Result<(), BigIntError> {
        if n < 0 {
            self.shl_bits(n.unsigned_abs())
        } else {
            self.shr_bits(n as u64);
            Ok(())
        }
    }

    fn shl_bits(&mut self, bits: u64) -> Result<(), BigIntError> {
        let len = self.len_limbs();
        if len == 0 || bits == 0 {
            return Ok(());
        }
        let limbs = (bits / 32) as usize;
        let sh = (bits % 32) as u32;
        let negative = self.is_negative();

        let top = if sh == 0 { 0 } else { self.val[len] >> (32 - sh) };
        let requested = len.saturating_add(limbs);
        check_limbs(requested + (top != 0) as usize)?;
        self.ensure_slots(requested + 2);

        if sh == 0 {
            self.val.copy_within(1..=len, 1 + limbs);
            self.val[1..=limbs].fill(0);
            self.set_header(len + limbs, negative);
            return Ok(());
        }

        // Walk down so no source limb is overwritten before it is read.
        for i in (1..len).rev() {
            self.val[1 + i + limbs] = (self.val[1 + i] << sh) | (self.val[i] >> (32 - sh));
        }
        self.val[1 + limbs] = self.val[1] << sh;
        self.val[1..1 + limbs].fill(0);
        self.val[1 + len + limbs] = top;
        self.canonicalize(len + limbs + 1, negative);
        Ok(())
    }

    fn shr_bits(&mut self, bits: u64) {
        let len = self.len_limbs();
        if len == 0 || bits == 0 {
            return;
        }
        let negative = self.is_negative();
        let limbs = bits / 32;
        if limbs >= len as u64 {
            // Every bit falls off: 0 for positive, -1 for negative.
            if negative {
                self.assign_wide(1, true);
            } else {
                self.set_zero();
            }
            return;
        }
        let limbs = limbs as usize;
        let sh = (bits % 32) as u32;

        // A negative value rounds toward negative infinity when ones are
        // shifted out.
        let lost = negative
            && (self.val[1..=limbs].iter().any(|&l| l != 0)
                || (sh > 0 && self.val[1 + limbs] << (32 - sh) != 0));

        let new_len = len - limbs;
        if sh == 0 {
            self.val.copy_within(1 + limbs..=len, 1);
        } else {
            for i in 0..new_len {
                let lo = self.val[1 + i + limbs] >> sh;
                let hi = if i + limbs + 1 < len {
                    self.val[2 + i + limbs] << (32 - sh)
                } else {
                    0
                };
                self.val[1 + i] = lo | hi;
            }
        }
        self.canonicalize(new_len, negative);
        if lost {
            self.inc_mag();
            let len = self.len_limbs();
            self.set_header(len, true);
        }
    }
}
