//! Addition and subtraction at limb, wide-word and full width.
//!
//! Every variant funnels into [`BigInt::add_mag`], which takes the other
//! operand as a magnitude plus sign. Same signs add magnitudes; differing
//! signs subtract the smaller magnitude from the larger and keep the sign of
//! the larger.

use std::cmp::Ordering;

use crate::cmp::cmp_mag;
use crate::error::BigIntError;
use crate::storage::{adc, check_limbs, sbb, trim, MAX_LIMBS};
use crate::BigInt;

/// `a += b` over `a.len() >= b.len()` limbs. Returns the carry out of the top.
pub(crate) fn add_assign_slice(a: &mut [u32], b: &[u32]) -> u32 {
    debug_assert!(a.len() >= b.len());
    let mut carry = 0;
    for (x, &y) in a.iter_mut().zip(b) {
        let (s, c) = adc(*x, y, carry);
        *x = s;
        carry = c;
    }
    for x in a[b.len()..].iter_mut() {
        if carry == 0 {
            break;
        }
        let (s, c) = adc(*x, 0, carry);
        *x = s;
        carry = c;
    }
    carry
}

/// Whether `a + b` carries out of `max(a.len(), b.len())` limbs.
fn add_carries(a: &[u32], b: &[u32]) -> bool {
    let n = a.len().max(b.len());
    let limb = |s: &[u32], i: usize| s.get(i).copied().unwrap_or(0);
    (0..n).fold(0, |carry, i| adc(limb(a, i), limb(b, i), carry).1) != 0
}

/// `a -= b` where `a >= b` as numbers. Returns the borrow out of the top,
/// which is zero when the precondition holds.
pub(crate) fn sub_assign_slice(a: &mut [u32], b: &[u32]) -> u32 {
    debug_assert!(a.len() >= b.len());
    let mut borrow = 0;
    for (x, &y) in a.iter_mut().zip(b) {
        let (d, br) = sbb(*x, y, borrow);
        *x = d;
        borrow = br;
    }
    for x in a[b.len()..].iter_mut() {
        if borrow == 0 {
            break;
        }
        let (d, br) = sbb(*x, 0, borrow);
        *x = d;
        borrow = br;
    }
    borrow
}

/// `a = b - a` over equal lengths, where `b > a` as numbers.
pub(crate) fn rsub_assign_slice(a: &mut [u32], b: &[u32]) {
    debug_assert_eq!(a.len(), b.len());
    let mut borrow = 0;
    for (x, &y) in a.iter_mut().zip(b) {
        let (d, br) = sbb(y, *x, borrow);
        *x = d;
        borrow = br;
    }
    debug_assert_eq!(borrow, 0);
}

#[inline]
fn split_wide(v: u64) -> [u32; 2] {
    [v as u32, (v >> 32) as u32]
}

impl BigInt {
    /// Add the value with magnitude `b` and sign `b_neg`.
    pub(crate) fn add_mag(&mut self, b: &[u32], b_neg: bool) -> Result<(), BigIntError> {
        let b = trim(b);
        if b.is_empty() {
            return Ok(());
        }
        let a_len = self.len_limbs();
        let a_neg = self.is_negative();

        if a_len == 0 {
            self.reserve_limbs(b.len())?;
            self.val[1..=b.len()].copy_from_slice(b);
            self.set_header(b.len(), b_neg);
            return Ok(());
        }

        if a_neg == b_neg {
            let n = a_len.max(b.len());
            check_limbs(n)?;
            if n == MAX_LIMBS && add_carries(self.limbs(), b) {
                check_limbs(n + 1)?;
            }
            self.ensure_slots(n + 2);
            self.zero_slots(a_len + 1, n + 1);
            let carry = add_assign_slice(&mut self.val[1..=n], b);
            if carry != 0 {
                self.val[n + 1] = carry;
                self.set_header(n + 1, a_neg);
            } else {
                self.set_header(n, a_neg);
            }
            return Ok(());
        }

        match cmp_mag(&self.val[1..=a_len], b) {
            Ordering::Equal => self.set_zero(),
            Ordering::Greater => {
                sub_assign_slice(&mut self.val[1..=a_len], b);
                self.canonicalize(a_len, a_neg);
            }
            Ordering::Less => {
                let n = b.len();
                self.reserve_limbs(n)?;
                self.zero_slots(a_len + 1, n + 1);
                rsub_assign_slice(&mut self.val[1..=n], b);
                self.canonicalize(n, b_neg);
            }
        }
        Ok(())
    }

    /// Add one to the magnitude, keeping the sign. Zero becomes one.
    pub(crate) fn inc_mag(&mut self) {
        let len = self.len_limbs();
        let negative = self.is_negative();
        for i in 1..=len {
            self.val[i] = self.val[i].wrapping_add(1);
            if self.val[i] != 0 {
                return;
            }
        }
        self.ensure_slots(len + 2);
        self.val[len + 1] = 1;
        self.set_header(len + 1, negative);
    }

    /// `self += rhs`
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut a: BigInt = "-123456789012345678901234567890".parse().unwrap();
    /// let b = a.clone();
    /// a.add(&b).unwrap();
    /// assert_eq!(a.to_string(), "-246913578024691357802469135780");
    /// ```
    pub fn add(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.add_mag(rhs.limbs(), rhs.is_negative())
    }

    /// `self -= rhs`
    pub fn sub(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.add_mag(rhs.limbs(), !rhs.is_negative())
    }

    pub fn add_u32(&mut self, v: u32) -> Result<(), BigIntError> {
        self.add_mag(&[v], false)
    }

    pub fn sub_u32(&mut self, v: u32) -> Result<(), BigIntError> {
        self.add_mag(&[v], true)
    }

    pub fn add_u64(&mut self, v: u64) -> Result<(), BigIntError> {
        self.add_mag(&split_wide(v), false)
    }

    pub fn sub_u64(&mut self, v: u64) -> Result<(), BigIntError> {
        self.add_mag(&split_wide(v), true)
    }

    pub fn add_i64(&mut self, v: i64) -> Result<(), BigIntError> {
        self.add_mag(&split_wide(v.unsigned_abs()), v < 0)
    }

    pub fn sub_i64(&mut self, v: i64) -> Result<(), BigIntError> {
        self.add_mag(&split_wide(v.unsigned_abs()), v >= 0)
    }

    /// Flip the sign. Zero stays zero.
    pub fn neg(&mut self) {
        let len = self.len_limbs();
        let negative = !self.is_negative();
        self.set_header(len, negative && len > 0);
    }

    /// Drop the sign.
    pub fn abs(&mut self) {
        let len = self.len_limbs();
        self.set_header(len, false);
    }
}
