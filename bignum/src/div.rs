//! Division engine: single-limb and wide-word fast paths, Knuth's
//! Algorithm D for longer divisors, and the remainder and modulus variants.
//!
//! Quotients truncate toward zero. Remainders take the sign of the dividend.
//! [`BigInt::modulo`] is always non-negative.
//!
//! Division by zero is a contract violation. Debug builds assert; release
//! builds do not check and panic inside the limb division.

use std::cmp::Ordering;

use crate::add::{add_assign_slice, rsub_assign_slice};
use crate::cmp::cmp_mag;
use crate::BigInt;

const BASE: u64 = 1 << 32;
const LOW: u64 = 0xFFFF_FFFF;

// ============================================================================
// Scratch storage
// ============================================================================

/// Caller-owned working storage for multi-limb division.
///
/// Holds the normalized dividend and divisor and the quotient digits between
/// calls, so a loop of remainders against the same divisor allocates only
/// until the buffers have grown to size. Contents are meaningless between
/// calls.
#[derive(Debug, Default)]
pub struct DivScratch {
    un: Vec<u32>,
    vn: Vec<u32>,
    q: Vec<u32>,
}

impl DivScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate for dividends of up to `limbs` limbs.
    pub fn with_capacity(limbs: usize) -> Self {
        Self {
            un: Vec::with_capacity(limbs + 1),
            vn: Vec::with_capacity(limbs),
            q: Vec::with_capacity(limbs),
        }
    }

    /// Number of dividend limbs handled without reallocating.
    pub fn capacity(&self) -> usize {
        self.un.capacity().saturating_sub(1)
    }
}

// ============================================================================
// Kernels
// ============================================================================

/// Divide `a` in place by a single limb, returning the remainder.
pub(crate) fn div_rem_limb(a: &mut [u32], d: u32) -> u32 {
    let d = d as u64;
    let mut r = 0u64;
    for x in a.iter_mut().rev() {
        let cur = (r << 32) | *x as u64;
        *x = (cur / d) as u32;
        r = cur % d;
    }
    r as u32
}

/// Divide `a` in place by a two-limb divisor, returning the remainder.
pub(crate) fn div_rem_wide(a: &mut [u32], d: u64) -> u64 {
    let d = d as u128;
    let mut r = 0u128;
    for x in a.iter_mut().rev() {
        let cur = (r << 32) | *x as u128;
        *x = (cur / d) as u32;
        r = cur % d;
    }
    r as u64
}

/// `dst = src << s` for `s < 32`, returning the bits shifted out of the top.
fn shl_into(src: &[u32], s: u32, dst: &mut [u32]) -> u32 {
    if s == 0 {
        dst[..src.len()].copy_from_slice(src);
        return 0;
    }
    let mut carry = 0;
    for (d, &x) in dst.iter_mut().zip(src) {
        *d = (x << s) | carry;
        carry = x >> (32 - s);
    }
    carry
}

/// Knuth's Algorithm D for `num.len() >= den.len() >= 2`.
///
/// Leaves the quotient in `scratch.q[..num.len() - den.len() + 1]` and the
/// remainder in `scratch.un[..den.len()]`.
fn knuth_div(num: &[u32], den: &[u32], scratch: &mut DivScratch) {
    let m = num.len();
    let n = den.len();
    debug_assert!(n >= 2 && m >= n && den[n - 1] != 0);

    let DivScratch { un, vn, q } = scratch;
    un.clear();
    un.resize(m + 1, 0);
    vn.clear();
    vn.resize(n, 0);
    q.clear();
    q.resize(m - n + 1, 0);

    // D1: normalize so the divisor's top bit is set.
    let s = den[n - 1].leading_zeros();
    shl_into(den, s, vn);
    un[m] = shl_into(num, s, un);

    let vtop = vn[n - 1] as u64;
    let vnext = vn[n - 2] as u64;

    for j in (0..=m - n).rev() {
        // D3: estimate from the top two limbs, then correct against the
        // next divisor limb. Off by at most one afterwards.
        let top = (un[j + n] as u64) << 32 | un[j + n - 1] as u64;
        let mut qhat = top / vtop;
        let mut rhat = top % vtop;
        while qhat >= BASE || qhat * vnext > (rhat << 32 | un[j + n - 2] as u64) {
            qhat -= 1;
            rhat += vtop;
            if rhat >= BASE {
                break;
            }
        }

        // D4: multiply and subtract.
        let mut borrow: i64 = 0;
        let mut carry: u64 = 0;
        for i in 0..n {
            let p = qhat * vn[i] as u64 + carry;
            carry = p >> 32;
            let t = un[i + j] as i64 - borrow - (p & LOW) as i64;
            un[i + j] = t as u32;
            borrow = -(t >> 32);
        }
        let t = un[j + n] as i64 - borrow - carry as i64;
        un[j + n] = t as u32;

        // D5/D6: the estimate was one too large; add the divisor back.
        if t < 0 {
            qhat -= 1;
            let c = add_assign_slice(&mut un[j..j + n], vn);
            un[j + n] = un[j + n].wrapping_add(c);
        }
        q[j] = qhat as u32;
    }

    // D8: unnormalize the remainder.
    if s > 0 {
        for i in 0..n {
            un[i] = (un[i] >> s) | (un[i + 1] << (32 - s));
        }
    }
}

/// Where a division left its results.
enum Split {
    /// `|dividend| < |divisor|`: quotient zero, remainder is the dividend.
    Small,
    /// Quotient limbs are in place (not yet canonical); remainder is this.
    Limb(u64),
    /// Quotient in `scratch.q`, remainder in `scratch.un[..divisor_len]`.
    Scratch,
}

// ============================================================================
// BigInt API
// ============================================================================

impl BigInt {
    fn divide(&mut self, b: &[u32], scratch: &mut DivScratch) -> Split {
        let m = self.len_limbs();
        let n = b.len();
        debug_assert!(n != 0, "division by zero");
        if n > m || (n == m && cmp_mag(self.limbs(), b) == Ordering::Less) {
            return Split::Small;
        }
        match n {
            0 | 1 => {
                let d = b.first().copied().unwrap_or(0);
                Split::Limb(div_rem_limb(&mut self.val[1..=m], d) as u64)
            }
            2 => {
                let d = b[0] as u64 | (b[1] as u64) << 32;
                Split::Limb(div_rem_wide(&mut self.val[1..=m], d))
            }
            _ => {
                knuth_div(self.limbs(), b, scratch);
                Split::Scratch
            }
        }
    }

    fn take_quotient(&mut self, split: &Split, n: usize, negative: bool, scratch: &DivScratch) {
        let m = self.len_limbs();
        match split {
            Split::Small => self.set_zero(),
            Split::Limb(_) => self.canonicalize(m, negative),
            Split::Scratch => {
                let qlen = m - n + 1;
                self.val[1..=qlen].copy_from_slice(&scratch.q[..qlen]);
                self.canonicalize(qlen, negative);
            }
        }
    }

    fn take_remainder(&mut self, split: &Split, n: usize, negative: bool, scratch: &DivScratch) {
        match split {
            Split::Small => {}
            Split::Limb(r) => self.assign_wide(*r, negative),
            Split::Scratch => {
                self.val[1..=n].copy_from_slice(&scratch.un[..n]);
                self.canonicalize(n, negative);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Full-width divisors
    // ------------------------------------------------------------------------

    /// `self /= d`, truncating toward zero.
    pub fn div(&mut self, d: &BigInt) {
        self.div_with(d, &mut DivScratch::new());
    }

    pub fn div_with(&mut self, d: &BigInt, scratch: &mut DivScratch) {
        let negative = self.is_negative() != d.is_negative();
        let split = self.divide(d.limbs(), scratch);
        self.take_quotient(&split, d.len_limbs(), negative, scratch);
    }

    /// `self %= d`; the result has the sign of the dividend.
    pub fn rem(&mut self, d: &BigInt) {
        self.rem_with(d, &mut DivScratch::new());
    }

    /// [`rem`](Self::rem) with caller-owned scratch storage.
    ///
    /// ```
    /// use bignum::{BigInt, DivScratch};
    ///
    /// let d: BigInt = "1000000000000000000000000007".parse().unwrap();
    /// let mut scratch = DivScratch::new();
    /// for s in ["-12345678901234567890123456789012345", "99999999999999999999999999999999"] {
    ///     let mut v: BigInt = s.parse().unwrap();
    ///     v.rem_with(&d, &mut scratch);
    ///     assert!(v.cmp_abs(&d).is_lt());
    /// }
    /// ```
    pub fn rem_with(&mut self, d: &BigInt, scratch: &mut DivScratch) {
        let negative = self.is_negative();
        let split = self.divide(d.limbs(), scratch);
        self.take_remainder(&split, d.len_limbs(), negative, scratch);
    }

    /// Non-negative remainder: `self mod |d|`.
    pub fn modulo(&mut self, d: &BigInt) {
        self.modulo_with(d, &mut DivScratch::new());
    }

    pub fn modulo_with(&mut self, d: &BigInt, scratch: &mut DivScratch) {
        self.rem_with(d, scratch);
        if self.is_negative() {
            // |d| - |r| with |r| < |d|.
            let b = d.limbs();
            let n = b.len();
            let r_len = self.len_limbs();
            self.ensure_slots(n + 1);
            self.zero_slots(r_len + 1, n + 1);
            rsub_assign_slice(&mut self.val[1..=n], b);
            self.canonicalize(n, false);
        }
    }

    /// Quotient in place, remainder returned.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(-17i64);
    /// let r = v.div_rem(&BigInt::from(5i64));
    /// assert_eq!(v, BigInt::from(-3i64));
    /// assert_eq!(r, BigInt::from(-2i64));
    /// ```
    pub fn div_rem(&mut self, d: &BigInt) -> BigInt {
        self.div_rem_with(d, &mut DivScratch::new())
    }

    pub fn div_rem_with(&mut self, d: &BigInt, scratch: &mut DivScratch) -> BigInt {
        let a_neg = self.is_negative();
        let q_neg = a_neg != d.is_negative();
        let n = d.len_limbs();
        let split = self.divide(d.limbs(), scratch);
        let rem = match &split {
            Split::Small => self.clone(),
            Split::Limb(r) => BigInt::from_wide(*r, a_neg),
            Split::Scratch => BigInt::from_mag(&scratch.un[..n], a_neg),
        };
        self.take_quotient(&split, n, q_neg, scratch);
        rem
    }

    // ------------------------------------------------------------------------
    // Scalar divisors
    // ------------------------------------------------------------------------

    /// Divide by a limb in place, returning the remainder's magnitude. The
    /// remainder carries the sign of the dividend.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v: BigInt = "1000000000000000000000".parse().unwrap();
    /// assert_eq!(v.div_rem_u32(7), 6);
    /// assert_eq!(v.to_string(), "142857142857142857142");
    /// ```
    pub fn div_rem_u32(&mut self, d: u32) -> u32 {
        debug_assert!(d != 0, "division by zero");
        let len = self.len_limbs();
        let negative = self.is_negative();
        let r = div_rem_limb(&mut self.val[1..=len], d);
        self.canonicalize(len, negative);
        r
    }

    /// Truncating division by a single limb, discarding the remainder.
    pub fn div_u32(&mut self, d: u32) {
        self.div_rem_u32(d);
    }

    /// Truncating signed division by a wide word, discarding the remainder.
    pub fn div_i64(&mut self, d: i64) {
        self.div_rem_i64(d);
    }

    /// Divide by a wide word in place, returning the remainder's magnitude.
    pub fn div_rem_u64(&mut self, d: u64) -> u64 {
        debug_assert!(d != 0, "division by zero");
        if d >> 32 == 0 {
            return self.div_rem_u32(d as u32) as u64;
        }
        let len = self.len_limbs();
        let negative = self.is_negative();
        let r = div_rem_wide(&mut self.val[1..=len], d);
        self.canonicalize(len, negative);
        r
    }

    /// Signed division by a wide word; returns the remainder signed like the
    /// dividend.
    pub fn div_rem_i64(&mut self, d: i64) -> i64 {
        let negative = self.is_negative();
        let r = self.div_rem_u64(d.unsigned_abs());
        if d < 0 {
            self.neg();
        }
        // |r| < |d| <= 2^63, so the cast only wraps for r == 2^63, never reached.
        if negative {
            (r as i64).wrapping_neg()
        } else {
            r as i64
        }
    }

    /// Remainder magnitude of `|self| / d` without touching `self`.
    pub fn rem_u32(&self, d: u32) -> u32 {
        debug_assert!(d != 0, "division by zero");
        let d = d as u64;
        self.limbs()
            .iter()
            .rev()
            .fold(0u64, |r, &x| ((r << 32) | x as u64) % d) as u32
    }

    /// Remainder magnitude of `|self| / d` without touching `self`.
    pub fn rem_u64(&self, d: u64) -> u64 {
        debug_assert!(d != 0, "division by zero");
        let d = d as u128;
        self.limbs()
            .iter()
            .rev()
            .fold(0u128, |r, &x| ((r << 32) | x as u128) % d) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    fn from_limbs(limbs: &[u32]) -> BigInt {
        BigInt::from_mag(limbs, false)
    }

    #[test]
    fn test_limb_division() {
        let mut a = vec![0, 0, 1];
        assert_eq!(div_rem_limb(&mut a, 3), 1);
        // 2^64 / 3 = 0x5555555555555555
        assert_eq!(a, vec![0x5555_5555, 0x5555_5555, 0]);

        let mut a = vec![u32::MAX, u32::MAX];
        assert_eq!(div_rem_limb(&mut a, 0x8000_0000), 0x7FFF_FFFF);
        assert_eq!(a, vec![1, 0]);
    }

    #[test]
    fn test_wide_division() {
        let mut a = vec![5, 0, 0, 1];
        let r = div_rem_wide(&mut a, u64::MAX);
        // 2^96 + 5 = (2^32) * (2^64 - 1) + 2^32 + 5
        assert_eq!(a, vec![0, 1, 0, 0]);
        assert_eq!(r, (1 << 32) + 5);
    }

    #[test]
    fn test_knuth_add_back() {
        // Known vector where the first estimate survives the correction loop
        // and the multiply-subtract step has to add the divisor back.
        let mut u = from_limbs(&[0, 0, 0x8000_0000, 0x7FFF_FFFF]);
        let v = from_limbs(&[1, 0, 0x8000_0000]);
        let r = u.div_rem(&v);
        assert_eq!(u.limbs(), &[0xFFFF_FFFE]);
        assert_eq!(r.limbs(), &[2, 0xFFFF_FFFF, 0x7FFF_FFFF]);
    }

    #[test]
    fn test_knuth_exact() {
        let mut u = from_limbs(&[3, 0, 0x8000_0000]);
        let v = from_limbs(&[1, 0, 0x2000_0000]);
        let r = u.div_rem(&v);
        assert_eq!(u, BigInt::from(3u32));
        assert_eq!(r.limbs(), &[0, 0, 0x2000_0000]);
    }

    #[test]
    fn test_signs() {
        let a = big("-123456789012345678901234567890123");
        let b = big("98765432109876543210");
        let mut q = a.clone();
        let r = q.div_rem(&b);
        assert_eq!(q, big("-1249999988609"));
        assert_eq!(r, big("-37037052338271595233"));

        let mut m = a.clone();
        m.modulo(&b);
        let mut expected = b.clone();
        expected.add(&r).unwrap();
        assert_eq!(m, expected);

        let mut m = a.clone();
        let mut neg_b = b.clone();
        neg_b.neg();
        m.modulo(&neg_b);
        assert_eq!(m, expected);
    }

    #[test]
    fn test_small_dividend() {
        let mut a = big("-5");
        let r = a.div_rem(&big("123456789012345678901234567890"));
        assert!(a.is_zero());
        assert_eq!(r, big("-5"));

        let mut a = big("-5");
        a.modulo(&big("123456789012345678901234567890"));
        assert_eq!(a, big("123456789012345678901234567885"));
    }

    #[test]
    fn test_rem_with_reuses_scratch() {
        let d = big("340282366920938463463374607431768211507");
        let mut scratch = DivScratch::new();
        let mut v = big("-1157920892373161954235709850086879078532699846656405640394575840079131296399");
        v.rem_with(&d, &mut scratch);
        let cap = scratch.capacity();
        assert!(cap >= 8);

        let mut w = big("1157920892373161954235709850086879078532699846656405640394575840079131296398");
        w.rem_with(&d, &mut scratch);
        assert_eq!(scratch.capacity(), cap);
        assert!(v.is_negative());
        assert!(!w.is_negative());
        assert!(v.cmp_abs(&d).is_lt() && w.cmp_abs(&d).is_lt());
    }

    #[test]
    fn test_scalar_division() {
        let mut v = big("-1000000000000000000000");
        assert_eq!(v.div_rem_u32(7), 6);
        assert_eq!(v, big("-142857142857142857142"));

        let mut v = big("-1000000000000000000000");
        assert_eq!(v.div_rem_i64(-7), -6);
        assert_eq!(v, big("142857142857142857142"));

        let mut v = big("36893488147419103232");
        assert_eq!(v.div_rem_u64(u64::MAX), 2);
        assert_eq!(v, BigInt::from(2u32));

        let v = big("1000000000000000000000");
        assert_eq!(v.rem_u32(7), 6);
        assert_eq!(v.rem_u64(1 << 40), 1000000000000000000000u128 as u64 % (1 << 40));
    }

    #[test]
    fn test_quotient_becomes_canonical_zero() {
        let mut v = big("-3");
        v.div_rem_u32(4);
        assert_eq!(v.as_raw(), &[0]);
    }
}
