//! Ordering, equality and hashing.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::BigInt;

/// Compare two canonical magnitudes: length first, then limbs from the top.
pub(crate) fn cmp_mag(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        if x != y {
            return x.cmp(y);
        }
    }
    Ordering::Equal
}

impl BigInt {
    /// Compare absolute values.
    ///
    /// ```
    /// use bignum::BigInt;
    /// use std::cmp::Ordering;
    ///
    /// let a = BigInt::from(-9i64);
    /// let b = BigInt::from(4i64);
    /// assert_eq!(a.cmp_abs(&b), Ordering::Greater);
    /// assert_eq!(a.cmp(&b), Ordering::Less);
    /// ```
    pub fn cmp_abs(&self, other: &BigInt) -> Ordering {
        cmp_mag(self.limbs(), other.limbs())
    }

    /// Base-31 polynomial over the limbs, most significant first, negated for
    /// negative values.
    pub fn hash_code(&self) -> i32 {
        let mut h: i32 = 0;
        for &limb in self.limbs().iter().rev() {
            h = h.wrapping_mul(31).wrapping_add(limb as i32);
        }
        if self.is_negative() {
            h.wrapping_neg()
        } else {
            h
        }
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        // Header equality covers both sign and length.
        self.val[0] == other.val[0] && self.limbs() == other.limbs()
    }
}

impl Eq for BigInt {}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_mag(self.limbs(), other.limbs()),
            (true, true) => cmp_mag(other.limbs(), self.limbs()),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for BigInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}
