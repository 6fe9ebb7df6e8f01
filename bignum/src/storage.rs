//! The length-prefixed limb buffer behind [`BigInt`].
//!
//! Slot 0 of the buffer holds the signed limb count: its absolute value is the
//! number of significant limbs and its sign is the sign of the value. Limbs
//! follow in little-endian order. Zero is encoded as a count of 0 and nothing
//! past slot 0 is read in that state.
//!
//! The buffer usually holds more slots than the value needs. Spare capacity is
//! kept across operations so that repeated arithmetic on the same value does
//! not reallocate; [`BigInt::shrink_to_fit`] drops it when a value is handed
//! off for long-term storage.

use crate::error::BigIntError;

/// Largest number of limbs a buffer may hold.
pub const MAX_LIMBS: usize = 1 << 26;

/// Extra limbs requested on every allocation.
pub(crate) const HEADROOM: usize = 32;

/// Arbitrary-precision signed integer over 32-bit limbs.
///
/// All mutating operations take `&mut self` and may reallocate the buffer
/// internally. Values are always kept in canonical form: no leading zero
/// limb, and a zero value is never negative.
pub struct BigInt {
    pub(crate) val: Vec<u32>,
}

// ============================================================================
// Low-level helpers
// ============================================================================

/// Add with carry: (result, carry) = a + b + carry_in
#[inline(always)]
pub(crate) const fn adc(a: u32, b: u32, carry: u32) -> (u32, u32) {
    let tmp = a as u64 + b as u64 + carry as u64;
    (tmp as u32, (tmp >> 32) as u32)
}

/// Subtract with borrow: (result, borrow) = a - b - borrow_in
#[inline(always)]
pub(crate) const fn sbb(a: u32, b: u32, borrow: u32) -> (u32, u32) {
    let tmp = (a as u64).wrapping_sub(b as u64).wrapping_sub(borrow as u64);
    (tmp as u32, (tmp >> 63) as u32)
}

/// Multiply-accumulate: (lo, carry) = a * b + c + carry_in
#[inline(always)]
pub(crate) const fn mac(a: u32, b: u32, c: u32, carry: u32) -> (u32, u32) {
    let tmp = a as u64 * b as u64 + c as u64 + carry as u64;
    (tmp as u32, (tmp >> 32) as u32)
}

/// Slice without its most significant zero limbs.
#[inline]
pub(crate) fn trim(mag: &[u32]) -> &[u32] {
    let mut len = mag.len();
    while len > 0 && mag[len - 1] == 0 {
        len -= 1;
    }
    &mag[..len]
}

/// Index of the lowest non-zero limb. `mag` must not be all zeros.
#[inline]
pub(crate) fn first_nonzero(mag: &[u32]) -> usize {
    mag.iter().position(|&l| l != 0).unwrap_or(mag.len())
}

pub(crate) fn check_limbs(requested: usize) -> Result<(), BigIntError> {
    if requested > MAX_LIMBS {
        return Err(BigIntError::CapacityOverflow {
            requested,
            max: MAX_LIMBS,
        });
    }
    Ok(())
}

// ============================================================================
// Construction and raw access
// ============================================================================

impl BigInt {
    /// Create a zero value with no spare capacity.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let z = BigInt::new();
    /// assert!(z.is_zero());
    /// assert_eq!(z.signum(), 0);
    /// ```
    pub fn new() -> Self {
        Self { val: vec![0] }
    }

    /// Create a zero value able to hold `min_limbs` limbs (plus headroom)
    /// without reallocating.
    pub fn with_capacity(min_limbs: usize) -> Result<Self, BigIntError> {
        check_limbs(min_limbs)?;
        Ok(Self {
            val: vec![0; min_limbs + HEADROOM + 1],
        })
    }

    /// Create the value one.
    pub fn one() -> Self {
        Self::from_limb(1, false)
    }

    /// Construct from a single limb magnitude and a sign.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let v = BigInt::from_limb(7, true);
    /// assert_eq!(v.to_string(), "-7");
    /// assert_eq!(BigInt::from_limb(0, true).signum(), 0);
    /// ```
    pub fn from_limb(mag: u32, negative: bool) -> Self {
        let mut v = Self { val: vec![0, mag] };
        v.canonicalize(1, negative);
        v
    }

    /// Construct from a two-limb magnitude and a sign.
    pub fn from_wide(mag: u64, negative: bool) -> Self {
        let mut v = Self {
            val: vec![0, mag as u32, (mag >> 32) as u32],
        };
        v.canonicalize(2, negative);
        v
    }

    /// Construct from a magnitude slice, least significant limb first.
    pub(crate) fn from_mag(mag: &[u32], negative: bool) -> Self {
        let mut val = Vec::with_capacity(mag.len() + 1);
        val.push(0);
        val.extend_from_slice(mag);
        let mut v = Self { val };
        v.canonicalize(mag.len(), negative);
        v
    }

    /// Adopt a raw encoded buffer: slot 0 is the signed limb count, limbs
    /// follow least significant first. Leading zero limbs are stripped.
    ///
    /// A count larger than the buffer is a contract violation; release builds
    /// clamp it to the available limbs.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// // -(2^32 + 5), with a dirty leading zero limb.
    /// let v = BigInt::from_raw(vec![(-3i32) as u32, 5, 1, 0]);
    /// assert_eq!(v.as_raw(), &[(-2i32) as u32, 5, 1]);
    /// ```
    pub fn from_raw(mut val: Vec<u32>) -> Self {
        if val.is_empty() {
            val.push(0);
        }
        let signed = val[0] as i32;
        let mut len = signed.unsigned_abs() as usize;
        debug_assert!(len < val.len(), "header claims {len} limbs");
        len = len.min(val.len() - 1);
        let mut v = Self { val };
        v.canonicalize(len, signed < 0);
        v
    }

    /// Give up the encoded buffer, spare capacity included.
    pub fn into_raw(self) -> Vec<u32> {
        self.val
    }

    /// The encoded value: signed count followed by the significant limbs.
    pub fn as_raw(&self) -> &[u32] {
        &self.val[..=self.len_limbs()]
    }

    /// Significant limbs, least significant first. Empty for zero.
    #[inline]
    pub fn limbs(&self) -> &[u32] {
        &self.val[1..=self.len_limbs()]
    }

    /// Number of significant limbs.
    #[inline]
    pub fn len_limbs(&self) -> usize {
        (self.val[0] as i32).unsigned_abs() as usize
    }

    /// Number of limbs the buffer can hold without reallocating.
    pub fn capacity_limbs(&self) -> usize {
        self.val.len() - 1
    }

    /// -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i32 {
        (self.val[0] as i32).signum()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.val[0] == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        (self.val[0] as i32) < 0
    }

    /// Low 32 bits of the magnitude. Exact when the magnitude fits a limb.
    pub fn low_u32(&self) -> u32 {
        if self.is_zero() {
            0
        } else {
            self.val[1]
        }
    }

    /// Low 64 bits of the magnitude. Exact when the magnitude fits two limbs.
    pub fn low_u64(&self) -> u64 {
        match self.len_limbs() {
            0 => 0,
            1 => self.val[1] as u64,
            _ => self.val[1] as u64 | (self.val[2] as u64) << 32,
        }
    }

    // ------------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------------

    pub fn set_zero(&mut self) {
        self.val[0] = 0;
    }

    /// Copy `other` into this value, reusing the buffer when it is large enough.
    pub fn assign(&mut self, other: &BigInt) {
        let len = other.len_limbs();
        if self.val.len() <= len {
            self.val.resize(len + HEADROOM + 1, 0);
        }
        self.val[..=len].copy_from_slice(other.as_raw());
    }

    pub fn assign_u64(&mut self, mag: u64) {
        self.assign_wide(mag, false);
    }

    pub fn assign_i64(&mut self, v: i64) {
        self.assign_wide(v.unsigned_abs(), v < 0);
    }

    pub(crate) fn assign_wide(&mut self, mag: u64, negative: bool) {
        if self.val.len() < 3 {
            self.val.resize(3, 0);
        }
        self.val[1] = mag as u32;
        self.val[2] = (mag >> 32) as u32;
        self.canonicalize(2, negative);
    }

    // ------------------------------------------------------------------------
    // Capacity
    // ------------------------------------------------------------------------

    /// Make room for at least `min_limbs` limbs, keeping the live value.
    ///
    /// Grows by replacing the buffer with a larger one that carries extra
    /// headroom. Limbs past the current length are unspecified afterwards.
    pub fn reserve_limbs(&mut self, min_limbs: usize) -> Result<(), BigIntError> {
        check_limbs(min_limbs)?;
        self.ensure_slots(min_limbs + 1);
        Ok(())
    }

    /// Grow the buffer to at least `slots` slots, carrying over the slots
    /// covered by the current header. Callers check the limb limit.
    pub(crate) fn ensure_slots(&mut self, slots: usize) {
        if self.val.len() < slots {
            let live = self.len_limbs() + 1;
            let mut grown = vec![0u32; slots + HEADROOM];
            grown[..live].copy_from_slice(&self.val[..live]);
            self.val = grown;
        }
    }

    /// Release spare capacity so the buffer holds exactly the live value.
    pub fn shrink_to_fit(&mut self) {
        let live = self.len_limbs() + 1;
        self.val.truncate(live);
        self.val.shrink_to_fit();
    }

    // ------------------------------------------------------------------------
    // Canonical form
    // ------------------------------------------------------------------------

    /// Strip leading zero limbs from the first `len` limbs and write the
    /// signed count. A zero result is never negative.
    #[inline]
    pub(crate) fn canonicalize(&mut self, mut len: usize, negative: bool) {
        while len > 0 && self.val[len] == 0 {
            len -= 1;
        }
        self.set_header(len, negative && len > 0);
    }

    #[inline]
    pub(crate) fn set_header(&mut self, len: usize, negative: bool) {
        let signed = len as i32;
        self.val[0] = if negative { -signed } else { signed } as u32;
        self.debug_check();
    }

    /// Zero the limbs in `from..to` (1-based slots) so they can be read as
    /// part of a wider operand.
    #[inline]
    pub(crate) fn zero_slots(&mut self, from: usize, to: usize) {
        if from < to {
            self.val[from..to].fill(0);
        }
    }

    /// Replace the buffer with `limbs` laid out from slot 1, then canonicalize.
    pub(crate) fn install(&mut self, mut buf: Vec<u32>, len: usize, negative: bool) {
        debug_assert!(buf.len() > len);
        buf[0] = 0;
        self.val = buf;
        self.canonicalize(len, negative);
    }

    /// Self-check of the encoding. Compiled out of release builds.
    #[inline]
    pub(crate) fn debug_check(&self) {
        #[cfg(debug_assertions)]
        {
            let signed = self.val[0] as i32;
            let len = signed.unsigned_abs() as usize;
            assert!(len < self.val.len(), "header {signed} exceeds buffer of {}", self.val.len());
            assert!(len <= MAX_LIMBS, "header {signed} exceeds MAX_LIMBS");
            if len > 0 {
                assert_ne!(self.val[len], 0, "leading zero limb in {:?}", &self.val[..=len]);
            }
        }
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl Default for BigInt {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BigInt {
    fn clone(&self) -> Self {
        Self {
            val: self.as_raw().to_vec(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl From<u32> for BigInt {
    fn from(v: u32) -> Self {
        Self::from_limb(v, false)
    }
}

impl From<i32> for BigInt {
    fn from(v: i32) -> Self {
        Self::from_limb(v.unsigned_abs(), v < 0)
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        Self::from_wide(v, false)
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        Self::from_wide(v.unsigned_abs(), v < 0)
    }
}

// ============================================================================
// Tests
// ============================================================================
