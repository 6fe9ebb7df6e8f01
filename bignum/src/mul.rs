//! Multiplication, squaring and integer powers.
//!
//! Products are formed by schoolbook accumulation for short operands and by
//! Karatsuba above the thresholds in [`MulConfig`]. Operand pairs of very
//! different lengths are cut into slices of the shorter length first. The
//! top Karatsuba levels of very large products run their three
//! sub-products on scoped threads.

use log::trace;

use crate::add::{add_assign_slice, sub_assign_slice};
use crate::config::{MulConfig, KARATSUBA_MIN};
use crate::error::BigIntError;
use crate::storage::{adc, check_limbs, mac, trim, MAX_LIMBS, HEADROOM};
use crate::BigInt;

/// Recursion depth down to which Karatsuba levels may fork.
const MAX_PARALLEL_DEPTH: u32 = 2;

// ============================================================================
// Slice kernels
// ============================================================================

/// `a = a * m + add`, returning the limb carried out of the top.
pub(crate) fn mul_limb_slice(a: &mut [u32], m: u32, add: u32) -> u32 {
    let mut carry = add;
    for x in a.iter_mut() {
        let (lo, c) = mac(*x, m, 0, carry);
        *x = lo;
        carry = c;
    }
    carry
}

/// Carry that `mul_limb_slice(a, m, add)` would return, without writing.
fn mul_limb_carry(a: &[u32], m: u32, add: u32) -> u32 {
    a.iter().fold(add, |carry, &x| mac(x, m, 0, carry).1)
}

/// `out = a * b` with `out.len() == a.len() + b.len()`.
fn schoolbook(a: &[u32], b: &[u32], out: &mut [u32]) {
    out.fill(0);
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry = 0;
        for (j, &y) in b.iter().enumerate() {
            let (lo, c) = mac(x, y, out[i + j], carry);
            out[i + j] = lo;
            carry = c;
        }
        out[i + b.len()] = carry;
    }
}

/// `out = a * a` with `out.len() == 2 * a.len()`. Each cross product is
/// formed once and doubled before the squares on the diagonal are added.
fn square_schoolbook(a: &[u32], out: &mut [u32]) {
    let n = a.len();
    out.fill(0);
    for i in 0..n {
        let mut carry = 0;
        for j in i + 1..n {
            let (lo, c) = mac(a[i], a[j], out[i + j], carry);
            out[i + j] = lo;
            carry = c;
        }
        out[i + n] = carry;
    }

    let mut top = 0;
    for x in out.iter_mut() {
        let next = *x >> 31;
        *x = (*x << 1) | top;
        top = next;
    }

    let mut carry = 0;
    for (i, &x) in a.iter().enumerate() {
        let sq = x as u64 * x as u64;
        let (lo, c) = adc(out[2 * i], sq as u32, carry);
        out[2 * i] = lo;
        let (hi, c) = adc(out[2 * i + 1], (sq >> 32) as u32, c);
        out[2 * i + 1] = hi;
        carry = c;
    }
    debug_assert_eq!(carry, 0);
}

/// Sum of two halves, one limb wider than the longer one.
fn add_halves(x: &[u32], y: &[u32]) -> Vec<u32> {
    let (long, short) = if x.len() >= y.len() { (x, y) } else { (y, x) };
    let mut sum = Vec::with_capacity(long.len() + 1);
    sum.extend_from_slice(long);
    sum.push(0);
    add_assign_slice(&mut sum, short);
    sum
}

/// Run three independent products, on scoped threads when `parallel`.
fn run3<F0, F1, F2>(parallel: bool, f0: F0, f1: F1, f2: F2)
where
    F0: FnOnce() + Send,
    F1: FnOnce() + Send,
    F2: FnOnce() + Send,
{
    if !parallel {
        f0();
        f1();
        f2();
        return;
    }
    let joined = crossbeam::thread::scope(|s| {
        s.spawn(move |_| f0());
        s.spawn(move |_| f1());
        f2();
    });
    if let Err(panic) = joined {
        std::panic::resume_unwind(panic);
    }
}

/// Recombine Karatsuba partial products into `out`:
/// `out = z0 + (z1 - z0 - z2) * B^m + z2 * B^2m`.
fn karatsuba_combine(z0: &[u32], mut z1: Vec<u32>, z2: &[u32], m: usize, out: &mut [u32]) {
    sub_assign_slice(&mut z1, z0);
    sub_assign_slice(&mut z1, z2);
    out[..z0.len()].copy_from_slice(z0);
    out[z0.len()..].copy_from_slice(z2);
    let carry = add_assign_slice(&mut out[m..], trim(&z1));
    debug_assert_eq!(carry, 0);
}

/// `out = a * b` with `out.len() == a.len() + b.len()`, choosing the strategy
/// from the operand sizes.
pub(crate) fn mul_slices(a: &[u32], b: &[u32], out: &mut [u32], cfg: &MulConfig, depth: u32) {
    debug_assert_eq!(out.len(), a.len() + b.len());
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if b.is_empty() {
        out.fill(0);
        return;
    }
    if !cfg.use_karatsuba(b.len(), out.len()) {
        schoolbook(a, b, out);
    } else if a.len() >= 2 * b.len() {
        mul_unbalanced(a, b, out, cfg, depth);
    } else {
        karatsuba(a, b, out, cfg, depth);
    }
}

/// Long `a` times short `b`: multiply `b` by consecutive `b`-sized slices of
/// `a` and accumulate.
fn mul_unbalanced(a: &[u32], b: &[u32], out: &mut [u32], cfg: &MulConfig, depth: u32) {
    out.fill(0);
    let step = b.len();
    let mut tmp = vec![0u32; 2 * step];
    for (k, chunk) in a.chunks(step).enumerate() {
        let prod = &mut tmp[..chunk.len() + step];
        mul_slices(chunk, b, prod, cfg, depth);
        let carry = add_assign_slice(&mut out[k * step..], trim(prod));
        debug_assert_eq!(carry, 0);
    }
}

/// Karatsuba for `b.len() <= a.len() < 2 * b.len()`.
fn karatsuba(a: &[u32], b: &[u32], out: &mut [u32], cfg: &MulConfig, depth: u32) {
    let m = a.len() / 2;
    let (a0, a1) = a.split_at(m);
    let (b0, b1) = b.split_at(m);
    let sa = add_halves(a0, a1);
    let sb = add_halves(b0, b1);

    let mut z0 = vec![0u32; 2 * m];
    let mut z1 = vec![0u32; sa.len() + sb.len()];
    let mut z2 = vec![0u32; a1.len() + b1.len()];
    let parallel = depth < MAX_PARALLEL_DEPTH && cfg.use_parallel(b.len(), out.len());
    run3(
        parallel,
        || mul_slices(a0, b0, &mut z0, cfg, depth + 1),
        || mul_slices(a1, b1, &mut z2, cfg, depth + 1),
        || mul_slices(&sa, &sb, &mut z1, cfg, depth + 1),
    );
    karatsuba_combine(&z0, z1, &z2, m, out);
}

/// `out = a * a` with `out.len() == 2 * a.len()`.
pub(crate) fn square_slices(a: &[u32], out: &mut [u32], cfg: &MulConfig, depth: u32) {
    debug_assert_eq!(out.len(), 2 * a.len());
    if a.len() < cfg.square_threshold.max(KARATSUBA_MIN) {
        square_schoolbook(a, out);
        return;
    }
    let m = a.len() / 2;
    let (a0, a1) = a.split_at(m);
    let sa = add_halves(a0, a1);

    let mut z0 = vec![0u32; 2 * m];
    let mut z1 = vec![0u32; 2 * sa.len()];
    let mut z2 = vec![0u32; 2 * a1.len()];
    let parallel = depth < MAX_PARALLEL_DEPTH && cfg.use_parallel(a.len(), out.len());
    run3(
        parallel,
        || square_slices(a0, &mut z0, cfg, depth + 1),
        || square_slices(a1, &mut z2, cfg, depth + 1),
        || square_slices(&sa, &mut z1, cfg, depth + 1),
    );
    karatsuba_combine(&z0, z1, &z2, m, out);
}

/// Top-level product: offer the operands to the backend, then fall back to
/// the portable kernels.
fn product(a: &[u32], b: &[u32], out: &mut [u32], cfg: &MulConfig) {
    let min_len = a.len().min(b.len());
    if let Some(backend) = cfg.backend_for(min_len) {
        if backend.mul(a, b, out) {
            trace!("mul {}x{} limbs: backend {}", a.len(), b.len(), backend.name());
            return;
        }
        trace!("mul {}x{} limbs: backend {} declined", a.len(), b.len(), backend.name());
        out.fill(0);
    }
    if cfg.use_parallel(min_len, out.len()) {
        trace!("mul {}x{} limbs: parallel karatsuba", a.len(), b.len());
    } else if cfg.use_karatsuba(min_len, out.len()) {
        trace!("mul {}x{} limbs: karatsuba", a.len(), b.len());
    }
    mul_slices(a, b, out, cfg, 0);
}

/// `10^exp`, for callers that already hold a value at least that large.
pub(crate) fn ten_pow(exp: u64) -> BigInt {
    let cfg = MulConfig::global();
    let mut result = vec![1u32];
    let mut base = vec![10u32];
    let mut e = exp;
    loop {
        if e & 1 == 1 {
            let mut out = vec![0u32; result.len() + base.len()];
            mul_slices(&result, &base, &mut out, cfg, 0);
            out.truncate(trim(&out).len());
            result = out;
        }
        e >>= 1;
        if e == 0 {
            break;
        }
        let mut sq = vec![0u32; 2 * base.len()];
        square_slices(&base, &mut sq, cfg, 0);
        sq.truncate(trim(&sq).len());
        base = sq;
    }
    BigInt::from_mag(&result, false)
}

// ============================================================================
// BigInt API
// ============================================================================

impl BigInt {
    /// `|self| = |self| * m + add`, keeping the sign.
    pub(crate) fn mul_add_mag(&mut self, m: u32, add: u32) -> Result<(), BigIntError> {
        let len = self.len_limbs();
        let negative = self.is_negative();
        if len == 0 {
            self.assign_wide(add as u64, false);
            return Ok(());
        }
        if len == MAX_LIMBS && mul_limb_carry(self.limbs(), m, add) != 0 {
            check_limbs(len + 1)?;
        }
        let carry = mul_limb_slice(&mut self.val[1..=len], m, add);
        if carry != 0 {
            self.ensure_slots(len + 2);
            self.val[len + 1] = carry;
            self.set_header(len + 1, negative);
        } else {
            self.canonicalize(len, negative);
        }
        Ok(())
    }

    /// Multiply by the value with magnitude `b` and sign `b_neg`.
    fn mul_mag(&mut self, b: &[u32], b_neg: bool, cfg: &MulConfig) -> Result<(), BigIntError> {
        let b = trim(b);
        if self.is_zero() || b.is_empty() {
            self.set_zero();
            return Ok(());
        }
        let negative = self.is_negative() != b_neg;
        if b.len() == 1 {
            self.mul_add_mag(b[0], 0)?;
            let len = self.len_limbs();
            self.set_header(len, negative);
            return Ok(());
        }
        let n = self.len_limbs() + b.len();
        check_limbs(n - 1)?;
        let mut buf = vec![0u32; n + 1 + HEADROOM];
        product(self.limbs(), b, &mut buf[1..=n], cfg);
        // The top limb of an `n`-limb product may be zero.
        check_limbs(trim(&buf[1..=n]).len())?;
        self.install(buf, n, negative);
        Ok(())
    }

    pub fn mul_u32(&mut self, m: u32) -> Result<(), BigIntError> {
        self.mul_add_mag(m, 0)
    }

    /// `self = self * m + add` for non-negative `self`.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(123u32);
    /// v.mul_add_u32(1_000_000_000, 456).unwrap();
    /// assert_eq!(v.to_string(), "123000000456");
    /// ```
    pub fn mul_add_u32(&mut self, m: u32, add: u32) -> Result<(), BigIntError> {
        debug_assert!(!self.is_negative(), "mul_add_u32 on a negative value");
        self.mul_add_mag(m, add)
    }

    pub fn mul_u64(&mut self, m: u64) -> Result<(), BigIntError> {
        if m >> 32 == 0 {
            return self.mul_u32(m as u32);
        }
        self.mul_mag(&[m as u32, (m >> 32) as u32], false, MulConfig::global())
    }

    pub fn mul_i64(&mut self, m: i64) -> Result<(), BigIntError> {
        self.mul_u64(m.unsigned_abs())?;
        if m < 0 {
            self.neg();
        }
        Ok(())
    }

    /// `self *= rhs` under the process-wide [`MulConfig`].
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut a: BigInt = "-340282366920938463463374607431768211457".parse().unwrap();
    /// let b: BigInt = "18446744073709551615".parse().unwrap();
    /// a.mul(&b).unwrap();
    /// assert_eq!(
    ///     a.to_string(),
    ///     "-6277101735386680763495507056286727952657427581105975853055"
    /// );
    /// ```
    pub fn mul(&mut self, rhs: &BigInt) -> Result<(), BigIntError> {
        self.mul_with(rhs, MulConfig::global())
    }

    /// `self *= rhs` under an explicit configuration.
    pub fn mul_with(&mut self, rhs: &BigInt, cfg: &MulConfig) -> Result<(), BigIntError> {
        self.mul_mag(rhs.limbs(), rhs.is_negative(), cfg)
    }

    /// `self = self * self` under the process-wide [`MulConfig`].
    pub fn square(&mut self) -> Result<(), BigIntError> {
        self.square_with(MulConfig::global())
    }

    pub fn square_with(&mut self, cfg: &MulConfig) -> Result<(), BigIntError> {
        let len = self.len_limbs();
        if len == 0 {
            return Ok(());
        }
        let n = 2 * len;
        check_limbs(n - 1)?;
        let mut buf = vec![0u32; n + 1 + HEADROOM];
        let a = self.limbs();
        let out = &mut buf[1..=n];
        match cfg.backend_for(len) {
            Some(backend) if backend.mul(a, a, out) => {
                trace!("square {len} limbs: backend {}", backend.name());
            }
            _ => {
                out.fill(0);
                square_slices(a, out, cfg, 0);
            }
        }
        check_limbs(trim(&buf[1..=n]).len())?;
        self.install(buf, n, false);
        Ok(())
    }

    /// `self = self^exp` under the process-wide [`MulConfig`].
    ///
    /// A negative exponent yields zero and `0^0` is one.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let mut v = BigInt::from(-2i64);
    /// v.pow(3).unwrap();
    /// assert_eq!(v, BigInt::from(-8i64));
    ///
    /// v.pow(-1).unwrap();
    /// assert!(v.is_zero());
    /// ```
    pub fn pow(&mut self, exp: i32) -> Result<(), BigIntError> {
        self.pow_with(exp, MulConfig::global())
    }

    pub fn pow_with(&mut self, exp: i32, cfg: &MulConfig) -> Result<(), BigIntError> {
        if exp < 0 {
            self.set_zero();
            return Ok(());
        }
        if exp == 0 {
            self.assign_wide(1, false);
            return Ok(());
        }
        if self.is_zero() || exp == 1 {
            return Ok(());
        }

        let negative = self.is_negative() && exp & 1 == 1;
        let exp = exp as u64;

        // Pull out the power of two so only the odd part is multiplied.
        let tz = self.lowest_set_bit().unwrap_or(0);
        let bits = self.bit_length_mag() - tz;
        let shift = tz * exp;

        let min_bits = (bits - 1) * exp + 1 + shift;
        let max_bits = (MAX_LIMBS as u64) * 32;
        if min_bits > max_bits {
            return Err(BigIntError::CapacityOverflow {
                requested: (min_bits / 32 + 1).min(usize::MAX as u64) as usize,
                max: MAX_LIMBS,
            });
        }

        // `self` is only replaced once every step has succeeded.
        let mut result = BigInt::one();
        if bits > 1 {
            let mut base = self.clone();
            base.abs();
            base.shr(tz as i64)?;
            let mut e = exp;
            loop {
                if e & 1 == 1 {
                    result.mul_with(&base, cfg)?;
                }
                e >>= 1;
                if e == 0 {
                    break;
                }
                base.square_with(cfg)?;
            }
        }

        result.shl(shift as i64)?;
        if negative {
            result.neg();
        }
        *self = result;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
