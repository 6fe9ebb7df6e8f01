//! Roots, logarithms and float import under an explicit rounding mode.

use std::cmp::Ordering;

use crate::cmp::cmp_mag;
use crate::config::MulConfig;
use crate::div::DivScratch;
use crate::error::BigIntError;
use crate::mul::{square_slices, ten_pow};
use crate::storage::trim;
use crate::BigInt;

/// How to round a result that falls between two integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Toward zero.
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// To nearest, ties away from zero.
    HalfUp,
    /// To nearest, ties toward zero.
    HalfDown,
    /// To nearest, ties to the even neighbour.
    HalfEven,
    /// The result must be exact.
    Unnecessary,
}

impl RoundingMode {
    /// Whether an inexact result should move away from zero. `half` compares
    /// the discarded fraction with one half and `odd` is the parity of the
    /// truncated result.
    fn round_up(self, negative: bool, odd: bool, half: Ordering) -> Result<bool, BigIntError> {
        Ok(match self {
            RoundingMode::Up => true,
            RoundingMode::Down => false,
            RoundingMode::Ceiling => !negative,
            RoundingMode::Floor => negative,
            RoundingMode::HalfUp => half != Ordering::Less,
            RoundingMode::HalfDown => half == Ordering::Greater,
            RoundingMode::HalfEven => match half {
                Ordering::Greater => true,
                Ordering::Equal => odd,
                Ordering::Less => false,
            },
            RoundingMode::Unnecessary => return Err(BigIntError::RoundingNecessary),
        })
    }
}

/// Bit length of `mag * mag`.
fn square_bit_length(mag: &[u32]) -> u64 {
    let mut sq = vec![0u32; 2 * mag.len()];
    square_slices(mag, &mut sq, MulConfig::global(), 0);
    let sq = trim(&sq);
    match sq.last() {
        Some(top) => sq.len() as u64 * 32 - top.leading_zeros() as u64,
        None => 0,
    }
}

impl BigInt {
    /// Whether the value is a positive power of two.
    pub fn is_power_of_two(&self) -> bool {
        !self.is_negative() && self.is_pow2_mag()
    }

    /// Integer value of a finite double, rounded by `mode`.
    ///
    /// ```
    /// use bignum::{BigInt, RoundingMode};
    ///
    /// let v = BigInt::from_f64(-2.5, RoundingMode::HalfEven).unwrap();
    /// assert_eq!(v, BigInt::from(-2i64));
    /// let v = BigInt::from_f64(-2.5, RoundingMode::Floor).unwrap();
    /// assert_eq!(v, BigInt::from(-3i64));
    /// ```
    pub fn from_f64(x: f64, mode: RoundingMode) -> Result<BigInt, BigIntError> {
        if !x.is_finite() {
            return Err(BigIntError::NonFinite);
        }
        let negative = x < 0.0;
        let whole = x.abs().trunc();
        let frac = x.abs() - whole;

        let mut v = if whole < 18_446_744_073_709_551_616.0 {
            BigInt::from(whole as u64)
        } else {
            // At this size the value is an integer: significand times 2^exp.
            let raw = whole.to_bits();
            let exp = ((raw >> 52) & 0x7FF) as i64 - 1075;
            let sig = (raw & ((1 << 52) - 1)) | (1 << 52);
            let mut v = BigInt::from(sig);
            v.shl(exp)?;
            v
        };

        if frac != 0.0 {
            let odd = v.low_u32() & 1 == 1;
            if mode.round_up(negative, odd, frac.total_cmp(&0.5))? {
                v.add_u32(1)?;
            }
        }
        if negative {
            v.neg();
        }
        Ok(v)
    }

    /// `self = sqrt(self)`, rounded by `mode`.
    ///
    /// ```
    /// use bignum::{BigInt, RoundingMode};
    ///
    /// let mut v = BigInt::from(15u32);
    /// v.sqrt(RoundingMode::Floor).unwrap();
    /// assert_eq!(v, BigInt::from(3u32));
    ///
    /// let mut v = BigInt::from(15u32);
    /// v.sqrt(RoundingMode::HalfUp).unwrap();
    /// assert_eq!(v, BigInt::from(4u32));
    /// ```
    pub fn sqrt(&mut self, mode: RoundingMode) -> Result<(), BigIntError> {
        if self.is_negative() {
            return Err(BigIntError::NegativeRoot);
        }
        if self.is_zero() {
            return Ok(());
        }
        let root = self.floor_sqrt()?;

        // r^2 <= v < (r + 1)^2, and sqrt(v) > r + 1/2 exactly when v > r^2 + r.
        let mut sq = root.clone();
        sq.square()?;
        if sq != *self {
            let mut mid = sq;
            mid.add(&root)?;
            let half = if *self > mid {
                Ordering::Greater
            } else {
                Ordering::Less
            };
            let odd = root.low_u32() & 1 == 1;
            let up = mode.round_up(false, odd, half)?;
            self.assign(&root);
            if up {
                self.add_u32(1)?;
            }
        } else {
            self.assign(&root);
        }
        Ok(())
    }

    /// Largest `r` with `r * r <= self`, for positive `self`.
    fn floor_sqrt(&self) -> Result<BigInt, BigIntError> {
        let bits = self.bit_length_mag();
        if bits <= 64 {
            let v = self.low_u64() as u128;
            let mut r = (v as f64).sqrt() as u128;
            while r * r > v {
                r -= 1;
            }
            while (r + 1) * (r + 1) <= v {
                r += 1;
            }
            return Ok(BigInt::from(r as u64));
        }

        // Seed from the top 64 or 65 bits; the +2 keeps the seed above the
        // root so Newton's iteration descends onto it.
        let shift = (bits - 64) & !1;
        let mut top = self.clone();
        top.shr(shift as i64)?;
        let seed = top.to_f64().sqrt() as u64 + 2;
        let mut x = BigInt::from(seed);
        x.shl((shift / 2) as i64)?;

        let mut scratch = DivScratch::new();
        let mut y = BigInt::new();
        loop {
            y.assign(self);
            y.div_with(&x, &mut scratch);
            y.add(&x)?;
            y.shr(1)?;
            if y >= x {
                return Ok(x);
            }
            std::mem::swap(&mut x, &mut y);
        }
    }

    /// Base-2 logarithm rounded by `mode`.
    ///
    /// ```
    /// use bignum::{BigInt, RoundingMode};
    ///
    /// let v = BigInt::from(1000u32);
    /// assert_eq!(v.log2(RoundingMode::Floor).unwrap(), 9);
    /// assert_eq!(v.log2(RoundingMode::HalfEven).unwrap(), 10);
    /// ```
    pub fn log2(&self, mode: RoundingMode) -> Result<u64, BigIntError> {
        if self.signum() <= 0 {
            return Err(BigIntError::NonPositiveLog);
        }
        let floor = self.bit_length_mag() - 1;
        if self.is_pow2_mag() {
            return Ok(floor);
        }
        // log2(v) > f + 1/2 exactly when v^2 > 2^(2f + 1); it is never equal.
        let half = if square_bit_length(self.limbs()) >= 2 * floor + 2 {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        let up = mode.round_up(false, floor & 1 == 1, half)?;
        Ok(floor + up as u64)
    }

    /// Base-10 logarithm rounded by `mode`.
    ///
    /// ```
    /// use bignum::{BigInt, RoundingMode};
    ///
    /// let v = BigInt::from(999u32);
    /// assert_eq!(v.log10(RoundingMode::Down).unwrap(), 2);
    /// assert_eq!(v.log10(RoundingMode::HalfDown).unwrap(), 3);
    /// assert!(v.log10(RoundingMode::Unnecessary).is_err());
    /// ```
    pub fn log10(&self, mode: RoundingMode) -> Result<u64, BigIntError> {
        if self.signum() <= 0 {
            return Err(BigIntError::NonPositiveLog);
        }
        let floor = self.precision() - 1;
        if cmp_mag(self.limbs(), ten_pow(floor).limbs()) == Ordering::Equal {
            return Ok(floor);
        }
        // log10(v) > f + 1/2 exactly when v^2 > 10^(2f + 1); never equal.
        let mut sq = vec![0u32; 2 * self.len_limbs()];
        square_slices(self.limbs(), &mut sq, MulConfig::global(), 0);
        let half = cmp_mag(trim(&sq), ten_pow(2 * floor + 1).limbs());
        let up = mode.round_up(false, floor & 1 == 1, half)?;
        Ok(floor + up as u64)
    }

    /// Natural logarithm rounded by `mode`.
    ///
    /// Unlike [`log2`](Self::log2) and [`log10`](Self::log10) this rounds a
    /// double-precision estimate, so results within about `1e-15` of an
    /// integer may land on either side of it.
    ///
    /// ```
    /// use bignum::{BigInt, RoundingMode};
    ///
    /// let v = BigInt::from(1000u32);
    /// assert_eq!(v.ln(RoundingMode::Floor).unwrap(), 6);
    /// assert_eq!(v.ln(RoundingMode::HalfEven).unwrap(), 7);
    /// ```
    pub fn ln(&self, mode: RoundingMode) -> Result<u64, BigIntError> {
        let x = self.ln_estimate()?;
        Ok(BigInt::from_f64(x, mode)?.low_u64())
    }

    /// Logarithm to a real `base` rounded by `mode`. A base of one, a
    /// non-positive base or a NaN base has no finite logarithm.
    ///
    /// ```
    /// use bignum::{BigInt, BigIntError, RoundingMode};
    ///
    /// let v = BigInt::from(1000u32);
    /// assert_eq!(v.log(0.5, RoundingMode::Floor).unwrap(), -10);
    /// assert_eq!(v.log(1.0, RoundingMode::Floor), Err(BigIntError::NonFinite));
    /// ```
    pub fn log(&self, base: f64, mode: RoundingMode) -> Result<i64, BigIntError> {
        let x = self.ln_estimate()? / base.ln();
        Ok(BigInt::from_f64(x, mode)?.to_i64())
    }

    /// `ln(self)` as a double. Values too large for a double are scaled down
    /// to their top 64 bits first.
    fn ln_estimate(&self) -> Result<f64, BigIntError> {
        if self.signum() <= 0 {
            return Err(BigIntError::NonPositiveLog);
        }
        let bits = self.bit_length_mag();
        if bits <= 1000 {
            return Ok(self.to_f64().ln());
        }
        let shift = bits - 64;
        let top = self.mag_bits(shift, 64) as f64;
        Ok(top.ln() + shift as f64 * std::f64::consts::LN_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    const ALL: [RoundingMode; 7] = [
        RoundingMode::Up,
        RoundingMode::Down,
        RoundingMode::Ceiling,
        RoundingMode::Floor,
        RoundingMode::HalfUp,
        RoundingMode::HalfDown,
        RoundingMode::HalfEven,
    ];

    #[test]
    fn test_round_up_table() {
        use RoundingMode::*;
        assert!(Ceiling.round_up(false, false, Ordering::Less).unwrap());
        assert!(!Ceiling.round_up(true, false, Ordering::Less).unwrap());
        assert!(Floor.round_up(true, false, Ordering::Less).unwrap());
        assert!(HalfUp.round_up(false, false, Ordering::Equal).unwrap());
        assert!(!HalfDown.round_up(false, false, Ordering::Equal).unwrap());
        assert!(HalfEven.round_up(false, true, Ordering::Equal).unwrap());
        assert!(!HalfEven.round_up(false, false, Ordering::Equal).unwrap());
        assert_eq!(
            Unnecessary.round_up(false, false, Ordering::Less),
            Err(BigIntError::RoundingNecessary)
        );
    }

    #[test]
    fn test_from_f64() {
        use RoundingMode::*;
        assert_eq!(BigInt::from_f64(2.5, HalfUp).unwrap(), BigInt::from(3u32));
        assert_eq!(BigInt::from_f64(2.5, HalfDown).unwrap(), BigInt::from(2u32));
        assert_eq!(BigInt::from_f64(3.5, HalfEven).unwrap(), BigInt::from(4u32));
        assert_eq!(BigInt::from_f64(-0.1, Ceiling).unwrap(), BigInt::new());
        assert_eq!(BigInt::from_f64(-0.1, Up).unwrap(), BigInt::from(-1i64));
        assert_eq!(BigInt::from_f64(7.0, Unnecessary).unwrap(), BigInt::from(7u32));
        assert_eq!(BigInt::from_f64(7.25, Unnecessary), Err(BigIntError::RoundingNecessary));
        assert_eq!(BigInt::from_f64(f64::NAN, Down), Err(BigIntError::NonFinite));
        assert_eq!(BigInt::from_f64(f64::NEG_INFINITY, Down), Err(BigIntError::NonFinite));
        let v = BigInt::from_f64(-2f64.powi(100), Down).unwrap();
        assert_eq!(v.to_string(), "-1267650600228229401496703205376");
        assert_eq!(BigInt::from_f64(f64::MAX, Down).unwrap().to_f64(), f64::MAX);
    }

    #[test]
    fn test_sqrt_exact_and_errors() {
        let mut v = big("152415787532388367504942236884722755800955129");
        v.sqrt(RoundingMode::Unnecessary).unwrap();
        assert_eq!(v.to_string(), "12345678901234567890123");

        let mut v = BigInt::from(-4i64);
        assert_eq!(v.sqrt(RoundingMode::Floor), Err(BigIntError::NegativeRoot));

        let mut v = big("152415787532388367504942236884722755800955130");
        assert_eq!(v.sqrt(RoundingMode::Unnecessary), Err(BigIntError::RoundingNecessary));
        assert_eq!(v.to_string(), "152415787532388367504942236884722755800955130");
    }

    #[test]
    fn test_sqrt_neighbourhood() {
        // (10^30)^2 - 1 and (10^30)^2 + 10^30 straddle both rounding points.
        let r = big("1000000000000000000000000000000");
        let mut sq = r.clone();
        sq.square().unwrap();

        let mut below = sq.clone();
        below.sub_u32(1).unwrap();
        for mode in ALL {
            let mut v = below.clone();
            v.sqrt(mode).unwrap();
            let expected = match mode {
                RoundingMode::Down | RoundingMode::Floor => {
                    let mut e = r.clone();
                    e.sub_u32(1).unwrap();
                    e
                }
                _ => r.clone(),
            };
            assert_eq!(v, expected, "{mode:?}");
        }

        let mut mid = sq.clone();
        mid.add(&r).unwrap(); // sqrt just below r + 1/2
        let mut v = mid.clone();
        v.sqrt(RoundingMode::HalfUp).unwrap();
        assert_eq!(v, r);
        mid.add_u32(1).unwrap(); // just above
        let mut v = mid;
        v.sqrt(RoundingMode::HalfDown).unwrap();
        let mut e = r.clone();
        e.add_u32(1).unwrap();
        assert_eq!(v, e);
    }

    #[test]
    fn test_log2() {
        assert_eq!(BigInt::new().log2(RoundingMode::Floor), Err(BigIntError::NonPositiveLog));
        assert_eq!(BigInt::from(-8i64).log2(RoundingMode::Floor), Err(BigIntError::NonPositiveLog));
        let mut v = BigInt::one();
        v.shl(100).unwrap();
        for mode in ALL {
            assert_eq!(v.log2(mode).unwrap(), 100);
        }
        assert_eq!(v.log2(RoundingMode::Unnecessary).unwrap(), 100);
        v.add_u32(1).unwrap();
        assert_eq!(v.log2(RoundingMode::Ceiling).unwrap(), 101);
        assert_eq!(v.log2(RoundingMode::HalfUp).unwrap(), 100);
        // 2^7.5 = 181.02
        assert_eq!(BigInt::from(181u32).log2(RoundingMode::HalfUp).unwrap(), 7);
        assert_eq!(BigInt::from(182u32).log2(RoundingMode::HalfUp).unwrap(), 8);
    }

    #[test]
    fn test_log10() {
        let v = big("1000000000000000000000000000000000000000");
        assert_eq!(v.log10(RoundingMode::Unnecessary).unwrap(), 39);
        // 10^39.5 = 3162277660168379331998.89...e18
        let lo = big("3162277660168379331998000000000000000000");
        assert_eq!(lo.log10(RoundingMode::HalfUp).unwrap(), 39);
        let hi = big("3162277660168379331999000000000000000000");
        assert_eq!(hi.log10(RoundingMode::HalfUp).unwrap(), 40);
        assert_eq!(hi.log10(RoundingMode::Floor).unwrap(), 39);
        assert!(BigInt::from(-10i64).log10(RoundingMode::Floor).is_err());
    }

    #[test]
    fn test_ln() {
        use RoundingMode::*;
        for mode in ALL {
            assert_eq!(BigInt::one().ln(mode).unwrap(), 0);
        }
        assert_eq!(BigInt::one().ln(Unnecessary).unwrap(), 0);
        assert_eq!(BigInt::from(1000u32).ln(Unnecessary), Err(BigIntError::RoundingNecessary));
        assert_eq!(BigInt::new().ln(Floor), Err(BigIntError::NonPositiveLog));
        assert_eq!(BigInt::from(-3i64).ln(Floor), Err(BigIntError::NonPositiveLog));

        // 2000 ln 2 = 1386.294...
        let mut v = BigInt::one();
        v.shl(2000).unwrap();
        assert_eq!(v.ln(Floor).unwrap(), 1386);
        assert_eq!(v.ln(HalfUp).unwrap(), 1386);
        assert_eq!(v.ln(Ceiling).unwrap(), 1387);

        // 2^20 ln 2 = 726817.498...
        let mut v = BigInt::one();
        v.shl(1 << 20).unwrap();
        assert_eq!(v.ln(HalfEven).unwrap(), 726817);

        // 400 ln 10 = 921.034...
        let mut v = BigInt::from(10u32);
        v.pow(400).unwrap();
        assert_eq!(v.ln(Down).unwrap(), 921);
        assert_eq!(v.ln(Up).unwrap(), 922);
    }

    #[test]
    fn test_log_base() {
        use RoundingMode::*;
        let mut v = BigInt::from(10u32);
        v.pow(400).unwrap();
        assert_eq!(v.log(10.0, HalfEven).unwrap(), 400);

        let mut v = BigInt::from(3u32);
        v.pow(50).unwrap();
        assert_eq!(v.log(3.0, HalfEven).unwrap(), 50);
        // 50 ln 3 / ln 2 = 79.248...
        assert_eq!(v.log(2.0, Floor).unwrap(), 79);

        // log_0.5(1000) = -9.965...
        let v = BigInt::from(1000u32);
        assert_eq!(v.log(0.5, Floor).unwrap(), -10);
        assert_eq!(v.log(0.5, Ceiling).unwrap(), -9);
        assert_eq!(v.log(0.5, Down).unwrap(), -9);
        assert_eq!(v.log(0.5, Up).unwrap(), -10);

        assert_eq!(v.log(1.0, Floor), Err(BigIntError::NonFinite));
        assert_eq!(v.log(-2.0, Floor), Err(BigIntError::NonFinite));
        assert_eq!(v.log(f64::NAN, Floor), Err(BigIntError::NonFinite));
        assert_eq!(BigInt::new().log(2.0, Floor), Err(BigIntError::NonPositiveLog));
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(BigInt::one().is_power_of_two());
        assert!(big("18446744073709551616").is_power_of_two());
        assert!(!big("-18446744073709551616").is_power_of_two());
        assert!(!BigInt::new().is_power_of_two());
        assert!(!BigInt::from(12u32).is_power_of_two());
    }
}
