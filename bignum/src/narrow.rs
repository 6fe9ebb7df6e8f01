//! Narrowing to native integers and floats.
//!
//! Integer narrowing keeps the low bits of the two's-complement form, like
//! an `as` cast between primitive integers. Float narrowing rounds half to
//! even and saturates to infinity.

use crate::BigInt;

/// Layout of an IEEE 754 binary format.
struct FloatFormat {
    /// Significand bits including the implicit one.
    precision: u32,
    max_exp: u64,
    bias: u64,
}

const F64: FloatFormat = FloatFormat {
    precision: 53,
    max_exp: 1023,
    bias: 1023,
};

const F32: FloatFormat = FloatFormat {
    precision: 24,
    max_exp: 127,
    bias: 127,
};

impl BigInt {
    pub fn to_i8(&self) -> i8 {
        self.to_i32() as i8
    }

    pub fn to_i16(&self) -> i16 {
        self.to_i32() as i16
    }

    /// Low 32 bits of the two's-complement form.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// let v: BigInt = "-4294967297".parse().unwrap();
    /// assert_eq!(v.to_i32(), -1);
    /// ```
    pub fn to_i32(&self) -> i32 {
        let low = self.low_u32();
        if self.is_negative() {
            low.wrapping_neg() as i32
        } else {
            low as i32
        }
    }

    pub fn to_i64(&self) -> i64 {
        self.to_u64_wrapping() as i64
    }

    /// Low 64 bits of the two's-complement form, read as unsigned.
    pub fn to_u64_wrapping(&self) -> u64 {
        let low = self.low_u64();
        if self.is_negative() {
            low.wrapping_neg()
        } else {
            low
        }
    }

    /// Nearest `f64`, ties to even; infinite when out of range.
    ///
    /// ```
    /// use bignum::BigInt;
    ///
    /// // 2^53 + 1 sits halfway between two doubles and rounds to the even one.
    /// let v: BigInt = "9007199254740993".parse().unwrap();
    /// assert_eq!(v.to_f64(), 9007199254740992.0);
    /// ```
    pub fn to_f64(&self) -> f64 {
        let bits = self.bit_length_mag();
        let mag = if bits <= 64 {
            self.low_u64() as f64
        } else {
            let (exp, frac) = self.float_parts(bits, &F64);
            if exp > F64.max_exp {
                f64::INFINITY
            } else {
                f64::from_bits(((exp + F64.bias) << 52) | frac)
            }
        };
        if self.is_negative() {
            -mag
        } else {
            mag
        }
    }

    /// Nearest `f32`, ties to even; infinite when out of range.
    pub fn to_f32(&self) -> f32 {
        let bits = self.bit_length_mag();
        let mag = if bits <= 64 {
            self.low_u64() as f32
        } else {
            let (exp, frac) = self.float_parts(bits, &F32);
            if exp > F32.max_exp {
                f32::INFINITY
            } else {
                f32::from_bits((((exp + F32.bias) << 23) | frac) as u32)
            }
        };
        if self.is_negative() {
            -mag
        } else {
            mag
        }
    }

    /// Unbiased exponent and stored fraction of `|self|` rounded to `fmt`.
    /// `bits` is the magnitude's bit length, larger than the precision.
    fn float_parts(&self, bits: u64, fmt: &FloatFormat) -> (u64, u64) {
        // Significand plus one guard bit.
        let shift = bits - fmt.precision as u64 - 1;
        let top = self.mag_bits(shift, fmt.precision + 1);
        let guard = top & 1;
        let mut sig = top >> 1;
        let sticky = self.lowest_set_bit().is_some_and(|low| low < shift);
        if guard == 1 && (sticky || sig & 1 == 1) {
            sig += 1;
        }
        let mut exp = bits - 1;
        if sig >> fmt.precision != 0 {
            sig >>= 1;
            exp += 1;
        }
        (exp, sig & ((1 << (fmt.precision - 1)) - 1))
    }

    /// `count <= 64` bits of the magnitude starting at bit `shift`.
    pub(crate) fn mag_bits(&self, shift: u64, count: u32) -> u64 {
        let limbs = self.limbs();
        let idx = (shift / 32) as usize;
        let window = (0..3).fold(0u128, |acc, k| match limbs.get(idx + k) {
            Some(&l) => acc | (l as u128) << (32 * k),
            None => acc,
        });
        let window = window >> (shift % 32);
        (window & ((1u128 << count) - 1)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn test_integer_truncation() {
        let v = big("-1");
        assert_eq!(v.to_i8(), -1);
        assert_eq!(v.to_u64_wrapping(), u64::MAX);
        let v = big("4294967551"); // 2^32 + 255
        assert_eq!(v.to_i8(), -1);
        assert_eq!(v.to_i16(), 255);
        assert_eq!(v.to_i32(), 255);
        assert_eq!(v.to_i64(), 4294967551);
        let v = BigInt::from(i64::MIN);
        assert_eq!(v.to_i64(), i64::MIN);
        assert_eq!(v.to_i32(), 0);
        let v = big("-18446744073709551617"); // -(2^64 + 1)
        assert_eq!(v.to_i64(), -1);
    }

    #[test]
    fn test_f64_exact_and_rounded() {
        assert_eq!(BigInt::new().to_f64(), 0.0);
        assert_eq!(big("-12345").to_f64(), -12345.0);
        // 2^70 exactly
        assert_eq!(big("1180591620717411303424").to_f64(), 2f64.powi(70));
        // 2^70 + 2^17: exactly halfway, ties to the even significand 2^70
        assert_eq!(big("1180591620717411434496").to_f64(), 2f64.powi(70));
        // one more sets the sticky bit and rounds up
        assert_eq!(
            big("1180591620717411434497").to_f64(),
            2f64.powi(70) + 2f64.powi(18)
        );
    }

    #[test]
    fn test_f64_carry_into_exponent() {
        // 2^80 - 1 rounds up to 2^80
        let mut v = BigInt::one();
        v.shl(80).unwrap();
        v.sub_u32(1).unwrap();
        assert_eq!(v.to_f64(), 2f64.powi(80));
        v.neg();
        assert_eq!(v.to_f32(), -(2f32.powi(80)));
    }

    #[test]
    fn test_saturation() {
        let mut v = BigInt::one();
        v.shl(1024).unwrap();
        assert_eq!(v.to_f64(), f64::INFINITY);
        v.neg();
        assert_eq!(v.to_f64(), f64::NEG_INFINITY);
        let mut v = BigInt::one();
        v.shl(128).unwrap();
        assert_eq!(v.to_f32(), f32::INFINITY);
        v.sub_u32(1).unwrap();
        // rounds up past f32::MAX
        assert_eq!(v.to_f32(), f32::INFINITY);
        let mut v = BigInt::one();
        v.shl(1023).unwrap();
        assert_eq!(v.to_f64(), 2f64.powi(1023));
    }
}
