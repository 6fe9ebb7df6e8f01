//! Two's-complement byte import and export.
//!
//! The layout matches the usual interchange form: minimal length, with at
//! least one bit carrying the sign, in either byte order.

use crate::binary::negate_twos;
use crate::error::BigIntError;
use crate::BigInt;

/// Byte order of a two's-complement byte string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl BigInt {
    /// Minimal two's-complement bytes of the value.
    ///
    /// ```
    /// use bignum::{BigInt, Endian};
    ///
    /// assert_eq!(BigInt::from(-1i64).to_bytes(Endian::Big), vec![0xFF]);
    /// assert_eq!(BigInt::from(128u32).to_bytes(Endian::Big), vec![0x00, 0x80]);
    /// assert_eq!(BigInt::from(-129i64).to_bytes(Endian::Little), vec![0x7F, 0xFF]);
    /// ```
    pub fn to_bytes(&self, endian: Endian) -> Vec<u8> {
        let n = (self.bit_length() / 8 + 1) as usize;
        let nz = self.nz_limb();
        let mut out: Vec<u8> = (0..n)
            .map(|i| (self.twos_at(i / 4, nz) >> (8 * (i % 4))) as u8)
            .collect();
        if endian == Endian::Big {
            out.reverse();
        }
        out
    }

    /// Value of a two's-complement byte string. Empty input is zero.
    pub fn from_bytes(bytes: &[u8], endian: Endian) -> Result<BigInt, BigIntError> {
        let mut v = BigInt::new();
        v.assign_bytes(bytes, endian)?;
        Ok(v)
    }

    /// Load a two's-complement byte string into this value, reusing its
    /// buffer.
    pub fn assign_bytes(&mut self, bytes: &[u8], endian: Endian) -> Result<(), BigIntError> {
        let len = bytes.len();
        if len == 0 {
            self.set_zero();
            return Ok(());
        }
        let byte_at = |i: usize| match endian {
            Endian::Little => bytes[i],
            Endian::Big => bytes[len - 1 - i],
        };

        let n = len.div_ceil(4);
        self.reserve_limbs(n)?;
        let negative = byte_at(len - 1) & 0x80 != 0;

        // Sign-extend the top limb, then overlay the bytes.
        let limbs = &mut self.val[1..=n];
        limbs.fill(if negative { u32::MAX } else { 0 });
        for i in 0..len {
            let shift = 8 * (i % 4);
            let limb = &mut limbs[i / 4];
            *limb = (*limb & !(0xFF << shift)) | (byte_at(i) as u32) << shift;
        }
        if negative {
            negate_twos(limbs);
        }
        self.canonicalize(n, negative);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(BigInt::new().to_bytes(Endian::Big), vec![0]);
        assert!(BigInt::from_bytes(&[], Endian::Big).unwrap().is_zero());
        assert!(BigInt::from_bytes(&[0, 0, 0, 0, 0], Endian::Little)
            .unwrap()
            .is_zero());
    }

    #[test]
    fn test_sign_byte_is_added() {
        let v = BigInt::from(0x8000_0000u32);
        assert_eq!(v.to_bytes(Endian::Big), vec![0x00, 0x80, 0, 0, 0]);
        let v = BigInt::from(-0x8000_0000i64);
        assert_eq!(v.to_bytes(Endian::Big), vec![0x80, 0, 0, 0]);
    }

    #[test]
    fn test_negative_import() {
        let v = BigInt::from_bytes(&[0xFF, 0x00], Endian::Big).unwrap();
        assert_eq!(v, BigInt::from(-256i64));
        let v = BigInt::from_bytes(&[0x80], Endian::Little).unwrap();
        assert_eq!(v, BigInt::from(-128i64));
        let v = BigInt::from_bytes(&[0x00, 0x00, 0x00, 0x00, 0x80], Endian::Little).unwrap();
        assert_eq!(v.to_string(), "-549755813888");
    }

    #[test]
    fn test_multi_limb_negative() {
        let v: BigInt = "-340282366920938463463374607431768211456".parse().unwrap();
        let bytes = v.to_bytes(Endian::Big);
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], 0xFF);
        assert!(bytes[1..].iter().all(|&b| b == 0));
        assert_eq!(BigInt::from_bytes(&bytes, Endian::Big).unwrap(), v);
    }

    #[test]
    fn test_assign_bytes_reuses_buffer() {
        let mut v = BigInt::with_capacity(16).unwrap();
        let cap = v.capacity_limbs();
        v.assign_bytes(&[0x01, 0x02, 0x03, 0x04, 0x05], Endian::Big).unwrap();
        assert_eq!(v.limbs(), &[0x0203_0405, 0x01]);
        assert_eq!(v.capacity_limbs(), cap);
    }
}
