//! Arbitrary-precision signed integers over a reusable limb buffer.
//!
//! [`BigInt`] keeps its magnitude in a length-prefixed `Vec<u32>` and mutates
//! in place: every operation takes `&mut self` and only reallocates when the
//! result outgrows the buffer. Growth past [`MAX_LIMBS`] is reported as
//! [`BigIntError::CapacityOverflow`] instead of wrapping.
//!
//! ```
//! use bignum::BigInt;
//!
//! let mut v: BigInt = "1000000000000000000000".parse().unwrap();
//! let r = v.div_rem_u32(7);
//! assert_eq!(r, 6);
//!
//! let mut a = BigInt::from(-1i64);
//! a.and(&BigInt::from(5u32)).unwrap();
//! assert_eq!(a.to_string(), "5");
//! ```
//!
//! Multiplication picks schoolbook, Karatsuba or parallel Karatsuba by
//! operand size; see [`MulConfig`] for the thresholds and the hook for an
//! accelerated backend.

pub mod error;
mod storage;

mod add;
mod binary;
mod bits;
mod bytes;
mod cmp;
pub mod config;
mod decimal;
mod div;
mod math;
mod mul;
mod narrow;
mod serde_impl;

pub use bytes::Endian;
pub use config::{MulBackend, MulConfig};
pub use div::DivScratch;
pub use error::BigIntError;
pub use math::RoundingMode;
pub use storage::{BigInt, MAX_LIMBS};
