//! Multiplication strategy thresholds and the accelerated-backend hook.
//!
//! Thresholds are limb counts. Every strategy produces the same result, so
//! they only trade speed. The defaults pick Karatsuba once both operands
//! reach 84 limbs and the product 162 limbs, and split the top Karatsuba
//! level across threads from 240 and 3000 limbs respectively.
//!
//! An accelerated backend can be installed with [`MulConfig::with_backend`].
//! It is offered every product whose shorter operand reaches
//! `accel_threshold` limbs and may decline; the portable path is used
//! otherwise. No backend is installed by default.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;

/// An alternate multiplication routine for large operands.
pub trait MulBackend: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Multiply magnitudes `a` and `b` into `out`, which is zeroed and holds
    /// exactly `a.len() + b.len()` limbs. Return `false` to decline; `out`
    /// is then discarded.
    fn mul(&self, a: &[u32], b: &[u32], out: &mut [u32]) -> bool;
}

/// Tunables for [`BigInt::mul_with`](crate::BigInt::mul_with) and
/// [`BigInt::square_with`](crate::BigInt::square_with).
#[derive(Clone)]
pub struct MulConfig {
    /// Both operands must have at least this many limbs for Karatsuba.
    pub karatsuba_threshold: usize,
    /// The product must have at least this many limbs for Karatsuba.
    pub karatsuba_product_threshold: usize,
    /// Operand limbs from which squaring switches to Karatsuba.
    pub square_threshold: usize,
    /// Both operands must have at least this many limbs for the parallel split.
    pub parallel_threshold: usize,
    /// The product must have at least this many limbs for the parallel split.
    pub parallel_product_threshold: usize,
    /// Shorter-operand limbs from which the backend is consulted.
    pub accel_threshold: usize,
    backend: Option<Arc<dyn MulBackend>>,
}

/// Smallest operand Karatsuba will split; below this it always falls back
/// to schoolbook, whatever the configured thresholds say.
pub(crate) const KARATSUBA_MIN: usize = 32;

const DEFAULT_ACCEL_THRESHOLD: usize = 15;

static GLOBAL: Lazy<MulConfig> = Lazy::new(MulConfig::from_env);

impl Default for MulConfig {
    fn default() -> Self {
        Self {
            karatsuba_threshold: 84,
            karatsuba_product_threshold: 162,
            square_threshold: 768,
            parallel_threshold: 240,
            parallel_product_threshold: 3000,
            accel_threshold: DEFAULT_ACCEL_THRESHOLD,
            backend: None,
        }
    }
}

impl MulConfig {
    /// Configuration that never leaves the portable path.
    pub fn pure() -> Self {
        Self::default()
    }

    /// Defaults overridden by environment variables:
    ///
    /// - `BIGNUM_KARATSUBA_THRESHOLD`, `BIGNUM_KARATSUBA_PRODUCT_THRESHOLD`
    /// - `BIGNUM_SQUARE_THRESHOLD`
    /// - `BIGNUM_PARALLEL_THRESHOLD`, `BIGNUM_PARALLEL_PRODUCT_THRESHOLD`
    /// - `BIGNUM_ACCEL_THRESHOLD`
    /// - `BIGNUM_NO_ACCEL`: any value but `false` disables backends
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let d = Self::default();
        let mut cfg = Self {
            karatsuba_threshold: env_threshold("BIGNUM_KARATSUBA_THRESHOLD", d.karatsuba_threshold),
            karatsuba_product_threshold: env_threshold(
                "BIGNUM_KARATSUBA_PRODUCT_THRESHOLD",
                d.karatsuba_product_threshold,
            ),
            square_threshold: env_threshold("BIGNUM_SQUARE_THRESHOLD", d.square_threshold),
            parallel_threshold: env_threshold("BIGNUM_PARALLEL_THRESHOLD", d.parallel_threshold),
            parallel_product_threshold: env_threshold(
                "BIGNUM_PARALLEL_PRODUCT_THRESHOLD",
                d.parallel_product_threshold,
            ),
            accel_threshold: env_threshold("BIGNUM_ACCEL_THRESHOLD", d.accel_threshold),
            backend: None,
        };
        if let Ok(v) = std::env::var("BIGNUM_NO_ACCEL") {
            if v != "false" {
                cfg.accel_threshold = usize::MAX;
            }
        }
        debug!("multiplication config from environment: {cfg:?}");
        cfg
    }

    /// Process-wide configuration used by [`BigInt::mul`](crate::BigInt::mul)
    /// and [`BigInt::square`](crate::BigInt::square). Read from the
    /// environment on first use.
    pub fn global() -> &'static MulConfig {
        &GLOBAL
    }

    /// Install an accelerated backend.
    pub fn with_backend(mut self, backend: Arc<dyn MulBackend>) -> Self {
        debug!(
            "multiplication backend {:?} installed from {} limbs",
            backend.name(),
            self.accel_threshold
        );
        self.backend = Some(backend);
        self
    }

    pub fn backend(&self) -> Option<&dyn MulBackend> {
        self.backend.as_deref()
    }

    /// Backend to offer an operand pair whose shorter side has `min_len` limbs.
    pub(crate) fn backend_for(&self, min_len: usize) -> Option<&dyn MulBackend> {
        if min_len >= self.accel_threshold {
            self.backend()
        } else {
            None
        }
    }

    pub(crate) fn use_karatsuba(&self, min_len: usize, product_len: usize) -> bool {
        min_len >= self.karatsuba_threshold.max(KARATSUBA_MIN)
            && product_len >= self.karatsuba_product_threshold
    }

    pub(crate) fn use_parallel(&self, min_len: usize, product_len: usize) -> bool {
        min_len >= self.parallel_threshold.max(KARATSUBA_MIN)
            && product_len >= self.parallel_product_threshold
    }
}

fn env_threshold(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(v) => v,
            Err(e) => {
                warn!("ignoring {name}={raw:?}: {e}");
                default
            }
        },
        Err(_) => default,
    }
}

impl fmt::Debug for MulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulConfig")
            .field("karatsuba_threshold", &self.karatsuba_threshold)
            .field("karatsuba_product_threshold", &self.karatsuba_product_threshold)
            .field("square_threshold", &self.square_threshold)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("parallel_product_threshold", &self.parallel_product_threshold)
            .field("accel_threshold", &self.accel_threshold)
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}
