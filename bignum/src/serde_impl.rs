//! Serde support: a `BigInt` travels as its decimal string.
//!
//! Integer tokens are accepted on input so hand-written JSON such as `42`
//! deserializes too.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::BigInt;

impl Serialize for BigInt {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
    type Value = BigInt;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal integer string")
    }

    fn visit_str<E>(self, v: &str) -> Result<BigInt, E>
    where
        E: de::Error,
    {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<BigInt, E>
    where
        E: de::Error,
    {
        Ok(BigInt::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<BigInt, E>
    where
        E: de::Error,
    {
        Ok(BigInt::from(v))
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D>(deserializer: D) -> Result<BigInt, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BigIntVisitor)
    }
}
