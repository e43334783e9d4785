use std::fmt::{Debug, Formatter};
use std::num::{ParseIntError, TryFromIntError};

use ethers::types::U256;
use serde::Deserialize;
use thiserror::Error;

use crate::{ChainCommunicationError, ChainResult};

/// Coerce a `U256` read from the chain into the `i64` domain of an integer
/// gauge.
///
/// Values above `i64::MAX` (9_223_372_036_854_775_807, roughly 9.22e18 of the
/// token's smallest unit) saturate at `i64::MAX`. The gauges fed by this are
/// approximate health signals, not an accounting ledger, so the precision
/// loss at the top of the range is accepted.
pub fn u256_as_gauge_int(value: U256) -> i64 {
    if value > U256::from(i64::MAX as u64) {
        i64::MAX
    } else {
        value.as_u64() as i64
    }
}

/// Decode a big-endian unsigned integer out of a contract call response.
/// Accepts 1..=32 bytes; anything else is a malformed response.
pub fn decode_be_uint(data: &[u8]) -> ChainResult<U256> {
    if data.is_empty() || data.len() > 32 {
        return Err(ChainCommunicationError::MalformedResponse(format!(
            "expected 1..=32 bytes of uint data, got {}",
            data.len()
        )));
    }
    Ok(U256::from_big_endian(data))
}

/// An error when parsing a StrOrInt type as an integer value.
#[derive(Error, Debug)]
pub enum StrOrIntParseError {
    /// The string is not a valid integer
    #[error("Invalid integer provided as a string: {0}")]
    StrParse(#[from] ParseIntError),
    /// The provided integer does not match the type requirements.
    #[error("Provided number is an invalid integer: {0}")]
    InvalidInt(#[from] TryFromIntError),
}

/// A type which can be used for parsing configs that may be provided as a
/// string or an integer but will ultimately be read as an integer. E.g. where
/// `"loopIntervalMs": "60000"` and `"loopIntervalMs": 60000` should both be
/// considered valid.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum StrOrInt {
    /// The parsed type is a string
    Str(String),
    /// The parsed type is an integer
    Int(i64),
}

impl Debug for StrOrInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StrOrInt::Str(v) => write!(f, "\"{v}\""),
            StrOrInt::Int(v) => write!(f, "{}", *v),
        }
    }
}

impl From<i64> for StrOrInt {
    fn from(value: i64) -> Self {
        StrOrInt::Int(value)
    }
}

impl From<&str> for StrOrInt {
    fn from(value: &str) -> Self {
        StrOrInt::Str(value.to_owned())
    }
}

macro_rules! convert_to {
    ($t:ty) => {
        impl TryFrom<StrOrInt> for $t {
            type Error = StrOrIntParseError;

            fn try_from(v: StrOrInt) -> Result<Self, Self::Error> {
                (&v).try_into()
            }
        }

        impl TryFrom<&StrOrInt> for $t {
            type Error = StrOrIntParseError;

            fn try_from(v: &StrOrInt) -> Result<Self, Self::Error> {
                Ok(match v {
                    StrOrInt::Str(s) => s.parse()?,
                    StrOrInt::Int(i) => (*i).try_into()?,
                })
            }
        }
    };
}

convert_to!(u16);
convert_to!(u32);
convert_to!(u64);
