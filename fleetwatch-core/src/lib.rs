//! Core primitives shared by fleetwatch agents: the account registry, the
//! chain capability traits they poll through, and the common error types.

// Forbid unsafe code outside of tests
#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

mod accounts;
mod error;
mod provider;

/// Config parsing and gauge coercion helpers
pub mod utils;

pub use accounts::*;
pub use error::*;
pub use provider::*;
pub use utils::{StrOrInt, StrOrIntParseError};

pub use ethers::types::{H160, U256};
