//! Mock implementations of the fleetwatch capability traits, for writing
//! agent tests with no network access.

// Forbid unsafe code outside of tests
#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(unused_extern_crates)]

/// Mock capability implementations
pub mod mocks;
