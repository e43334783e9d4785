//! A small framework for building fleetwatch agents: configuration loading,
//! prometheus metrics, tracing setup, and the agent run loop plumbing.

// Forbid unsafe code outside of tests
#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

pub mod settings;
pub use settings::Settings;

mod agent;
pub use agent::*;

mod metrics;
pub use metrics::*;

/// Macro helpers for declaring agents and their settings
pub mod macros;
