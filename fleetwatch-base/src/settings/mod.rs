//! Settings and configuration for fleetwatch agents
//!
//! ## Introduction
//!
//! All agents share the [`Settings`] struct in this crate: the RPC connection
//! for the chain being monitored, the metrics listen port, and the tracing
//! configuration. Each agent then declares its own additions in its crate's
//! `settings.rs` using the [`decl_settings!`](crate::decl_settings) macro.
//!
//! ### Configuration
//!
//! Agents read settings from config files and/or env.
//!
//! Configuration key/value pairs are loaded in the following order, with
//! later sources taking precedence:
//!
//! 1. Every `*.json` file in the `./config` directory, when present.
//! 2. The files named by the `CONFIG_FILES` env var (comma separated).
//! 3. Configuration env vars with the prefix `FW_BASE`, intended to be
//!    shared by multiple agents in the same environment.
//!    E.g. `export FW_BASE_RPC_URL=http://localhost:8545`
//! 4. Configuration env vars with the prefix `FW_{agent name}`, intended to
//!    be used by a specific agent.
//!    E.g. `export FW_MONITOR_LOOPINTERVALMS=30000`
//!
//! Env variable names correspond 1:1 with the config file's JSON object
//! hierarchy, with `_` as the path separator.
//!
//! A config that cannot be deserialized into the typed settings structs is a
//! fatal startup error: the agent reports it and exits non-zero before any
//! work is scheduled.

use std::sync::Arc;

use eyre::Result;
use prometheus::Registry;

use fleetwatch_core::{FleetProvider, StrOrInt};
pub use fleetwatch_ethereum::Connection;

use crate::CoreMetrics;

pub use trace::TracingConfig;

mod loader;
pub(crate) use loader::load_settings_object;

/// Tracing subscriber management
pub mod trace;

/// Settings shared by all agents.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// The RPC connection for the chain the fleet lives on
    #[serde(default)]
    pub rpc: Connection,
    /// Port to listen for prometheus scrapes on; metrics exposition is
    /// disabled when unset
    pub metrics: Option<StrOrInt>,
    /// The tracing configuration
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl Settings {
    /// Try to connect to the configured chain.
    pub async fn try_into_provider(&self) -> Result<Arc<dyn FleetProvider>> {
        self.rpc.try_into_provider().await
    }

    /// Try to generate an agent core metrics object.
    pub fn try_into_metrics(&self, name: &str) -> Result<Arc<CoreMetrics>> {
        let port = self
            .metrics
            .as_ref()
            .map(u16::try_from)
            .transpose()?;
        Ok(Arc::new(CoreMetrics::new(
            name,
            port,
            Arc::new(Registry::new()),
        )))
    }
}
