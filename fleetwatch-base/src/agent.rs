use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Report, Result};
use futures_util::future::select_all;
use tokio::task::JoinHandle;
use tracing::instrument::Instrumented;
use tracing::{info_span, Instrument};

use fleetwatch_core::FleetProvider;

use crate::{cancel_task, metrics::CoreMetrics, settings::Settings};

/// Properties shared across all fleetwatch agents
#[derive(Debug)]
pub struct AgentCore {
    /// A boxed connection to the chain the fleet lives on
    pub provider: Arc<dyn FleetProvider>,
    /// Prometheus metrics
    pub metrics: Arc<CoreMetrics>,
    /// Settings this agent was created with
    pub settings: Settings,
}

/// A fundamental agent which does not make any assumptions about the tools
/// which are used.
#[async_trait]
pub trait BaseAgent: Send + Sync + Debug {
    /// The agent's name
    const AGENT_NAME: &'static str;

    /// The settings object for this agent
    type Settings;

    /// Instantiate the agent from the standard settings object
    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized;

    /// Start running this agent.
    #[allow(clippy::async_yields_async)]
    async fn run(&self) -> Instrumented<JoinHandle<Result<()>>>;
}

/// A trait for a fleetwatch agent.
/// Adds assumptions for the metric and provider methods.
///
/// To use the default implementation you must `impl AsRef<AgentCore>`
pub trait Agent: BaseAgent {
    /// Return a handle to the metrics registry
    fn metrics(&self) -> Arc<CoreMetrics>;

    /// Return a handle to the chain provider
    fn provider(&self) -> Arc<dyn FleetProvider>;

    /// Return a reference to the settings the agent was created with
    fn settings(&self) -> &Settings;
}

impl<B> Agent for B
where
    B: BaseAgent + AsRef<AgentCore>,
{
    fn metrics(&self) -> Arc<CoreMetrics> {
        self.as_ref().metrics.clone()
    }

    fn provider(&self) -> Arc<dyn FleetProvider> {
        self.as_ref().provider.clone()
    }

    fn settings(&self) -> &Settings {
        &self.as_ref().settings
    }
}

/// Utility to run multiple tasks and shutdown if any one task ends.
#[allow(clippy::unit_arg, unused_must_use)]
pub fn run_all(
    tasks: Vec<Instrumented<JoinHandle<Result<(), Report>>>>,
) -> Instrumented<JoinHandle<Result<()>>> {
    let span = info_span!("run_all");
    tokio::spawn(async move {
        let (res, _, remaining) = select_all(tasks).await;

        for task in remaining.into_iter() {
            cancel_task!(task);
        }

        res?
    })
    .instrument(span)
}
