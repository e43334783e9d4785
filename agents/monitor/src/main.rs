//! The monitor watches a fixed fleet of accounts and reports their native
//! balance, and the nonce of Safe contract accounts, as prometheus metrics.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

use eyre::Result;

use fleetwatch_base::BaseAgent;

use crate::monitor::Monitor;

mod monitor;
mod settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let settings = settings::MonitorSettings::new()?;
    let metrics = settings.base.try_into_metrics(Monitor::AGENT_NAME)?;
    settings.base.tracing.start_tracing()?;
    let agent = Monitor::from_settings(settings, metrics.clone()).await?;
    let _ = metrics.run_http_server();

    agent.run().await.await??;
    Ok(())
}
