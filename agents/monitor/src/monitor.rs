use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use prometheus::{IntCounterVec, IntGaugeVec};
use tokio::{task::JoinHandle, time::sleep};
use tracing::instrument::Instrumented;
use tracing::{debug, info, info_span, warn, Instrument};

use fleetwatch_base::{decl_agent, run_all, Agent, AgentCore, BaseAgent, CoreMetrics};
use fleetwatch_core::{
    utils::{decode_be_uint, u256_as_gauge_int},
    Account, AccountRegistry, FleetProvider, SAFE_NONCE_SELECTOR,
};

decl_agent!(
    /// Watches a fixed fleet of accounts and exports their health as metrics
    Monitor {
        registry: AccountRegistry,
        interval: Duration,
        fetch_metrics: AccountFetcherMetrics,
    }
);

#[async_trait]
impl BaseAgent for Monitor {
    const AGENT_NAME: &'static str = "monitor";

    type Settings = crate::settings::MonitorSettings;

    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized,
    {
        let registry = AccountRegistry::from_confs(&settings.accounts)?;
        let interval = Duration::from_millis(
            settings
                .loopintervalms
                .as_ref()
                .map(u64::try_from)
                .transpose()?
                .unwrap_or(60_000),
        );
        let fetch_metrics = AccountFetcherMetrics::new(&metrics)?;
        let provider = settings.base.try_into_provider().await?;

        Ok(Self {
            registry,
            interval,
            fetch_metrics,
            core: AgentCore {
                provider,
                metrics,
                settings: settings.base,
            },
        })
    }

    #[allow(clippy::async_yields_async)]
    async fn run(&self) -> Instrumented<JoinHandle<Result<()>>> {
        let fetcher = AccountFetcher::new(
            self.provider(),
            self.registry.clone(),
            self.interval,
            self.fetch_metrics.clone(),
        );
        run_all(vec![fetcher.spawn()])
    }
}

/// The metrics the fetcher reports into. Names and labels are an observable
/// contract with the dashboards that consume them.
#[derive(Clone, Debug)]
pub(crate) struct AccountFetcherMetrics {
    /// Last observed native balance per account, in the token's smallest unit
    balances: IntGaugeVec,
    /// Last observed Safe nonce per contract account
    safe_nonces: IntGaugeVec,
    /// Failed RPC reads by section and operation
    unexpected_rpc_errors: IntCounterVec,
}

impl AccountFetcherMetrics {
    pub(crate) fn new(metrics: &CoreMetrics) -> Result<Self> {
        Ok(Self {
            balances: metrics.new_int_gauge(
                "balances",
                "Last observed balance of the account, in wei",
                &["address", "nickname"],
            )?,
            safe_nonces: metrics.new_int_gauge(
                "safeNonces",
                "Last observed nonce of the Safe contract account",
                &["address", "nickname"],
            )?,
            unexpected_rpc_errors: metrics.new_int_counter(
                "unexpectedRpcErrors",
                "Number of failed RPC reads, by section and operation",
                &["section", "name"],
            )?,
        })
    }
}

/// Walks the account registry on a fixed cadence and reports what it sees.
///
/// Every fetch failure is handled at the account-step level: it is logged,
/// counted, and the pass moves on. Gauges keep their previous value on
/// failure; only a successful read overwrites them. A new pass starts a
/// fixed delay after the previous one finished, so passes never overlap.
pub(crate) struct AccountFetcher {
    provider: Arc<dyn FleetProvider>,
    registry: AccountRegistry,
    interval: Duration,
    metrics: AccountFetcherMetrics,
}

impl AccountFetcher {
    pub(crate) fn new(
        provider: Arc<dyn FleetProvider>,
        registry: AccountRegistry,
        interval: Duration,
        metrics: AccountFetcherMetrics,
    ) -> Self {
        Self {
            provider,
            registry,
            interval,
            metrics,
        }
    }

    pub(crate) fn spawn(self) -> Instrumented<JoinHandle<Result<()>>> {
        let span = info_span!("AccountFetcher");
        tokio::spawn(self.main_task()).instrument(span)
    }

    async fn main_task(self) -> Result<()> {
        info!(
            accounts = self.registry.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting account fetch loop"
        );
        loop {
            self.tick().await;
            sleep(self.interval).await;
        }
    }

    /// One full pass over the registry, in input order, sequentially. There
    /// is no retry within a pass; the next scheduled pass re-attempts
    /// naturally.
    async fn tick(&self) {
        for account in self.registry.iter() {
            self.fetch_balance(account).await;
            if account.safe {
                self.fetch_safe_nonce(account).await;
            }
        }
    }

    async fn fetch_balance(&self, account: &Account) {
        let address = account.address_label();
        match self.provider.get_balance(account.address).await {
            Ok(balance) => {
                debug!(
                    address = %address,
                    nickname = %account.nickname,
                    %balance,
                    "Fetched account balance"
                );
                self.metrics
                    .balances
                    .with_label_values(&[&address, &account.nickname])
                    .set(u256_as_gauge_int(balance));
            }
            Err(err) => {
                warn!(
                    address = %address,
                    nickname = %account.nickname,
                    error = %err,
                    "Failed to fetch account balance"
                );
                self.metrics
                    .unexpected_rpc_errors
                    .with_label_values(&["balances", "getBalance"])
                    .inc();
            }
        }
    }

    async fn fetch_safe_nonce(&self, account: &Account) {
        let address = account.address_label();
        let nonce = self
            .provider
            .call(account.address, SAFE_NONCE_SELECTOR.to_vec())
            .await
            .and_then(|data| decode_be_uint(&data));
        match nonce {
            Ok(nonce) => {
                debug!(
                    address = %address,
                    nickname = %account.nickname,
                    %nonce,
                    "Fetched safe nonce"
                );
                self.metrics
                    .safe_nonces
                    .with_label_values(&[&address, &account.nickname])
                    .set(u256_as_gauge_int(nonce));
            }
            Err(err) => {
                warn!(
                    address = %address,
                    nickname = %account.nickname,
                    error = %err,
                    "Failed to fetch safe nonce"
                );
                self.metrics
                    .unexpected_rpc_errors
                    .with_label_values(&["safeNonce", "getSafeNonce"])
                    .inc();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use prometheus::core::Collector;
    use prometheus::Registry;

    use fleetwatch_core::{AccountConf, ChainCommunicationError, H160, U256};
    use fleetwatch_test::mocks::MockFleetProviderClient;

    use super::*;

    const ADDR_A: &str = "0x00000000000000000000000000000000000000aa";
    const ADDR_B: &str = "0x00000000000000000000000000000000000000bb";

    fn registry(entries: &[(&str, &str, bool)]) -> AccountRegistry {
        let confs: Vec<AccountConf> = entries
            .iter()
            .map(|(address, nickname, safe)| AccountConf {
                address: address.to_string(),
                nickname: nickname.to_string(),
                safe: *safe,
            })
            .collect();
        AccountRegistry::from_confs(&confs).unwrap()
    }

    fn fetcher(
        provider: MockFleetProviderClient,
        registry: AccountRegistry,
        interval: Duration,
    ) -> AccountFetcher {
        let metrics = CoreMetrics::new("monitor", None, Arc::new(Registry::new()));
        AccountFetcher::new(
            Arc::new(provider),
            registry,
            interval,
            AccountFetcherMetrics::new(&metrics).unwrap(),
        )
    }

    fn family_is_empty<C: Collector>(collector: &C) -> bool {
        collector.collect()[0].get_metric().is_empty()
    }

    #[tokio::test]
    async fn sets_balance_gauge_and_skips_nonce_for_plain_accounts() {
        let mut provider = MockFleetProviderClient::new();
        provider
            .expect__get_balance()
            .times(1)
            .returning(|_| Ok(U256::exp10(18)));
        // any contract call would be an unexpected mock invocation and panic

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_A, "alice", false)]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert_eq!(
            fetcher
                .metrics
                .balances
                .with_label_values(&[ADDR_A, "alice"])
                .get(),
            1_000_000_000_000_000_000
        );
        assert!(family_is_empty(&fetcher.metrics.safe_nonces));
        assert!(family_is_empty(&fetcher.metrics.unexpected_rpc_errors));
    }

    #[tokio::test]
    async fn failed_balance_read_still_probes_the_safe_nonce() {
        let mut provider = MockFleetProviderClient::new();
        provider
            .expect__get_balance()
            .times(1)
            .returning(|_| Err(ChainCommunicationError::MalformedResponse("boom".into())));
        provider
            .expect__call()
            .times(1)
            .withf(|_, data| data.as_slice() == SAFE_NONCE_SELECTOR.as_slice())
            .returning(|_, _| Ok(vec![0x05]));

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_B, "bob", true)]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert!(family_is_empty(&fetcher.metrics.balances));
        assert_eq!(
            fetcher
                .metrics
                .safe_nonces
                .with_label_values(&[ADDR_B, "bob"])
                .get(),
            5
        );
        assert_eq!(
            fetcher
                .metrics
                .unexpected_rpc_errors
                .with_label_values(&["balances", "getBalance"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn empty_account_list_is_a_noop_tick() {
        let fetcher = fetcher(
            MockFleetProviderClient::new(),
            registry(&[]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert!(family_is_empty(&fetcher.metrics.balances));
        assert!(family_is_empty(&fetcher.metrics.safe_nonces));
        assert!(family_is_empty(&fetcher.metrics.unexpected_rpc_errors));
    }

    #[tokio::test]
    async fn one_failing_account_does_not_block_the_next() {
        let mut provider = MockFleetProviderClient::new();
        let b: H160 = ADDR_B.parse().unwrap();
        provider
            .expect__get_balance()
            .times(2)
            .returning(move |address| {
                if address == b {
                    Ok(U256::from(7u64))
                } else {
                    Err(ChainCommunicationError::MalformedResponse("down".into()))
                }
            });

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_A, "alice", false), (ADDR_B, "bob", false)]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert_eq!(
            fetcher
                .metrics
                .balances
                .with_label_values(&[ADDR_B, "bob"])
                .get(),
            7
        );
        assert_eq!(
            fetcher
                .metrics
                .unexpected_rpc_errors
                .with_label_values(&["balances", "getBalance"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn oversized_nonce_payload_is_counted_as_an_error() {
        let mut provider = MockFleetProviderClient::new();
        provider
            .expect__get_balance()
            .times(1)
            .returning(|_| Ok(U256::one()));
        provider
            .expect__call()
            .times(1)
            .returning(|_, _| Ok(vec![0u8; 33]));

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_B, "bob", true)]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert!(family_is_empty(&fetcher.metrics.safe_nonces));
        assert_eq!(
            fetcher
                .metrics
                .unexpected_rpc_errors
                .with_label_values(&["safeNonce", "getSafeNonce"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn huge_balances_saturate_the_gauge() {
        let mut provider = MockFleetProviderClient::new();
        provider
            .expect__get_balance()
            .times(1)
            .returning(|_| Ok(U256::MAX));

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_A, "alice", false)]),
            Duration::from_secs(60),
        );
        fetcher.tick().await;

        assert_eq!(
            fetcher
                .metrics
                .balances
                .with_label_values(&[ADDR_A, "alice"])
                .get(),
            i64::MAX
        );
    }

    #[tokio::test(start_paused = true)]
    async fn passes_are_spaced_by_the_configured_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let seen = ticks.clone();

        let mut provider = MockFleetProviderClient::new();
        provider.expect__get_balance().returning(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(U256::one())
        });

        let fetcher = fetcher(
            provider,
            registry(&[(ADDR_A, "alice", false)]),
            Duration::from_secs(60),
        );
        let handle = tokio::spawn(fetcher.main_task());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
