//! Ethereum-backed implementation of the fleetwatch chain capability.

// Forbid unsafe code outside of tests
#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::prelude::{Http, Middleware, Provider, TransactionRequest, Ws};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{H160, U256};
use eyre::Result;

use fleetwatch_core::{ChainCommunicationError, ChainResult, FleetProvider};

/// Ethereum connection configuration
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Connection {
    /// HTTP connection details
    Http {
        /// Fully qualified string to connect to
        url: String,
    },
    /// Websocket connection details
    Ws {
        /// Fully qualified string to connect to
        url: String,
    },
}

impl Default for Connection {
    fn default() -> Self {
        Self::Http {
            url: Default::default(),
        }
    }
}

impl Connection {
    /// Try to convert this connection into a live fleet provider.
    pub async fn try_into_provider(&self) -> Result<Arc<dyn FleetProvider>> {
        Ok(match self {
            Connection::Http { url } => {
                let provider = Provider::<Http>::try_from(url.as_str())?;
                Arc::new(EthereumFleetProvider::new(Arc::new(provider)))
            }
            Connection::Ws { url } => {
                let ws = Ws::connect(url).await?;
                Arc::new(EthereumFleetProvider::new(Arc::new(Provider::new(ws))))
            }
        })
    }
}

/// A `FleetProvider` over any ethers middleware. Purely read-only; no signer
/// is ever attached.
#[derive(Debug, Clone)]
pub struct EthereumFleetProvider<M>
where
    M: Middleware,
{
    provider: Arc<M>,
}

impl<M> EthereumFleetProvider<M>
where
    M: Middleware,
{
    /// Wrap an existing middleware.
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<M> FleetProvider for EthereumFleetProvider<M>
where
    M: Middleware + 'static,
    M::Error: 'static,
{
    async fn get_balance(&self, address: H160) -> ChainResult<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(ChainCommunicationError::from_other)
    }

    async fn call(&self, to: H160, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let out = self
            .provider
            .call(&tx, None)
            .await
            .map_err(ChainCommunicationError::from_other)?;
        Ok(out.to_vec())
    }
}
