#![allow(non_snake_case)]

use async_trait::async_trait;
use mockall::*;

use ethers::types::{H160, U256};

use fleetwatch_core::{ChainResult, FleetProvider};

mock! {
    pub FleetProviderClient {
        pub fn _get_balance(&self, address: H160) -> ChainResult<U256>;

        pub fn _call(&self, to: H160, data: Vec<u8>) -> ChainResult<Vec<u8>>;
    }
}

impl std::fmt::Debug for MockFleetProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockFleetProviderClient")
    }
}

#[async_trait]
impl FleetProvider for MockFleetProviderClient {
    async fn get_balance(&self, address: H160) -> ChainResult<U256> {
        self._get_balance(address)
    }

    async fn call(&self, to: H160, data: Vec<u8>) -> ChainResult<Vec<u8>> {
        self._call(to, data)
    }
}
