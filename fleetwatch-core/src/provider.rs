use std::fmt::Debug;

use async_trait::async_trait;
use ethers::types::{H160, U256};

use crate::ChainResult;

/// 4-byte selector of the Safe contract's `nonce()` accessor,
/// `keccak256("nonce()")[0..4]`.
pub const SAFE_NONCE_SELECTOR: [u8; 4] = [0xaf, 0xfe, 0xd0, 0xe0];

/// Read-only interface to the chain the fleet lives on. Implementations may
/// block while awaiting a network round trip; any timeout is theirs to
/// enforce.
#[async_trait]
pub trait FleetProvider: Send + Sync + Debug {
    /// Query the native-token balance of an account, in the token's smallest
    /// unit.
    async fn get_balance(&self, address: H160) -> ChainResult<U256>;

    /// Perform a read-only contract call against `to` with the given call
    /// data, returning the raw response bytes.
    async fn call(&self, to: H160, data: Vec<u8>) -> ChainResult<Vec<u8>>;
}
