use std::error::Error as StdError;

use ethers::providers::ProviderError;

/// The result of reading from a chain.
pub type ChainResult<T> = Result<T, ChainCommunicationError>;

/// ChainCommunicationError contains errors returned when attempting to
/// read from a chain. The monitoring core treats every variant uniformly;
/// the distinction exists only for log readability.
#[derive(Debug, thiserror::Error)]
pub enum ChainCommunicationError {
    /// Provider Error
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    /// The node answered, but with something we could not interpret
    #[error("Malformed response from node: {0}")]
    MalformedResponse(String),
    /// Any other error; does not implement `From` to prevent
    /// conflicting/absorbing other errors.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl ChainCommunicationError {
    /// Create a chain communication error from any other existing error
    pub fn from_other<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }
}
