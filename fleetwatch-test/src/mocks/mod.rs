/// Mock fleet provider
pub mod provider;

pub use provider::MockFleetProviderClient;
