use super::CallProvider;
use crate::{
    chain::SimulatedChain,
    config::ChainConfig,
    error::CallError,
    primitives::{
        Address,
        Bytes,
    },
    request::CallRequest,
};

use parking_lot::RwLock;

use std::sync::Arc;

/// Provider executing against an in-process [`SimulatedChain`].
///
/// Clones share the same chain.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    chain: Arc<RwLock<SimulatedChain>>,
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl LocalProvider {
    pub fn new(config: ChainConfig) -> Self {
        Self::from_chain(SimulatedChain::new(config))
    }

    pub fn from_chain(chain: SimulatedChain) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
        }
    }

    /// Shared handle to the underlying chain.
    pub fn chain(&self) -> Arc<RwLock<SimulatedChain>> {
        self.chain.clone()
    }
}

impl CallProvider for LocalProvider {
    async fn chain_id(&self) -> Result<u64, CallError> {
        Ok(self.chain.read().config().chain_id)
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, CallError> {
        self.chain.read().call(&request)
    }

    async fn deploy(&self, request: CallRequest) -> Result<Address, CallError> {
        self.chain.write().deploy(&request)
    }
}
