use crate::primitives::{
    Address,
    SpecId,
    U256,
    address,
};

/// Default sender of simulated calls and deployments on the local chain.
pub const DEFAULT_CALLER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// Contains the configuration for the simulated chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub spec_id: SpecId,
    /// Gas limit of the block every call executes in.
    pub block_gas_limit: u64,
    /// Gas limit applied to requests which do not carry one.
    pub call_gas_limit: u64,
    pub caller: Address,
    /// Balance the caller is funded with at genesis.
    pub caller_balance: U256,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            chain_id: 31337,
            spec_id: SpecId::PRAGUE,
            block_gas_limit: 30_000_000,
            call_gas_limit: 30_000_000,
            caller: DEFAULT_CALLER,
            // 10_000 ether
            caller_balance: U256::from(10_000_000_000_000_000_000_000u128),
        }
    }
}

impl ChainConfig {
    /// Set the chain id of the simulated chain
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the evm [`SpecId`] of the simulated chain
    pub fn with_spec_id(mut self, spec_id: SpecId) -> Self {
        self.spec_id = spec_id;
        self
    }

    /// Set the block gas limit
    pub fn with_block_gas_limit(mut self, gas_limit: u64) -> Self {
        self.block_gas_limit = gas_limit;
        self
    }

    /// Set the gas limit used for requests without an explicit one
    pub fn with_call_gas_limit(mut self, gas_limit: u64) -> Self {
        self.call_gas_limit = gas_limit;
        self
    }

    /// Set the default caller and its genesis balance
    pub fn with_caller(mut self, caller: Address, balance: U256) -> Self {
        self.caller = caller;
        self.caller_balance = balance;
        self
    }

    /// Gas limit a request is executed with. Capped by the block gas limit.
    pub fn effective_gas_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.call_gas_limit)
            .min(self.block_gas_limit)
    }
}
