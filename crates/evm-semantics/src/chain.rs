use crate::{
    config::ChainConfig,
    error::CallError,
    evm::{
        chain_env,
        transact,
    },
    primitives::{
        AccountInfo,
        Address,
        Bytes,
        EvmExecutionResult,
        Output,
        U256,
        keccak256,
    },
    request::CallRequest,
    revert::ErrorRegistry,
};

use revm::{
    DatabaseCommit,
    DatabaseRef,
    database::{
        CacheDB,
        InMemoryDB,
    },
};

use tracing::{
    debug,
    instrument,
    trace,
};

/// In-process chain backing the local provider.
///
/// Deployments are committed and advance the block number. Calls execute on a throwaway overlay
/// of the current state, so repeating a call always observes the same state.
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    config: ChainConfig,
    db: InMemoryDB,
    block_number: u64,
}

impl SimulatedChain {
    /// Creates a chain at block 1 with the configured caller funded.
    pub fn new(config: ChainConfig) -> Self {
        let mut chain = Self {
            db: InMemoryDB::default(),
            block_number: 1,
            config,
        };
        chain.fund(chain.config.caller, chain.config.caller_balance);
        chain
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Sets the balance of `address`, keeping its nonce and code.
    pub fn fund(&mut self, address: Address, balance: U256) {
        let mut info = self.account(address).unwrap_or_else(|| {
            AccountInfo {
                balance: U256::ZERO,
                nonce: 0,
                code_hash: keccak256([]),
                code: None,
            }
        });
        info.balance = balance;
        self.db.insert_account_info(address, info);
    }

    pub fn nonce_of(&self, address: Address) -> u64 {
        self.account(address).map(|info| info.nonce).unwrap_or_default()
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.account(address)
            .map(|info| info.balance)
            .unwrap_or_default()
    }

    /// Runtime code deployed at `address`, empty if there is none.
    pub fn code_at(&self, address: Address) -> Bytes {
        let Some(info) = self.account(address) else {
            return Bytes::new();
        };
        match info.code {
            Some(code) => code.original_bytes(),
            None => {
                self.db
                    .code_by_hash_ref(info.code_hash)
                    .map(|code| code.original_bytes())
                    .unwrap_or_default()
            }
        }
    }

    fn account(&self, address: Address) -> Option<AccountInfo> {
        match self.db.basic_ref(address) {
            Ok(info) => info,
            Err(never) => match never {},
        }
    }

    /// Executes `request` without committing any state change.
    ///
    /// Returns the output of the call, or the runtime code for creation requests.
    #[instrument(
        level = "debug",
        skip_all,
        target = "chain::call",
        fields(create = request.is_create())
    )]
    pub fn call(&self, request: &CallRequest) -> Result<Bytes, CallError> {
        let sender = request.sender(&self.config);
        let tx_env = request.to_tx_env(&self.config, self.nonce_of(sender));
        let env = chain_env(&self.config, self.block_number);

        let mut overlay = CacheDB::new(&self.db);
        let result = transact(&mut overlay, &env, tx_env)
            .map_err(|err| CallError::Evm(err.to_string()))?;

        let output = into_output(result.result)?;
        trace!(target: "chain::call", output_len = output.data().len(), "Call succeeded");
        Ok(output.into_data())
    }

    /// Executes a creation request and commits the resulting state.
    ///
    /// Failed deployments leave the state untouched.
    #[instrument(level = "debug", skip_all, target = "chain::deploy")]
    pub fn deploy(&mut self, request: &CallRequest) -> Result<Address, CallError> {
        if !request.is_create() {
            return Err(CallError::NoContractAddress);
        }

        let sender = request.sender(&self.config);
        let tx_env = request.to_tx_env(&self.config, self.nonce_of(sender));
        let env = chain_env(&self.config, self.block_number);

        let result = transact(&mut self.db, &env, tx_env)
            .map_err(|err| CallError::Evm(err.to_string()))?;

        let Output::Create(_, Some(address)) = into_output(result.result)? else {
            return Err(CallError::NoContractAddress);
        };

        self.db.commit(result.state);
        self.block_number += 1;

        debug!(
            target: "chain::deploy",
            %address,
            block_number = self.block_number,
            "Contract deployed"
        );
        Ok(address)
    }
}

/// Maps an execution result to its output, or to the error a node would report.
///
/// Revert data is decoded with the builtin errors only.
fn into_output(result: EvmExecutionResult) -> Result<Output, CallError> {
    match result {
        EvmExecutionResult::Success { output, .. } => Ok(output),
        EvmExecutionResult::Revert { output, gas_used } => {
            debug!(target: "chain", gas_used, data = %output, "Execution reverted");
            Err(CallError::Revert {
                revert: ErrorRegistry::builtin().decode(&output),
                data: output,
            })
        }
        EvmExecutionResult::Halt { reason, gas_used } => {
            debug!(target: "chain", gas_used, ?reason, "Execution halted");
            Err(CallError::Halt { reason, gas_used })
        }
    }
}
