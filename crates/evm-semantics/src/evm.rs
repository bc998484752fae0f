use crate::{
    config::ChainConfig,
    primitives::{
        BlockEnv,
        EVMError,
        ResultAndState,
        TxEnv,
    },
};

use alloy_evm::EvmEnv;

use revm::{
    Context,
    Database,
    ExecuteEvm,
    MainBuilder,
    MainContext,
    context::CfgEnv,
};

/// Builds an EVM environment.
/// The `chain_id` is used to set the chain ID in the EVM environment.
/// The `spec_id` is used to set the spec ID in the EVM environment.
/// The `block_env` is used to set the block environment in the EVM environment.
pub fn evm_env<Spec>(chain_id: u64, spec_id: Spec, block_env: BlockEnv) -> EvmEnv<Spec>
where
    Spec: Default,
{
    let mut cfg_env = CfgEnv::default();
    cfg_env.chain_id = chain_id;
    cfg_env.spec = spec_id;
    EvmEnv { cfg_env, block_env }
}

/// Builds the environment of block `number` of the simulated chain.
pub fn chain_env(config: &ChainConfig, number: u64) -> EvmEnv {
    let block_env = BlockEnv {
        number,
        timestamp: number,
        gas_limit: config.block_gas_limit,
        ..Default::default()
    };
    evm_env(config.chain_id, config.spec_id, block_env)
}

/// Executes `tx_env` on a mainnet EVM built over `db`.
///
/// The resulting state changes are returned, never committed. Committing is up to the caller.
pub fn transact<DB>(
    db: DB,
    env: &EvmEnv,
    tx_env: TxEnv,
) -> Result<ResultAndState, EVMError<DB::Error>>
where
    DB: Database,
{
    let mut evm = Context::mainnet()
        .with_db(db)
        .with_cfg(env.cfg_env.clone())
        .with_block(env.block_env.clone())
        .build_mainnet();

    evm.transact(tx_env)
}
