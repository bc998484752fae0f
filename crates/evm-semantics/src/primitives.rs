pub use alloy_primitives::{
    Address,
    B256,
    Bytes,
    FixedBytes,
    Selector,
    TxKind,
    U256,
    address,
    b256,
    bytes,
    fixed_bytes,
    hex,
    keccak256,
};

pub use revm::{
    context::{
        BlockEnv,
        CfgEnv,
        TxEnv,
        result::{
            EVMError,
            ExecutionResult as EvmExecutionResult,
            HaltReason,
            OutOfGasError,
            Output,
            ResultAndState,
        },
    },
    primitives::hardfork::SpecId,
    state::{
        AccountInfo,
        Bytecode,
        EvmState,
    },
};

pub use alloy_dyn_abi::{
    DynSolType,
    DynSolValue,
};
pub use alloy_json_abi::JsonAbi;
