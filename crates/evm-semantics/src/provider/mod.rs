//! `provider`
//!
//! Providers submit simulated calls and deployments to a node and surface its failures as
//! [`CallError`]s. Revert data is decoded against the builtin errors only; callers which know
//! more error definitions decode it again, see [`CallError::redecode`].

mod local;
pub use local::LocalProvider;

mod rpc;
pub use rpc::RpcProvider;

use crate::{
    error::CallError,
    primitives::{
        Address,
        Bytes,
    },
    request::CallRequest,
};

/// A node able to execute simulated calls.
#[allow(async_fn_in_trait)]
pub trait CallProvider: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, CallError>;

    /// Executes `request` against the latest state without committing it, like `eth_call`.
    ///
    /// Creation requests return the runtime code the constructor would deploy.
    async fn call(&self, request: CallRequest) -> Result<Bytes, CallError>;

    /// Deploys the creation code of `request` and returns the address of the new contract.
    async fn deploy(&self, request: CallRequest) -> Result<Address, CallError>;
}
