use super::CallProvider;
use crate::{
    error::CallError,
    primitives::{
        Address,
        Bytes,
    },
    request::CallRequest,
    revert::ErrorRegistry,
};

use alloy_provider::{
    Provider,
    ProviderBuilder,
    RootProvider,
};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportError;

use tracing::{
    debug,
    instrument,
};

use url::Url;

/// Provider talking to a JSON-RPC node.
///
/// Deployments are sent with `eth_sendTransaction`, so the node must manage the deployer account.
#[derive(Debug, Clone)]
pub struct RpcProvider {
    provider: RootProvider,
    deployer: Option<Address>,
}

impl RpcProvider {
    /// Connects to `rpc_url` over http or ws.
    pub async fn connect(rpc_url: &str) -> Result<Self, CallError> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|err| CallError::Transport(err.to_string()))?;
        Ok(Self::new(provider.root().clone()))
    }

    /// Http provider, no connection is made until the first request.
    pub fn connect_http(url: Url) -> Self {
        Self::new(ProviderBuilder::new().connect_http(url).root().clone())
    }

    pub fn new(provider: RootProvider) -> Self {
        Self {
            provider,
            deployer: None,
        }
    }

    /// Account deploying contracts. Defaults to the first account reported by the node.
    pub fn with_deployer(mut self, deployer: Address) -> Self {
        self.deployer = Some(deployer);
        self
    }

    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    async fn deployer(&self) -> Result<Address, CallError> {
        if let Some(deployer) = self.deployer {
            return Ok(deployer);
        }
        let accounts = self.provider.get_accounts().await.map_err(rpc_error)?;
        accounts.first().copied().ok_or_else(|| {
            CallError::Transport("node does not manage any account".to_string())
        })
    }
}

impl CallProvider for RpcProvider {
    async fn chain_id(&self) -> Result<u64, CallError> {
        self.provider.get_chain_id().await.map_err(rpc_error)
    }

    #[instrument(level = "debug", skip_all, target = "provider::rpc")]
    async fn call(&self, request: CallRequest) -> Result<Bytes, CallError> {
        let tx: TransactionRequest = request.into();
        self.provider.call(tx).await.map_err(rpc_error)
    }

    #[instrument(level = "debug", skip_all, target = "provider::rpc")]
    async fn deploy(&self, request: CallRequest) -> Result<Address, CallError> {
        let from = match request.from {
            Some(from) => from,
            None => self.deployer().await?,
        };
        let request = request.with_from(from);

        // Simulate first, a mined revert carries no revert data.
        self.call(request.clone()).await?;

        let receipt = self
            .provider
            .send_transaction(request.into())
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(|err| CallError::Transport(err.to_string()))?;

        if !receipt.status() {
            return Err(CallError::Revert {
                revert: None,
                data: Bytes::new(),
            });
        }

        let address = receipt.contract_address.ok_or(CallError::NoContractAddress)?;
        debug!(
            target: "provider::rpc",
            %address,
            tx_hash = %receipt.transaction_hash,
            "Contract deployed"
        );
        Ok(address)
    }
}

/// Maps a JSON-RPC failure to a [`CallError`].
///
/// Error responses carrying revert data become [`CallError::Revert`], other error responses
/// [`CallError::Node`].
fn rpc_error(err: TransportError) -> CallError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            return CallError::Revert {
                revert: ErrorRegistry::builtin().decode(&data),
                data,
            };
        }
        return CallError::Node {
            code: payload.code,
            message: payload.message.to_string(),
        };
    }
    CallError::Transport(err.to_string())
}
