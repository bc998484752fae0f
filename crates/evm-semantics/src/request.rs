use crate::{
    config::ChainConfig,
    primitives::{
        Address,
        Bytes,
        TxEnv,
        TxKind,
        U256,
    },
};

use alloy_rpc_types::{
    TransactionInput,
    TransactionRequest,
};

/// A simulated call request, the `{ data, gasPrice, gasLimit }` object handed to `eth_call`.
///
/// A request without a `to` address executes `data` as contract creation code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

impl CallRequest {
    /// A request deploying `init_code`.
    pub fn create(init_code: impl Into<Bytes>) -> Self {
        Self {
            data: init_code.into(),
            ..Default::default()
        }
    }

    /// A request calling `to` with `data`.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }

    pub fn kind(&self) -> TxKind {
        match self.to {
            Some(to) => TxKind::Call(to),
            None => TxKind::Create,
        }
    }

    /// Converts the request into a revm [`TxEnv`].
    ///
    /// Missing fields are filled from `config`: the configured caller, the configured call gas
    /// limit and a zero gas price. `nonce` must be the current nonce of the sender.
    pub fn to_tx_env(&self, config: &ChainConfig, nonce: u64) -> TxEnv {
        TxEnv {
            caller: self.sender(config),
            kind: self.kind(),
            data: self.data.clone(),
            value: self.value,
            gas_limit: config.effective_gas_limit(self.gas_limit),
            gas_price: self.gas_price.unwrap_or_default(),
            nonce,
            chain_id: Some(config.chain_id),
            ..Default::default()
        }
    }

    /// The sender of the request, falling back to the configured caller.
    pub fn sender(&self, config: &ChainConfig) -> Address {
        self.from.unwrap_or(config.caller)
    }
}

impl From<CallRequest> for TransactionRequest {
    fn from(request: CallRequest) -> Self {
        TransactionRequest {
            from: request.from,
            to: request.to.map(TxKind::Call),
            input: TransactionInput::new(request.data),
            value: Some(request.value),
            gas_price: request.gas_price,
            gas: request.gas_limit,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{
        address,
        bytes,
    };

    #[test]
    fn test_create_request() {
        let request = CallRequest::create(bytes!("60006000fd"));
        assert!(request.is_create());
        assert_eq!(request.kind(), TxKind::Create);
        assert_eq!(request.gas_price, None);
        assert_eq!(request.gas_limit, None);
    }

    #[test]
    fn test_tx_env_defaults() {
        let config = ChainConfig::default().with_call_gas_limit(1_000_000);
        let to = address!("00000000000000000000000000000000000000aa");
        let tx_env = CallRequest::call(to, bytes!("deadbeef")).to_tx_env(&config, 3);

        assert_eq!(tx_env.caller, config.caller);
        assert_eq!(tx_env.kind, TxKind::Call(to));
        assert_eq!(tx_env.data, bytes!("deadbeef"));
        assert_eq!(tx_env.gas_limit, 1_000_000);
        assert_eq!(tx_env.gas_price, 0);
        assert_eq!(tx_env.nonce, 3);
        assert_eq!(tx_env.chain_id, Some(config.chain_id));
    }

    #[test]
    fn test_tx_env_overrides() {
        let config = ChainConfig::default();
        let from = address!("00000000000000000000000000000000000000bb");
        let tx_env = CallRequest::create(bytes!("00"))
            .with_from(from)
            .with_gas_price(7)
            .with_gas_limit(50_000)
            .with_value(U256::from(1))
            .to_tx_env(&config, 0);

        assert_eq!(tx_env.caller, from);
        assert_eq!(tx_env.kind, TxKind::Create);
        assert_eq!(tx_env.gas_limit, 50_000);
        assert_eq!(tx_env.gas_price, 7);
        assert_eq!(tx_env.value, U256::from(1));
    }

    #[test]
    fn test_into_transaction_request() {
        let request: TransactionRequest = CallRequest::create(bytes!("6000"))
            .with_gas_limit(21_000)
            .into();

        assert_eq!(request.to, None);
        assert_eq!(request.gas, Some(21_000));
        assert_eq!(request.gas_price, None);
        assert_eq!(request.input.input(), Some(&bytes!("6000")));
    }
}
