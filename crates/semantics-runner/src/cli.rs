//! Command-line configuration for the semantics runner.

use clap::Parser;
use evm_semantics::{
    ChainConfig,
    scenarios::SuiteOptions,
};
use url::Url;

/// Runs the revert reporting scenarios against a node.
///
/// Every flag can also be set through its `SEMANTICS_*` env var.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON-RPC endpoint of the node under test. Uses the in-process chain when omitted.
    #[arg(long, env = "SEMANTICS_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Chain id of the in-process chain.
    #[arg(long, env = "SEMANTICS_CHAIN_ID", default_value = "31337")]
    pub chain_id: u64,

    /// Gas limit of calls which do not set one, in-process chain only.
    #[arg(long, env = "SEMANTICS_CALL_GAS_LIMIT", default_value = "30000000")]
    pub call_gas_limit: u64,

    /// Times each scenario is run, results must be identical.
    #[arg(long, env = "SEMANTICS_REPEAT", default_value = "2")]
    pub repeat: usize,

    /// Also run the disabled scenarios.
    #[arg(long, env = "SEMANTICS_INCLUDE_DISABLED")]
    pub include_disabled: bool,

    /// Search the largest view call return length the node accepts.
    #[arg(long, env = "SEMANTICS_PROBE_RETURN_LENGTH")]
    pub probe_return_length: bool,

    /// Print a single JSON document instead of colored lines.
    #[arg(long, env = "SEMANTICS_JSON")]
    pub json: bool,
}

impl Args {
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig::default()
            .with_chain_id(self.chain_id)
            .with_call_gas_limit(self.call_gas_limit)
    }

    pub fn suite_options(&self) -> SuiteOptions {
        SuiteOptions {
            repeat: self.repeat,
            include_disabled: self.include_disabled,
        }
    }
}
