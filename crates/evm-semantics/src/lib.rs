//! `evm-semantics`
//!
//! Probes how a node reports failures of read-only simulated calls.
//!
//! Fixture contracts revert in controlled ways, either in their constructor or in a view
//! function. The [`Harness`] submits them through a [`CallProvider`] and checks that the node
//! surfaces a structured [`RevertError`] with the expected name and arguments. Plain
//! `Error(string)` reverts and custom typed errors must stay distinguishable.
//!
//! Two providers are available: [`LocalProvider`] executes against an in-process revm chain,
//! [`RpcProvider`] talks to any JSON-RPC node through alloy.

mod error;
pub use error::{
    ArtifactError,
    CallError,
    FixtureError,
    HarnessError,
    ScenarioError,
};

mod config;
pub use config::ChainConfig;

pub mod primitives;

pub mod evm;

mod request;
pub use request::CallRequest;

mod chain;
pub use chain::SimulatedChain;

pub mod revert;
pub use revert::{
    ErrorRegistry,
    RevertError,
};

pub mod artifact;
pub use artifact::ContractArtifact;

pub mod fixtures;

pub mod provider;
pub use provider::{
    CallProvider,
    LocalProvider,
    RpcProvider,
};

mod harness;
pub use harness::Harness;

pub mod scenarios;

#[cfg(any(test, feature = "test"))]
pub mod test_utils;
