use crate::{
    primitives::{
        Bytes,
        HaltReason,
        hex,
    },
    revert::{
        ErrorRegistry,
        RevertError,
    },
};

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a simulated call or deployment, as surfaced by a node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error(
        "execution reverted{}",
        .revert.as_ref().map(|revert| format!(": {revert}")).unwrap_or_default()
    )]
    Revert {
        /// The decoded error, if the revert data matched a known error definition.
        revert: Option<RevertError>,
        /// The raw revert data.
        data: Bytes,
    },
    #[error("execution halted: {}", halt_message(.reason))]
    Halt { reason: HaltReason, gas_used: u64 },
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("deployment did not create a contract")]
    NoContractAddress,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("evm error: {0}")]
    Evm(String),
}

impl CallError {
    /// The decoded revert, if the call reverted with recognised data.
    pub fn revert(&self) -> Option<&RevertError> {
        match self {
            CallError::Revert { revert, .. } => revert.as_ref(),
            _ => None,
        }
    }

    /// The raw revert data, if the call reverted.
    pub fn revert_data(&self) -> Option<&Bytes> {
        match self {
            CallError::Revert { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Whether execution ran out of gas, either halted locally or as reported by a node.
    pub fn is_out_of_gas(&self) -> bool {
        match self {
            CallError::Halt { reason, .. } => matches!(reason, HaltReason::OutOfGas(_)),
            CallError::Node { message, .. } => message.to_lowercase().contains("out of gas"),
            _ => false,
        }
    }

    /// Human readable error message, as a node would put it in its error object.
    pub fn message(&self) -> String {
        match self {
            CallError::Node { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Decodes the revert data again using `registry`.
    ///
    /// Non revert errors are returned unchanged. A previously decoded revert is only replaced
    /// when the registry recognises the data.
    pub fn redecode(self, registry: &ErrorRegistry) -> Self {
        match self {
            CallError::Revert { revert, data } => {
                let revert = registry.decode(&data).or(revert);
                CallError::Revert { revert, data }
            }
            other => other,
        }
    }
}

fn halt_message(reason: &HaltReason) -> String {
    match reason {
        HaltReason::OutOfGas(kind) => format!("out of gas ({kind:?})"),
        other => format!("{other:?}"),
    }
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Artifact has no bytecode")]
    MissingBytecode,
    #[error("Artifact bytecode is not valid hex: {0}")]
    InvalidBytecode(#[from] hex::FromHexError),
    #[error("Function {0} not found in artifact abi")]
    UnknownFunction(String),
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Abi error: {0}")]
    Abi(#[from] alloy_dyn_abi::Error),
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to assemble fixture {name}: {reason}")]
    Assembly { name: &'static str, reason: String },
    #[error("Fixture abi is invalid: {0}")]
    Abi(String),
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("No artifact registered under {0}")]
    UnknownArtifact(String),
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("Call error: {0}")]
    Call(#[from] CallError),
    #[error("Expected the call to revert, but it returned 0x{}", hex::encode(.output))]
    NoRevert { output: Bytes },
    #[error("Call reverted with unrecognised data 0x{}", hex::encode(.data))]
    UndecodedRevert { data: Bytes },
    #[error("Expected a revert, got: {0}")]
    UnexpectedFailure(CallError),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Harness error: {0}")]
    Harness(#[from] HarnessError),
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("{scenario}: expected {field} to be {expected}, got {actual}")]
    Mismatch {
        scenario: &'static str,
        field: &'static str,
        expected: String,
        actual: String,
    },
    #[error("{scenario}: attempt {attempt} produced a different result than the first attempt")]
    NotIdempotent {
        scenario: &'static str,
        attempt: usize,
    },
}
