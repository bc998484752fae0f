//! Compiled contract artifacts.
//!
//! Artifacts are read from the JSON files written by Hardhat (`"bytecode": "0x…"`) or Foundry
//! (`"bytecode": { "object": "0x…" }`), or built in memory, see [`crate::fixtures`].

use crate::{
    error::ArtifactError,
    primitives::{
        Bytes,
        DynSolType,
        DynSolValue,
        JsonAbi,
        hex,
    },
    request::CallRequest,
};

use alloy_dyn_abi::JsonAbiExt;
use alloy_json_abi::{
    Function,
    Param,
};

use serde::Deserialize;

use std::path::Path;

/// ABI and creation code of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    pub name: String,
    pub abi: JsonAbi,
    /// Creation code, without constructor arguments.
    pub bytecode: Bytes,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    abi: JsonAbi,
    bytecode: Option<RawBytecode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(String),
    Foundry { object: String },
}

impl RawBytecode {
    fn as_hex(&self) -> &str {
        match self {
            RawBytecode::Hardhat(hex) => hex,
            RawBytecode::Foundry { object } => object,
        }
    }
}

impl ContractArtifact {
    pub fn new(name: impl Into<String>, abi: JsonAbi, bytecode: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            abi,
            bytecode: bytecode.into(),
        }
    }

    /// Parses an artifact from its JSON representation.
    ///
    /// `name` is used unless the artifact carries its own `contractName`.
    pub fn from_json(name: &str, json: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        let bytecode = raw.bytecode.ok_or(ArtifactError::MissingBytecode)?;
        let bytecode = hex::decode(bytecode.as_hex())?;
        if bytecode.is_empty() {
            return Err(ArtifactError::MissingBytecode);
        }

        Ok(Self {
            name: raw.contract_name.unwrap_or_else(|| name.to_string()),
            abi: raw.abi,
            bytecode: bytecode.into(),
        })
    }

    /// Reads an artifact file. The file stem is used as the contract name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json(&name, &json)
    }

    /// Builds the deployment request: creation code followed by the abi encoded constructor
    /// arguments. Gas price and gas limit are left to the node.
    pub fn deploy_transaction(&self, args: &[DynSolValue]) -> Result<CallRequest, ArtifactError> {
        let mut data = self.bytecode.to_vec();
        match &self.abi.constructor {
            Some(constructor) => {
                check_arguments(&constructor.inputs, args)?;
                data.extend(constructor.abi_encode_input(args)?);
            }
            None => check_arguments(&[], args)?,
        }
        Ok(CallRequest::create(data))
    }

    /// Abi encodes a call to `function`, selector included.
    pub fn encode_call(
        &self,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Bytes, ArtifactError> {
        let function = self.function(function)?;
        check_arguments(&function.inputs, args)?;
        Ok(function.abi_encode_input(args)?.into())
    }

    /// Decodes the return data of `function`.
    pub fn decode_output(
        &self,
        function: &str,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, ArtifactError> {
        let function = self.function(function)?;
        decode_params(&function.outputs, data)
    }

    fn function(&self, name: &str) -> Result<&Function, ArtifactError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| ArtifactError::UnknownFunction(name.to_string()))
    }
}

fn check_arguments(params: &[Param], args: &[DynSolValue]) -> Result<(), ArtifactError> {
    if params.len() != args.len() {
        return Err(ArtifactError::ArgumentCount {
            expected: params.len(),
            actual: args.len(),
        });
    }
    Ok(())
}

fn decode_params(params: &[Param], data: &[u8]) -> Result<Vec<DynSolValue>, ArtifactError> {
    let types = params
        .iter()
        .map(|param| DynSolType::parse(&param.selector_type()))
        .collect::<Result<Vec<_>, _>>()?;

    match DynSolType::Tuple(types).abi_decode_params(data)? {
        DynSolValue::Tuple(values) => Ok(values),
        value => Ok(vec![value]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{
        TxKind,
        U256,
        bytes,
    };
    use std::io::Write;

    const FOUNDRY_ARTIFACT: &str = r#"{
        "abi": [
            {
                "type": "constructor",
                "inputs": [{ "name": "seed", "type": "uint256", "internalType": "uint256" }],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "echo",
                "inputs": [{ "name": "value", "type": "uint256", "internalType": "uint256" }],
                "outputs": [{ "name": "", "type": "uint256", "internalType": "uint256" }],
                "stateMutability": "pure"
            },
            {
                "type": "error",
                "name": "CustomError",
                "inputs": [{ "name": "value", "type": "bytes32", "internalType": "bytes32" }]
            }
        ],
        "bytecode": { "object": "0x6080604052" }
    }"#;

    const HARDHAT_ARTIFACT: &str = r#"{
        "contractName": "CreateFailRequire",
        "abi": [],
        "bytecode": "0x60006000fd"
    }"#;

    #[test]
    fn test_foundry_artifact() {
        let artifact = ContractArtifact::from_json("Echo", FOUNDRY_ARTIFACT).unwrap();
        assert_eq!(artifact.name, "Echo");
        assert_eq!(artifact.bytecode, bytes!("6080604052"));
        assert_eq!(artifact.abi.errors().count(), 1);
    }

    #[test]
    fn test_hardhat_artifact() {
        let artifact = ContractArtifact::from_json("ignored", HARDHAT_ARTIFACT).unwrap();
        assert_eq!(artifact.name, "CreateFailRequire");
        assert_eq!(artifact.bytecode, bytes!("60006000fd"));
    }

    #[test]
    fn test_missing_bytecode() {
        let err = ContractArtifact::from_json("I", r#"{ "abi": [] }"#).unwrap_err();
        assert!(matches!(err, ArtifactError::MissingBytecode));

        let err =
            ContractArtifact::from_json("I", r#"{ "abi": [], "bytecode": "0x" }"#).unwrap_err();
        assert!(matches!(err, ArtifactError::MissingBytecode));
    }

    #[test]
    fn test_invalid_bytecode() {
        let err = ContractArtifact::from_json("I", r#"{ "abi": [], "bytecode": "0xzz" }"#)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidBytecode(_)));
    }

    #[test]
    fn test_from_file_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Echo.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(FOUNDRY_ARTIFACT.as_bytes()).unwrap();

        let artifact = ContractArtifact::from_file(&path).unwrap();
        assert_eq!(artifact.name, "Echo");

        let err = ContractArtifact::from_file(dir.path().join("Missing.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_deploy_transaction_appends_constructor_args() {
        let artifact = ContractArtifact::from_json("Echo", FOUNDRY_ARTIFACT).unwrap();
        let request = artifact
            .deploy_transaction(&[DynSolValue::Uint(U256::from(5), 256)])
            .unwrap();

        assert_eq!(request.kind(), TxKind::Create);
        assert_eq!(request.gas_price, None);
        assert_eq!(request.gas_limit, None);
        assert_eq!(&request.data[..5], bytecode_prefix());
        assert_eq!(request.data.len(), 5 + 32);
        assert_eq!(request.data[5 + 31], 5);

        let err = artifact.deploy_transaction(&[]).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::ArgumentCount {
                expected: 1,
                actual: 0
            }
        ));
    }

    fn bytecode_prefix() -> &'static [u8] {
        &[0x60, 0x80, 0x60, 0x40, 0x52]
    }

    #[test]
    fn test_deploy_transaction_without_constructor() {
        let artifact = ContractArtifact::from_json("I", HARDHAT_ARTIFACT).unwrap();
        let request = artifact.deploy_transaction(&[]).unwrap();
        assert_eq!(request.data, bytes!("60006000fd"));

        let err = artifact
            .deploy_transaction(&[DynSolValue::Bool(true)])
            .unwrap_err();
        assert!(matches!(err, ArtifactError::ArgumentCount { .. }));
    }

    #[test]
    fn test_encode_and_decode_call() {
        let artifact = ContractArtifact::from_json("Echo", FOUNDRY_ARTIFACT).unwrap();
        let calldata = artifact
            .encode_call("echo", &[DynSolValue::Uint(U256::from(9), 256)])
            .unwrap();
        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(
            &calldata[..4],
            artifact.abi.function("echo").unwrap()[0].selector().as_slice()
        );

        let output = U256::from(9).to_be_bytes::<32>();
        let decoded = artifact.decode_output("echo", &output).unwrap();
        assert_eq!(decoded, vec![DynSolValue::Uint(U256::from(9), 256)]);

        let err = artifact.encode_call("missing", &[]).unwrap_err();
        assert!(matches!(err, ArtifactError::UnknownFunction(name) if name == "missing"));
    }
}
