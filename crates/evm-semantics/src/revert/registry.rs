use super::RevertError;
use crate::primitives::{
    DynSolType,
    DynSolValue,
    JsonAbi,
    Selector,
};

use alloy_sol_types::{
    Panic,
    Revert,
    SolError,
};

use std::collections::{
    HashMap,
    hash_map::Entry,
};

use tracing::{
    debug,
    trace,
    warn,
};

#[derive(Debug, Clone)]
struct ErrorDefinition {
    name: String,
    signature: String,
    types: Vec<DynSolType>,
}

/// Known error definitions, keyed by selector.
///
/// The registry always knows the builtin `Error(string)` and `Panic(uint256)`. Custom errors are
/// added from contract ABIs. When two definitions share a selector the first one registered is
/// kept.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    errors: HashMap<Selector, ErrorDefinition>,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ErrorRegistry {
    /// Registry containing only `Error(string)` and `Panic(uint256)`.
    pub fn builtin() -> Self {
        let mut errors = HashMap::new();
        errors.insert(
            Selector::from(Revert::SELECTOR),
            ErrorDefinition {
                name: "Error".to_string(),
                signature: Revert::SIGNATURE.to_string(),
                types: vec![DynSolType::String],
            },
        );
        errors.insert(
            Selector::from(Panic::SELECTOR),
            ErrorDefinition {
                name: "Panic".to_string(),
                signature: Panic::SIGNATURE.to_string(),
                types: vec![DynSolType::Uint(256)],
            },
        );
        Self { errors }
    }

    /// Registry knowing the builtin errors and every error of `abi`.
    pub fn from_abi(abi: &JsonAbi) -> Result<Self, alloy_dyn_abi::Error> {
        let mut registry = Self::builtin();
        registry.register_abi(abi)?;
        Ok(registry)
    }

    /// Registers every error defined in `abi`. Returns how many definitions were new.
    pub fn register_abi(&mut self, abi: &JsonAbi) -> Result<usize, alloy_dyn_abi::Error> {
        let mut added = 0;
        for error in abi.errors() {
            if self.register_error(error)? {
                added += 1;
            }
        }
        debug!(
            target: "evm_semantics::revert",
            added,
            known = self.errors.len(),
            "Registered abi errors"
        );
        Ok(added)
    }

    /// Registers a single error definition. Returns `false` if the selector was already known.
    pub fn register_error(
        &mut self,
        error: &alloy_json_abi::Error,
    ) -> Result<bool, alloy_dyn_abi::Error> {
        let types = error
            .inputs
            .iter()
            .map(|param| DynSolType::parse(&param.selector_type()))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = error.signature();

        match self.errors.entry(error.selector()) {
            Entry::Occupied(known) => {
                if known.get().signature != signature {
                    warn!(
                        target: "evm_semantics::revert",
                        selector = %known.key(),
                        known = %known.get().signature,
                        ignored = %signature,
                        "Error selector collision, keeping the first definition"
                    );
                }
                Ok(false)
            }
            Entry::Vacant(slot) => {
                trace!(target: "evm_semantics::revert", %signature, "Registering error");
                slot.insert(ErrorDefinition {
                    name: error.name.clone(),
                    signature,
                    types,
                });
                Ok(true)
            }
        }
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.errors.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Canonical signatures of all known errors, sorted.
    pub fn signatures(&self) -> Vec<&str> {
        let mut signatures: Vec<&str> = self
            .errors
            .values()
            .map(|definition| definition.signature.as_str())
            .collect();
        signatures.sort_unstable();
        signatures
    }

    /// Decodes revert data.
    ///
    /// Returns `None` for empty data, unknown selectors and arguments which do not decode as the
    /// registered types.
    pub fn decode(&self, data: &[u8]) -> Option<RevertError> {
        if data.len() < 4 {
            return None;
        }
        let selector = Selector::from_slice(&data[..4]);
        let definition = self.errors.get(&selector)?;

        let decoded = DynSolType::Tuple(definition.types.clone())
            .abi_decode_params(&data[4..])
            .inspect_err(|err| {
                debug!(
                    target: "evm_semantics::revert",
                    signature = %definition.signature,
                    %err,
                    "Revert data does not match the registered error"
                );
            })
            .ok()?;

        let args = match decoded {
            DynSolValue::Tuple(values) => values,
            value => vec![value],
        };

        Some(RevertError {
            name: definition.name.clone(),
            signature: definition.signature.clone(),
            selector,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{
        B256,
        U256,
        hex,
    };

    #[test]
    fn test_builtin_string_error() {
        let data = Revert::from("boom").abi_encode();
        let revert = ErrorRegistry::builtin().decode(&data).unwrap();

        assert_eq!(revert.name, "Error");
        assert_eq!(revert.signature, "Error(string)");
        assert_eq!(revert.args, vec![DynSolValue::String("boom".to_string())]);
    }

    #[test]
    fn test_builtin_panic() {
        let data = Panic::from(0x11u64).abi_encode();
        let revert = ErrorRegistry::builtin().decode(&data).unwrap();

        assert_eq!(revert.name, "Panic");
        assert_eq!(revert.args, vec![DynSolValue::Uint(U256::from(0x11), 256)]);
    }

    #[test]
    fn test_empty_and_short_data() {
        let registry = ErrorRegistry::builtin();
        assert!(registry.decode(&[]).is_none());
        assert!(registry.decode(&[0x08, 0xc3, 0x79]).is_none());
    }

    #[test]
    fn test_unknown_custom_error() {
        let abi = JsonAbi::parse(["error CustomError(bytes32 value)"]).unwrap();
        let error = abi.errors().next().unwrap();
        let mut data = error.selector().to_vec();
        data.extend_from_slice(B256::repeat_byte(1).as_slice());

        assert!(ErrorRegistry::builtin().decode(&data).is_none());

        let registry = ErrorRegistry::from_abi(&abi).unwrap();
        let revert = registry.decode(&data).unwrap();
        assert_eq!(revert.name, "CustomError");
        assert_eq!(revert.signature, "CustomError(bytes32)");
        assert_eq!(
            revert.args,
            vec![DynSolValue::FixedBytes(B256::repeat_byte(1), 32)]
        );
    }

    #[test]
    fn test_malformed_arguments() {
        let registry = ErrorRegistry::builtin();
        // `Error(string)` selector followed by a truncated offset word
        let data = hex::decode("08c379a00000").unwrap();
        assert!(registry.decode(&data).is_none());
    }

    #[test]
    fn test_register_is_idempotent() {
        let abi = JsonAbi::parse([
            "error CustomError(bytes32 value)",
            "error Unauthorized(address caller, uint256 amount)",
        ])
        .unwrap();

        let mut registry = ErrorRegistry::builtin();
        assert_eq!(registry.register_abi(&abi).unwrap(), 2);
        assert_eq!(registry.register_abi(&abi).unwrap(), 0);
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.signatures(),
            vec![
                "CustomError(bytes32)",
                "Error(string)",
                "Panic(uint256)",
                "Unauthorized(address,uint256)",
            ]
        );
    }

    #[test]
    fn test_builtin_error_not_overridden() {
        // Same signature as the builtin, must not replace it.
        let abi = JsonAbi::parse(["error Error(string message)"]).unwrap();
        let mut registry = ErrorRegistry::builtin();
        assert_eq!(registry.register_abi(&abi).unwrap(), 0);
        assert!(registry.contains(&Selector::from(Revert::SELECTOR)));
    }

    #[test]
    fn test_zero_argument_error() {
        let abi = JsonAbi::parse(["error Paused()"]).unwrap();
        let registry = ErrorRegistry::from_abi(&abi).unwrap();
        let selector = abi.errors().next().unwrap().selector();

        let revert = registry.decode(selector.as_slice()).unwrap();
        assert_eq!(revert.name, "Paused");
        assert!(revert.args.is_empty());
    }
}
