//! Structured reverts.
//!
//! A [`RevertError`] is what a caller sees when a simulated call fails with revert data that
//! matches a known error definition: the error name and its decoded positional arguments.
//! The [`ErrorRegistry`] owns the known definitions and performs the decoding.

mod registry;
pub use registry::ErrorRegistry;

mod value;
pub use value::render_value;

use crate::primitives::{
    DynSolValue,
    Selector,
};

use serde::{
    Serialize,
    Serializer,
    ser::SerializeStruct,
};

use std::fmt;

/// A decoded revert.
#[derive(Debug, Clone, PartialEq)]
pub struct RevertError {
    /// Name of the error, `Error` for `require`/string reverts.
    pub name: String,
    /// Canonical signature, e.g. `CustomError(bytes32)`.
    pub signature: String,
    pub selector: Selector,
    /// Decoded positional arguments.
    pub args: Vec<DynSolValue>,
}

impl RevertError {
    pub fn arg(&self, index: usize) -> Option<&DynSolValue> {
        self.args.get(index)
    }

    /// Renders argument `index` the way it is shown to users, see [`render_value`].
    pub fn arg_string(&self, index: usize) -> Option<String> {
        self.arg(index).map(render_value)
    }

    /// Whether this is a plain `Error(string)` revert.
    pub fn is_string_error(&self) -> bool {
        self.signature == "Error(string)"
    }

    /// Whether this is a compiler inserted `Panic(uint256)`.
    pub fn is_panic(&self) -> bool {
        self.signature == "Panic(uint256)"
    }
}

impl fmt::Display for RevertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                DynSolValue::String(s) => write!(f, "{s:?}")?,
                other => f.write_str(&render_value(other))?,
            }
        }
        f.write_str(")")
    }
}

impl Serialize for RevertError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let args: Vec<String> = self.args.iter().map(render_value).collect();
        let mut state = serializer.serialize_struct("RevertError", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("signature", &self.signature)?;
        state.serialize_field("args", &args)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{
        B256,
        U256,
        fixed_bytes,
    };

    fn custom_error() -> RevertError {
        RevertError {
            name: "CustomError".to_string(),
            signature: "CustomError(bytes32)".to_string(),
            selector: fixed_bytes!("aabbccdd"),
            args: vec![DynSolValue::FixedBytes(B256::repeat_byte(0xab), 32)],
        }
    }

    #[test]
    fn test_display() {
        let revert = RevertError {
            name: "Error".to_string(),
            signature: "Error(string)".to_string(),
            selector: fixed_bytes!("08c379a0"),
            args: vec![DynSolValue::String("boom".to_string())],
        };
        assert_eq!(revert.to_string(), "Error(\"boom\")");
        assert!(revert.is_string_error());
        assert!(!revert.is_panic());

        let panic = RevertError {
            name: "Panic".to_string(),
            signature: "Panic(uint256)".to_string(),
            selector: fixed_bytes!("4e487b71"),
            args: vec![DynSolValue::Uint(U256::from(0x11), 256)],
        };
        assert_eq!(panic.to_string(), "Panic(17)");
        assert!(panic.is_panic());
    }

    #[test]
    fn test_arg_string() {
        let revert = custom_error();
        assert_eq!(
            revert.arg_string(0).unwrap(),
            format!("0x{}", "ab".repeat(32))
        );
        assert_eq!(revert.arg_string(1), None);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(custom_error()).unwrap();
        assert_eq!(json["name"], "CustomError");
        assert_eq!(json["signature"], "CustomError(bytes32)");
        assert_eq!(json["args"][0], format!("0x{}", "ab".repeat(32)));
    }
}
