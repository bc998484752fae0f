use crate::primitives::{
    DynSolValue,
    hex,
};

/// Renders a decoded ABI value as a string.
///
/// Strings are returned verbatim, byte values as lowercase `0x` prefixed hex, addresses
/// checksummed and integers in decimal. Arrays and tuples are rendered element wise.
pub fn render_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(n, _) => n.to_string(),
        DynSolValue::Int(n, _) => n.to_string(),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", render_list(values))
        }
        DynSolValue::Tuple(values) => format!("({})", render_list(values)),
        #[allow(unreachable_patterns)]
        other => format!("{other:?}"),
    }
}

fn render_list(values: &[DynSolValue]) -> String {
    values
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(", ")
}
