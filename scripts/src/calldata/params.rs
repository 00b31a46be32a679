//! Parsing of operator-supplied parameter values, and checking that a value
//! agrees with its declared type

use std::str::FromStr;

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};

use crate::{
    calldata::ParamType,
    constants::{LIST_DELIMITER, NUM_BYTES_ADDRESS, NUM_BYTES_WORD},
    errors::ScriptError,
};

/// A parameter value, tagged with the category it was parsed as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// An address, kept as entered
    Address(String),
    /// A string
    Text(String),
    /// A dynamic byte string in hex, kept as entered
    Bytes(String),
    /// A 32 byte word in hex, kept as entered
    Bytes32(String),
    /// An unsigned integer
    UInt(U256),
    /// An array of values of a single type
    Array(Vec<TypedValue>),
}

/// Parses the raw text entered for a parameter of the given type.
///
/// Array elements are separated by commas, so string elements cannot contain
/// one. Whitespace around elements is trimmed, except for `string[]` whose
/// elements are encoded exactly as entered. Textual types are kept as entered,
/// [`check_param`] validates them.
pub fn parse_param(param_type: &ParamType, raw: &str) -> Result<TypedValue, ScriptError> {
    match param_type {
        ParamType::Array(item_type) => {
            if raw.is_empty() {
                return Ok(TypedValue::Array(Vec::new()));
            }

            raw.split(LIST_DELIMITER)
                .map(|item| match **item_type {
                    ParamType::String => parse_param(item_type, item),
                    _ => parse_param(item_type, item.trim()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::Array)
        }
        ParamType::Uint(bits) => {
            // `U256::from_str` alone accepts an empty string and digit separators
            let is_numeric = match raw.strip_prefix("0x") {
                Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
                None => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()),
            };
            if !is_numeric {
                return Err(ScriptError::ParseFailure(format!("`{raw}` is not a {param_type}")));
            }

            let value = U256::from_str(raw).map_err(|e| {
                ScriptError::ParseFailure(format!("`{raw}` is not a {param_type}: {e}"))
            })?;
            if value.bit_len() > *bits {
                return Err(ScriptError::ParseFailure(format!(
                    "`{raw}` does not fit in a {param_type}"
                )));
            }
            Ok(TypedValue::UInt(value))
        }
        ParamType::Address => Ok(TypedValue::Address(raw.to_string())),
        ParamType::String => Ok(TypedValue::Text(raw.to_string())),
        ParamType::Bytes => Ok(TypedValue::Bytes(raw.to_string())),
        ParamType::Bytes32 => Ok(TypedValue::Bytes32(raw.to_string())),
    }
}

/// Checks that a value is structurally consistent with its declared type
pub fn check_param(param_type: &ParamType, value: &TypedValue) -> bool {
    match (param_type, value) {
        (ParamType::Array(item_type), TypedValue::Array(items)) => {
            items.iter().all(|item| check_param(item_type, item))
        }
        (ParamType::Uint(bits), TypedValue::UInt(value)) => value.bit_len() <= *bits,
        (ParamType::Address, TypedValue::Address(s)) => {
            decode_hex(s).is_some_and(|b| b.len() == NUM_BYTES_ADDRESS)
        }
        (ParamType::Bytes32, TypedValue::Bytes32(s)) => {
            decode_hex(s).is_some_and(|b| b.len() == NUM_BYTES_WORD)
        }
        (ParamType::Bytes, TypedValue::Bytes(s)) => decode_hex(s).is_some_and(|b| !b.is_empty()),
        (ParamType::String, TypedValue::Text(_)) => true,
        _ => false,
    }
}

/// Converts a checked value into its ABI codec representation
pub fn to_sol_value(param_type: &ParamType, value: &TypedValue) -> Result<DynSolValue, ScriptError> {
    if !check_param(param_type, value) {
        return Err(ScriptError::TypeMismatch(format!(
            "{value:?} is not a valid {param_type}"
        )));
    }

    // The check above guarantees the hex decodes below succeed
    let mismatch = || ScriptError::TypeMismatch(format!("{value:?} is not a valid {param_type}"));
    Ok(match (param_type, value) {
        (ParamType::Array(item_type), TypedValue::Array(items)) => DynSolValue::Array(
            items
                .iter()
                .map(|item| to_sol_value(item_type, item))
                .collect::<Result<_, _>>()?,
        ),
        (ParamType::Uint(bits), TypedValue::UInt(value)) => DynSolValue::Uint(*value, *bits),
        (ParamType::Address, TypedValue::Address(s)) => {
            DynSolValue::Address(Address::from_slice(&decode_hex(s).ok_or_else(mismatch)?))
        }
        (ParamType::Bytes32, TypedValue::Bytes32(s)) => {
            DynSolValue::FixedBytes(B256::from_slice(&decode_hex(s).ok_or_else(mismatch)?), NUM_BYTES_WORD)
        }
        (ParamType::Bytes, TypedValue::Bytes(s)) => DynSolValue::Bytes(decode_hex(s).ok_or_else(mismatch)?),
        (ParamType::String, TypedValue::Text(s)) => DynSolValue::String(s.clone()),
        _ => return Err(mismatch()),
    })
}

/// Decodes hex with an optional `0x` prefix
fn decode_hex(s: &str) -> Option<Vec<u8>> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()
}
