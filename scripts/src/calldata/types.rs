//! Parameter types accepted in upgrade calldata, and validation of a
//! signature's parameter list against them

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use tracing::warn;

use crate::{
    constants::{ARRAY_SUFFIX, BARE_UINT_ALIAS, MAX_UINT_BITS},
    errors::ScriptError,
};

/// A supported ABI parameter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// `address`
    Address,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `bytes32`
    Bytes32,
    /// `uintN`, holding the bit width `N`
    Uint(usize),
    /// `T[]`, a dynamic array of a non-array type
    Array(Box<ParamType>),
}

impl ParamType {
    /// Whether this is the integer family
    pub fn is_uint(&self) -> bool {
        matches!(self, ParamType::Uint(_))
    }

    /// Parses a non-array type name
    fn parse_scalar(name: &str) -> Result<Self, ScriptError> {
        match name {
            "address" => Ok(ParamType::Address),
            "string" => Ok(ParamType::String),
            "bytes" => Ok(ParamType::Bytes),
            "bytes32" => Ok(ParamType::Bytes32),
            BARE_UINT_ALIAS => Err(ScriptError::DisallowedType(format!(
                "`{name}` encodes with an implicit width, use `uint256` instead"
            ))),
            _ => name
                .strip_prefix(BARE_UINT_ALIAS)
                .and_then(|width| {
                    // Reject signs and leading zeros so that the text hashed
                    // into the selector stays canonical
                    if width.starts_with('0') || !width.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    width.parse::<usize>().ok()
                })
                .filter(|bits| *bits > 0 && *bits <= MAX_UINT_BITS && bits % 8 == 0)
                .map(ParamType::Uint)
                .ok_or_else(|| {
                    ScriptError::DisallowedType(format!("`{name}` is not a supported type"))
                }),
        }
    }
}

impl FromStr for ParamType {
    type Err = ScriptError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.strip_suffix(ARRAY_SUFFIX) {
            Some(item) => {
                if item.ends_with(ARRAY_SUFFIX) {
                    return Err(ScriptError::DisallowedType(format!(
                        "`{name}` nests arrays, only one level is supported"
                    )));
                }
                Ok(ParamType::Array(Box::new(Self::parse_scalar(item)?)))
            }
            None => Self::parse_scalar(name),
        }
    }
}

impl Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::Bytes32 => write!(f, "bytes32"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Array(item) => write!(f, "{item}{ARRAY_SUFFIX}"),
        }
    }
}

/// Validates every entry of a parameter list, before any value is collected.
///
/// The bare `uint` alias is rejected, also as an array element type, as is any
/// name outside of the supported set.
pub fn validate_type_list(type_names: &[String]) -> Result<Vec<ParamType>, ScriptError> {
    type_names
        .iter()
        .map(|name| {
            ParamType::from_str(name).inspect_err(|e| {
                if name.trim_end_matches(ARRAY_SUFFIX) == BARE_UINT_ALIAS {
                    warn!("using `{name}` may result in a corrupt payload, replace it with `uint256`");
                } else {
                    warn!("{e}");
                }
            })
        })
        .collect()
}
