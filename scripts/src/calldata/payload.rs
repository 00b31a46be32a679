//! Construction of the call payload passed to `upgradeToAndCall`

use alloy::dyn_abi::DynSolValue;
use alloy_primitives::keccak256;

use crate::{
    calldata::{to_sol_value, ParamType, TypedValue},
    constants::NUM_BYTES_SELECTOR,
    errors::ScriptError,
};

/// The call made on a new implementation as part of its upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPayload {
    /// No call, the proxy is upgraded with a bare `upgradeTo`
    Empty,
    /// A call to the function identified by `selector`
    Call {
        /// The leading bytes of the function signature's hash
        selector: [u8; NUM_BYTES_SELECTOR],
        /// The ABI encoded arguments
        encoded_args: Vec<u8>,
    },
}

impl CallPayload {
    /// Whether this is the "no payload" sentinel
    pub fn is_empty(&self) -> bool {
        matches!(self, CallPayload::Empty)
    }

    /// The calldata bytes, the selector followed by the encoded arguments
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            CallPayload::Empty => Vec::new(),
            CallPayload::Call {
                selector,
                encoded_args,
            } => [selector.as_slice(), encoded_args].concat(),
        }
    }
}

/// Computes the selector of a function signature.
///
/// The signature is hashed verbatim, callers must supply canonical type names.
pub fn compute_selector(signature: &str) -> [u8; NUM_BYTES_SELECTOR] {
    let mut selector = [0_u8; NUM_BYTES_SELECTOR];
    selector.copy_from_slice(&keccak256(signature.as_bytes())[..NUM_BYTES_SELECTOR]);
    selector
}

/// Builds the payload calling `signature` with the given values, which must
/// match the declared types in number and, position by position, in type
pub fn build_payload(
    signature: &str,
    param_types: &[ParamType],
    values: &[TypedValue],
) -> Result<CallPayload, ScriptError> {
    if param_types.len() != values.len() {
        return Err(ScriptError::TypeMismatch(format!(
            "`{signature}` takes {} arguments, {} were given",
            param_types.len(),
            values.len()
        )));
    }

    let sol_values = param_types
        .iter()
        .zip(values)
        .map(|(param_type, value)| to_sol_value(param_type, value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CallPayload::Call {
        selector: compute_selector(signature),
        encoded_args: DynSolValue::Tuple(sol_values).abi_encode_params(),
    })
}
