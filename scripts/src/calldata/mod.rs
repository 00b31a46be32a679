//! Construction of upgrade calldata from a human-supplied function signature
//! and textual parameter values.
//!
//! The stages are pure: a signature is split into its parameter types
//! ([`parse_parameter_types`]), the types are validated ([`validate_type_list`]),
//! each raw value is parsed and checked against its type ([`parse_param`],
//! [`check_param`]), and the results are encoded behind the function selector
//! ([`build_payload`]).

mod params;
mod payload;
mod signature;
mod types;

pub use params::{check_param, parse_param, to_sol_value, TypedValue};
pub use payload::{build_payload, compute_selector, CallPayload};
pub use signature::parse_parameter_types;
pub use types::{validate_type_list, ParamType};

use crate::errors::ScriptError;

/// Parses a raw value and checks it against its declared type
pub fn parse_checked_param(param_type: &ParamType, raw: &str) -> Result<TypedValue, ScriptError> {
    let value = parse_param(param_type, raw)?;
    if !check_param(param_type, &value) {
        return Err(ScriptError::TypeMismatch(format!(
            "`{raw}` is not a valid {param_type}"
        )));
    }

    Ok(value)
}

/// Builds the payload for a call to `signature` with the given raw argument
/// values, running every stage of the pipeline
pub fn encode_call(signature: &str, raw_args: &[String]) -> Result<CallPayload, ScriptError> {
    let type_names = parse_parameter_types(signature)?;
    let param_types = validate_type_list(&type_names)?;

    if raw_args.len() != param_types.len() {
        return Err(ScriptError::TypeMismatch(format!(
            "`{signature}` takes {} arguments, {} were given",
            param_types.len(),
            raw_args.len()
        )));
    }

    let values = param_types
        .iter()
        .zip(raw_args)
        .map(|(param_type, raw)| parse_checked_param(param_type, raw))
        .collect::<Result<Vec<_>, _>>()?;

    build_payload(signature, &param_types, &values)
}
