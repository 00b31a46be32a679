//! Extraction of the parameter list from a function signature

use crate::{constants::LIST_DELIMITER, errors::ScriptError};

/// Extracts the declared parameter types of a function signature, e.g.
/// `initialize(address,uint256)` yields `["address", "uint256"]`.
///
/// Tokens are returned verbatim. Whether they name a supported type is decided
/// by [`validate_type_list`](super::validate_type_list).
pub fn parse_parameter_types(signature: &str) -> Result<Vec<String>, ScriptError> {
    if signature.is_empty() || !signature.ends_with(')') {
        return Err(ScriptError::MalformedSignature(format!(
            "`{signature}` must end with a closing parenthesis"
        )));
    }

    let end = signature.len() - 1;
    let start = match signature.find('(') {
        Some(start) if start > 0 && start < end => start,
        _ => {
            return Err(ScriptError::MalformedSignature(format!(
                "`{signature}` must be a function name followed by a parameter list"
            )))
        }
    };

    let params = &signature[start + 1..end];
    if params.is_empty() {
        return Ok(Vec::new());
    }

    Ok(params.split(LIST_DELIMITER).map(String::from).collect())
}
