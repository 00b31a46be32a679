//! Definitions of errors that can occur during the execution of the upgrade scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the upgrade scripts.
///
/// Every variant is terminal for the task that raised it, nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A function signature could not be split into its parameter list
    MalformedSignature(String),
    /// A parameter type is unsupported or known to encode incorrectly
    DisallowedType(String),
    /// A raw parameter value does not lex as its declared type
    ParseFailure(String),
    /// A parsed value disagrees with its declared type
    TypeMismatch(String),
    /// A deployment did not produce a usable contract address
    DeployFailure(String),
    /// The verification service reported an unrecoverable error
    VerifyFailure(String),
    /// An expected prior deployment is absent from the registry
    MissingRegistryEntry(String),
    /// The requested contract is not part of the upgradeable catalog
    UnknownContract(String),
    /// An address supplied by the operator or the registry is malformed
    InvalidAddress(String),
    /// Error reading an answer from the operator
    Prompt(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error reading or linking a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error loading or validating the configuration file
    Config(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::MalformedSignature(s) => write!(f, "malformed signature: {}", s),
            ScriptError::DisallowedType(s) => write!(f, "disallowed parameter type: {}", s),
            ScriptError::ParseFailure(s) => write!(f, "error parsing parameter: {}", s),
            ScriptError::TypeMismatch(s) => write!(f, "parameter type mismatch: {}", s),
            ScriptError::DeployFailure(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::VerifyFailure(s) => write!(f, "error verifying contract: {}", s),
            ScriptError::MissingRegistryEntry(s) => write!(f, "missing deployment: {}", s),
            ScriptError::UnknownContract(s) => write!(f, "unknown contract: {}", s),
            ScriptError::InvalidAddress(s) => write!(f, "invalid address: {}", s),
            ScriptError::Prompt(s) => write!(f, "error reading answer: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::Config(s) => write!(f, "error loading config: {}", s),
        }
    }
}

impl Error for ScriptError {}
