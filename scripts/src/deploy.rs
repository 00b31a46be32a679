//! Idempotent deployment of compiled logic and library contracts

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{network::TransactionBuilder, providers::Provider, rpc::types::TransactionRequest};
use alloy_primitives::{keccak256, Address, B256};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    constants::{ARTIFACT_EXTENSION, NUM_BYTES_ADDRESS, NUM_DEPLOY_CONFIRMATIONS},
    errors::ScriptError,
    registry::{DeploymentsFile, Registry},
    types::{Deployment, DeploymentRecord, LibraryBinding},
};

/// Deploys contracts by name
#[allow(async_fn_in_trait)]
pub trait Deployer {
    /// Deploys `name` linked against `libraries`.
    ///
    /// An identical prior deployment is reused rather than deployed again.
    async fn deploy(
        &mut self,
        name: &str,
        libraries: &LibraryBinding,
    ) -> Result<Deployment, ScriptError>;
}

/// The position of a library placeholder in unlinked bytecode
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkReference {
    /// The offset of the placeholder, in bytes
    pub start: usize,
    /// The length of the placeholder, in bytes
    pub length: usize,
}

/// A Hardhat-style compilation artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The hex creation bytecode, with placeholders for unlinked libraries
    pub bytecode: String,
    /// Library placeholders, keyed by source file and then library name
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
}

impl Artifact {
    /// Loads the artifact of `name` from anywhere under `artifacts_dir`
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, ScriptError> {
        let file_name = format!("{name}.{ARTIFACT_EXTENSION}");
        let path = find_file(artifacts_dir, &file_name)?.ok_or_else(|| {
            ScriptError::ArtifactParsing(format!(
                "no {file_name} under {}",
                artifacts_dir.display()
            ))
        })?;

        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
    }

    /// The names of the libraries this contract must be linked against
    pub fn required_libraries(&self) -> impl Iterator<Item = &str> {
        self.link_references
            .values()
            .flat_map(|libs| libs.keys().map(String::as_str))
    }

    /// Substitutes every library placeholder with its bound address and
    /// returns the creation bytecode
    pub fn link(&self, libraries: &LibraryBinding) -> Result<Vec<u8>, ScriptError> {
        let mut code = self
            .bytecode
            .strip_prefix("0x")
            .unwrap_or(&self.bytecode)
            .to_string();
        if !code.is_ascii() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} has malformed bytecode",
                self.contract_name
            )));
        }

        for (lib, refs) in self.link_references.values().flat_map(|libs| libs.iter()) {
            let address = libraries.get(lib).ok_or_else(|| {
                ScriptError::ArtifactParsing(format!(
                    "{} must be linked against {lib}",
                    self.contract_name
                ))
            })?;

            let address_hex = hex::encode(address.as_slice());
            for link_ref in refs {
                let (start, end) = (link_ref.start * 2, (link_ref.start + link_ref.length) * 2);
                if link_ref.length != NUM_BYTES_ADDRESS || end > code.len() {
                    return Err(ScriptError::ArtifactParsing(format!(
                        "{} has an invalid link reference for {lib}",
                        self.contract_name
                    )));
                }
                code.replace_range(start..end, &address_hex);
            }
        }

        for lib in libraries.keys() {
            if !self.required_libraries().any(|required| required == lib) {
                warn!("{} does not reference library {lib}", self.contract_name);
            }
        }

        hex::decode(&code).map_err(|e| {
            ScriptError::ArtifactParsing(format!("{}: {e}", self.contract_name))
        })
    }
}

/// Searches `dir` recursively for a file named `file_name`
fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>, ScriptError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ScriptError::ArtifactParsing(format!("could not read {}: {e}", dir.display()))
    })?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|f| f == file_name) {
            return Ok(Some(path));
        }
    }

    for subdir in subdirs {
        if let Some(path) = find_file(&subdir, file_name)? {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Deploys artifacts from disk through an RPC provider, recording each
/// deployment with the fingerprint of its linked bytecode
pub struct ArtifactDeployer<P> {
    /// The provider through which creation transactions are sent
    provider: P,
    /// The directory holding the compiled artifacts
    artifacts_dir: PathBuf,
    /// The deployments file
    deployments: DeploymentsFile,
}

impl<P: Provider> ArtifactDeployer<P> {
    /// Creates a deployer reading artifacts from `artifacts_dir`
    pub fn new(provider: P, artifacts_dir: PathBuf, deployments: DeploymentsFile) -> Self {
        Self {
            provider,
            artifacts_dir,
            deployments,
        }
    }

    /// Returns the prior deployment of `name` if it holds exactly `fingerprint`
    async fn find_identical(
        &self,
        name: &str,
        fingerprint: B256,
    ) -> Result<Option<Address>, ScriptError> {
        let Some(record) = self.deployments.get(name)? else {
            return Ok(None);
        };
        if record.fingerprint != Some(fingerprint) {
            return Ok(None);
        }

        let code = self
            .provider
            .get_code_at(record.address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        Ok((!code.is_empty()).then_some(record.address))
    }
}

impl<P: Provider> Deployer for ArtifactDeployer<P> {
    async fn deploy(
        &mut self,
        name: &str,
        libraries: &LibraryBinding,
    ) -> Result<Deployment, ScriptError> {
        let artifact = Artifact::load(&self.artifacts_dir, name)?;
        let code = artifact.link(libraries)?;
        let fingerprint = keccak256(&code);

        if let Some(address) = self.find_identical(name, fingerprint).await? {
            info!("{name} is already deployed at {address:#x}, reusing it");
            return Ok(Deployment {
                address,
                reused: true,
            });
        }

        info!("deploying {name}...");
        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::DeployFailure(e.to_string()))?
            .with_required_confirmations(NUM_DEPLOY_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::DeployFailure(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::DeployFailure(format!(
                "{name} creation transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::DeployFailure(format!("no contract address in receipt for {name}"))
        })?;

        info!("{name} deployed at {address:#x}");
        self.deployments.record(
            name,
            DeploymentRecord {
                address,
                fingerprint: Some(fingerprint),
            },
        )?;

        Ok(Deployment {
            address,
            reused: false,
        })
    }
}
