//! Type definitions used throughout the scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy_primitives::{Address, TxHash, B256};
use serde::{Deserialize, Serialize};

use crate::calldata::CallPayload;

/// Library name to deployed address, linked into a logic contract's bytecode
pub type LibraryBinding = BTreeMap<String, Address>;

/// A deployment as recorded in the deployments file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// The address of the deployed contract
    pub address: Address,
    /// The hash of the linked creation bytecode, absent for
    /// contracts that were not deployed by these scripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<B256>,
}

/// The result of a deployment action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// The address of the contract
    pub address: Address,
    /// Whether an identical prior deployment was reused
    pub reused: bool,
}

/// The result of a source verification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The source was verified by this submission
    Verified,
    /// The source had been verified before
    AlreadyVerified,
    /// The submission was accepted but needs to be checked by hand
    ManualCheckRequired,
    /// The verification service rejected the submission
    Failed(String),
}

impl VerifyOutcome {
    /// Whether the deployment may be wired into a proxy
    pub fn is_success(&self) -> bool {
        !matches!(self, VerifyOutcome::Failed(_))
    }
}

/// A single proxy upgrade, assembled stage by stage and never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeTask {
    /// The name of the logic contract being upgraded
    pub target_contract: String,
    /// The proxy delegating to the logic contract
    pub proxy_address: Address,
    /// The newly deployed logic contract
    pub implementation_address: Address,
    /// The libraries linked into the new logic contract
    pub library_binding: LibraryBinding,
    /// The call made on the new implementation during the upgrade
    pub payload: CallPayload,
}

/// A completed upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    /// The upgrade that was performed
    pub task: UpgradeTask,
    /// The hash of the confirmed upgrade transaction
    pub tx_hash: TxHash,
}

/// The stages of the deploy-verify-upgrade pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStage {
    /// Choosing the logic contract to upgrade
    SelectTarget,
    /// Constructing the initialization call
    BuildPayload,
    /// Deploying and verifying library dependencies
    ResolveLibraries,
    /// Deploying the new logic contract
    DeployLogic,
    /// Verifying the new logic contract's source
    VerifyLogic,
    /// Finding the proxy to upgrade
    LocateProxy,
    /// Pointing the proxy at the new logic contract
    UpgradeProxy,
}

impl Display for UpgradeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeStage::SelectTarget => write!(f, "select-target"),
            UpgradeStage::BuildPayload => write!(f, "build-payload"),
            UpgradeStage::ResolveLibraries => write!(f, "resolve-libraries"),
            UpgradeStage::DeployLogic => write!(f, "deploy-logic"),
            UpgradeStage::VerifyLogic => write!(f, "verify-logic"),
            UpgradeStage::LocateProxy => write!(f, "locate-proxy"),
            UpgradeStage::UpgradeProxy => write!(f, "upgrade-proxy"),
        }
    }
}
