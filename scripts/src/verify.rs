//! Source verification of deployed contracts against a block explorer

use alloy_primitives::Address;
use tokio::process::Command;
use tracing::{info, warn};

use crate::{
    constants::{
        ALREADY_VERIFIED_MARKER, FORGE_COMMAND, MANUAL_CHECK_MARKER, VERIFY_CONTRACT_COMMAND,
    },
    errors::ScriptError,
    types::VerifyOutcome,
};

/// Verifies the source of deployed contracts
#[allow(async_fn_in_trait)]
pub trait Verifier {
    /// Submits the source at `source_path` for the contract at `address`
    async fn verify(
        &mut self,
        address: Address,
        constructor_args: &[u8],
        source_path: &str,
    ) -> Result<VerifyOutcome, ScriptError>;
}

/// Verifies through `forge verify-contract`.
///
/// Assumes that `forge` is locally available and run from the contracts project.
#[derive(Debug, Clone)]
pub struct ForgeVerifier {
    /// The RPC url of the chain the contracts live on
    rpc_url: String,
    /// The block explorer's verification API, if not the chain's default
    verifier_url: Option<String>,
    /// The block explorer's API key
    api_key: Option<String>,
}

impl ForgeVerifier {
    /// Creates a verifier for contracts on the chain behind `rpc_url`
    pub fn new(rpc_url: &str, verifier_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            verifier_url,
            api_key,
        }
    }
}

impl Verifier for ForgeVerifier {
    async fn verify(
        &mut self,
        address: Address,
        constructor_args: &[u8],
        source_path: &str,
    ) -> Result<VerifyOutcome, ScriptError> {
        info!("verifying {source_path} at {address:#x}");

        let mut cmd = Command::new(FORGE_COMMAND);
        cmd.arg(VERIFY_CONTRACT_COMMAND);
        cmd.arg(format!("{address:#x}"));
        cmd.arg(source_path);
        cmd.arg("--rpc-url");
        cmd.arg(&self.rpc_url);
        // Block until the explorer has processed the submission
        cmd.arg("--watch");
        if !constructor_args.is_empty() {
            cmd.arg("--constructor-args");
            cmd.arg(hex::encode(constructor_args));
        }
        if let Some(verifier_url) = &self.verifier_url {
            cmd.arg("--verifier-url");
            cmd.arg(verifier_url);
        }
        if let Some(api_key) = &self.api_key {
            cmd.arg("--etherscan-api-key");
            cmd.arg(api_key);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| ScriptError::VerifyFailure(format!("could not run forge: {e}")))?;
        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        let outcome = classify_verification(output.status.success(), &text);
        match &outcome {
            VerifyOutcome::Verified => info!("verified {source_path}"),
            VerifyOutcome::AlreadyVerified => info!("{source_path} is already verified"),
            VerifyOutcome::ManualCheckRequired => {
                warn!("{source_path} was submitted and should be checked manually")
            }
            VerifyOutcome::Failed(reason) => warn!("verifying {source_path} failed: {reason}"),
        }

        Ok(outcome)
    }
}

/// Classifies the output of a verification submission
pub fn classify_verification(success: bool, output: &str) -> VerifyOutcome {
    let lower = output.to_lowercase();
    if lower.contains(ALREADY_VERIFIED_MARKER) {
        VerifyOutcome::AlreadyVerified
    } else if lower.contains(MANUAL_CHECK_MARKER) {
        VerifyOutcome::ManualCheckRequired
    } else if success {
        VerifyOutcome::Verified
    } else {
        let reason = output
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("verification failed");
        VerifyOutcome::Failed(reason.to_string())
    }
}
