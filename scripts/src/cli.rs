//! Definitions of CLI arguments and commands for the upgrade scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{build_calldata, show_contracts, upgrade},
    config::DeployConfig,
    constants::{DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_RPC_URL},
    errors::ScriptError,
};

/// Deploy new logic for an upgradeable contract and point its proxy at it
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer, required to upgrade
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to the deployments file
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// Path to a JSON configuration file, the built-in catalog is used if absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The upgrade scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy new logic for a contract and upgrade its proxy
    Upgrade(UpgradeArgs),
    /// Print the calldata of a function call
    Calldata(CalldataArgs),
    /// List the upgradeable contracts, their libraries and recorded deployments
    ShowContracts,
}

impl Command {
    /// Runs the command against the loaded configuration
    pub async fn run(
        self,
        config: &DeployConfig,
        priv_key: Option<&str>,
        rpc_url: &str,
        deployments_path: &str,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Upgrade(args) => {
                let priv_key = priv_key.ok_or_else(|| {
                    ScriptError::ClientInitialization(
                        "a private key is required to upgrade".to_string(),
                    )
                })?;
                upgrade(args, config, priv_key, rpc_url, deployments_path).await
            }
            Command::Calldata(args) => build_calldata(args),
            Command::ShowContracts => show_contracts(config, deployments_path),
        }
    }
}

/// Deploy and verify new logic for a contract, then upgrade its proxy.
///
/// The operator is asked for anything not given here: the contract, the
/// calldata of the initialization call, which libraries to link, and any
/// source path or proxy address to override.
#[derive(Args)]
pub struct UpgradeArgs {
    /// Name of the logic contract to upgrade, e.g. `LockersLogic`
    #[arg(long)]
    pub contract: Option<String>,

    /// Directory holding the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Verification API of the block explorer, if not the chain's default
    #[arg(long)]
    pub verifier_url: Option<String>,

    /// API key of the block explorer
    #[arg(long, env = "ETHERSCAN_API_KEY")]
    pub etherscan_api_key: Option<String>,
}

/// Print the calldata of a function call without sending anything
#[derive(Args)]
pub struct CalldataArgs {
    /// Function signature, e.g. `initialize(address,uint256)`
    #[arg(short, long)]
    pub signature: String,

    /// A parameter value, given once per parameter in order.
    /// Array values are comma-separated, e.g. `--arg 0xabc..,0xdef..`
    #[arg(long = "arg")]
    pub args: Vec<String>,
}
