use clap::Parser;
use tracing_subscriber::EnvFilter;
use uups_scripts::{cli::Cli, config::DeployConfig, errors::ScriptError};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        deployments_path,
        config,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DeployConfig::load(config.as_deref())?;

    command
        .run(&config, priv_key.as_deref(), &rpc_url, &deployments_path)
        .await
}
