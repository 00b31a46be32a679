//! Utilities for the upgrade scripts.

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::info;

use crate::errors::ScriptError;

/// Sets up a provider which signs with `priv_key` and sends through `rpc_url`
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<impl Provider + Clone, ScriptError> {
    let url = Url::parse(rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(format!("invalid RPC url: {e}")))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let sender = signer.address();

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("sending from {sender:#x} on chain {chain_id}");

    Ok(provider)
}
