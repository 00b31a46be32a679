//! Upgrade calls on UUPS proxies

use alloy::{providers::Provider, sol};
use alloy_primitives::{Address, Bytes, TxHash};
use tracing::info;

use crate::{constants::NUM_UPGRADE_CONFIRMATIONS, errors::ScriptError};

sol! {
    #[sol(rpc)]
    interface IUUPSUpgradeable {
        function upgradeTo(address newImplementation) external;
        function upgradeToAndCall(address newImplementation, bytes memory data) external payable;
    }
}

/// Points proxies at new implementations.
///
/// Both calls wait for the upgrade transaction to be confirmed before returning its hash.
#[allow(async_fn_in_trait)]
pub trait ProxyUpgrader {
    /// Upgrades without calling the new implementation
    async fn upgrade_to(
        &mut self,
        proxy: Address,
        implementation: Address,
    ) -> Result<TxHash, ScriptError>;

    /// Upgrades and calls the new implementation with `data` in the same transaction
    async fn upgrade_to_and_call(
        &mut self,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TxHash, ScriptError>;
}

/// Sends upgrade transactions through an RPC provider
pub struct AlloyProxyUpgrader<P> {
    /// The provider through which upgrades are sent
    provider: P,
}

impl<P: Provider> AlloyProxyUpgrader<P> {
    /// Creates an upgrader sending through `provider`
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> ProxyUpgrader for AlloyProxyUpgrader<P> {
    async fn upgrade_to(
        &mut self,
        proxy: Address,
        implementation: Address,
    ) -> Result<TxHash, ScriptError> {
        let proxy_contract = IUUPSUpgradeable::new(proxy, &self.provider);

        info!("proxy {proxy:#x} calling upgradeTo");
        let receipt = proxy_contract
            .upgradeTo(implementation)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(NUM_UPGRADE_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractInteraction(format!(
                "upgradeTo transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }
        Ok(receipt.transaction_hash)
    }

    async fn upgrade_to_and_call(
        &mut self,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TxHash, ScriptError> {
        let proxy_contract = IUUPSUpgradeable::new(proxy, &self.provider);

        info!("proxy {proxy:#x} calling upgradeToAndCall");
        let receipt = proxy_contract
            .upgradeToAndCall(implementation, data)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .with_required_confirmations(NUM_UPGRADE_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractInteraction(format!(
                "upgradeToAndCall transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }
        Ok(receipt.transaction_hash)
    }
}
