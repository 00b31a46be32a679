//! Configuration of the upgrade scripts.
//!
//! The configuration is read once from an optional JSON file and passed into
//! each command explicitly. Without a file, the built-in catalog of
//! upgradeable contracts is used and every oracle key is absent.

use std::{collections::BTreeMap, fs, path::Path};

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        BITCOIN_RELAY_LOGIC, BURN_ROUTER_LIB, BURN_ROUTER_LOGIC, CC_TRANSFER_ROUTER_LOGIC,
        COLLATERALS_LOGIC, CORE_BTC_LOGIC, LOCKERS_LIB, LOCKERS_LOGIC,
    },
    errors::ScriptError,
};

/// An upgradeable logic contract and the proxy delegating to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSpec {
    /// The name under which the proxy is recorded in the deployments file
    pub proxy: String,
    /// The source path used for verification, e.g. `contracts/Foo.sol:Foo`
    pub source_path: String,
    /// The libraries the contract may be linked against
    #[serde(default)]
    pub libraries: Vec<String>,
}

/// Token price pair names registered in the price oracle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePairs {
    /// The native token price pair
    pub core_usdt: Option<String>,
    /// The wrapped bitcoin price pair
    pub btc_usdt: Option<String>,
    /// The USDT price pair, only used with multiple collaterals
    pub usdt_usdt: Option<String>,
    /// The USDC price pair, only used with multiple collaterals
    pub usdc_usdt: Option<String>,
}

/// Pyth price feed identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedIds {
    /// The bitcoin price feed
    pub btc_usdt: Option<B256>,
    /// The native token price feed
    pub core_usdt: Option<B256>,
}

/// Token and feed settings of the price oracle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// The native token
    pub native_token: Option<Address>,
    /// The USDT token, absent on deployments without multiple collaterals
    pub usdt_token: Option<Address>,
    /// The USDC token, absent on deployments without multiple collaterals
    pub usdc_token: Option<Address>,
    /// The price pair names
    pub price_pairs: PricePairs,
    /// The Pyth feed identifiers
    pub pyth_feed_ids: FeedIds,
}

/// Optional features of a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Whether stable tokens may be locked as collateral
    pub enable_multiple_collaterals: bool,
    /// Whether the price oracle reads from a mock price proxy
    pub enable_mock_price_proxy: bool,
}

/// The configuration of the upgrade scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// The upgradeable logic contracts, keyed by name
    pub contracts: BTreeMap<String, ContractSpec>,
    /// The verification source path of each library, keyed by name
    pub libraries: BTreeMap<String, String>,
    /// The price oracle settings
    pub oracle: OracleConfig,
    /// The enabled features
    pub features: FeatureFlags,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let contract = |proxy: &str, source_path: &str, libraries: &[&str]| ContractSpec {
            proxy: proxy.to_string(),
            source_path: source_path.to_string(),
            libraries: libraries.iter().map(|l| l.to_string()).collect(),
        };

        let contracts = BTreeMap::from([
            (
                BITCOIN_RELAY_LOGIC.to_string(),
                contract(
                    "BitcoinRelayProxy",
                    "contracts/common/relay/BitcoinRelayLogic.sol:BitcoinRelayLogic",
                    &[],
                ),
            ),
            (
                CORE_BTC_LOGIC.to_string(),
                contract("CoreBTCProxy", "contracts/erc20/CoreBTCLogic.sol:CoreBTCLogic", &[]),
            ),
            (
                LOCKERS_LOGIC.to_string(),
                contract(
                    "LockersProxy",
                    "contracts/lockers/LockersLogic.sol:LockersLogic",
                    &[LOCKERS_LIB],
                ),
            ),
            (
                CC_TRANSFER_ROUTER_LOGIC.to_string(),
                contract(
                    "CcTransferRouterProxy",
                    "contracts/routers/CcTransferRouterLogic.sol:CcTransferRouterLogic",
                    &[],
                ),
            ),
            (
                BURN_ROUTER_LOGIC.to_string(),
                contract(
                    "BurnRouterProxy",
                    "contracts/routers/BurnRouterLogic.sol:BurnRouterLogic",
                    &[BURN_ROUTER_LIB],
                ),
            ),
            (
                COLLATERALS_LOGIC.to_string(),
                contract(
                    "CollateralsProxy",
                    "contracts/lockers/CollateralsLogic.sol:CollateralsLogic",
                    &[],
                ),
            ),
        ]);

        let libraries = BTreeMap::from([
            (
                LOCKERS_LIB.to_string(),
                "contracts/libraries/LockersLib.sol:LockersLib".to_string(),
            ),
            (
                BURN_ROUTER_LIB.to_string(),
                "contracts/libraries/BurnRouterLib.sol:BurnRouterLib".to_string(),
            ),
        ]);

        Self {
            contracts,
            libraries,
            oracle: OracleConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl DeployConfig {
    /// Loads and validates the configuration file, falling back to the
    /// built-in defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ScriptError> {
        let config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    ScriptError::Config(format!("could not read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&contents).map_err(|e| ScriptError::Config(e.to_string()))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that every library a contract depends on has a source path, and
    /// that the stable-token keys are present when multiple collaterals are
    /// enabled
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (name, spec) in &self.contracts {
            if let Some(lib) = spec.libraries.iter().find(|l| !self.libraries.contains_key(*l)) {
                return Err(ScriptError::Config(format!(
                    "{name} depends on {lib}, which has no source path"
                )));
            }
        }

        if self.features.enable_multiple_collaterals {
            let oracle = &self.oracle;
            let missing = [
                ("oracle.usdt_token", oracle.usdt_token.is_none()),
                ("oracle.usdc_token", oracle.usdc_token.is_none()),
                ("oracle.price_pairs.usdt_usdt", oracle.price_pairs.usdt_usdt.is_none()),
                ("oracle.price_pairs.usdc_usdt", oracle.price_pairs.usdc_usdt.is_none()),
            ];
            if let Some((key, _)) = missing.iter().find(|(_, absent)| *absent) {
                return Err(ScriptError::Config(format!(
                    "{key} is required when multiple collaterals are enabled"
                )));
            }
        }

        Ok(())
    }

    /// Looks up an upgradeable contract by name
    pub fn contract(&self, name: &str) -> Result<&ContractSpec, ScriptError> {
        self.contracts
            .get(name)
            .ok_or_else(|| ScriptError::UnknownContract(name.to_string()))
    }

    /// The verification source path of a library
    pub fn library_source_path(&self, name: &str) -> Option<&str> {
        self.libraries.get(name).map(String::as_str)
    }
}
