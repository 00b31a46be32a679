//! Constants used in the upgrade scripts

/// The number of confirmations to wait for a contract deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The number of confirmations to wait for a proxy upgrade transaction
pub const NUM_UPGRADE_CONFIRMATIONS: u64 = 1;

/// The number of bytes in a function selector
pub const NUM_BYTES_SELECTOR: usize = 4;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The number of bytes in a `bytes32` value
pub const NUM_BYTES_WORD: usize = 32;

/// The widest unsigned integer type supported by the ABI
pub const MAX_UINT_BITS: usize = 256;

/// The unsized integer alias, which is rejected in favor of `uint256`
pub const BARE_UINT_ALIAS: &str = "uint";

/// The suffix marking a dynamic array type
pub const ARRAY_SUFFIX: &str = "[]";

/// The delimiter between parameter types in a signature, and between
/// elements of an array value
pub const LIST_DELIMITER: char = ',';

/// The answer which confirms a yes/no prompt
pub const CONFIRM_ANSWER: &str = "y";

/// The answer which declines a yes/no prompt
pub const DECLINE_ANSWER: &str = "n";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The default RPC url, a local devnet node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The name of the Foundry command
pub const FORGE_COMMAND: &str = "forge";

/// The name of the source verification subcommand
pub const VERIFY_CONTRACT_COMMAND: &str = "verify-contract";

/// Verification output marking a contract that was verified before
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// Verification output marking a submission that succeeded but needs a manual look
pub const MANUAL_CHECK_MARKER: &str = "should be checked manually";

// ---------------------
// | Contract catalog |
// ---------------------

/// The bitcoin relay logic contract
pub const BITCOIN_RELAY_LOGIC: &str = "BitcoinRelayLogic";
/// The wrapped bitcoin token logic contract
pub const CORE_BTC_LOGIC: &str = "CoreBTCLogic";
/// The lockers logic contract
pub const LOCKERS_LOGIC: &str = "LockersLogic";
/// The cross-chain transfer router logic contract
pub const CC_TRANSFER_ROUTER_LOGIC: &str = "CcTransferRouterLogic";
/// The burn router logic contract
pub const BURN_ROUTER_LOGIC: &str = "BurnRouterLogic";
/// The collaterals logic contract
pub const COLLATERALS_LOGIC: &str = "CollateralsLogic";
/// The library linked into the lockers logic contract
pub const LOCKERS_LIB: &str = "LockersLib";
/// The library linked into the burn router logic contract
pub const BURN_ROUTER_LIB: &str = "BurnRouterLib";
