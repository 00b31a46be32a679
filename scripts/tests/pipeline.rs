//! Tests of the deploy-verify-upgrade pipeline against in-memory collaborators

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use alloy_primitives::{address, Address, Bytes, TxHash};
use uups_scripts::{
    calldata::{compute_selector, CallPayload},
    config::DeployConfig,
    deploy::Deployer,
    errors::ScriptError,
    pipeline::UpgradePipeline,
    prompt::ScriptedAnswers,
    proxy::ProxyUpgrader,
    registry::Registry,
    types::{Deployment, DeploymentRecord, LibraryBinding, VerifyOutcome},
    verify::Verifier,
};

const CORE_BTC_PROXY: Address = address!("00000000000000000000000000000000000000c0");
const LOCKERS_PROXY: Address = address!("00000000000000000000000000000000000000c1");
const UPGRADE_TX: TxHash = TxHash::repeat_byte(0xab);

/// An action taken by one of the collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Deploy(String, LibraryBinding),
    Verify(Address, String),
    UpgradeTo(Address, Address),
    UpgradeToAndCall(Address, Address, Bytes),
}

type EventLog = Rc<RefCell<Vec<Event>>>;

/// A registry holding the proxies of the built-in catalog
struct MockRegistry(BTreeMap<String, DeploymentRecord>);

impl MockRegistry {
    fn with_proxies() -> Self {
        let record = |address| DeploymentRecord {
            address,
            fingerprint: None,
        };
        Self(BTreeMap::from([
            ("CoreBTCProxy".to_string(), record(CORE_BTC_PROXY)),
            ("LockersProxy".to_string(), record(LOCKERS_PROXY)),
        ]))
    }

    fn empty() -> Self {
        Self(BTreeMap::new())
    }
}

impl Registry for MockRegistry {
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>, ScriptError> {
        Ok(self.0.get(name).copied())
    }
}

/// Deploys each contract to the next address in sequence, starting at 0x..01.
/// The contract named by `zero_address_for` lands at the zero address.
struct MockDeployer {
    log: EventLog,
    deployed: u8,
    zero_address_for: Option<&'static str>,
}

impl Deployer for MockDeployer {
    async fn deploy(
        &mut self,
        name: &str,
        libraries: &LibraryBinding,
    ) -> Result<Deployment, ScriptError> {
        self.deployed += 1;
        self.log
            .borrow_mut()
            .push(Event::Deploy(name.to_string(), libraries.clone()));
        let address = if self.zero_address_for == Some(name) {
            Address::ZERO
        } else {
            Address::with_last_byte(self.deployed)
        };
        Ok(Deployment {
            address,
            reused: false,
        })
    }
}

struct MockVerifier {
    log: EventLog,
    outcome: VerifyOutcome,
}

impl Verifier for MockVerifier {
    async fn verify(
        &mut self,
        address: Address,
        _constructor_args: &[u8],
        source_path: &str,
    ) -> Result<VerifyOutcome, ScriptError> {
        self.log
            .borrow_mut()
            .push(Event::Verify(address, source_path.to_string()));
        Ok(self.outcome.clone())
    }
}

struct MockUpgrader {
    log: EventLog,
}

impl ProxyUpgrader for MockUpgrader {
    async fn upgrade_to(
        &mut self,
        proxy: Address,
        implementation: Address,
    ) -> Result<TxHash, ScriptError> {
        self.log
            .borrow_mut()
            .push(Event::UpgradeTo(proxy, implementation));
        Ok(UPGRADE_TX)
    }

    async fn upgrade_to_and_call(
        &mut self,
        proxy: Address,
        implementation: Address,
        data: Bytes,
    ) -> Result<TxHash, ScriptError> {
        self.log
            .borrow_mut()
            .push(Event::UpgradeToAndCall(proxy, implementation, data));
        Ok(UPGRADE_TX)
    }
}

type TestPipeline<'a> =
    UpgradePipeline<'a, ScriptedAnswers, MockRegistry, MockDeployer, MockVerifier, MockUpgrader>;

fn setup<'a>(
    config: &'a DeployConfig,
    answers: &[&str],
    registry: MockRegistry,
    outcome: VerifyOutcome,
) -> (TestPipeline<'a>, EventLog) {
    setup_with_zero_address(config, answers, registry, outcome, None)
}

fn setup_with_zero_address<'a>(
    config: &'a DeployConfig,
    answers: &[&str],
    registry: MockRegistry,
    outcome: VerifyOutcome,
    zero_address_for: Option<&'static str>,
) -> (TestPipeline<'a>, EventLog) {
    let log = EventLog::default();
    let pipeline = UpgradePipeline::new(
        config,
        ScriptedAnswers::new(answers.iter().copied()),
        registry,
        MockDeployer {
            log: log.clone(),
            deployed: 0,
            zero_address_for,
        },
        MockVerifier {
            log: log.clone(),
            outcome,
        },
        MockUpgrader { log: log.clone() },
    );
    (pipeline, log)
}

/// Left-pads `bytes` to a 32 byte ABI word
fn word(bytes: &[u8]) -> Vec<u8> {
    let mut word = vec![0_u8; 32 - bytes.len()];
    word.extend_from_slice(bytes);
    word
}

#[tokio::test]
async fn test_upgrade_with_calldata() {
    let config = DeployConfig::default();
    let arg = address!("00000000000000000000000000000000000000ff");
    let (mut pipeline, log) = setup(
        &config,
        &[
            "y",
            "setValue(uint256,address)",
            "42",
            "0x00000000000000000000000000000000000000ff",
            "n", // keep the source path
            "n", // keep the proxy address
        ],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let report = pipeline
        .run(Some("CoreBTCLogic".to_string()))
        .await
        .unwrap();
    assert_eq!(pipeline.answers().remaining(), 0);

    let implementation = Address::with_last_byte(1);
    let selector = compute_selector("setValue(uint256,address)");
    let encoded_args = [word(&[42]), word(arg.as_slice())].concat();
    let calldata = [selector.as_slice(), &encoded_args].concat();

    assert_eq!(report.tx_hash, UPGRADE_TX);
    assert_eq!(report.task.proxy_address, CORE_BTC_PROXY);
    assert_eq!(report.task.implementation_address, implementation);
    assert_eq!(
        report.task.payload,
        CallPayload::Call {
            selector,
            encoded_args
        }
    );
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Deploy("CoreBTCLogic".to_string(), LibraryBinding::new()),
            Event::Verify(
                implementation,
                "contracts/erc20/CoreBTCLogic.sol:CoreBTCLogic".to_string()
            ),
            Event::UpgradeToAndCall(CORE_BTC_PROXY, implementation, Bytes::from(calldata)),
        ]
    );
}

#[tokio::test]
async fn test_upgrade_without_calldata() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["CoreBTCLogic", "n", "n", "n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::AlreadyVerified,
    );

    let report = pipeline.run(None).await.unwrap();

    assert!(report.task.payload.is_empty());
    assert_eq!(
        log.borrow().last(),
        Some(&Event::UpgradeTo(CORE_BTC_PROXY, Address::with_last_byte(1)))
    );
}

#[tokio::test]
async fn test_library_resolution() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &[
            "n", // no calldata
            "y", // depends on LockersLib
            "n", // keep the library source path
            "n", // keep the logic source path
            "n", // keep the proxy address
        ],
        MockRegistry::with_proxies(),
        VerifyOutcome::ManualCheckRequired,
    );

    let report = pipeline
        .run(Some("LockersLogic".to_string()))
        .await
        .unwrap();

    let lib = Address::with_last_byte(1);
    let logic = Address::with_last_byte(2);
    let binding = LibraryBinding::from([("LockersLib".to_string(), lib)]);
    assert_eq!(report.task.library_binding, binding);
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Deploy("LockersLib".to_string(), LibraryBinding::new()),
            Event::Verify(lib, "contracts/libraries/LockersLib.sol:LockersLib".to_string()),
            Event::Deploy("LockersLogic".to_string(), binding),
            Event::Verify(logic, "contracts/lockers/LockersLogic.sol:LockersLogic".to_string()),
            Event::UpgradeTo(LOCKERS_PROXY, logic),
        ]
    );
}

#[tokio::test]
async fn test_declined_library() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let binding = pipeline
        .resolve_libraries("LockersLogic", &["LockersLib".to_string()])
        .await
        .unwrap();

    assert!(binding.is_empty());
    assert_eq!(pipeline.answers().remaining(), 0);
    assert!(log.borrow().is_empty());
}

#[tokio::test]
async fn test_source_path_override() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["n", "y", "contracts/erc20/CoreBTCLogicV2.sol:CoreBTCLogic", "n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    pipeline
        .run(Some("CoreBTCLogic".to_string()))
        .await
        .unwrap();

    assert!(log.borrow().contains(&Event::Verify(
        Address::with_last_byte(1),
        "contracts/erc20/CoreBTCLogicV2.sol:CoreBTCLogic".to_string()
    )));
}

#[tokio::test]
async fn test_bad_parameter_spends_nothing() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["y", "setValue(uint256,address)", "forty-two"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::ParseFailure(_))));
    assert!(log.borrow().is_empty());
}

#[tokio::test]
async fn test_bare_uint_spends_nothing() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["y", "setValue(uint)"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::DisallowedType(_))));
    assert!(log.borrow().is_empty());
}

#[tokio::test]
async fn test_failed_verification_aborts() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["n", "n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Failed("bytecode mismatch".to_string()),
    );

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::VerifyFailure(_))));
    assert_eq!(log.borrow().len(), 2);
    assert!(!log
        .borrow()
        .iter()
        .any(|e| matches!(e, Event::UpgradeTo(..) | Event::UpgradeToAndCall(..))));
}

#[tokio::test]
async fn test_missing_proxy_aborts() {
    let config = DeployConfig::default();
    let (mut pipeline, log) =
        setup(&config, &["n", "n", "n"], MockRegistry::empty(), VerifyOutcome::Verified);

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert_eq!(
        res.unwrap_err(),
        ScriptError::MissingRegistryEntry("CoreBTCProxy".to_string())
    );
    assert_eq!(log.borrow().len(), 2);
}

#[tokio::test]
async fn test_proxy_address_override() {
    let config = DeployConfig::default();
    let overridden = address!("00000000000000000000000000000000000000d0");
    let (mut pipeline, log) = setup(
        &config,
        &["n", "n", "y", "0x00000000000000000000000000000000000000d0"],
        MockRegistry::empty(),
        VerifyOutcome::Verified,
    );

    let report = pipeline
        .run(Some("CoreBTCLogic".to_string()))
        .await
        .unwrap();

    assert_eq!(report.task.proxy_address, overridden);
    assert_eq!(
        log.borrow().last(),
        Some(&Event::UpgradeTo(overridden, Address::with_last_byte(1)))
    );
}

#[tokio::test]
async fn test_invalid_proxy_override_aborts() {
    let config = DeployConfig::default();
    for bad in ["0x1234", "0x0000000000000000000000000000000000000000"] {
        let (mut pipeline, log) = setup(
            &config,
            &["n", "n", "y", bad],
            MockRegistry::with_proxies(),
            VerifyOutcome::Verified,
        );

        let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

        assert!(matches!(res, Err(ScriptError::InvalidAddress(_))), "{bad}");
        assert_eq!(log.borrow().len(), 2);
    }
}

#[tokio::test]
async fn test_unknown_target() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &[],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let res = pipeline.run(Some("TeleBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::UnknownContract(_))));
    assert!(pipeline.answers().asked().is_empty());
    assert!(log.borrow().is_empty());
}

#[tokio::test]
async fn test_exhausted_answers_abort() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["y", "setValue(uint256,address)", "42"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::Prompt(_))));
    assert!(log.borrow().is_empty());
    assert_eq!(pipeline.answers().remaining(), 0);
}

#[tokio::test]
async fn test_failed_library_verification_aborts_before_logic() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &[
            "n", // no calldata
            "y", // depends on LockersLib
            "n", // keep the library source path
        ],
        MockRegistry::with_proxies(),
        VerifyOutcome::Failed("bytecode mismatch".to_string()),
    );

    let res = pipeline.run(Some("LockersLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::VerifyFailure(_))));
    assert_eq!(pipeline.answers().remaining(), 0);
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Deploy("LockersLib".to_string(), LibraryBinding::new()),
            Event::Verify(
                Address::with_last_byte(1),
                "contracts/libraries/LockersLib.sol:LockersLib".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_zero_logic_address_aborts() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup_with_zero_address(
        &config,
        &["n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
        Some("CoreBTCLogic"),
    );

    let res = pipeline.run(Some("CoreBTCLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::DeployFailure(_))));
    assert_eq!(
        *log.borrow(),
        vec![Event::Deploy("CoreBTCLogic".to_string(), LibraryBinding::new())]
    );
}

#[tokio::test]
async fn test_zero_library_address_aborts() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup_with_zero_address(
        &config,
        &["n", "y"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
        Some("LockersLib"),
    );

    let res = pipeline.run(Some("LockersLogic".to_string())).await;

    assert!(matches!(res, Err(ScriptError::DeployFailure(_))));
    assert_eq!(
        *log.borrow(),
        vec![Event::Deploy("LockersLib".to_string(), LibraryBinding::new())]
    );
}

#[tokio::test]
async fn test_unclear_dependency_answer_asks_again() {
    let config = DeployConfig::default();
    let (mut pipeline, log) = setup(
        &config,
        &["yes"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let res = pipeline
        .resolve_libraries("LockersLogic", &["LockersLib".to_string()])
        .await;

    // The typo is not taken as a no, the question is asked again
    assert!(matches!(res, Err(ScriptError::Prompt(_))));
    assert_eq!(pipeline.answers().asked().len(), 2);
    assert!(log.borrow().is_empty());

    let (mut pipeline, log) = setup(
        &config,
        &["yes", "y", "n"],
        MockRegistry::with_proxies(),
        VerifyOutcome::Verified,
    );

    let binding = pipeline
        .resolve_libraries("LockersLogic", &["LockersLib".to_string()])
        .await
        .unwrap();

    assert_eq!(
        binding,
        LibraryBinding::from([("LockersLib".to_string(), Address::with_last_byte(1))])
    );
    assert_eq!(log.borrow().len(), 2);
}
