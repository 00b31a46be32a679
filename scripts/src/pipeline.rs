//! The deploy-verify-upgrade pipeline for a single upgradeable contract.
//!
//! A run walks through the stages of [`UpgradeStage`] in order:
//! select the target, build the initialization payload, deploy and verify the
//! target's libraries, deploy and verify the new logic, locate the proxy and
//! upgrade it. The first failing stage aborts the run. Nothing is retried or
//! rolled back, deployments staged before an abort are reused by the next run.

use std::str::FromStr;

use alloy_primitives::{Address, Bytes, TxHash};
use tracing::{error, info, warn};

use crate::{
    calldata::{
        build_payload, parse_checked_param, parse_parameter_types, validate_type_list,
        CallPayload,
    },
    config::DeployConfig,
    deploy::Deployer,
    errors::ScriptError,
    prompt::AnswerSource,
    proxy::ProxyUpgrader,
    registry::Registry,
    types::{LibraryBinding, UpgradeReport, UpgradeStage, UpgradeTask},
    verify::Verifier,
};

/// Orchestrates the upgrade of one logic contract behind its proxy
pub struct UpgradePipeline<'a, A, R, D, V, U> {
    /// The contract catalog
    config: &'a DeployConfig,
    /// The source of operator answers
    answers: A,
    /// The registry of prior deployments
    registry: R,
    /// Deploys libraries and logic contracts
    deployer: D,
    /// Verifies deployed sources
    verifier: V,
    /// Upgrades proxies
    upgrader: U,
}

impl<'a, A, R, D, V, U> UpgradePipeline<'a, A, R, D, V, U>
where
    A: AnswerSource,
    R: Registry,
    D: Deployer,
    V: Verifier,
    U: ProxyUpgrader,
{
    /// Creates a pipeline over the given collaborators
    pub fn new(
        config: &'a DeployConfig,
        answers: A,
        registry: R,
        deployer: D,
        verifier: V,
        upgrader: U,
    ) -> Self {
        Self {
            config,
            answers,
            registry,
            deployer,
            verifier,
            upgrader,
        }
    }

    /// The source of operator answers
    pub fn answers(&self) -> &A {
        &self.answers
    }

    /// Runs the pipeline for `target`, asking for it if not given
    pub async fn run(&mut self, target: Option<String>) -> Result<UpgradeReport, ScriptError> {
        let mut stage = UpgradeStage::SelectTarget;
        match self.run_stages(target, &mut stage).await {
            Ok(report) => {
                info!(
                    "upgraded {} at {:#x} to {:#x} in tx {:#x}",
                    report.task.target_contract,
                    report.task.proxy_address,
                    report.task.implementation_address,
                    report.tx_hash
                );
                Ok(report)
            }
            Err(e) => {
                error!("upgrade aborted at {stage}: {e}");
                Err(e)
            }
        }
    }

    /// Runs every stage in order, keeping `stage` at the one in progress
    async fn run_stages(
        &mut self,
        target: Option<String>,
        stage: &mut UpgradeStage,
    ) -> Result<UpgradeReport, ScriptError> {
        let config = self.config;

        let target = match target {
            Some(target) => target,
            None => self.answers.ask("Enter logic contract name to be upgraded")?,
        };
        let spec = config.contract(&target)?;
        info!("upgrading {target} behind {}", spec.proxy);

        // The payload is built before anything is deployed, so that a bad
        // parameter costs no gas
        *stage = UpgradeStage::BuildPayload;
        let payload = self.prepare_payload()?;

        *stage = UpgradeStage::ResolveLibraries;
        let library_binding = self.resolve_libraries(&target, &spec.libraries).await?;

        *stage = UpgradeStage::DeployLogic;
        let deployment = self.deployer.deploy(&target, &library_binding).await?;
        if deployment.address == Address::ZERO {
            return Err(ScriptError::DeployFailure(format!(
                "{target} deployed to the zero address"
            )));
        }

        *stage = UpgradeStage::VerifyLogic;
        self.verify_source(&target, deployment.address, &spec.source_path)
            .await?;

        *stage = UpgradeStage::LocateProxy;
        let proxy_address = self.locate_proxy(&spec.proxy)?;

        *stage = UpgradeStage::UpgradeProxy;
        let task = UpgradeTask {
            target_contract: target,
            proxy_address,
            implementation_address: deployment.address,
            library_binding,
            payload,
        };
        let tx_hash = self.upgrade_proxy(&task).await?;

        Ok(UpgradeReport { task, tx_hash })
    }

    /// Asks whether to call the new implementation during the upgrade, and if
    /// so collects the signature and a value for each of its parameters
    pub fn prepare_payload(&mut self) -> Result<CallPayload, ScriptError> {
        if !self
            .answers
            .confirm("Construct calldata for upgradeToAndCall?")?
        {
            return Ok(CallPayload::Empty);
        }

        let signature = self
            .answers
            .ask("Function signature (e.g. initForMultipleCollateralsFeature(address[]))")?;
        let type_names = parse_parameter_types(&signature)?;
        let param_types = validate_type_list(&type_names)?;

        let mut values = Vec::with_capacity(param_types.len());
        for (i, param_type) in param_types.iter().enumerate() {
            let raw = self
                .answers
                .ask(&format!("Enter parameter {i} (type {param_type})"))?;
            values.push(parse_checked_param(param_type, &raw)?);
        }

        info!("type list: {param_types:?}");
        info!("value list: {values:?}");
        build_payload(&signature, &param_types, &values)
    }

    /// Deploys and verifies each library `target` is confirmed to depend on,
    /// returning the bindings to link into it
    pub async fn resolve_libraries(
        &mut self,
        target: &str,
        dependencies: &[String],
    ) -> Result<LibraryBinding, ScriptError> {
        let config = self.config;
        let mut binding = LibraryBinding::new();

        for lib in dependencies {
            if !self
                .answers
                .confirm(&format!("Does {target} depend on library {lib}?"))?
            {
                continue;
            }

            let deployment = self.deployer.deploy(lib, &LibraryBinding::new()).await?;
            if deployment.address == Address::ZERO {
                return Err(ScriptError::DeployFailure(format!(
                    "{lib} deployed to the zero address"
                )));
            }

            let source_path = config.library_source_path(lib).unwrap_or_default();
            self.verify_source(lib, deployment.address, source_path)
                .await?;

            binding.insert(lib.clone(), deployment.address);
        }

        Ok(binding)
    }

    /// Confirms or overrides the source path of `name` and verifies it, any
    /// outcome other than a failure counts as verified
    async fn verify_source(
        &mut self,
        name: &str,
        address: Address,
        default_path: &str,
    ) -> Result<(), ScriptError> {
        let mut source_path = default_path.to_string();
        if self.answers.confirm(&format!(
            "{name} source path is `{source_path}`, replace it?"
        ))? {
            source_path = self.answers.ask("Enter new source path for verifying")?;
        }
        if source_path.is_empty() {
            return Err(ScriptError::VerifyFailure(format!(
                "no source path for {name}"
            )));
        }

        let outcome = self
            .verifier
            .verify(address, &[] /* constructor_args */, &source_path)
            .await?;
        if !outcome.is_success() {
            return Err(ScriptError::VerifyFailure(format!(
                "{name} at {address:#x}: {outcome:?}"
            )));
        }

        Ok(())
    }

    /// Resolves the proxy address from the registry, letting the operator
    /// override it
    fn locate_proxy(&mut self, proxy_name: &str) -> Result<Address, ScriptError> {
        let recorded = self.registry.get(proxy_name)?.map(|record| record.address);
        let shown = recorded.map_or_else(|| "absent".to_string(), |a| format!("{a:#x}"));

        let address = if self.answers.confirm(&format!(
            "{proxy_name} default address is {shown}, replace it?"
        ))? {
            let raw = self
                .answers
                .ask(&format!("Enter new {proxy_name} address"))?;
            Address::from_str(&raw)
                .map_err(|e| ScriptError::InvalidAddress(format!("`{raw}`: {e}")))?
        } else {
            recorded.ok_or_else(|| ScriptError::MissingRegistryEntry(proxy_name.to_string()))?
        };

        if address == Address::ZERO {
            return Err(ScriptError::InvalidAddress(format!(
                "{proxy_name} is the zero address"
            )));
        }
        Ok(address)
    }

    /// Points the proxy at the new implementation, calling it if the task
    /// carries a payload
    async fn upgrade_proxy(&mut self, task: &UpgradeTask) -> Result<TxHash, ScriptError> {
        if !task.library_binding.is_empty() {
            info!("new logic is linked against {:?}", task.library_binding);
        }

        match &task.payload {
            CallPayload::Empty => {
                warn!("no calldata, upgrading without an initialization call");
                self.upgrader
                    .upgrade_to(task.proxy_address, task.implementation_address)
                    .await
            }
            payload => {
                self.upgrader
                    .upgrade_to_and_call(
                        task.proxy_address,
                        task.implementation_address,
                        Bytes::from(payload.to_bytes()),
                    )
                    .await
            }
        }
    }
}
