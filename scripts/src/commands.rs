//! Implementations of the upgrade scripts

use itertools::Itertools;
use tracing::info;

use crate::{
    calldata::encode_call,
    cli::{CalldataArgs, UpgradeArgs},
    config::DeployConfig,
    deploy::ArtifactDeployer,
    errors::ScriptError,
    pipeline::UpgradePipeline,
    prompt::StdinAnswers,
    proxy::AlloyProxyUpgrader,
    registry::DeploymentsFile,
    utils::setup_client,
    verify::ForgeVerifier,
};

/// Runs the upgrade pipeline against the live chain, asking the operator in the terminal
pub async fn upgrade(
    args: UpgradeArgs,
    config: &DeployConfig,
    priv_key: &str,
    rpc_url: &str,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let client = setup_client(priv_key, rpc_url).await?;
    let deployments = DeploymentsFile::new(deployments_path);

    let deployer = ArtifactDeployer::new(client.clone(), args.artifacts_dir, deployments.clone());
    let verifier = ForgeVerifier::new(rpc_url, args.verifier_url, args.etherscan_api_key);
    let upgrader = AlloyProxyUpgrader::new(client);

    let mut pipeline =
        UpgradePipeline::new(config, StdinAnswers, deployments, deployer, verifier, upgrader);
    let report = pipeline.run(args.contract).await?;

    println!(
        "{} upgraded to {:#x} in tx {:#x}",
        report.task.target_contract, report.task.implementation_address, report.tx_hash
    );

    Ok(())
}

/// Prints the hex calldata of a function call
pub fn build_calldata(args: CalldataArgs) -> Result<(), ScriptError> {
    let payload = encode_call(&args.signature, &args.args)?;
    info!("built {} bytes of calldata for {}", payload.to_bytes().len(), args.signature);

    println!("0x{}", hex::encode(payload.to_bytes()));
    Ok(())
}

/// Prints the contract catalog alongside the recorded deployments
pub fn show_contracts(config: &DeployConfig, deployments_path: &str) -> Result<(), ScriptError> {
    let deployments = DeploymentsFile::new(deployments_path).all()?;
    let recorded = |name: &str| {
        deployments
            .get(name)
            .map_or_else(|| "-".to_string(), |record| format!("{:#x}", record.address))
    };

    println!("Upgradeable contracts:");
    for (name, spec) in &config.contracts {
        let libraries = if spec.libraries.is_empty() {
            "-".to_string()
        } else {
            spec.libraries.iter().join(", ")
        };
        println!(
            "  {name:<24} proxy {:<24} {:<44} libraries {libraries}",
            spec.proxy,
            recorded(&spec.proxy)
        );
        println!("  {:<24} source {}", "", spec.source_path);
    }

    println!("Libraries:");
    for (name, source_path) in &config.libraries {
        println!("  {name:<24} {:<44} source {source_path}", recorded(name));
    }

    println!("Deployments file {deployments_path}:");
    for (name, record) in &deployments {
        let fingerprint = record
            .fingerprint
            .map_or_else(|| "-".to_string(), |f| format!("{f:#x}"));
        println!("  {name:<24} {:#x} fingerprint {fingerprint}", record.address);
    }

    let oracle = &config.oracle;
    let features = &config.features;
    let fmt_opt = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!("Oracle:");
    println!("  native token      {}", fmt_opt(oracle.native_token.map(|a| format!("{a:#x}"))));
    println!("  usdt token        {}", fmt_opt(oracle.usdt_token.map(|a| format!("{a:#x}"))));
    println!("  usdc token        {}", fmt_opt(oracle.usdc_token.map(|a| format!("{a:#x}"))));
    println!(
        "  price pairs       {}",
        [
            &oracle.price_pairs.core_usdt,
            &oracle.price_pairs.btc_usdt,
            &oracle.price_pairs.usdt_usdt,
            &oracle.price_pairs.usdc_usdt,
        ]
        .into_iter()
        .flatten()
        .join(", ")
    );
    println!(
        "  pyth feeds        {}",
        [oracle.pyth_feed_ids.btc_usdt, oracle.pyth_feed_ids.core_usdt]
            .into_iter()
            .flatten()
            .map(|id| format!("{id:#x}"))
            .join(", ")
    );
    println!("Features:");
    println!("  multiple collaterals  {}", features.enable_multiple_collaterals);
    println!("  mock price proxy      {}", features.enable_mock_price_proxy);

    Ok(())
}
