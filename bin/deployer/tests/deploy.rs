//! Integration tests against a local development node.
//!
//! Start anvil (or hardhat node) first, then run:
//! ```bash
//! RPC_URL=http://127.0.0.1:8545 cargo test --package deployer --test deploy -- --ignored --test-threads=1
//! ```


use alloy_primitives::{address, Address, U256};
use alloy_provider::Provider;
use binding::proxy::{address_from_slot, slot_key, IMPLEMENTATION_SLOT};
use config::Env;
use deployer::{cli::GlobalArgs, Context, PROXY_CONTRACT};
use setup::{
    workspace, write_artifact, ANSWER_BYTECODE, PROXY_ABI, PROXY_BYTECODE, UUPS_ABI,
    UUPS_BYTECODE,
};

const OWNER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

fn write_upgradable(global: &GlobalArgs) {
    write_artifact(&global.artifacts, "Vault", UUPS_ABI, UUPS_BYTECODE);
    write_artifact(&global.artifacts, "VaultV2", UUPS_ABI, UUPS_BYTECODE);
    write_artifact(&global.artifacts, PROXY_CONTRACT, PROXY_ABI, PROXY_BYTECODE);
}

async fn storage_address(proxy: Address, slot: U256) -> Address {
    let provider = client::create_provider(&setup::rpc_url())
        .await
        .expect("Failed to create provider");
    let word = provider
        .get_storage_at(proxy, slot)
        .await
        .expect("Failed to read storage");
    address_from_slot(word)
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_signer_balance() {
    let (_dir, global) = workspace();
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    let balance = ctx.signer_balance().await.expect("Failed to query signer balance");

    println!("✓ Signer balance: {} {balance}", balance.holder);
    assert_eq!(
        balance.holder,
        address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    );
    assert!(balance.amount > U256::ZERO);
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_deploy_and_read_balance() {
    let (_dir, global) = workspace();
    write_artifact(&global.artifacts, "Answer", "[]", ANSWER_BYTECODE);
    let ctx = Context::resolve(&global, Env::new().with("REPORT_GAS", "1")).unwrap();

    let deployment = ctx
        .deploy("Answer", false, vec![])
        .await
        .expect("Failed to deploy");

    println!("✓ Contract deployed at {}", deployment.address);
    println!("  Transaction: {}", deployment.outcome.tx_hash);
    assert!(deployment.implementation.is_none());
    assert!(deployment.outcome.gas_used > 0);

    let balance = ctx.balance(deployment.address).await.unwrap();
    assert_eq!(balance.amount, U256::ZERO);
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_upgradable_requires_proxy_artifact() {
    let (_dir, global) = workspace();
    write_artifact(&global.artifacts, "Answer", "[]", ANSWER_BYTECODE);
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    let err = ctx.deploy("Answer", true, vec![]).await.unwrap_err();
    assert!(err.to_string().contains("ERC1967Proxy"));
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_upgrade_rejects_plain_account() {
    let (_dir, global) = workspace();
    write_artifact(&global.artifacts, "Answer", "[]", ANSWER_BYTECODE);
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    // an EOA has no code and no implementation slot
    let eoa = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    let err = ctx.upgrade("Answer", eoa).await.unwrap_err();
    assert!(err.to_string().contains("Not ready"));
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_upgradable_deploy_initializes_proxy() {
    let (_dir, global) = workspace();
    write_upgradable(&global);
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    let deployment = ctx
        .deploy("Vault", true, vec![OWNER.to_string()])
        .await
        .expect("Failed to deploy behind proxy");

    let implementation = deployment.implementation.expect("no implementation address");
    println!("✓ Proxy deployed at {}", deployment.address);
    println!("  Implementation: {implementation}");
    assert_ne!(deployment.address, implementation);

    let slot = storage_address(deployment.address, slot_key(IMPLEMENTATION_SLOT)).await;
    assert_eq!(slot, implementation);

    // initialize(address) ran through the proxy
    let owner = storage_address(deployment.address, U256::ZERO).await;
    assert_eq!(owner, OWNER);
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_upgradable_deploy_rejects_unmatched_initializer() {
    let (_dir, global) = workspace();
    write_upgradable(&global);
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    let err = ctx
        .deploy("Vault", true, vec![OWNER.to_string(), "1".into()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Not ready"));
}

#[tokio::test]
#[ignore = "requires a local development node"]
async fn test_upgrade_replaces_implementation() {
    let (_dir, global) = workspace();
    write_upgradable(&global);
    let ctx = Context::resolve(&global, Env::new()).unwrap();

    let deployment = ctx
        .deploy("Vault", true, vec![OWNER.to_string()])
        .await
        .expect("Failed to deploy behind proxy");
    let original = deployment.implementation.expect("no implementation address");

    let upgraded = ctx
        .upgrade("VaultV2", deployment.address)
        .await
        .expect("Failed to upgrade");

    println!("✓ Proxy {} upgraded", upgraded.proxy);
    println!("  {} -> {}", upgraded.previous, upgraded.implementation);
    println!("  Transaction: {}", upgraded.outcome.tx_hash);

    assert_eq!(upgraded.proxy, deployment.address);
    assert_eq!(upgraded.previous, original);
    assert_ne!(upgraded.implementation, original);

    let slot = storage_address(deployment.address, slot_key(IMPLEMENTATION_SLOT)).await;
    assert_eq!(slot, upgraded.implementation);

    // proxy storage survives the upgrade
    assert_eq!(storage_address(deployment.address, U256::ZERO).await, OWNER);
}
