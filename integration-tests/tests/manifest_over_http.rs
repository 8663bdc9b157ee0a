#![allow(non_snake_case)]

use chain_arcade::{
    bridge::{
        Bridge,
        BridgeError,
        BridgeOptions,
    },
    config::ManifestSource,
};
use deployments::{
    ContractEntry,
    ContractManifest,
    write_manifest,
};
use game_abi::test_helpers::{
    FAKE_CHAIN_ID,
    FakeChain,
    account,
    contract_address,
};
use serde_json::json;
use static_server::{
    SiteConfig,
    StaticServer,
};
use tempdir::TempDir;

fn function(name: &str) -> serde_json::Value {
    json!({"type": "function", "name": name, "inputs": [], "outputs": []})
}

fn publish(dir: &TempDir, manifest: &ContractManifest) -> StaticServer {
    std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
    let site = SiteConfig::in_root(dir.path());
    write_manifest(&site.manifest, manifest).unwrap();
    StaticServer::new(site, None).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn served_manifest__drives_bridge_connection() {
    // given
    let dir = TempDir::new("site").unwrap();
    let mut manifest = ContractManifest::single(ContractEntry {
        address: Some(contract_address().to_string()),
        abi: vec![function("registerPlayer"), function("performAction")],
    });
    manifest.network = Some("localhost".to_string());
    manifest.chain_id = Some(FAKE_CHAIN_ID);
    let server = publish(&dir, &manifest);
    let source = ManifestSource::parse(&format!("{}/", server.base_url()));

    // when
    let loaded = source.load().await.unwrap().unwrap();
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = Bridge::new(chain.wallet(), Some(loaded), BridgeOptions::default());
    let report = bridge.connect_and_sync().await.unwrap();

    // then
    assert_eq!(report.contract, Some(contract_address()));
    assert!(report.chain_mismatch.is_none());
    assert!(chain.is_registered(account(1)));
    bridge.perform_action().await.unwrap();
    assert_eq!(
        bridge.stake_nft(alloy::primitives::U256::from(1)).await,
        Err(BridgeError::MethodUnavailable { method: "stakeNft" })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_served_manifest__leaves_contract_unavailable() {
    // given
    let dir = TempDir::new("site").unwrap();
    std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
    let server = StaticServer::new(SiteConfig::in_root(dir.path()), None).unwrap();
    let source = ManifestSource::parse(&format!("{}/contractInfo.json", server.base_url()));

    // when
    let loaded = source.load().await.unwrap();
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = Bridge::new(chain.wallet(), loaded, BridgeOptions::default());
    let report = bridge.connect().await.unwrap();

    // then
    assert!(report.contract.is_none());
    assert_eq!(
        bridge.perform_action().await,
        Err(BridgeError::ContractUnavailable)
    );
    assert!(chain.submitted().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn served_manifest__on_other_chain_reports_mismatch() {
    let dir = TempDir::new("site").unwrap();
    let mut manifest = ContractManifest::single(ContractEntry {
        address: Some(contract_address().to_string()),
        abi: Vec::new(),
    });
    manifest.chain_id = Some(1);
    let server = publish(&dir, &manifest);
    let source = ManifestSource::Url(format!("{}/contractInfo.json", server.base_url()));

    let loaded = source.load().await.unwrap();
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = Bridge::new(chain.wallet(), loaded, BridgeOptions::default());
    let report = bridge.connect().await.unwrap();

    let mismatch = report.chain_mismatch.unwrap();
    assert_eq!(mismatch.expected, 1);
    assert_eq!(mismatch.actual, FAKE_CHAIN_ID);
}
