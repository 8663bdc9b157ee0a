#![allow(non_snake_case)]

use alloy::primitives::U256;
use chain_arcade::bridge::{
    ActionPhase,
    Bridge,
    BridgeError,
    BridgeOptions,
    RevertReason,
};
use deployments::{
    ContractEntry,
    ContractManifest,
};
use game_abi::{
    CallError,
    CallKind,
    ContractCall,
    test_helpers::{
        FakeChain,
        FakeWallet,
        account,
        contract_address,
    },
};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn manifest() -> ContractManifest {
    ContractManifest::single(ContractEntry {
        address: Some(contract_address().to_string()),
        abi: Vec::new(),
    })
}

fn call_for(index: u8) -> ContractCall {
    let token_id = U256::from(index % 4 + 1);
    match index % 8 {
        0 => ContractCall::PerformAction,
        1 => ContractCall::ClaimDailyReward,
        2 => ContractCall::UpgradeNft { token_id },
        3 => ContractCall::CreateGuild {
            name: "Guild".to_string(),
            description: "Testers".to_string(),
        },
        4 => ContractCall::LeaveGuild,
        5 => ContractCall::ListItem {
            token_id,
            price: U256::from(5),
        },
        6 => ContractCall::StakeNft { token_id },
        _ => ContractCall::ChallengePlayer {
            opponent: account(2),
            amount: U256::from(1),
        },
    }
}

async fn connected(chain: &FakeChain) -> Bridge<FakeWallet> {
    let mut bridge = Bridge::new(chain.wallet(), Some(manifest()), BridgeOptions::default());
    bridge.connect_and_sync().await.unwrap();
    bridge
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 16, .. ProptestConfig::default() })]
    #[test]
    fn run_action__releases_busy_flag_whatever_the_outcome(
        steps in prop::collection::vec((any::<u8>(), 0u8..4), 1..12)
    ) {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            _run_action__releases_busy_flag_whatever_the_outcome(steps).await
        })?;
    }
}

async fn _run_action__releases_busy_flag_whatever_the_outcome(
    steps: Vec<(u8, u8)>,
) -> Result<(), TestCaseError> {
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = connected(&chain).await;

    for (index, failure) in steps {
        // given
        let call = call_for(index);
        let kind = call.kind();
        match failure {
            1 => chain.fail_next_submit(kind, CallError::rejected("User rejected the request")),
            2 => chain.fail_next_submit(kind, CallError::reverted("execution reverted: boom")),
            3 => chain.revert_next_confirm(kind),
            _ => {}
        }

        // when
        let result = bridge.run_action(call).await;

        // then
        prop_assert_eq!(result.is_ok(), failure == 0);
        let expected = if failure == 0 {
            ActionPhase::Succeeded
        } else {
            ActionPhase::Failed
        };
        prop_assert_eq!(bridge.phase(kind), expected);
        prop_assert!(!bridge.phase(kind).is_busy());
        prop_assert_eq!(bridge.in_flight(), 0);
    }
    Ok(())
}

#[tokio::test]
async fn arcade_session__experience_tracks_confirmed_actions() {
    // given
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = connected(&chain).await;

    // when
    for _ in 0..3 {
        bridge.perform_action().await.unwrap();
    }
    chain.fail_next_submit(
        CallKind::PerformAction,
        CallError::reverted("execution reverted: Action on cooldown"),
    );
    let cooldown = bridge.perform_action().await;

    // then
    assert!(matches!(
        cooldown,
        Err(BridgeError::ContractRevert {
            reason: RevertReason::Cooldown,
            ..
        })
    ));
    let info = bridge.view().info.clone().unwrap();
    assert_eq!(info.experience, U256::from(30));
    assert_eq!(chain.submitted_count(CallKind::PerformAction), 3);
}

#[tokio::test]
async fn guild_lifecycle__is_reflected_in_refreshed_view() {
    // given
    let chain = FakeChain::with_accounts(vec![account(1)]);
    let mut bridge = connected(&chain).await;

    // when
    bridge
        .create_guild("Arcaders".to_string(), "Coin hunters".to_string())
        .await
        .unwrap();
    let joined = bridge.view().guild.clone();
    bridge.leave_guild().await.unwrap();

    // then
    assert_eq!(joined.map(|g| g.name), Some("Arcaders".to_string()));
    assert!(bridge.view().guild.is_none());
    assert!(!bridge.view().info.clone().unwrap().in_guild());
}
