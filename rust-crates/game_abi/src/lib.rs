use alloy::primitives::{
    Address,
    B256,
    U256,
};
use std::{
    fmt,
    future::Future,
};

pub mod rpc;
pub mod wallets;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub mod game_types {
    alloy::sol! {
        #[sol(rpc)]
        interface IGameLogic {
            function registerPlayer() external;
            function mintNFT(string uri) external returns (uint256);
            function performAction() external;
            function upgradeNFT(uint256 tokenId) external;
            function claimDailyReward() external;
            function createGuild(string name, string description) external returns (uint256);
            function joinGuild(uint256 guildId) external;
            function leaveGuild() external;
            function challengePlayer(address opponent, uint256 amount) external;
            function listItem(uint256 tokenId, uint256 price) external;
            function buyItem(uint256 tokenId) external;
            function stakeNFT(uint256 tokenId) external;
            function unstakeNFT(uint256 tokenId) external;

            function getPlayerInfo(address playerAddr) external view returns (
                uint256[] nfts,
                uint256 level,
                uint256 experience,
                uint256 lastActionTime,
                uint256 lastClaimTime,
                uint256 totalRewards,
                uint256 achievementPoints,
                uint256 nftCount,
                uint256 gameTokens,
                uint256 reputation,
                uint256 guildId
            );
            function getPlayerAchievements(address playerAddr) external view returns (string[]);
            function getGuildInfo(uint256 guildId) external view returns (
                string name,
                string description,
                uint256 memberCount,
                uint256 level,
                uint256 totalExperience
            );
            function getActiveMarketItems() external view returns (uint256[]);
            function getPlayerStakes(address playerAddr) external view returns (uint256[]);
            function players(address playerAddr) external view returns (
                uint256 level,
                uint256 experience,
                uint256 lastActionTime,
                bool exists
            );
            function balanceOf(address owner) external view returns (uint256);
        }
    }
}

pub type TokenId = U256;

/// Snapshot of `getPlayerInfo`; never mutated locally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub nft_ids: Vec<TokenId>,
    pub level: U256,
    pub experience: U256,
    pub last_action_time: U256,
    pub last_claim_time: U256,
    pub total_rewards: U256,
    pub achievement_points: U256,
    pub nft_count: U256,
    pub game_tokens: U256,
    pub reputation: U256,
    pub guild_id: U256,
}

impl PlayerInfo {
    pub fn in_guild(&self) -> bool {
        !self.guild_id.is_zero()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildInfo {
    pub name: String,
    pub description: String,
    pub member_count: U256,
    pub level: U256,
    pub total_experience: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallKind {
    RegisterPlayer,
    MintNft,
    PerformAction,
    UpgradeNft,
    ClaimDailyReward,
    CreateGuild,
    JoinGuild,
    LeaveGuild,
    ChallengePlayer,
    ListItem,
    BuyItem,
    StakeNft,
    UnstakeNft,
}

impl CallKind {
    pub const ALL: [CallKind; 13] = [
        CallKind::RegisterPlayer,
        CallKind::MintNft,
        CallKind::PerformAction,
        CallKind::UpgradeNft,
        CallKind::ClaimDailyReward,
        CallKind::CreateGuild,
        CallKind::JoinGuild,
        CallKind::LeaveGuild,
        CallKind::ChallengePlayer,
        CallKind::ListItem,
        CallKind::BuyItem,
        CallKind::StakeNft,
        CallKind::UnstakeNft,
    ];

    /// Function name as it appears in the contract ABI.
    pub fn method(self) -> &'static str {
        match self {
            CallKind::RegisterPlayer => "registerPlayer",
            CallKind::MintNft => "mintNFT",
            CallKind::PerformAction => "performAction",
            CallKind::UpgradeNft => "upgradeNFT",
            CallKind::ClaimDailyReward => "claimDailyReward",
            CallKind::CreateGuild => "createGuild",
            CallKind::JoinGuild => "joinGuild",
            CallKind::LeaveGuild => "leaveGuild",
            CallKind::ChallengePlayer => "challengePlayer",
            CallKind::ListItem => "listItem",
            CallKind::BuyItem => "buyItem",
            CallKind::StakeNft => "stakeNFT",
            CallKind::UnstakeNft => "unstakeNFT",
        }
    }

    /// Present-participle label used in status lines ("Minting NFT...").
    pub fn label(self) -> &'static str {
        match self {
            CallKind::RegisterPlayer => "registering player",
            CallKind::MintNft => "minting NFT",
            CallKind::PerformAction => "performing action",
            CallKind::UpgradeNft => "upgrading NFT",
            CallKind::ClaimDailyReward => "claiming daily reward",
            CallKind::CreateGuild => "creating guild",
            CallKind::JoinGuild => "joining guild",
            CallKind::LeaveGuild => "leaving guild",
            CallKind::ChallengePlayer => "challenging player",
            CallKind::ListItem => "listing item",
            CallKind::BuyItem => "buying item",
            CallKind::StakeNft => "staking NFT",
            CallKind::UnstakeNft => "unstaking NFT",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// A state-changing contract method together with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    RegisterPlayer,
    MintNft { uri: String },
    PerformAction,
    UpgradeNft { token_id: TokenId },
    ClaimDailyReward,
    CreateGuild { name: String, description: String },
    JoinGuild { guild_id: U256 },
    LeaveGuild,
    ChallengePlayer { opponent: Address, amount: U256 },
    ListItem { token_id: TokenId, price: U256 },
    BuyItem { token_id: TokenId },
    StakeNft { token_id: TokenId },
    UnstakeNft { token_id: TokenId },
}

impl ContractCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ContractCall::RegisterPlayer => CallKind::RegisterPlayer,
            ContractCall::MintNft { .. } => CallKind::MintNft,
            ContractCall::PerformAction => CallKind::PerformAction,
            ContractCall::UpgradeNft { .. } => CallKind::UpgradeNft,
            ContractCall::ClaimDailyReward => CallKind::ClaimDailyReward,
            ContractCall::CreateGuild { .. } => CallKind::CreateGuild,
            ContractCall::JoinGuild { .. } => CallKind::JoinGuild,
            ContractCall::LeaveGuild => CallKind::LeaveGuild,
            ContractCall::ChallengePlayer { .. } => CallKind::ChallengePlayer,
            ContractCall::ListItem { .. } => CallKind::ListItem,
            ContractCall::BuyItem { .. } => CallKind::BuyItem,
            ContractCall::StakeNft { .. } => CallKind::StakeNft,
            ContractCall::UnstakeNft { .. } => CallKind::UnstakeNft,
        }
    }

    pub fn method(&self) -> &'static str {
        self.kind().method()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: B256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallErrorKind {
    /// The wallet (or its user) refused to sign or send.
    Rejected,
    /// The contract reverted, either during estimation or once mined.
    Reverted,
    Transport,
    Decode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallError {
    pub kind: CallErrorKind,
    pub message: String,
}

impl CallError {
    pub fn new(kind: CallErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classifies a boundary error from its rendered message.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let kind = if lower.contains("user rejected")
            || lower.contains("denied")
            || lower.contains("rejected")
        {
            CallErrorKind::Rejected
        } else if lower.contains("revert") {
            CallErrorKind::Reverted
        } else if lower.contains("decode") || lower.contains("abi") {
            CallErrorKind::Decode
        } else {
            CallErrorKind::Transport
        };
        Self { kind, message }
    }

    pub fn reverted(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::Reverted, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(CallErrorKind::Rejected, message)
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CallError {}

/// A bound handle to the deployed game contract, acting for one account.
pub trait GameContract: Clone + Send + Sync + 'static {
    fn address(&self) -> Address;

    fn account(&self) -> Address;

    /// Sends the transaction; may wait indefinitely on wallet approval.
    fn submit(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<PendingTx, CallError>> + Send;

    /// Waits for the transaction to be mined. No timeout is applied.
    fn confirm(
        &self,
        pending: PendingTx,
    ) -> impl Future<Output = Result<TxReceipt, CallError>> + Send;

    fn player_info(
        &self,
        player: Address,
    ) -> impl Future<Output = Result<PlayerInfo, CallError>> + Send;

    fn is_registered(
        &self,
        player: Address,
    ) -> impl Future<Output = Result<bool, CallError>> + Send;

    fn player_achievements(
        &self,
        player: Address,
    ) -> impl Future<Output = Result<Vec<String>, CallError>> + Send;

    fn guild_info(
        &self,
        guild_id: U256,
    ) -> impl Future<Output = Result<GuildInfo, CallError>> + Send;

    fn active_market_items(
        &self,
    ) -> impl Future<Output = Result<Vec<TokenId>, CallError>> + Send;

    fn player_stakes(
        &self,
        player: Address,
    ) -> impl Future<Output = Result<Vec<TokenId>, CallError>> + Send;

    fn nft_balance(
        &self,
        player: Address,
    ) -> impl Future<Output = Result<U256, CallError>> + Send;
}

/// Account access and transaction submission, provided by an external wallet.
pub trait WalletProvider: Clone + Send + Sync + 'static {
    type Contract: GameContract;

    fn request_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Address>, CallError>> + Send;

    fn chain_id(&self) -> impl Future<Output = Result<u64, CallError>> + Send;

    fn bind(&self, account: Address, contract: Address) -> Self::Contract;
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify__recognizes_wallet_rejection() {
        let err = CallError::classify("MetaMask Tx Signature: User rejected the request.");
        assert_eq!(err.kind, CallErrorKind::Rejected);
    }

    #[test]
    fn classify__recognizes_reverts() {
        let err = CallError::classify(
            "server returned an error response: execution reverted: Action on cooldown",
        );
        assert_eq!(err.kind, CallErrorKind::Reverted);
        assert!(err.message.contains("cooldown"));
    }

    #[test]
    fn classify__falls_back_to_transport() {
        let err = CallError::classify("error sending request for url (http://127.0.0.1:8545/)");
        assert_eq!(err.kind, CallErrorKind::Transport);
    }

    #[test]
    fn contract_call__kind_maps_to_abi_method() {
        let call = ContractCall::StakeNft {
            token_id: U256::from(7),
        };
        assert_eq!(call.kind(), CallKind::StakeNft);
        assert_eq!(call.method(), "stakeNFT");
    }
}
