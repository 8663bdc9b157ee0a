//! JSON-RPC backed wallet and contract handle.
//!
//! Without a local signer the node's unlocked accounts are used, the way a
//! browser wallet exposes its accounts; with one, transactions are signed
//! locally before being broadcast.

use crate::{
    CallError,
    ContractCall,
    GameContract,
    GuildInfo,
    PendingTx,
    PlayerInfo,
    TokenId,
    TxReceipt,
    WalletProvider,
    game_types::IGameLogic::{
        self,
        IGameLogicInstance,
    },
};
use alloy::{
    contract::SolCallBuilder,
    network::{
        EthereumWallet,
        ReceiptResponse,
        TransactionBuilder,
    },
    primitives::{
        Address,
        B256,
        Bytes,
        U256,
    },
    providers::{
        DynProvider,
        PendingTransactionBuilder,
        Provider,
        ProviderBuilder,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use anyhow::{
    Context,
    Result,
    anyhow,
};
use url::Url;

#[derive(Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    local_signer: Option<Address>,
}

#[derive(Clone, Copy, Debug)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

impl RpcWallet {
    pub fn connect(rpc_url: &str, signer: Option<PrivateKeySigner>) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC url {rpc_url}"))?;
        let wallet = match signer {
            Some(signer) => {
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                Self {
                    provider,
                    local_signer: Some(address),
                }
            }
            None => Self {
                provider: ProviderBuilder::new().connect_http(url).erased(),
                local_signer: None,
            },
        };
        Ok(wallet)
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn local_signer(&self) -> Option<Address> {
        self.local_signer
    }

    /// Deploys raw creation bytecode and waits for the receipt.
    pub async fn deploy(&self, from: Address, bytecode: Bytes) -> Result<Deployment> {
        let tx = TransactionRequest::default()
            .from(from)
            .with_deploy_code(bytecode);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("Failed to send deployment transaction")?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, "deployment submitted");
        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to fetch deployment receipt")?;
        if !receipt.status() {
            return Err(anyhow!("Deployment transaction {tx_hash} reverted"));
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| anyhow!("Deployment receipt carried no contract address"))?;
        Ok(Deployment {
            address,
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}

impl WalletProvider for RpcWallet {
    type Contract = RpcGameContract;

    async fn request_accounts(&self) -> Result<Vec<Address>, CallError> {
        if let Some(address) = self.local_signer {
            return Ok(vec![address]);
        }
        self.provider
            .get_accounts()
            .await
            .map_err(|err| CallError::classify(err.to_string()))
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|err| CallError::classify(err.to_string()))
    }

    fn bind(&self, account: Address, contract: Address) -> RpcGameContract {
        RpcGameContract {
            instance: IGameLogic::new(contract, self.provider.clone()),
            account,
        }
    }
}

#[derive(Clone)]
pub struct RpcGameContract {
    instance: IGameLogicInstance<DynProvider>,
    account: Address,
}

fn boundary_error(err: impl std::fmt::Display) -> CallError {
    CallError::classify(err.to_string())
}

impl RpcGameContract {
    async fn dispatch<C: SolCall>(
        &self,
        builder: SolCallBuilder<&DynProvider, C>,
    ) -> Result<PendingTx, CallError> {
        let pending = builder
            .from(self.account)
            .send()
            .await
            .map_err(boundary_error)?;
        Ok(PendingTx {
            tx_hash: *pending.tx_hash(),
        })
    }
}

impl GameContract for RpcGameContract {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn submit(&self, call: &ContractCall) -> Result<PendingTx, CallError> {
        let c = &self.instance;
        match call {
            ContractCall::RegisterPlayer => self.dispatch(c.registerPlayer()).await,
            ContractCall::MintNft { uri } => self.dispatch(c.mintNFT(uri.clone())).await,
            ContractCall::PerformAction => self.dispatch(c.performAction()).await,
            ContractCall::UpgradeNft { token_id } => {
                self.dispatch(c.upgradeNFT(*token_id)).await
            }
            ContractCall::ClaimDailyReward => self.dispatch(c.claimDailyReward()).await,
            ContractCall::CreateGuild { name, description } => {
                self.dispatch(c.createGuild(name.clone(), description.clone()))
                    .await
            }
            ContractCall::JoinGuild { guild_id } => {
                self.dispatch(c.joinGuild(*guild_id)).await
            }
            ContractCall::LeaveGuild => self.dispatch(c.leaveGuild()).await,
            ContractCall::ChallengePlayer { opponent, amount } => {
                self.dispatch(c.challengePlayer(*opponent, *amount)).await
            }
            ContractCall::ListItem { token_id, price } => {
                self.dispatch(c.listItem(*token_id, *price)).await
            }
            ContractCall::BuyItem { token_id } => self.dispatch(c.buyItem(*token_id)).await,
            ContractCall::StakeNft { token_id } => {
                self.dispatch(c.stakeNFT(*token_id)).await
            }
            ContractCall::UnstakeNft { token_id } => {
                self.dispatch(c.unstakeNFT(*token_id)).await
            }
        }
    }

    async fn confirm(&self, pending: PendingTx) -> Result<TxReceipt, CallError> {
        let root = self.instance.provider().root().clone();
        let receipt = PendingTransactionBuilder::new(root, pending.tx_hash)
            .get_receipt()
            .await
            .map_err(boundary_error)?;
        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
        })
    }

    async fn player_info(&self, player: Address) -> Result<PlayerInfo, CallError> {
        let info = self
            .instance
            .getPlayerInfo(player)
            .call()
            .await
            .map_err(boundary_error)?;
        Ok(PlayerInfo {
            nft_ids: info.nfts,
            level: info.level,
            experience: info.experience,
            last_action_time: info.lastActionTime,
            last_claim_time: info.lastClaimTime,
            total_rewards: info.totalRewards,
            achievement_points: info.achievementPoints,
            nft_count: info.nftCount,
            game_tokens: info.gameTokens,
            reputation: info.reputation,
            guild_id: info.guildId,
        })
    }

    async fn is_registered(&self, player: Address) -> Result<bool, CallError> {
        let record = self
            .instance
            .players(player)
            .call()
            .await
            .map_err(boundary_error)?;
        Ok(record.exists)
    }

    async fn player_achievements(
        &self,
        player: Address,
    ) -> Result<Vec<String>, CallError> {
        self.instance
            .getPlayerAchievements(player)
            .call()
            .await
            .map_err(boundary_error)
    }

    async fn guild_info(&self, guild_id: U256) -> Result<GuildInfo, CallError> {
        let guild = self
            .instance
            .getGuildInfo(guild_id)
            .call()
            .await
            .map_err(boundary_error)?;
        Ok(GuildInfo {
            name: guild.name,
            description: guild.description,
            member_count: guild.memberCount,
            level: guild.level,
            total_experience: guild.totalExperience,
        })
    }

    async fn active_market_items(&self) -> Result<Vec<TokenId>, CallError> {
        self.instance
            .getActiveMarketItems()
            .call()
            .await
            .map_err(boundary_error)
    }

    async fn player_stakes(&self, player: Address) -> Result<Vec<TokenId>, CallError> {
        self.instance
            .getPlayerStakes(player)
            .call()
            .await
            .map_err(boundary_error)
    }

    async fn nft_balance(&self, player: Address) -> Result<U256, CallError> {
        self.instance
            .balanceOf(player)
            .call()
            .await
            .map_err(boundary_error)
    }
}
