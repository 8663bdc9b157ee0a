//! In-memory stand-ins for the wallet and the game contract.
//!
//! State changes are applied when a transaction is confirmed, not when it is
//! submitted, so tests can observe the window between the two.

use crate::{
    CallError,
    CallKind,
    ContractCall,
    GameContract,
    GuildInfo,
    PendingTx,
    PlayerInfo,
    TokenId,
    TxReceipt,
    WalletProvider,
};
use alloy::primitives::{
    Address,
    B256,
    U256,
};
use std::{
    collections::{
        HashMap,
        HashSet,
        VecDeque,
    },
    sync::{
        Arc,
        Mutex,
        MutexGuard,
    },
};
use tokio::sync::Semaphore;

pub const FAKE_CHAIN_ID: u64 = 31337;

pub fn account(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn contract_address() -> Address {
    Address::repeat_byte(0xC0)
}

#[derive(Clone, Debug)]
enum ConfirmOutcome {
    Reverted,
    Fail(CallError),
}

#[derive(Default)]
struct ChainState {
    accounts: Vec<Address>,
    accounts_error: Option<CallError>,
    registered: HashSet<Address>,
    players: HashMap<Address, PlayerInfo>,
    achievements: HashMap<Address, Vec<String>>,
    guilds: HashMap<U256, GuildInfo>,
    market: Vec<TokenId>,
    stakes: HashMap<Address, Vec<TokenId>>,
    submit_failures: HashMap<CallKind, VecDeque<CallError>>,
    confirm_failures: HashMap<CallKind, VecDeque<ConfirmOutcome>>,
    pending: HashMap<B256, (Address, ContractCall)>,
    submitted: Vec<(Address, ContractCall)>,
    confirmed: Vec<ContractCall>,
    info_reads: usize,
    next_tx: u64,
    next_token: u64,
    next_guild: u64,
}

impl ChainState {
    fn player_mut(&mut self, who: Address) -> &mut PlayerInfo {
        self.players.entry(who).or_default()
    }

    fn apply(&mut self, who: Address, call: &ContractCall) {
        match call {
            ContractCall::RegisterPlayer => {
                self.registered.insert(who);
                self.player_mut(who).level = U256::from(1);
            }
            ContractCall::MintNft { .. } => {
                self.next_token += 1;
                let token = U256::from(self.next_token);
                let player = self.player_mut(who);
                player.nft_ids.push(token);
                player.nft_count += U256::from(1);
            }
            ContractCall::PerformAction => {
                let player = self.player_mut(who);
                player.experience += U256::from(10);
                player.game_tokens += U256::from(1);
                player.last_action_time += U256::from(1);
            }
            ContractCall::UpgradeNft { .. } => {
                self.player_mut(who).level += U256::from(1);
            }
            ContractCall::ClaimDailyReward => {
                let player = self.player_mut(who);
                player.game_tokens += U256::from(100);
                player.total_rewards += U256::from(100);
                player.last_claim_time += U256::from(1);
            }
            ContractCall::CreateGuild { name, description } => {
                self.next_guild += 1;
                let id = U256::from(self.next_guild);
                self.guilds.insert(
                    id,
                    GuildInfo {
                        name: name.clone(),
                        description: description.clone(),
                        member_count: U256::from(1),
                        level: U256::from(1),
                        total_experience: U256::ZERO,
                    },
                );
                self.player_mut(who).guild_id = id;
            }
            ContractCall::JoinGuild { guild_id } => {
                if let Some(guild) = self.guilds.get_mut(guild_id) {
                    guild.member_count += U256::from(1);
                }
                self.player_mut(who).guild_id = *guild_id;
            }
            ContractCall::LeaveGuild => {
                let guild_id = self.player_mut(who).guild_id;
                if let Some(guild) = self.guilds.get_mut(&guild_id) {
                    guild.member_count = guild.member_count.saturating_sub(U256::from(1));
                }
                self.player_mut(who).guild_id = U256::ZERO;
            }
            ContractCall::ChallengePlayer { .. } => {
                self.player_mut(who).reputation += U256::from(1);
            }
            ContractCall::ListItem { token_id, .. } => {
                self.market.push(*token_id);
            }
            ContractCall::BuyItem { token_id } => {
                self.market.retain(|id| id != token_id);
                self.player_mut(who).nft_ids.push(*token_id);
            }
            ContractCall::StakeNft { token_id } => {
                self.stakes.entry(who).or_default().push(*token_id);
            }
            ContractCall::UnstakeNft { token_id } => {
                self.stakes.entry(who).or_default().retain(|id| id != token_id);
            }
        }
    }
}

/// Shared handle to the fake chain; clones observe the same state.
#[derive(Clone, Default)]
pub struct FakeChain {
    state: Arc<Mutex<ChainState>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    accounts_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl FakeChain {
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        let chain = Self::default();
        chain.lock().accounts = accounts;
        chain
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    pub fn wallet(&self) -> FakeWallet {
        FakeWallet {
            chain: self.clone(),
        }
    }

    pub fn fail_accounts(&self, error: CallError) {
        self.lock().accounts_error = Some(error);
    }

    pub fn register(&self, who: Address) {
        self.lock().apply(who, &ContractCall::RegisterPlayer);
    }

    pub fn set_player(&self, who: Address, info: PlayerInfo) {
        self.lock().players.insert(who, info);
    }

    pub fn set_achievements(&self, who: Address, achievements: Vec<String>) {
        self.lock().achievements.insert(who, achievements);
    }

    pub fn is_registered(&self, who: Address) -> bool {
        self.lock().registered.contains(&who)
    }

    pub fn player(&self, who: Address) -> PlayerInfo {
        self.lock().players.get(&who).cloned().unwrap_or_default()
    }

    /// The next submission of `kind` fails with `error`.
    pub fn fail_next_submit(&self, kind: CallKind, error: CallError) {
        self.lock()
            .submit_failures
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// The next confirmation of `kind` yields a receipt with failed status.
    pub fn revert_next_confirm(&self, kind: CallKind) {
        self.lock()
            .confirm_failures
            .entry(kind)
            .or_default()
            .push_back(ConfirmOutcome::Reverted);
    }

    pub fn fail_next_confirm(&self, kind: CallKind, error: CallError) {
        self.lock()
            .confirm_failures
            .entry(kind)
            .or_default()
            .push_back(ConfirmOutcome::Fail(error));
    }

    /// Confirmations block until released.
    pub fn hold_confirmations(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_confirmations(&self, count: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(count);
        }
    }

    /// Account requests block until released, like a wallet awaiting approval.
    pub fn hold_accounts(&self) {
        *self.accounts_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_accounts(&self, count: usize) {
        if let Some(gate) = self.accounts_gate.lock().unwrap().as_ref() {
            gate.add_permits(count);
        }
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.lock()
            .submitted
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn submitted_by(&self) -> Vec<(Address, ContractCall)> {
        self.lock().submitted.clone()
    }

    pub fn confirmed(&self) -> Vec<ContractCall> {
        self.lock().confirmed.clone()
    }

    pub fn submitted_count(&self, kind: CallKind) -> usize {
        self.lock()
            .submitted
            .iter()
            .filter(|(_, call)| call.kind() == kind)
            .count()
    }

    pub fn player_info_reads(&self) -> usize {
        self.lock().info_reads
    }
}

#[derive(Clone)]
pub struct FakeWallet {
    chain: FakeChain,
}

impl FakeWallet {
    pub fn chain(&self) -> &FakeChain {
        &self.chain
    }
}

impl WalletProvider for FakeWallet {
    type Contract = FakeContract;

    async fn request_accounts(&self) -> Result<Vec<Address>, CallError> {
        let gate = self.chain.accounts_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| CallError::classify(e.to_string()))?;
            permit.forget();
        }
        let state = self.chain.lock();
        match &state.accounts_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.accounts.clone()),
        }
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        Ok(FAKE_CHAIN_ID)
    }

    fn bind(&self, account: Address, contract: Address) -> FakeContract {
        FakeContract {
            chain: self.chain.clone(),
            account,
            address: contract,
        }
    }
}

#[derive(Clone)]
pub struct FakeContract {
    chain: FakeChain,
    account: Address,
    address: Address,
}

impl GameContract for FakeContract {
    fn address(&self) -> Address {
        self.address
    }

    fn account(&self) -> Address {
        self.account
    }

    async fn submit(&self, call: &ContractCall) -> Result<PendingTx, CallError> {
        let mut state = self.chain.lock();
        if let Some(err) = state
            .submit_failures
            .get_mut(&call.kind())
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        state.next_tx += 1;
        let tx_hash = B256::left_padding_from(&state.next_tx.to_be_bytes());
        state.submitted.push((self.account, call.clone()));
        state.pending.insert(tx_hash, (self.account, call.clone()));
        Ok(PendingTx { tx_hash })
    }

    async fn confirm(&self, pending: PendingTx) -> Result<TxReceipt, CallError> {
        let gate = self.chain.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| CallError::classify(e.to_string()))?;
            permit.forget();
        }
        let mut state = self.chain.lock();
        let (who, call) = state
            .pending
            .remove(&pending.tx_hash)
            .ok_or_else(|| CallError::classify("unknown transaction hash"))?;
        let outcome = state
            .confirm_failures
            .get_mut(&call.kind())
            .and_then(VecDeque::pop_front);
        let block_number = Some(state.next_tx);
        match outcome {
            Some(ConfirmOutcome::Fail(err)) => Err(err),
            Some(ConfirmOutcome::Reverted) => Ok(TxReceipt {
                tx_hash: pending.tx_hash,
                block_number,
                success: false,
            }),
            None => {
                state.apply(who, &call);
                state.confirmed.push(call);
                Ok(TxReceipt {
                    tx_hash: pending.tx_hash,
                    block_number,
                    success: true,
                })
            }
        }
    }

    async fn player_info(&self, player: Address) -> Result<PlayerInfo, CallError> {
        let mut state = self.chain.lock();
        state.info_reads += 1;
        Ok(state.players.get(&player).cloned().unwrap_or_default())
    }

    async fn is_registered(&self, player: Address) -> Result<bool, CallError> {
        Ok(self.chain.lock().registered.contains(&player))
    }

    async fn player_achievements(
        &self,
        player: Address,
    ) -> Result<Vec<String>, CallError> {
        Ok(self
            .chain
            .lock()
            .achievements
            .get(&player)
            .cloned()
            .unwrap_or_default())
    }

    async fn guild_info(&self, guild_id: U256) -> Result<GuildInfo, CallError> {
        Ok(self
            .chain
            .lock()
            .guilds
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn active_market_items(&self) -> Result<Vec<TokenId>, CallError> {
        Ok(self.chain.lock().market.clone())
    }

    async fn player_stakes(&self, player: Address) -> Result<Vec<TokenId>, CallError> {
        Ok(self
            .chain
            .lock()
            .stakes
            .get(&player)
            .cloned()
            .unwrap_or_default())
    }

    async fn nft_balance(&self, player: Address) -> Result<U256, CallError> {
        Ok(self
            .chain
            .lock()
            .players
            .get(&player)
            .map(|p| U256::from(p.nft_ids.len()))
            .unwrap_or_default())
    }
}
