//! Session and contract bridge.
//!
//! Every mutating call goes through the same protocol: precondition check,
//! submission, confirmation, then a refresh of the cached player state. The
//! three steps are split (`prepare`, [`PreparedAction::execute`], `complete`)
//! so the event loop can run the slow middle part on a spawned task.

use alloy::primitives::{
    Address,
    U256,
};
use deployments::ContractManifest;
use game_abi::{
    CallError,
    CallErrorKind,
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
use serde_json::json;
use std::{
    collections::BTreeMap,
    fmt,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};


pub type ActionKind = CallKind;

pub const COOLDOWN_HINT: &str = "Action still on cooldown. Please wait before trying again.";
pub const ONCE_PER_DAY_HINT: &str = "Daily reward already claimed. Come back tomorrow.";

/// Which views to re-fetch besides the player record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshScope {
    pub market: bool,
    pub stakes: bool,
}

impl RefreshScope {
    pub const PLAYER: RefreshScope = RefreshScope {
        market: false,
        stakes: false,
    };
    pub const FULL: RefreshScope = RefreshScope {
        market: true,
        stakes: true,
    };

    pub fn for_kind(kind: ActionKind) -> Self {
        match kind {
            CallKind::ListItem | CallKind::BuyItem => RefreshScope {
                market: true,
                stakes: false,
            },
            CallKind::StakeNft | CallKind::UnstakeNft => RefreshScope {
                market: false,
                stakes: true,
            },
            _ => RefreshScope::PLAYER,
        }
    }

    pub fn merge(self, other: RefreshScope) -> Self {
        RefreshScope {
            market: self.market || other.market,
            stakes: self.stakes || other.stakes,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionPhase {
    #[default]
    Idle,
    Submitting,
    Confirming,
    Succeeded,
    Failed,
}

impl ActionPhase {
    pub fn is_busy(self) -> bool {
        matches!(self, ActionPhase::Submitting | ActionPhase::Confirming)
    }
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionPhase::Idle => "idle",
            ActionPhase::Submitting => "submitting",
            ActionPhase::Confirming => "confirming",
            ActionPhase::Succeeded => "succeeded",
            ActionPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevertReason {
    Cooldown,
    OncePerDay,
    Generic,
}

impl RevertReason {
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("cooldown") {
            RevertReason::Cooldown
        } else if lower.contains("once per day") || lower.contains("already claimed") {
            RevertReason::OncePerDay
        } else {
            RevertReason::Generic
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeError {
    NotConnected,
    ContractUnavailable,
    MethodUnavailable {
        method: &'static str,
    },
    ActionInFlight {
        kind: ActionKind,
    },
    TransactionRejected {
        message: String,
    },
    ContractRevert {
        kind: ActionKind,
        reason: RevertReason,
        message: String,
    },
}

impl BridgeError {
    /// Maps a wallet/contract boundary failure for `kind`.
    pub fn from_call(kind: ActionKind, err: CallError) -> Self {
        match err.kind {
            CallErrorKind::Reverted => BridgeError::ContractRevert {
                kind,
                reason: RevertReason::from_message(&err.message),
                message: err.message,
            },
            CallErrorKind::Rejected
            | CallErrorKind::Transport
            | CallErrorKind::Decode => BridgeError::TransactionRejected {
                message: err.message,
            },
        }
    }

    pub fn hint(&self) -> String {
        match self {
            BridgeError::NotConnected => "Please connect wallet first".to_string(),
            BridgeError::ContractUnavailable => "Contract not deployed yet".to_string(),
            BridgeError::MethodUnavailable { method } => {
                format!("Contract does not expose {method}")
            }
            BridgeError::ActionInFlight { kind } => {
                format!("Already {}; wait for it to finish", kind.label())
            }
            BridgeError::TransactionRejected { message } => {
                format!("Transaction rejected: {message}")
            }
            BridgeError::ContractRevert {
                reason: RevertReason::Cooldown,
                ..
            } => COOLDOWN_HINT.to_string(),
            BridgeError::ContractRevert {
                reason: RevertReason::OncePerDay,
                ..
            } => ONCE_PER_DAY_HINT.to_string(),
            BridgeError::ContractRevert {
                kind,
                reason: RevertReason::Generic,
                message,
            } => format!("Error {}: {message}", kind.label()),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hint())
    }
}

impl std::error::Error for BridgeError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Transient acknowledgment shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

fn success_text(kind: ActionKind) -> &'static str {
    match kind {
        CallKind::RegisterPlayer => "Player registered successfully!",
        CallKind::MintNft => "NFT minted successfully!",
        CallKind::PerformAction => "Action completed!",
        CallKind::UpgradeNft => "NFT upgraded successfully!",
        CallKind::ClaimDailyReward => "Daily reward claimed!",
        CallKind::CreateGuild => "Guild created successfully!",
        CallKind::JoinGuild => "Joined guild!",
        CallKind::LeaveGuild => "Left guild",
        CallKind::ChallengePlayer => "Challenge sent!",
        CallKind::ListItem => "Item listed on the market!",
        CallKind::BuyItem => "Item purchased!",
        CallKind::StakeNft => "NFT staked!",
        CallKind::UnstakeNft => "NFT unstaked!",
    }
}

/// Cached on-chain views; each refresh replaces these wholesale.
#[derive(Clone, Debug, Default)]
pub struct PlayerView {
    pub info: Option<PlayerInfo>,
    pub achievements: Vec<String>,
    pub registered: Option<bool>,
    pub nft_balance: Option<U256>,
    pub guild: Option<GuildInfo>,
    pub market: Vec<TokenId>,
    pub stakes: Vec<TokenId>,
}

#[derive(Clone, Debug)]
pub struct BridgeOptions {
    pub auto_register: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            auto_register: true,
        }
    }
}

struct Session<C> {
    account: Address,
    chain_id: Option<u64>,
    contract: Option<C>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectReport {
    pub account: Address,
    pub chain_id: Option<u64>,
    pub contract: Option<Address>,
    /// `None` when there is no contract or the lookup failed.
    pub registered: Option<bool>,
    pub chain_mismatch: Option<ChainMismatch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainMismatch {
    pub expected: u64,
    pub actual: u64,
}

/// Account request, chain check and registration lookup for one connect attempt.
#[derive(Clone)]
pub struct ConnectJob<W> {
    wallet: W,
    contract: Option<Address>,
    expected_chain: Option<u64>,
}

impl<W: WalletProvider> ConnectJob<W> {
    pub async fn run(self) -> Result<ConnectReport, BridgeError> {
        let accounts = self
            .wallet
            .request_accounts()
            .await
            .map_err(|e| match e.kind {
                CallErrorKind::Rejected => BridgeError::TransactionRejected {
                    message: e.message,
                },
                _ => {
                    warn!(error = %e, "account request failed");
                    BridgeError::NotConnected
                }
            })?;
        let account = accounts.first().copied().ok_or(BridgeError::NotConnected)?;

        let chain_id = match self.wallet.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "could not read chain id");
                None
            }
        };
        let chain_mismatch = match (self.expected_chain, chain_id) {
            (Some(expected), Some(actual)) if expected != actual => {
                warn!(expected, actual, "wallet is on a different chain than the manifest");
                Some(ChainMismatch { expected, actual })
            }
            _ => None,
        };

        let registered = match self.contract {
            Some(address) => match self.wallet.bind(account, address).is_registered(account).await {
                Ok(flag) => Some(flag),
                Err(e) => {
                    warn!(error = %e, "registration lookup failed");
                    None
                }
            },
            None => {
                warn!("no game contract in manifest; actions are unavailable");
                None
            }
        };
        Ok(ConnectReport {
            account,
            chain_id,
            contract: self.contract,
            registered,
            chain_mismatch,
        })
    }
}

/// A call that passed its preconditions and holds the busy flag for its kind.
#[derive(Clone)]
pub struct PreparedAction<C> {
    contract: C,
    call: ContractCall,
    ticket: Option<u64>,
}

impl<C: GameContract> PreparedAction<C> {
    pub fn kind(&self) -> ActionKind {
        self.call.kind()
    }

    pub fn call(&self) -> &ContractCall {
        &self.call
    }

    /// Caller correlation id, echoed back in the outcome.
    pub fn with_ticket(mut self, ticket: u64) -> Self {
        self.ticket = Some(ticket);
        self
    }

    /// Submits and waits for the receipt. `on_submitted` fires between the two.
    pub async fn execute<F>(self, on_submitted: F) -> ActionOutcome
    where
        F: FnOnce(PendingTx) + Send,
    {
        let kind = self.kind();
        let ticket = self.ticket;
        let result: Result<TxReceipt, BridgeError> = async {
            let pending = self
                .contract
                .submit(&self.call)
                .await
                .map_err(|e| BridgeError::from_call(kind, e))?;
            debug!(tx_hash = %pending.tx_hash, ?kind, "transaction submitted");
            on_submitted(pending);
            let receipt = self
                .contract
                .confirm(pending)
                .await
                .map_err(|e| BridgeError::from_call(kind, e))?;
            if receipt.success {
                Ok(receipt)
            } else {
                Err(BridgeError::ContractRevert {
                    kind,
                    reason: RevertReason::Generic,
                    message: "transaction reverted".to_string(),
                })
            }
        }
        .await;
        ActionOutcome {
            kind,
            ticket,
            result,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub ticket: Option<u64>,
    pub result: Result<TxReceipt, BridgeError>,
}

#[derive(Clone, Debug)]
pub struct ActionReport {
    pub kind: ActionKind,
    pub notice: Notice,
    /// Set only when the action succeeded.
    pub refresh: Option<RefreshScope>,
    pub result: Result<TxReceipt, BridgeError>,
}

/// Spawnable fetch of every view the scope covers.
#[derive(Clone)]
pub struct RefreshJob<C> {
    contract: C,
    account: Address,
    scope: RefreshScope,
}

#[derive(Clone, Debug)]
pub struct RefreshData {
    pub account: Address,
    pub info: PlayerInfo,
    pub achievements: Vec<String>,
    pub registered: bool,
    pub nft_balance: U256,
    pub guild: Option<GuildInfo>,
    pub market: Option<Vec<TokenId>>,
    pub stakes: Option<Vec<TokenId>>,
}

impl<C: GameContract> RefreshJob<C> {
    pub fn scope(&self) -> RefreshScope {
        self.scope
    }

    pub async fn run(self) -> Result<RefreshData, BridgeError> {
        let read_err = |e: CallError| BridgeError::TransactionRejected { message: e.message };
        let account = self.account;
        let info = self.contract.player_info(account).await.map_err(read_err)?;
        let achievements = self
            .contract
            .player_achievements(account)
            .await
            .map_err(read_err)?;
        let registered = self.contract.is_registered(account).await.map_err(read_err)?;
        let nft_balance = self.contract.nft_balance(account).await.map_err(read_err)?;
        let guild = if info.in_guild() {
            Some(
                self.contract
                    .guild_info(info.guild_id)
                    .await
                    .map_err(read_err)?,
            )
        } else {
            None
        };
        let market = if self.scope.market {
            Some(self.contract.active_market_items().await.map_err(read_err)?)
        } else {
            None
        };
        let stakes = if self.scope.stakes {
            Some(self.contract.player_stakes(account).await.map_err(read_err)?)
        } else {
            None
        };
        Ok(RefreshData {
            account,
            info,
            achievements,
            registered,
            nft_balance,
            guild,
            market,
            stakes,
        })
    }
}

pub struct Bridge<W: WalletProvider> {
    wallet: W,
    manifest: Option<ContractManifest>,
    options: BridgeOptions,
    session: Option<Session<W::Contract>>,
    phases: BTreeMap<ActionKind, ActionPhase>,
    view: PlayerView,
}

impl<W: WalletProvider> Bridge<W> {
    pub fn new(
        wallet: W,
        manifest: Option<ContractManifest>,
        options: BridgeOptions,
    ) -> Self {
        Self {
            wallet,
            manifest,
            options,
            session: None,
            phases: BTreeMap::new(),
            view: PlayerView::default(),
        }
    }

    pub fn manifest(&self) -> Option<&ContractManifest> {
        self.manifest.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.as_ref().map(|s| s.account)
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.session.as_ref().and_then(|s| s.chain_id)
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.session
            .as_ref()
            .and_then(|s| s.contract.as_ref())
            .map(GameContract::address)
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn phase(&self, kind: ActionKind) -> ActionPhase {
        self.phases.get(&kind).copied().unwrap_or_default()
    }

    /// Non-idle phases, in `ActionKind` order.
    pub fn active_phases(&self) -> Vec<(ActionKind, ActionPhase)> {
        self.phases
            .iter()
            .filter(|(_, phase)| **phase != ActionPhase::Idle)
            .map(|(kind, phase)| (*kind, *phase))
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.phases.values().filter(|p| p.is_busy()).count()
    }

    pub fn wants_registration(&self, report: &ConnectReport) -> bool {
        self.options.auto_register && report.registered == Some(false)
    }

    fn resolve_contract_address(&self) -> Option<Address> {
        let raw = self.manifest.as_ref()?.game_contract_address()?;
        match raw.parse::<Address>() {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(address = raw, error = %e, "manifest address is not a valid account");
                None
            }
        }
    }

    /// Wallet handshake detached from the bridge so it can run off the UI loop.
    pub fn connect_job(&self) -> ConnectJob<W> {
        ConnectJob {
            wallet: self.wallet.clone(),
            contract: self.resolve_contract_address(),
            expected_chain: self.manifest.as_ref().and_then(|m| m.chain_id),
        }
    }

    /// Installs the session a finished `ConnectJob` produced.
    pub fn finish_connect(&mut self, report: ConnectReport) -> ConnectReport {
        let contract = report
            .contract
            .map(|address| self.wallet.bind(report.account, address));
        self.disconnect();
        self.session = Some(Session {
            account: report.account,
            chain_id: report.chain_id,
            contract,
        });
        self.view.registered = report.registered;
        info!(account = %report.account, chain_id = ?report.chain_id, contract = ?report.contract, "wallet connected");
        report
    }

    /// Requests accounts and binds the contract handle when the manifest has one.
    pub async fn connect(&mut self) -> Result<ConnectReport, BridgeError> {
        let report = self.connect_job().run().await?;
        Ok(self.finish_connect(report))
    }

    /// Connects, refreshes and registers the player when needed.
    pub async fn connect_and_sync(&mut self) -> Result<ConnectReport, BridgeError> {
        let report = self.connect().await?;
        if report.contract.is_none() {
            return Ok(report);
        }
        if let Err(e) = self.refresh(RefreshScope::FULL).await {
            warn!(error = %e, "initial refresh failed");
        }
        if self.wants_registration(&report)
            && let Err(e) = self.register().await
        {
            warn!(error = %e, "player registration failed");
        }
        Ok(report)
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            info!(account = %session.account, "wallet disconnected");
        }
        self.view = PlayerView::default();
        // Transactions already sent keep running; their kinds stay busy until they finish.
        self.phases.retain(|_, phase| phase.is_busy());
    }

    fn contract(&self) -> Result<&W::Contract, BridgeError> {
        let session = self.session.as_ref().ok_or(BridgeError::NotConnected)?;
        session
            .contract
            .as_ref()
            .ok_or(BridgeError::ContractUnavailable)
    }

    /// Checks preconditions and claims the busy flag for the call's kind.
    pub fn prepare(
        &mut self,
        call: ContractCall,
    ) -> Result<PreparedAction<W::Contract>, BridgeError> {
        let kind = call.kind();
        let contract = self.contract()?.clone();
        if let Some(entry) = self.manifest.as_ref().and_then(|m| m.game_contract())
            && !entry.supports(kind.method())
        {
            return Err(BridgeError::MethodUnavailable {
                method: kind.method(),
            });
        }
        if self.phase(kind).is_busy() {
            return Err(BridgeError::ActionInFlight { kind });
        }
        self.phases.insert(kind, ActionPhase::Submitting);
        info!(?kind, "submitting {}", kind.method());
        Ok(PreparedAction {
            contract,
            call,
            ticket: None,
        })
    }

    pub fn mark_confirming(&mut self, kind: ActionKind) {
        if self.phase(kind) == ActionPhase::Submitting {
            self.phases.insert(kind, ActionPhase::Confirming);
        }
    }

    /// Records the outcome and releases the busy flag.
    pub fn complete(&mut self, outcome: ActionOutcome) -> ActionReport {
        let ActionOutcome { kind, result, .. } = outcome;
        match &result {
            Ok(receipt) => {
                info!(?kind, tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "action confirmed");
                self.phases.insert(kind, ActionPhase::Succeeded);
                ActionReport {
                    kind,
                    notice: Notice::success(success_text(kind)),
                    refresh: Some(RefreshScope::for_kind(kind)),
                    result,
                }
            }
            Err(e) => {
                error!(?kind, error = ?e, "action failed");
                self.phases.insert(kind, ActionPhase::Failed);
                ActionReport {
                    kind,
                    notice: Notice::error(e.hint()),
                    refresh: None,
                    result,
                }
            }
        }
    }

    /// Returns a finished kind to `Idle` once its acknowledgment has been shown.
    pub fn settle_phase(&mut self, kind: ActionKind) {
        if !self.phase(kind).is_busy() {
            self.phases.remove(&kind);
        }
    }

    /// Settles every finished kind; busy kinds keep their phase.
    pub fn settle_finished(&mut self) {
        self.phases.retain(|_, phase| phase.is_busy());
    }

    pub fn refresh_job(
        &self,
        scope: RefreshScope,
    ) -> Result<RefreshJob<W::Contract>, BridgeError> {
        let contract = self.contract()?.clone();
        let account = contract.account();
        Ok(RefreshJob {
            contract,
            account,
            scope,
        })
    }

    /// Replaces the cached views. Data for a previous account is dropped.
    pub fn apply_refresh(&mut self, data: RefreshData) -> bool {
        if self.account() != Some(data.account) {
            debug!(account = %data.account, "discarding refresh for stale account");
            return false;
        }
        self.view.info = Some(data.info);
        self.view.achievements = data.achievements;
        self.view.registered = Some(data.registered);
        self.view.nft_balance = Some(data.nft_balance);
        self.view.guild = data.guild;
        if let Some(market) = data.market {
            self.view.market = market;
        }
        if let Some(stakes) = data.stakes {
            self.view.stakes = stakes;
        }
        true
    }

    pub async fn refresh(&mut self, scope: RefreshScope) -> Result<(), BridgeError> {
        let data = self.refresh_job(scope)?.run().await?;
        self.apply_refresh(data);
        Ok(())
    }

    /// Runs the whole protocol inline, refreshing on success.
    pub async fn run_action(
        &mut self,
        call: ContractCall,
    ) -> Result<TxReceipt, BridgeError> {
        let prepared = self.prepare(call)?;
        let kind = prepared.kind();
        let outcome = prepared.execute(|_| {}).await;
        let report = self.complete(outcome);
        if let Some(scope) = report.refresh
            && let Err(e) = self.refresh(scope).await
        {
            warn!(error = %e, "refresh after {} failed", kind.method());
        }
        report.result
    }

    pub async fn register(&mut self) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::RegisterPlayer).await
    }

    pub async fn mint_nft(&mut self) -> Result<TxReceipt, BridgeError> {
        let uri = new_character_uri();
        self.run_action(ContractCall::MintNft { uri }).await
    }

    pub async fn perform_action(&mut self) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::PerformAction).await
    }

    pub async fn upgrade_nft(&mut self, token_id: TokenId) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::UpgradeNft { token_id }).await
    }

    pub async fn claim_daily_reward(&mut self) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::ClaimDailyReward).await
    }

    pub async fn create_guild(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::CreateGuild {
            name: name.into(),
            description: description.into(),
        })
        .await
    }

    pub async fn join_guild(&mut self, guild_id: U256) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::JoinGuild { guild_id }).await
    }

    pub async fn leave_guild(&mut self) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::LeaveGuild).await
    }

    pub async fn challenge_player(
        &mut self,
        opponent: Address,
        amount: U256,
    ) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::ChallengePlayer { opponent, amount })
            .await
    }

    pub async fn list_item(
        &mut self,
        token_id: TokenId,
        price: U256,
    ) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::ListItem { token_id, price }).await
    }

    pub async fn buy_item(&mut self, token_id: TokenId) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::BuyItem { token_id }).await
    }

    pub async fn stake_nft(&mut self, token_id: TokenId) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::StakeNft { token_id }).await
    }

    pub async fn unstake_nft(&mut self, token_id: TokenId) -> Result<TxReceipt, BridgeError> {
        self.run_action(ContractCall::UnstakeNft { token_id }).await
    }
}

/// Builds a `data:` URI carrying the metadata of a freshly minted character.
pub fn character_metadata_uri(name: &str, rarity: &str) -> String {
    let metadata = json!({
        "name": name,
        "description": "A unique character in the blockchain game",
        "attributes": [
            { "trait_type": "level", "value": 1 },
            { "trait_type": "rarity", "value": rarity },
        ],
    });
    let encoded: String =
        url::form_urlencoded::byte_serialize(metadata.to_string().as_bytes()).collect();
    // form encoding turns spaces into '+'; literal '+' is already %2B
    format!("data:application/json,{}", encoded.replace('+', "%20"))
}

/// Metadata URI for a new character: a generated name plus a timestamp.
pub fn new_character_uri() -> String {
    let name = format!(
        "{} #{}",
        fakeit::name::first(),
        chrono::Utc::now().timestamp_millis()
    );
    character_metadata_uri(&name, "common")
}
