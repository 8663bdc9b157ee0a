use crate::ui::{
    self,
    ArcadeView,
    ViewModel,
};
use chain_arcade::{
    arcade::{
        Arcade,
        ArcadeEvent,
        Directions,
        TICK,
        reward::{
            RewardDue,
            RewardId,
            RewardLedger,
            SkipReason,
            spawn_reward,
        },
    },
    bridge::{
        ActionKind,
        ActionOutcome,
        Bridge,
        BridgeError,
        BridgeOptions,
        ConnectReport,
        Notice,
        RefreshData,
        RefreshScope,
    },
    config::AppConfig,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use game_abi::{
    ContractCall,
    WalletProvider,
    rpc::RpcWallet,
    wallets,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use std::{
    path::Path,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::{
        self,
        Instant,
        MissedTickBehavior,
    },
};
use tracing::{
    debug,
    error,
    info,
    warn,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const NOTICE_TTL: Duration = Duration::from_secs(4);
const MAX_ERRORS: usize = 50;

pub enum BridgeEvent {
    Connected(Result<ConnectReport, BridgeError>),
    Submitted(ActionKind),
    Finished(ActionOutcome),
    Refreshed(Result<RefreshData, BridgeError>),
}

pub struct ArcadeSettings {
    pub reward_chance: f64,
    pub reward_delay: Duration,
}

pub struct Receivers {
    pub bridge: mpsc::UnboundedReceiver<BridgeEvent>,
    pub rewards: mpsc::UnboundedReceiver<RewardDue>,
}

pub struct AppController<W: WalletProvider> {
    bridge: Bridge<W>,
    arcade: Arcade,
    rng: StdRng,
    rewards: RewardLedger,
    reward_delay: Duration,
    connecting: bool,
    bridge_tx: mpsc::UnboundedSender<BridgeEvent>,
    reward_tx: mpsc::UnboundedSender<RewardDue>,
    status: String,
    notice: Option<(Notice, Instant)>,
    errors: Vec<String>,
}

fn sentence_case(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<W: WalletProvider> AppController<W> {
    pub fn new(bridge: Bridge<W>, settings: ArcadeSettings, rng: StdRng) -> (Self, Receivers) {
        let (bridge_tx, bridge_rx) = mpsc::unbounded_channel();
        let (reward_tx, reward_rx) = mpsc::unbounded_channel();
        let controller = Self {
            bridge,
            arcade: Arcade::new(settings.reward_chance),
            rng,
            rewards: RewardLedger::default(),
            reward_delay: settings.reward_delay,
            connecting: false,
            bridge_tx,
            reward_tx,
            status: String::new(),
            notice: None,
            errors: Vec::new(),
        };
        let receivers = Receivers {
            bridge: bridge_rx,
            rewards: reward_rx,
        };
        (controller, receivers)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now() + NOTICE_TTL));
    }

    fn push_errors(&mut self, mut items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        for item in &items {
            error!("{}", item);
        }
        self.errors.append(&mut items);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }

    pub fn notice_deadline(&self) -> Option<Instant> {
        self.notice.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn arcade_running(&self) -> bool {
        self.arcade.is_running()
    }

    /// Clears an expired notice and returns finished phases to idle.
    pub fn expire_notice(&mut self, now: Instant) -> bool {
        match self.notice_deadline() {
            Some(deadline) if deadline <= now => {
                self.notice = None;
                self.bridge.settle_finished();
                true
            }
            _ => false,
        }
    }

    /// Starts the wallet handshake; the result arrives as `BridgeEvent::Connected`.
    pub fn connect(&mut self) {
        if self.connecting {
            debug!("connect already pending");
            return;
        }
        self.connecting = true;
        self.set_status("Connecting wallet...");
        let job = self.bridge.connect_job();
        let tx = self.bridge_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(BridgeEvent::Connected(job.run().await));
        });
    }

    fn handle_connected(&mut self, result: Result<ConnectReport, BridgeError>) {
        self.connecting = false;
        match result {
            Ok(report) => {
                let report = self.bridge.finish_connect(report);
                self.set_status(format!("Connected: {}", report.account));
                match report.chain_mismatch {
                    Some(mismatch) => self.notify(Notice::error(format!(
                        "Wallet is on chain {} but the contract was deployed to chain {}",
                        mismatch.actual, mismatch.expected
                    ))),
                    None if report.contract.is_none() => {
                        self.notify(Notice::info("Connected; no game contract deployed yet"))
                    }
                    None => self.notify(Notice::success("Wallet connected")),
                }
                if report.contract.is_some() {
                    self.request_refresh(RefreshScope::FULL);
                }
                if self.bridge.wants_registration(&report) {
                    info!("player not registered; registering");
                    if let Err(e) = self.submit(ContractCall::RegisterPlayer, None) {
                        warn!(error = %e, "automatic registration not submitted");
                    }
                }
            }
            Err(e) => {
                let hint = e.hint();
                self.push_errors(vec![format!("Connect failed: {hint}")]);
                self.set_status("Not connected");
                self.notify(Notice::error(hint));
            }
        }
    }

    fn submit(
        &mut self,
        call: ContractCall,
        reward: Option<RewardId>,
    ) -> Result<(), BridgeError> {
        let mut prepared = self.bridge.prepare(call)?;
        if let Some(id) = reward {
            prepared = prepared.with_ticket(id);
        }
        let kind = prepared.kind();
        let progress = self.bridge_tx.clone();
        let done = self.bridge_tx.clone();
        tokio::spawn(async move {
            let outcome = prepared
                .execute(move |_| {
                    let _ = progress.send(BridgeEvent::Submitted(kind));
                })
                .await;
            let _ = done.send(BridgeEvent::Finished(outcome));
        });
        self.set_status(format!("{}...", sentence_case(kind.label())));
        Ok(())
    }

    /// User-initiated action; precondition failures become a notice.
    pub fn submit_action(&mut self, call: ContractCall) {
        let kind = call.kind();
        if let Err(e) = self.submit(call, None) {
            warn!(?kind, error = %e, "action not submitted");
            self.notify(Notice::error(e.hint()));
        }
    }

    pub fn request_refresh(&mut self, scope: RefreshScope) {
        match self.bridge.refresh_job(scope) {
            Ok(job) => {
                let tx = self.bridge_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(BridgeEvent::Refreshed(job.run().await));
                });
            }
            Err(e) => {
                debug!(error = %e, "refresh skipped");
                self.notify(Notice::error(e.hint()));
            }
        }
    }

    pub fn handle_bridge_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected(result) => self.handle_connected(result),
            BridgeEvent::Submitted(kind) => {
                self.bridge.mark_confirming(kind);
                self.set_status(format!(
                    "{}: waiting for confirmation...",
                    sentence_case(kind.label())
                ));
            }
            BridgeEvent::Finished(outcome) => {
                if let Some(id) = outcome.ticket {
                    let result = match &outcome.result {
                        Ok(_) => Ok(()),
                        Err(e) => Err(e.hint()),
                    };
                    self.rewards.settle(id, result);
                }
                let report = self.bridge.complete(outcome);
                if let Err(e) = &report.result {
                    self.push_errors(vec![e.hint()]);
                }
                self.set_status(report.notice.text.clone());
                self.notify(report.notice);
                if let Some(scope) = report.refresh {
                    self.request_refresh(scope);
                }
            }
            BridgeEvent::Refreshed(Ok(data)) => {
                self.bridge.apply_refresh(data);
            }
            BridgeEvent::Refreshed(Err(e)) => {
                let message = format!("Refresh failed: {}", e.hint());
                self.push_errors(vec![message.clone()]);
                self.notify(Notice::error(message));
            }
        }
    }

    pub fn handle_reward_due(&mut self, RewardDue(id): RewardDue) {
        if !self.rewards.mark_due(id) {
            return;
        }
        match self.submit(ContractCall::PerformAction, Some(id)) {
            Ok(()) => {
                self.rewards.mark_submitted(id);
                info!(id, "arcade reward submitted");
            }
            Err(BridgeError::ActionInFlight { .. }) => {
                debug!(id, "arcade reward coalesced with in-flight action");
                self.rewards.mark_skipped(id, SkipReason::Coalesced);
            }
            Err(e) => {
                debug!(id, error = %e, "arcade reward skipped");
                self.rewards.mark_skipped(id, SkipReason::Unavailable(e.hint()));
            }
        }
    }

    pub fn toggle_arcade(&mut self) {
        if self.arcade.toggle() {
            self.set_status("Game started!");
        } else {
            self.set_status("Game paused!");
        }
    }

    pub fn tick(&mut self, input: Directions) {
        for event in self.arcade.step(input, &mut self.rng) {
            match event {
                ArcadeEvent::CoinCollected {
                    reward: true,
                    index,
                    ..
                } => {
                    let id = self.rewards.schedule();
                    debug!(id, coin = index, "arcade reward scheduled");
                    spawn_reward(id, self.reward_delay, self.reward_tx.clone());
                }
                ArcadeEvent::GameOver { score } => {
                    info!(score, "arcade game over");
                    self.set_status("Game over!");
                    self.notify(Notice::info(format!(
                        "Game over! Score: {score}. Press space to play again"
                    )));
                }
                ArcadeEvent::PowerUpTriggered { .. } => {
                    self.notify(Notice::info("Speed boost!"));
                }
                _ => {}
            }
        }
    }

    pub fn view_model(&self) -> ViewModel {
        let manifest = self.bridge.manifest();
        let network = match (
            manifest.and_then(|m| m.network.clone()),
            self.bridge.chain_id(),
        ) {
            (Some(name), Some(id)) => format!("{name} ({id})"),
            (Some(name), None) => name,
            (None, Some(id)) => format!("chain {id}"),
            (None, None) => "unknown".to_string(),
        };
        let player = self.arcade.player();
        let arcade = ArcadeView {
            running: self.arcade.is_running(),
            player: Some(player.bounds),
            enemies: self.arcade.enemies().iter().map(|e| e.bounds).collect(),
            coins: self
                .arcade
                .coins()
                .iter()
                .filter(|c| !c.collected)
                .map(|c| c.bounds)
                .collect(),
            power_ups: self
                .arcade
                .power_ups()
                .iter()
                .filter(|p| p.active)
                .map(|p| p.bounds)
                .collect(),
            score: self.arcade.score(),
            coins_collected: self.arcade.coins_collected(),
            health: player.health,
            boosted: player.is_boosted(),
            rewards_pending: self.rewards.pending(),
            rewards_confirmed: self.rewards.confirmed(),
        };
        ViewModel {
            account: self.bridge.account(),
            network,
            contract: self.bridge.contract_address(),
            phases: self.bridge.active_phases(),
            in_flight: self.bridge.in_flight(),
            player: self.bridge.view().clone(),
            arcade,
            status: self.status.clone(),
            notice: self.notice.as_ref().map(|(n, _)| n.clone()),
            errors: self.errors.clone(),
        }
    }
}

/// Logs go to a daily rolling file; the terminal belongs to the UI.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("creating log dir {} failed", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(log_dir, "chain-arcade.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("installing tracing subscriber failed: {e}"))?;
    Ok(guard)
}

fn open_wallet(config: &AppConfig) -> Result<RpcWallet> {
    let signer = match &config.keystore {
        Some(choice) => {
            let dir = wallets::resolve_keystore_dir(choice.dir.as_deref())
                .map_err(|e| eyre!("{e:#}"))?;
            let descriptor =
                wallets::find_keystore(&dir, &choice.name).map_err(|e| eyre!("{e:#}"))?;
            Some(wallets::unlock_keystore(&descriptor).map_err(|e| eyre!("{e:#}"))?)
        }
        None => None,
    };
    RpcWallet::connect(&config.rpc_url, signer).map_err(|e| eyre!("{e:#}"))
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let manifest = match config.manifest.load().await {
        Ok(Some(manifest)) => Some(manifest),
        Ok(None) => {
            warn!(source = %config.manifest, "no deployment manifest found");
            None
        }
        Err(e) => {
            error!(source = %config.manifest, error = %e, "could not load deployment manifest");
            None
        }
    };
    let wallet = open_wallet(&config)?;
    let bridge = Bridge::new(
        wallet,
        manifest,
        BridgeOptions {
            auto_register: config.auto_register,
        },
    );
    let settings = ArcadeSettings {
        reward_chance: config.reward_chance,
        reward_delay: config.reward_delay,
    };
    let (controller, receivers) =
        AppController::new(bridge, settings, StdRng::from_os_rng());

    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();
    info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, receivers, &mut ui_state, &mut input_events).await;
    ui::terminal_exit(&mut ui_state)?;
    res
}

async fn run_loop<W: WalletProvider>(
    mut controller: AppController<W>,
    mut receivers: Receivers,
    ui_state: &mut ui::UiState,
    input_events: &mut crossterm::event::EventStream,
) -> Result<()> {
    info!("Running app loop");
    let mut ticker = time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ui::draw(ui_state, &controller.view_model()).wrap_err("initial draw failed")?;

    loop {
        let notice_deadline = controller.notice_deadline();
        tokio::select! {
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event, std::time::Instant::now()) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Redraw => {}
                    ui::UserEvent::Connect => controller.connect(),
                    ui::UserEvent::Refresh => {
                        controller.set_status("Refreshing...");
                        controller.request_refresh(RefreshScope::FULL);
                    }
                    ui::UserEvent::ToggleArcade => {
                        ui_state.clear_keys();
                        controller.toggle_arcade();
                        ticker.reset();
                    }
                    ui::UserEvent::Submit(call) => controller.submit_action(call),
                }
                ui::draw(ui_state, &controller.view_model())
                    .wrap_err("draw after input failed")?;
            }
            _ = ticker.tick(), if controller.arcade_running() => {
                controller.tick(ui_state.directions(std::time::Instant::now()));
                ui::draw(ui_state, &controller.view_model())
                    .wrap_err("draw after arcade tick failed")?;
            }
            Some(event) = receivers.bridge.recv() => {
                controller.handle_bridge_event(event);
                ui::draw(ui_state, &controller.view_model())
                    .wrap_err("draw after bridge event failed")?;
            }
            Some(due) = receivers.rewards.recv() => {
                controller.handle_reward_due(due);
                ui::draw(ui_state, &controller.view_model())
                    .wrap_err("draw after reward failed")?;
            }
            _ = time::sleep_until(notice_deadline.unwrap_or_else(Instant::now)), if notice_deadline.is_some() => {
                if controller.expire_notice(Instant::now()) {
                    ui::draw(ui_state, &controller.view_model())
                        .wrap_err("draw after notice expiry failed")?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
    Ok(())
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use chain_arcade::{
        arcade::reward::RewardState,
        bridge::{
            ActionPhase,
            NoticeLevel,
        },
    };
    use deployments::{
        ContractEntry,
        ContractManifest,
    };
    use game_abi::{
        CallError,
        CallKind,
        test_helpers::{
            FakeChain,
            FakeWallet,
            account,
            contract_address,
        },
    };

    fn controller_for(
        chain: &FakeChain,
        reward_chance: f64,
    ) -> (AppController<FakeWallet>, Receivers) {
        let manifest = ContractManifest::single(ContractEntry {
            address: Some(contract_address().to_string()),
            abi: Vec::new(),
        });
        let bridge = Bridge::new(chain.wallet(), Some(manifest), BridgeOptions::default());
        AppController::new(
            bridge,
            ArcadeSettings {
                reward_chance,
                reward_delay: Duration::from_millis(1000),
            },
            StdRng::seed_from_u64(1),
        )
    }

    async fn drain_until_finished(
        controller: &mut AppController<FakeWallet>,
        receivers: &mut Receivers,
    ) {
        while let Some(event) = receivers.bridge.recv().await {
            let finished = matches!(event, BridgeEvent::Finished(_));
            controller.handle_bridge_event(event);
            if finished {
                break;
            }
        }
    }

    async fn connect_and_wait(
        controller: &mut AppController<FakeWallet>,
        receivers: &mut Receivers,
    ) {
        controller.connect();
        while let Some(event) = receivers.bridge.recv().await {
            let connected = matches!(event, BridgeEvent::Connected(_));
            controller.handle_bridge_event(event);
            if connected {
                break;
            }
        }
    }

    #[tokio::test]
    async fn connect__registers_new_player_in_background() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);

        // when
        controller.connect();
        drain_until_finished(&mut controller, &mut receivers).await;

        // then
        assert!(chain.is_registered(account(1)));
        assert_eq!(
            controller.bridge.phase(CallKind::RegisterPlayer),
            ActionPhase::Succeeded
        );
    }

    #[tokio::test]
    async fn submit_action__precondition_failure_becomes_error_notice() {
        let chain = FakeChain::with_accounts(vec![account(1)]);
        let (mut controller, _receivers) = controller_for(&chain, 0.0);

        controller.submit_action(ContractCall::PerformAction);

        let (notice, _) = controller.notice.clone().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, BridgeError::NotConnected.hint());
    }

    #[tokio::test]
    async fn finished_action__cooldown_shows_hint_and_logs_error() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        chain.register(account(1));
        chain.fail_next_submit(
            CallKind::PerformAction,
            CallError::reverted("execution reverted: Action on cooldown"),
        );
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        connect_and_wait(&mut controller, &mut receivers).await;

        // when
        controller.submit_action(ContractCall::PerformAction);
        drain_until_finished(&mut controller, &mut receivers).await;

        // then
        let (notice, _) = controller.notice.clone().unwrap();
        assert_eq!(notice.text, chain_arcade::bridge::COOLDOWN_HINT);
        assert_eq!(controller.errors.last(), Some(&notice.text));
    }

    #[tokio::test]
    async fn reward_due__coalesces_when_perform_action_is_busy() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        chain.register(account(1));
        chain.hold_confirmations();
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        connect_and_wait(&mut controller, &mut receivers).await;
        controller.submit_action(ContractCall::PerformAction);
        let id = controller.rewards.schedule();

        // when
        controller.handle_reward_due(RewardDue(id));

        // then
        assert_eq!(
            controller.rewards.state(id),
            Some(&RewardState::Skipped(SkipReason::Coalesced))
        );
        assert_eq!(controller.rewards.pending(), 0);
    }

    #[tokio::test]
    async fn reward_due__submits_and_settles_on_confirmation() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        chain.register(account(1));
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        connect_and_wait(&mut controller, &mut receivers).await;
        let id = controller.rewards.schedule();

        // when
        controller.handle_reward_due(RewardDue(id));
        drain_until_finished(&mut controller, &mut receivers).await;

        // then
        assert_eq!(controller.rewards.state(id), Some(&RewardState::Confirmed));
        assert_eq!(chain.confirmed(), vec![ContractCall::PerformAction]);
    }

    #[tokio::test]
    async fn connect__pending_wallet_does_not_stall_arcade() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        chain.hold_accounts();
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        controller.connect();
        tokio::task::yield_now().await;
        controller.toggle_arcade();
        let start = controller.arcade.player().bounds.x;

        // when
        controller.connect();
        for _ in 0..5 {
            controller.tick(Directions {
                right: true,
                ..Directions::default()
            });
        }

        // then
        assert!(controller.arcade.player().bounds.x > start);
        assert!(controller.bridge.account().is_none());
        assert!(controller.connecting);

        chain.release_accounts(1);
        let event = receivers.bridge.recv().await.unwrap();
        assert!(matches!(event, BridgeEvent::Connected(Ok(_))));
        controller.handle_bridge_event(event);
        assert_eq!(controller.bridge.account(), Some(account(1)));
        assert!(!controller.connecting);
        tokio::task::yield_now().await;
        assert!(!matches!(
            receivers.bridge.try_recv(),
            Ok(BridgeEvent::Connected(_))
        ));
    }

    #[tokio::test]
    async fn reward_settles_its_own_entry_across_reconnect() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        chain.register(account(1));
        chain.hold_confirmations();
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        connect_and_wait(&mut controller, &mut receivers).await;
        let first = controller.rewards.schedule();
        controller.handle_reward_due(RewardDue(first));

        // when
        connect_and_wait(&mut controller, &mut receivers).await;
        let second = controller.rewards.schedule();
        controller.handle_reward_due(RewardDue(second));
        chain.release_confirmations(1);
        drain_until_finished(&mut controller, &mut receivers).await;

        // then
        assert_eq!(
            controller.rewards.state(second),
            Some(&RewardState::Skipped(SkipReason::Coalesced))
        );
        assert_eq!(controller.rewards.state(first), Some(&RewardState::Confirmed));
        assert_eq!(controller.rewards.pending(), 0);
        assert_eq!(chain.submitted_count(CallKind::PerformAction), 1);
    }

    #[tokio::test]
    async fn reward_due__without_connection_is_skipped() {
        let chain = FakeChain::with_accounts(vec![account(1)]);
        let (mut controller, _receivers) = controller_for(&chain, 0.0);
        let id = controller.rewards.schedule();

        controller.handle_reward_due(RewardDue(id));

        assert!(matches!(
            controller.rewards.state(id),
            Some(RewardState::Skipped(SkipReason::Unavailable(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn tick__flagged_coin_schedules_delayed_reward() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        let (mut controller, mut receivers) = controller_for(&chain, 1.0);
        controller.toggle_arcade();
        let right = Directions {
            right: true,
            ..Directions::default()
        };

        // when
        while controller.arcade.coins_collected() == 0 && controller.arcade_running() {
            let down = controller.arcade.player().bounds.y < 90;
            controller.tick(Directions { down, ..right });
        }

        // then
        assert_eq!(controller.rewards.pending(), 1);
        let due = receivers.rewards.recv().await.unwrap();
        assert_eq!(due, RewardDue(1));
    }

    #[tokio::test(start_paused = true)]
    async fn expire_notice__clears_after_ttl_and_settles_phases() {
        // given
        let chain = FakeChain::with_accounts(vec![account(1)]);
        let (mut controller, mut receivers) = controller_for(&chain, 0.0);
        connect_and_wait(&mut controller, &mut receivers).await;
        drain_until_finished(&mut controller, &mut receivers).await;

        // when
        let early = controller.expire_notice(Instant::now());
        time::advance(NOTICE_TTL).await;
        let late = controller.expire_notice(Instant::now());

        // then
        assert!(!early);
        assert!(late);
        assert!(controller.notice.is_none());
        assert_eq!(
            controller.bridge.phase(CallKind::RegisterPlayer),
            ActionPhase::Idle
        );
    }

    #[test]
    fn sentence_case__capitalizes_first_letter() {
        assert_eq!(sentence_case("minting NFT"), "Minting NFT");
        assert_eq!(sentence_case(""), "");
    }
}
