use alloy::primitives::{
    Address,
    U256,
};
use chain_arcade::{
    arcade::{
        Bounds,
        Directions,
        FIELD_HEIGHT,
        FIELD_WIDTH,
    },
    bridge::{
        self,
        ActionKind,
        ActionPhase,
        Notice,
        NoticeLevel,
        PlayerView,
    },
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
        KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use game_abi::ContractCall;
use itertools::Itertools;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{
            Canvas,
            Rectangle,
        },
        *,
    },
};
use std::{
    io::stdout,
    time::{
        Duration,
        Instant,
    },
};
use unicode_width::UnicodeWidthChar;

/// Without release events a direction counts as held this long after its
/// last press or repeat.
pub const HOLD_WINDOW: Duration = Duration::from_millis(250);

pub enum UserEvent {
    Quit,
    Redraw,
    Connect,
    Refresh,
    ToggleArcade,
    Submit(ContractCall),
}

/// Everything the frame needs, captured once per draw.
#[derive(Clone, Debug, Default)]
pub struct ViewModel {
    pub account: Option<Address>,
    pub network: String,
    pub contract: Option<Address>,
    pub phases: Vec<(ActionKind, ActionPhase)>,
    pub in_flight: usize,
    pub player: PlayerView,
    pub arcade: ArcadeView,
    pub status: String,
    pub notice: Option<Notice>,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ArcadeView {
    pub running: bool,
    pub player: Option<Bounds>,
    pub enemies: Vec<Bounds>,
    pub coins: Vec<Bounds>,
    pub power_ups: Vec<Bounds>,
    pub score: u32,
    pub coins_collected: u32,
    pub health: u32,
    pub boosted: bool,
    pub rewards_pending: usize,
    pub rewards_confirmed: usize,
}

#[derive(Debug, Default)]
struct KeyHold {
    up: Option<Instant>,
    down: Option<Instant>,
    left: Option<Instant>,
    right: Option<Instant>,
    release_aware: bool,
}

#[derive(Clone, Copy, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl KeyHold {
    fn slot(&mut self, dir: Dir) -> &mut Option<Instant> {
        match dir {
            Dir::Up => &mut self.up,
            Dir::Down => &mut self.down,
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }

    fn press(&mut self, dir: Dir, now: Instant) {
        *self.slot(dir) = Some(now);
    }

    fn release(&mut self, dir: Dir) {
        self.release_aware = true;
        *self.slot(dir) = None;
    }

    fn held(&self, at: Option<Instant>, now: Instant) -> bool {
        match at {
            Some(t) => self.release_aware || now.saturating_duration_since(t) < HOLD_WINDOW,
            None => false,
        }
    }

    fn directions(&self, now: Instant) -> Directions {
        Directions {
            up: self.held(self.up, now),
            down: self.held(self.down, now),
            left: self.held(self.left, now),
            right: self.held(self.right, now),
        }
    }

    fn clear(&mut self) {
        let release_aware = self.release_aware;
        *self = KeyHold {
            release_aware,
            ..KeyHold::default()
        };
    }
}

pub struct UiState {
    mode: Mode,
    keys: KeyHold,
    in_flight: usize,
    enhanced_keyboard: bool,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            mode: Mode::Normal,
            keys: KeyHold::default(),
            in_flight: 0,
            enhanced_keyboard: false,
            terminal: None,
        }
    }
}

impl UiState {
    pub fn directions(&self, now: Instant) -> Directions {
        self.keys.directions(now)
    }

    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    Prompt(PromptState),
    QuitConfirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PromptForm {
    UpgradeNft,
    CreateGuild,
    JoinGuild,
    Challenge,
    ListItem,
    BuyItem,
    StakeNft,
    UnstakeNft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldKind {
    Text { required: bool },
    Uint,
    Address,
}

#[derive(Clone, Debug)]
struct Field {
    label: &'static str,
    kind: FieldKind,
    value: String,
}

impl Field {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            kind,
            value: String::new(),
        }
    }
}

#[derive(Clone, Debug)]
struct PromptState {
    form: PromptForm,
    fields: Vec<Field>,
    focus: usize,
    error: Option<String>,
}

impl PromptForm {
    fn title(self) -> &'static str {
        match self {
            PromptForm::UpgradeNft => "Upgrade NFT",
            PromptForm::CreateGuild => "Create Guild",
            PromptForm::JoinGuild => "Join Guild",
            PromptForm::Challenge => "Challenge Player",
            PromptForm::ListItem => "List Item",
            PromptForm::BuyItem => "Buy Item",
            PromptForm::StakeNft => "Stake NFT",
            PromptForm::UnstakeNft => "Unstake NFT",
        }
    }

    fn fields(self) -> Vec<Field> {
        match self {
            PromptForm::UpgradeNft
            | PromptForm::BuyItem
            | PromptForm::StakeNft
            | PromptForm::UnstakeNft => vec![Field::new("Token id", FieldKind::Uint)],
            PromptForm::CreateGuild => vec![
                Field::new("Name", FieldKind::Text { required: true }),
                Field::new("Description", FieldKind::Text { required: false }),
            ],
            PromptForm::JoinGuild => vec![Field::new("Guild id", FieldKind::Uint)],
            PromptForm::Challenge => vec![
                Field::new("Opponent", FieldKind::Address),
                Field::new("Amount", FieldKind::Uint),
            ],
            PromptForm::ListItem => vec![
                Field::new("Token id", FieldKind::Uint),
                Field::new("Price", FieldKind::Uint),
            ],
        }
    }
}

fn parse_uint(label: &str, raw: &str) -> Result<U256, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("{label} must be an unsigned integer"));
    }
    trimmed
        .parse::<U256>()
        .map_err(|_| format!("{label} is out of range"))
}

fn parse_address(label: &str, raw: &str) -> Result<Address, String> {
    let trimmed = raw.trim();
    let valid_shape = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed[2..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid_shape {
        return Err(format!("{label} must be a 0x-prefixed 20-byte hex address"));
    }
    trimmed
        .parse::<Address>()
        .map_err(|e| format!("{label}: {e}"))
}

impl PromptState {
    fn new(form: PromptForm) -> Self {
        Self {
            form,
            fields: form.fields(),
            focus: 0,
            error: None,
        }
    }

    fn validate(&self) -> Result<ContractCall, String> {
        for field in &self.fields {
            match field.kind {
                FieldKind::Text { required: true } if field.value.trim().is_empty() => {
                    return Err(format!("{} is required", field.label));
                }
                FieldKind::Uint => {
                    parse_uint(field.label, &field.value)?;
                }
                FieldKind::Address => {
                    parse_address(field.label, &field.value)?;
                }
                FieldKind::Text { .. } => {}
            }
        }
        let uint = |i: usize| parse_uint(self.fields[i].label, &self.fields[i].value);
        let text = |i: usize| self.fields[i].value.trim().to_string();
        let call = match self.form {
            PromptForm::UpgradeNft => ContractCall::UpgradeNft { token_id: uint(0)? },
            PromptForm::CreateGuild => ContractCall::CreateGuild {
                name: text(0),
                description: text(1),
            },
            PromptForm::JoinGuild => ContractCall::JoinGuild { guild_id: uint(0)? },
            PromptForm::Challenge => ContractCall::ChallengePlayer {
                opponent: parse_address(self.fields[0].label, &self.fields[0].value)?,
                amount: uint(1)?,
            },
            PromptForm::ListItem => ContractCall::ListItem {
                token_id: uint(0)?,
                price: uint(1)?,
            },
            PromptForm::BuyItem => ContractCall::BuyItem { token_id: uint(0)? },
            PromptForm::StakeNft => ContractCall::StakeNft { token_id: uint(0)? },
            PromptForm::UnstakeNft => ContractCall::UnstakeNft { token_id: uint(0)? },
        };
        Ok(call)
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)?;
    state.enhanced_keyboard =
        crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if state.enhanced_keyboard {
        crossterm::execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit(state: &mut UiState) -> Result<()> {
    if state.enhanced_keyboard {
        crossterm::execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    state.terminal = None;
    Ok(())
}

pub fn input_event_stream() -> EventStream {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut EventStream) -> Result<Event> {
    match events.next().await {
        Some(event) => event.wrap_err("reading terminal input failed"),
        None => Err(color_eyre::eyre::eyre!("terminal input stream closed")),
    }
}

pub fn draw(state: &mut UiState, view: &ViewModel) -> Result<()> {
    state.in_flight = view.in_flight;
    if let Some(mut term) = state.terminal.take() {
        let result = term.draw(|f| ui(f, state, view)).map(|_| ());
        state.terminal = Some(term);
        result?;
    }
    Ok(())
}

fn direction_for(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Dir::Right),
        _ => None,
    }
}

pub fn interpret_event(state: &mut UiState, event: Event, now: Instant) -> Option<UserEvent> {
    match event {
        Event::Key(key) => interpret_key(state, key, now),
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        Event::FocusLost => {
            state.keys.clear();
            None
        }
        _ => None,
    }
}

fn interpret_key(state: &mut UiState, key: KeyEvent, now: Instant) -> Option<UserEvent> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UserEvent::Quit);
    }
    let pressed = matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat);
    match &mut state.mode {
        Mode::Prompt(prompt) => {
            if !pressed {
                return None;
            }
            match key.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Tab | KeyCode::Down => {
                    prompt.focus = (prompt.focus + 1) % prompt.fields.len();
                    Some(UserEvent::Redraw)
                }
                KeyCode::BackTab | KeyCode::Up => {
                    prompt.focus = (prompt.focus + prompt.fields.len() - 1) % prompt.fields.len();
                    Some(UserEvent::Redraw)
                }
                KeyCode::Backspace => {
                    prompt.fields[prompt.focus].value.pop();
                    prompt.error = None;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Enter => {
                    if prompt.focus + 1 < prompt.fields.len() {
                        prompt.focus += 1;
                        return Some(UserEvent::Redraw);
                    }
                    match prompt.validate() {
                        Ok(call) => {
                            state.mode = Mode::Normal;
                            Some(UserEvent::Submit(call))
                        }
                        Err(message) => {
                            prompt.error = Some(message);
                            Some(UserEvent::Redraw)
                        }
                    }
                }
                KeyCode::Char(c) => {
                    prompt.fields[prompt.focus].value.push(c);
                    prompt.error = None;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            }
        }
        Mode::QuitConfirm => {
            if key.kind != KeyEventKind::Press {
                return None;
            }
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Some(UserEvent::Quit)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            }
        }
        Mode::Normal => {
            if let Some(dir) = direction_for(key.code) {
                if pressed {
                    state.keys.press(dir, now);
                } else if key.kind == KeyEventKind::Release {
                    state.keys.release(dir);
                }
                return None;
            }
            if key.kind != KeyEventKind::Press {
                return None;
            }
            let open = |form: PromptForm| Mode::Prompt(PromptState::new(form));
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    if state.in_flight > 0 {
                        state.mode = Mode::QuitConfirm;
                        Some(UserEvent::Redraw)
                    } else {
                        Some(UserEvent::Quit)
                    }
                }
                KeyCode::Char('c') => Some(UserEvent::Connect),
                KeyCode::Char('f') => Some(UserEvent::Refresh),
                KeyCode::Char(' ') => Some(UserEvent::ToggleArcade),
                KeyCode::Char('r') => Some(UserEvent::Submit(ContractCall::RegisterPlayer)),
                KeyCode::Char('m') => Some(UserEvent::Submit(ContractCall::MintNft {
                    uri: bridge::new_character_uri(),
                })),
                KeyCode::Char('e') => Some(UserEvent::Submit(ContractCall::PerformAction)),
                KeyCode::Char('y') => Some(UserEvent::Submit(ContractCall::ClaimDailyReward)),
                KeyCode::Char('l') => Some(UserEvent::Submit(ContractCall::LeaveGuild)),
                KeyCode::Char(c) => {
                    let form = match c {
                        'u' => PromptForm::UpgradeNft,
                        'g' => PromptForm::CreateGuild,
                        'j' => PromptForm::JoinGuild,
                        'h' => PromptForm::Challenge,
                        't' => PromptForm::ListItem,
                        'b' => PromptForm::BuyItem,
                        'k' => PromptForm::StakeNft,
                        'n' => PromptForm::UnstakeNft,
                        _ => return None,
                    };
                    state.mode = open(form);
                    Some(UserEvent::Redraw)
                }
                _ => None,
            }
        }
    }
}

fn ui(f: &mut Frame, state: &UiState, view: &ViewModel) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(4),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_wallet_panel(f, chunks[0], view);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    draw_chain_panels(f, middle[0], view);
    draw_arcade(f, middle[1], &view.arcade);
    draw_status(f, chunks[2], view);
    draw_help(f, chunks[3]);
    draw_modals(f, state);
}

fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

fn format_time(secs: U256) -> String {
    if secs.is_zero() {
        return "never".to_string();
    }
    u64::try_from(secs)
        .ok()
        .and_then(|s| i64::try_from(s).ok())
        .and_then(|s| chrono::DateTime::from_timestamp(s, 0))
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn id_list(ids: &[U256]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.iter().join(", ")
    }
}

/// Truncates to `width` terminal columns.
fn fit_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, view: &ViewModel) {
    let account = view
        .account
        .as_ref()
        .map(short_address)
        .unwrap_or_else(|| "not connected (press c)".to_string());
    let contract = view
        .contract
        .as_ref()
        .map(short_address)
        .unwrap_or_else(|| "unavailable".to_string());
    let phases = if view.phases.is_empty() {
        "idle".to_string()
    } else {
        view.phases
            .iter()
            .map(|(kind, phase)| format!("{}: {}", kind.label(), phase))
            .join(" | ")
    };
    let lines = vec![
        Line::from(format!(
            "Account: {} | Network: {} | Contract: {}",
            account, view.network, contract
        )),
        Line::from(format!("Actions: {phases}")),
    ];
    let widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Wallet"));
    f.render_widget(widget, area);
}

fn draw_chain_panels(f: &mut Frame, area: Rect, view: &ViewModel) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(9),
            Constraint::Length(5),
            Constraint::Length(4),
        ])
        .split(area);
    draw_player_panel(f, rows[0], &view.player);
    draw_guild_panel(f, rows[1], &view.player);
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let market = Paragraph::new(id_list(&view.player.market))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Market"));
    f.render_widget(market, lower[0]);
    let stakes = Paragraph::new(id_list(&view.player.stakes))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Stakes"));
    f.render_widget(stakes, lower[1]);
}

fn draw_player_panel(f: &mut Frame, area: Rect, player: &PlayerView) {
    let block = Block::default().borders(Borders::ALL).title("Player");
    let Some(info) = player.info.as_ref() else {
        let text = match player.registered {
            Some(false) => "Not registered (press r)",
            _ => "No player data",
        };
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    };
    let balance = player
        .nft_balance
        .map(|b| b.to_string())
        .unwrap_or_else(|| "-".to_string());
    let achievements = if player.achievements.is_empty() {
        "none".to_string()
    } else {
        player.achievements.join(", ")
    };
    let lines = vec![
        Line::from(format!("Level: {} | XP: {}", info.level, info.experience)),
        Line::from(format!(
            "Last action: {} | Last claim: {}",
            format_time(info.last_action_time),
            format_time(info.last_claim_time)
        )),
        Line::from(format!(
            "Rewards: {} | Tokens: {} | Reputation: {}",
            info.total_rewards, info.game_tokens, info.reputation
        )),
        Line::from(format!(
            "Achievement points: {} | Guild: {}",
            info.achievement_points, info.guild_id
        )),
        Line::from(format!("NFTs ({} / balance {}): {}", info.nft_count, balance, id_list(&info.nft_ids))),
        Line::from(format!("Achievements: {achievements}")),
    ];
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(widget, area);
}

fn draw_guild_panel(f: &mut Frame, area: Rect, player: &PlayerView) {
    let lines = match player.guild.as_ref() {
        Some(guild) => vec![
            Line::from(Span::styled(
                guild.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(guild.description.clone()),
            Line::from(format!(
                "Members: {} | Level: {} | XP: {}",
                guild.member_count, guild.level, guild.total_experience
            )),
        ],
        None => vec![Line::from("Not in a guild (g create, j join)")],
    };
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Guild"));
    f.render_widget(widget, area);
}

fn to_canvas(bounds: &Bounds, color: Color) -> Rectangle {
    // canvas y grows upwards
    Rectangle {
        x: f64::from(bounds.x),
        y: f64::from(FIELD_HEIGHT - bounds.y - bounds.height),
        width: f64::from(bounds.width),
        height: f64::from(bounds.height),
        color,
    }
}

fn draw_arcade(f: &mut Frame, area: Rect, arcade: &ArcadeView) {
    let state = if arcade.running { "" } else { " | paused (space)" };
    let boost = if arcade.boosted { " | BOOST" } else { "" };
    let title = format!(
        "Arcade | Score {} | Coins {} | Health {}{}{} | Rewards {}/{}",
        arcade.score,
        arcade.coins_collected,
        arcade.health,
        boost,
        state,
        arcade.rewards_confirmed,
        arcade.rewards_pending + arcade.rewards_confirmed,
    );
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(FIELD_WIDTH)])
        .y_bounds([0.0, f64::from(FIELD_HEIGHT)])
        .paint(|ctx| {
            for coin in &arcade.coins {
                ctx.draw(&to_canvas(coin, Color::Yellow));
            }
            for power_up in &arcade.power_ups {
                ctx.draw(&to_canvas(power_up, Color::Magenta));
            }
            for enemy in &arcade.enemies {
                ctx.draw(&to_canvas(enemy, Color::Red));
            }
            if let Some(player) = &arcade.player {
                let color = if arcade.boosted {
                    Color::Cyan
                } else {
                    Color::Green
                };
                ctx.draw(&to_canvas(player, color));
            }
        });
    f.render_widget(canvas, area);
}

fn draw_status(f: &mut Frame, area: Rect, view: &ViewModel) {
    let width = area.width.saturating_sub(2) as usize;
    let (text, color) = match &view.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Error => Color::Red,
            };
            (notice.text.clone(), color)
        }
        None if view.status.trim().is_empty() => ("Ready".to_string(), Color::Green),
        None => (view.status.clone(), Color::Green),
    };
    let mut lines = vec![Line::from(fit_width(&text, width))];
    if let Some(last) = view.errors.last() {
        lines.push(Line::from(Span::styled(
            fit_width(&format!("Last error: {last}"), width),
            Style::default().fg(Color::Red),
        )));
    }
    let widget = Paragraph::new(lines)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "c connect | r register | m mint | e act | u upgrade | y claim | g/j/l guild | h challenge | t list | b buy | k/n stake | f refresh | space arcade | arrows/WASD move | q quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::Normal => {}
        Mode::QuitConfirm => {
            let area = centered_rect(40, 20, f.area());
            f.render_widget(Clear, area);
            let text = format!(
                "{} action(s) still confirming.\nQuit anyway? (y/n)",
                state.in_flight
            );
            let widget = Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Quit"));
            f.render_widget(widget, area);
        }
        Mode::Prompt(prompt) => {
            let area = centered_rect(50, 40, f.area());
            f.render_widget(Clear, area);
            let mut lines: Vec<Line> = Vec::new();
            for (i, field) in prompt.fields.iter().enumerate() {
                let focused = i == prompt.focus;
                let marker = if focused { "> " } else { "  " };
                let style = if focused {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}: {}", field.label, field.value),
                    style,
                )));
            }
            lines.push(Line::from(""));
            if let Some(err) = &prompt.error {
                lines.push(Line::from(Span::styled(
                    err.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
            lines.push(Line::from("Tab next field | Enter submit | Esc cancel"));
            let widget = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(prompt.form.title()),
                );
            f.render_widget(widget, area);
        }
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(vertical[1])[1]
}
