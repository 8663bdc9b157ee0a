//! Local arcade simulation, stepped at a fixed rate by the client loop.
//!
//! The simulation owns no chain state. Coin pickups may carry a reward flag;
//! acting on it is left to the caller (see [`reward`]).

use rand::Rng;
use std::time::Duration;

pub mod reward;

pub const FIELD_WIDTH: i32 = 600;
pub const FIELD_HEIGHT: i32 = 400;
pub const TICKS_PER_SECOND: u32 = 30;
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / TICKS_PER_SECOND as u64);

pub const BASE_SPEED: i32 = 5;
pub const BOOST_SPEED: i32 = 8;
pub const BOOST_TICKS: u32 = 5 * TICKS_PER_SECOND;
pub const POWER_UP_COOLDOWN_TICKS: u32 = 10 * TICKS_PER_SECOND;
pub const ENEMY_STEP: i32 = 1;
pub const COIN_VALUE: u32 = 10;
pub const MAX_HEALTH: u32 = 100;
pub const DAMAGE_PER_TICK: u32 = 1;
pub const DEFAULT_REWARD_CHANCE: f64 = 0.3;

const PLAYER_START: (i32, i32) = (50, 50);
const PLAYER_SIZE: i32 = 50;
const ENEMY_SIZE: i32 = 30;
const COIN_SIZE: i32 = 25;
const POWER_UP_SIZE: i32 = 20;
const ENEMY_LAYOUT: [(i32, i32); 2] = [(200, 150), (300, 250)];
const COIN_LAYOUT: [(i32, i32); 3] = [(350, 100), (150, 200), (400, 300)];
const POWER_UP_LAYOUT: [(i32, i32); 2] = [(500, 60), (80, 320)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    fn clamp_to_field(&mut self) {
        self.x = self.x.clamp(0, FIELD_WIDTH - self.width);
        self.y = self.y.clamp(0, FIELD_HEIGHT - self.height);
    }

    pub fn within_field(&self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + self.width <= FIELD_WIDTH
            && self.y + self.height <= FIELD_HEIGHT
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub bounds: Bounds,
    pub speed: i32,
    pub health: u32,
    pub boost_ticks: u32,
}

impl Player {
    fn new() -> Self {
        Self {
            bounds: Bounds::new(PLAYER_START.0, PLAYER_START.1, PLAYER_SIZE, PLAYER_SIZE),
            speed: BASE_SPEED,
            health: MAX_HEALTH,
            boost_ticks: 0,
        }
    }

    pub fn is_boosted(&self) -> bool {
        self.boost_ticks > 0
    }

    fn clear_boost(&mut self) {
        self.speed = BASE_SPEED;
        self.boost_ticks = 0;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub bounds: Bounds,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    pub bounds: Bounds,
    pub collected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerUp {
    pub bounds: Bounds,
    pub active: bool,
    pub cooldown_ticks: u32,
}

/// Directions currently held by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArcadeEvent {
    CoinCollected {
        index: usize,
        score: u32,
        reward: bool,
    },
    PowerUpTriggered {
        index: usize,
    },
    BoostExpired,
    PowerUpReady {
        index: usize,
    },
    Damaged {
        health: u32,
    },
    GameOver {
        score: u32,
    },
}

#[derive(Clone, Debug)]
pub struct Arcade {
    player: Player,
    enemies: Vec<Enemy>,
    coins: Vec<Coin>,
    power_ups: Vec<PowerUp>,
    score: u32,
    coins_collected: u32,
    running: bool,
    reward_chance: f64,
    ticks: u64,
}

impl Default for Arcade {
    fn default() -> Self {
        Self::new(DEFAULT_REWARD_CHANCE)
    }
}

fn initial_enemies() -> Vec<Enemy> {
    ENEMY_LAYOUT
        .iter()
        .map(|&(x, y)| Enemy {
            bounds: Bounds::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
        })
        .collect()
}

fn initial_coins() -> Vec<Coin> {
    COIN_LAYOUT
        .iter()
        .map(|&(x, y)| Coin {
            bounds: Bounds::new(x, y, COIN_SIZE, COIN_SIZE),
            collected: false,
        })
        .collect()
}

fn initial_power_ups() -> Vec<PowerUp> {
    POWER_UP_LAYOUT
        .iter()
        .map(|&(x, y)| PowerUp {
            bounds: Bounds::new(x, y, POWER_UP_SIZE, POWER_UP_SIZE),
            active: true,
            cooldown_ticks: 0,
        })
        .collect()
}

fn step_toward(from: i32, to: i32) -> i32 {
    from + (to - from).signum() * ENEMY_STEP
}

impl Arcade {
    /// `reward_chance` is clamped to `[0, 1]`; non-finite values disable rewards.
    pub fn new(reward_chance: f64) -> Self {
        let reward_chance = if reward_chance.is_finite() {
            reward_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            player: Player::new(),
            enemies: initial_enemies(),
            coins: initial_coins(),
            power_ups: initial_power_ups(),
            score: 0,
            coins_collected: 0,
            running: false,
            reward_chance,
            ticks: 0,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn coins_collected(&self) -> u32 {
        self.coins_collected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Resumes ticking with a fresh entity layout. Position and score persist.
    pub fn start(&mut self) {
        self.enemies = initial_enemies();
        self.coins = initial_coins();
        self.power_ups = initial_power_ups();
        self.player.clear_boost();
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Returns whether the arcade is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
        self.running
    }

    pub fn step(&mut self, input: Directions, rng: &mut impl Rng) -> Vec<ArcadeEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }
        self.ticks += 1;

        if self.player.boost_ticks > 0 {
            self.player.boost_ticks -= 1;
            if self.player.boost_ticks == 0 {
                self.player.speed = BASE_SPEED;
                events.push(ArcadeEvent::BoostExpired);
            }
        }
        for (index, power_up) in self.power_ups.iter_mut().enumerate() {
            if !power_up.active {
                power_up.cooldown_ticks = power_up.cooldown_ticks.saturating_sub(1);
                if power_up.cooldown_ticks == 0 {
                    power_up.active = true;
                    events.push(ArcadeEvent::PowerUpReady { index });
                }
            }
        }

        self.move_player(input);
        let target = self.player.bounds;
        for enemy in &mut self.enemies {
            enemy.bounds.x = step_toward(enemy.bounds.x, target.x);
            enemy.bounds.y = step_toward(enemy.bounds.y, target.y);
            enemy.bounds.clamp_to_field();
        }

        for (index, coin) in self.coins.iter_mut().enumerate() {
            if !coin.collected && target.overlaps(&coin.bounds) {
                coin.collected = true;
                self.score += COIN_VALUE;
                self.coins_collected += 1;
                let reward = rng.random_bool(self.reward_chance);
                events.push(ArcadeEvent::CoinCollected {
                    index,
                    score: self.score,
                    reward,
                });
            }
        }

        for (index, power_up) in self.power_ups.iter_mut().enumerate() {
            if power_up.active && target.overlaps(&power_up.bounds) {
                power_up.active = false;
                power_up.cooldown_ticks = POWER_UP_COOLDOWN_TICKS;
                self.player.speed = BOOST_SPEED;
                self.player.boost_ticks = BOOST_TICKS;
                events.push(ArcadeEvent::PowerUpTriggered { index });
            }
        }

        if self.enemies.iter().any(|e| target.overlaps(&e.bounds)) {
            self.player.health = self.player.health.saturating_sub(DAMAGE_PER_TICK);
            events.push(ArcadeEvent::Damaged {
                health: self.player.health,
            });
            if self.player.health == 0 {
                events.push(ArcadeEvent::GameOver { score: self.score });
                self.player = Player::new();
                self.running = false;
            }
        }
        events
    }

    fn move_player(&mut self, input: Directions) {
        let speed = self.player.speed;
        let bounds = &mut self.player.bounds;
        if input.left {
            bounds.x -= speed;
        }
        if input.right {
            bounds.x += speed;
        }
        if input.up {
            bounds.y -= speed;
        }
        if input.down {
            bounds.y += speed;
        }
        bounds.clamp_to_field();
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{
        SeedableRng,
        rngs::StdRng,
    };

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn running_arcade(chance: f64) -> Arcade {
        let mut arcade = Arcade::new(chance);
        arcade.start();
        arcade
    }

    fn place_player(arcade: &mut Arcade, x: i32, y: i32) {
        arcade.player.bounds.x = x;
        arcade.player.bounds.y = y;
    }

    fn clear_enemies(arcade: &mut Arcade) {
        arcade.enemies.clear();
    }

    const IDLE: Directions = Directions {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    #[test]
    fn new__uses_initial_layout() {
        let arcade = Arcade::default();

        assert_eq!(arcade.player().bounds, Bounds::new(50, 50, 50, 50));
        assert_eq!(arcade.player().speed, BASE_SPEED);
        assert_eq!(arcade.enemies().len(), 2);
        assert_eq!(arcade.coins().len(), 3);
        assert_eq!(arcade.power_ups().len(), 2);
        assert!(!arcade.is_running());
    }

    #[test]
    fn step__does_nothing_while_paused() {
        let mut arcade = Arcade::default();
        let before = arcade.clone();

        let events = arcade.step(
            Directions {
                right: true,
                ..IDLE
            },
            &mut rng(),
        );

        assert!(events.is_empty());
        assert_eq!(arcade.player(), before.player());
    }

    #[test]
    fn step__moves_player_and_clamps_to_field() {
        // given
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 2, 348);

        // when
        arcade.step(
            Directions {
                left: true,
                down: true,
                ..IDLE
            },
            &mut rng(),
        );

        // then
        assert_eq!(arcade.player().bounds.x, 0);
        assert_eq!(arcade.player().bounds.y, FIELD_HEIGHT - PLAYER_SIZE);
    }

    #[test]
    fn step__up_decreases_y() {
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);

        arcade.step(
            Directions {
                up: true,
                ..IDLE
            },
            &mut rng(),
        );

        assert_eq!(arcade.player().bounds.y, 45);
    }

    #[test]
    fn step__enemies_pursue_player_one_unit_per_axis() {
        // given
        let mut arcade = running_arcade(0.0);

        // when
        arcade.step(IDLE, &mut rng());

        // then
        assert_eq!(arcade.enemies()[0].bounds.x, 199);
        assert_eq!(arcade.enemies()[0].bounds.y, 149);
        assert_eq!(arcade.enemies()[1].bounds.x, 299);
        assert_eq!(arcade.enemies()[1].bounds.y, 249);
    }

    #[test]
    fn step__coin_is_scored_once_across_overlapping_frames() {
        // given
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 340, 90);

        // when
        let first = arcade.step(IDLE, &mut rng());
        let second = arcade.step(IDLE, &mut rng());

        // then
        assert_eq!(
            first,
            vec![ArcadeEvent::CoinCollected {
                index: 0,
                score: COIN_VALUE,
                reward: false,
            }]
        );
        assert!(second.is_empty());
        assert!(arcade.coins()[0].collected);
        assert_eq!(arcade.score(), COIN_VALUE);
        assert_eq!(arcade.coins_collected(), 1);
    }

    #[test]
    fn step__certain_reward_chance_flags_every_coin() {
        let mut arcade = running_arcade(1.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 140, 190);

        let events = arcade.step(IDLE, &mut rng());

        assert!(matches!(
            events.as_slice(),
            [ArcadeEvent::CoinCollected { reward: true, .. }]
        ));
    }

    #[test]
    fn new__out_of_range_chance_is_clamped() {
        let mut arcade = Arcade::new(7.5);
        arcade.start();
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 390, 290);

        let events = arcade.step(IDLE, &mut rng());

        assert!(matches!(
            events.as_slice(),
            [ArcadeEvent::CoinCollected { reward: true, .. }]
        ));
        assert_eq!(Arcade::new(f64::NAN).reward_chance, 0.0);
    }

    #[test]
    fn step__power_up_boost_expires_and_restores_base_speed() {
        // given
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 490, 50);
        let events = arcade.step(IDLE, &mut rng());
        assert_eq!(events, vec![ArcadeEvent::PowerUpTriggered { index: 0 }]);
        assert_eq!(arcade.player().speed, BOOST_SPEED);
        place_player(&mut arcade, 250, 0);

        // when
        let mut expired_at = None;
        for tick in 1..=BOOST_TICKS {
            let events = arcade.step(IDLE, &mut rng());
            if events.contains(&ArcadeEvent::BoostExpired) {
                expired_at = Some(tick);
                break;
            }
            assert_eq!(arcade.player().speed, BOOST_SPEED);
        }

        // then
        assert_eq!(expired_at, Some(BOOST_TICKS));
        assert_eq!(arcade.player().speed, BASE_SPEED);
        assert!(!arcade.player().is_boosted());
    }

    #[test]
    fn step__power_up_becomes_eligible_after_cooldown() {
        // given
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 490, 50);
        arcade.step(IDLE, &mut rng());
        place_player(&mut arcade, 250, 0);

        // when
        let mut ready_at = None;
        for tick in 1..=POWER_UP_COOLDOWN_TICKS {
            if arcade
                .step(IDLE, &mut rng())
                .contains(&ArcadeEvent::PowerUpReady { index: 0 })
            {
                ready_at = Some(tick);
                break;
            }
            assert!(!arcade.power_ups()[0].active);
        }

        // then
        assert_eq!(ready_at, Some(POWER_UP_COOLDOWN_TICKS));
        assert!(arcade.power_ups()[0].active);
    }

    #[test]
    fn step__enemy_overlap_costs_health_every_tick() {
        let mut arcade = running_arcade(0.0);
        place_player(&mut arcade, 190, 140);

        let first = arcade.step(IDLE, &mut rng());
        let second = arcade.step(IDLE, &mut rng());

        assert!(first.contains(&ArcadeEvent::Damaged { health: 99 }));
        assert!(second.contains(&ArcadeEvent::Damaged { health: 98 }));
    }

    #[test]
    fn step__zero_health_ends_game_once_and_resets_player() {
        // given
        let mut arcade = running_arcade(0.0);
        arcade.score = 30;
        place_player(&mut arcade, 190, 140);
        arcade.player.health = 2;

        // when
        let mut game_overs = 0;
        for _ in 0..10 {
            for event in arcade.step(IDLE, &mut rng()) {
                if event == (ArcadeEvent::GameOver { score: 30 }) {
                    game_overs += 1;
                }
            }
        }

        // then
        assert_eq!(game_overs, 1);
        assert!(!arcade.is_running());
        assert_eq!(arcade.player().health, MAX_HEALTH);
        assert_eq!(arcade.player().bounds, Bounds::new(50, 50, 50, 50));
    }

    #[test]
    fn start__after_pause_resets_layout_but_keeps_position_and_score() {
        // given
        let mut arcade = running_arcade(0.0);
        clear_enemies(&mut arcade);
        place_player(&mut arcade, 340, 90);
        arcade.step(IDLE, &mut rng());
        arcade.step(
            Directions {
                right: true,
                ..IDLE
            },
            &mut rng(),
        );
        let position = arcade.player().bounds;

        // when
        arcade.toggle();
        assert!(!arcade.is_running());
        arcade.toggle();

        // then
        assert!(arcade.is_running());
        assert_eq!(arcade.coins(), initial_coins().as_slice());
        assert_eq!(arcade.enemies(), initial_enemies().as_slice());
        assert_eq!(arcade.power_ups(), initial_power_ups().as_slice());
        assert_eq!(arcade.player().bounds, position);
        assert_eq!(arcade.score(), COIN_VALUE);
    }

    fn directions() -> impl Strategy<Value = Directions> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(up, down, left, right)| Directions {
                up,
                down,
                left,
                right,
            },
        )
    }

    proptest! {
        #[test]
        fn step__invariants_hold_for_any_input(
            inputs in proptest::collection::vec(directions(), 1..400),
            seed in any::<u64>(),
        ) {
            let mut arcade = running_arcade(0.5);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut seen_scores = 0u32;
            for input in inputs {
                if !arcade.is_running() {
                    arcade.start();
                }
                for event in arcade.step(input, &mut rng) {
                    if let ArcadeEvent::CoinCollected { score, .. } = event {
                        prop_assert!(score > seen_scores);
                        seen_scores = score;
                    }
                }
                prop_assert!(arcade.player().health <= MAX_HEALTH);
                prop_assert!(arcade.player().bounds.within_field());
                for enemy in arcade.enemies() {
                    prop_assert!(enemy.bounds.within_field());
                }
                let collected = arcade.coins().iter().filter(|c| c.collected).count() as u32;
                prop_assert!(arcade.score() >= collected * COIN_VALUE);
                prop_assert_eq!(arcade.score(), arcade.coins_collected() * COIN_VALUE);
            }
        }
    }
}
