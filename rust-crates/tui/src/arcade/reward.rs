//! One-shot reward tasks triggered by coin pickups.
//!
//! A reward is scheduled when a flagged coin is collected, becomes due after
//! a delay, and is then either submitted as a `performAction` call or
//! skipped. The arcade loop never waits on any of it.

use std::{
    collections::BTreeMap,
    fmt,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
};

pub const DEFAULT_REWARD_DELAY: Duration = Duration::from_millis(1000);
const SETTLED_HISTORY: usize = 32;

pub type RewardId = u64;

/// Posted to the client loop once a reward's delay has elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardDue(pub RewardId);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Another `performAction` was still in flight.
    Coalesced,
    Unavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Coalesced => f.write_str("action already in flight"),
            SkipReason::Unavailable(reason) => f.write_str(reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewardState {
    Scheduled,
    Due,
    Submitted,
    Skipped(SkipReason),
    Confirmed,
    Failed(String),
}

impl RewardState {
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RewardState::Skipped(_) | RewardState::Confirmed | RewardState::Failed(_)
        )
    }
}

#[derive(Debug, Default)]
pub struct RewardLedger {
    next_id: RewardId,
    tasks: BTreeMap<RewardId, RewardState>,
}

impl RewardLedger {
    pub fn schedule(&mut self) -> RewardId {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.insert(id, RewardState::Scheduled);
        id
    }

    pub fn state(&self, id: RewardId) -> Option<&RewardState> {
        self.tasks.get(&id)
    }

    /// `Scheduled -> Due`; false for unknown or already-advanced rewards.
    pub fn mark_due(&mut self, id: RewardId) -> bool {
        self.advance(id, RewardState::Scheduled, RewardState::Due)
    }

    pub fn mark_submitted(&mut self, id: RewardId) -> bool {
        self.advance(id, RewardState::Due, RewardState::Submitted)
    }

    pub fn mark_skipped(&mut self, id: RewardId, reason: SkipReason) -> bool {
        let moved = self.advance(id, RewardState::Due, RewardState::Skipped(reason));
        self.prune();
        moved
    }

    pub fn settle(&mut self, id: RewardId, result: Result<(), String>) -> bool {
        let next = match result {
            Ok(()) => RewardState::Confirmed,
            Err(message) => RewardState::Failed(message),
        };
        let moved = self.advance(id, RewardState::Submitted, next);
        self.prune();
        moved
    }

    /// Rewards not yet settled.
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|s| !s.is_settled()).count()
    }

    pub fn confirmed(&self) -> usize {
        self.tasks
            .values()
            .filter(|s| **s == RewardState::Confirmed)
            .count()
    }

    fn advance(&mut self, id: RewardId, from: RewardState, to: RewardState) -> bool {
        match self.tasks.get_mut(&id) {
            Some(state) if *state == from => {
                *state = to;
                true
            }
            _ => false,
        }
    }

    fn prune(&mut self) {
        let settled: Vec<RewardId> = self
            .tasks
            .iter()
            .filter(|(_, s)| s.is_settled())
            .map(|(id, _)| *id)
            .collect();
        if settled.len() > SETTLED_HISTORY {
            let drop = settled.len() - SETTLED_HISTORY;
            for id in &settled[..drop] {
                self.tasks.remove(id);
            }
        }
    }
}

/// Detached timer; the receiver may already be gone when it fires.
pub fn spawn_reward(
    id: RewardId,
    delay: Duration,
    tx: mpsc::UnboundedSender<RewardDue>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(RewardDue(id)).is_err() {
            tracing::debug!(id, "reward receiver closed");
        }
    })
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger__walks_the_happy_path() {
        let mut ledger = RewardLedger::default();
        let id = ledger.schedule();

        assert!(ledger.mark_due(id));
        assert!(ledger.mark_submitted(id));
        assert!(ledger.settle(id, Ok(())));

        assert_eq!(ledger.state(id), Some(&RewardState::Confirmed));
        assert_eq!(ledger.pending(), 0);
        assert_eq!(ledger.confirmed(), 1);
    }

    #[test]
    fn ledger__rejects_out_of_order_transitions() {
        let mut ledger = RewardLedger::default();
        let id = ledger.schedule();

        assert!(!ledger.mark_submitted(id));
        assert!(!ledger.settle(id, Ok(())));
        assert!(ledger.mark_due(id));
        assert!(!ledger.mark_due(id));
        assert!(!ledger.mark_due(999));
    }

    #[test]
    fn ledger__skipped_rewards_are_settled() {
        let mut ledger = RewardLedger::default();
        let id = ledger.schedule();
        ledger.mark_due(id);

        ledger.mark_skipped(id, SkipReason::Coalesced);

        assert_eq!(
            ledger.state(id),
            Some(&RewardState::Skipped(SkipReason::Coalesced))
        );
        assert!(!ledger.mark_submitted(id));
        assert_eq!(ledger.pending(), 0);
    }

    #[test]
    fn ledger__failures_keep_message() {
        let mut ledger = RewardLedger::default();
        let id = ledger.schedule();
        ledger.mark_due(id);
        ledger.mark_submitted(id);

        ledger.settle(id, Err("cooldown".to_string()));

        assert_eq!(
            ledger.state(id),
            Some(&RewardState::Failed("cooldown".to_string()))
        );
    }

    #[test]
    fn ledger__prunes_oldest_settled_entries() {
        // given
        let mut ledger = RewardLedger::default();
        let pending = ledger.schedule();
        let mut ids = Vec::new();
        for _ in 0..SETTLED_HISTORY + 5 {
            let id = ledger.schedule();
            ledger.mark_due(id);
            ledger.mark_skipped(id, SkipReason::Coalesced);
            ids.push(id);
        }

        // then
        assert!(ledger.state(ids[0]).is_none());
        assert!(ledger.state(*ids.last().unwrap()).is_some());
        assert_eq!(ledger.state(pending), Some(&RewardState::Scheduled));
        assert_eq!(ledger.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_reward__posts_due_after_delay() {
        // given
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();

        // when
        spawn_reward(4, Duration::from_millis(1000), tx);
        let due = rx.recv().await;

        // then
        assert_eq!(due, Some(RewardDue(4)));
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_reward__survives_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let handle = spawn_reward(1, Duration::from_millis(10), tx);

        assert!(handle.await.is_ok());
    }
}
