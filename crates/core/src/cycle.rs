//! Timed reward display shown after a round settles.
//!
//! The cycle is a cooperative task driven by [`PresentationCycle::advance`]. It
//! only suspends at its three documented boundaries (the wait before the total,
//! the wait before cycling, and each cycle interval) and re-checks its
//! [`CancelToken`] every time one of those waits completes, before touching the
//! display.

use crate::{format_money, CycleTiming, EventBus, HitEntry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TOTAL_MESSAGE: &str = "Total Reward!";

const MIN_CYCLE_SPEED: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    WaitBeforeTotal,
    WaitBeforeCycle,
    Cycling { next: usize },
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PresentationCycle {
    timing: CycleTiming,
    total_reward: f64,
    hits: Vec<HitEntry>,
    entries: Vec<HitEntry>,
    stage: Stage,
    waited: Duration,
    token: CancelToken,
}

impl PresentationCycle {
    pub fn start(timing: CycleTiming, total_reward: f64, hits: Vec<HitEntry>) -> Self {
        Self {
            timing,
            total_reward,
            hits,
            entries: Vec::new(),
            stage: Stage::WaitBeforeTotal,
            waited: Duration::ZERO,
            token: CancelToken::default(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn stop(&mut self) {
        self.token.cancel();
        self.stage = Stage::Stopped;
    }

    pub fn status(&self) -> CycleStatus {
        if self.stage == Stage::Stopped || self.token.is_cancelled() {
            CycleStatus::Stopped
        } else {
            CycleStatus::Running
        }
    }

    /// Display sequence once cycling has begun: hit entries then the total.
    pub fn entries(&self) -> &[HitEntry] {
        &self.entries
    }

    /// Let `elapsed` pass, writing every display change that falls due to `events`.
    pub fn advance(&mut self, elapsed: Duration, events: &mut EventBus) -> CycleStatus {
        let mut budget = elapsed;
        loop {
            if self.token.is_cancelled() {
                self.stage = Stage::Stopped;
            }
            let wait = match self.stage {
                Stage::Stopped => return CycleStatus::Stopped,
                Stage::WaitBeforeTotal => self.timing.delay_before_total(),
                Stage::WaitBeforeCycle => self.timing.delay_after_total(),
                Stage::Cycling { .. } => self.timing.cycle_speed().max(MIN_CYCLE_SPEED),
            };
            let due = wait.saturating_sub(self.waited);
            if budget < due {
                self.waited += budget;
                return CycleStatus::Running;
            }
            budget -= due;
            self.waited = Duration::ZERO;

            // resumed from a wait: nothing is written once cancelled
            if self.token.is_cancelled() {
                self.stage = Stage::Stopped;
                return CycleStatus::Stopped;
            }
            self.stage = match self.stage {
                Stage::WaitBeforeTotal => {
                    events.reward_text(TOTAL_MESSAGE, total_amount(self.total_reward));
                    Stage::WaitBeforeCycle
                }
                Stage::WaitBeforeCycle => {
                    self.entries = self.hits.clone();
                    self.entries.push(HitEntry {
                        message: TOTAL_MESSAGE.to_string(),
                        amount: total_amount(self.total_reward),
                    });
                    self.show(0, events)
                }
                Stage::Cycling { next } => self.show(next, events),
                Stage::Stopped => Stage::Stopped,
            };
        }
    }

    fn show(&self, index: usize, events: &mut EventBus) -> Stage {
        let entry = &self.entries[index];
        events.reward_text(entry.message.clone(), entry.amount.clone());
        Stage::Cycling {
            next: (index + 1) % self.entries.len(),
        }
    }
}

pub fn total_amount(total: f64) -> String {
    format!("$ {}", format_money(total))
}
