//! Timed effect bookkeeping.
//!
//! A timed effect goes through `Idle -> Active -> Expired` exactly once.
//! [`TimedEffects`] keeps the active ones and hands back those whose deadline
//! has passed; the pack then runs their stop action.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::EffectRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedState {
    Idle,
    Active { started: Instant, deadline: Instant },
    Expired,
}

#[derive(Debug, Clone)]
pub struct TimedEffect {
    pub request: EffectRequest,
    pub duration: Duration,
    state: TimedState,
}

impl TimedEffect {
    pub fn new(request: EffectRequest, duration: Duration) -> Self {
        Self {
            request,
            duration,
            state: TimedState::Idle,
        }
    }

    pub fn state(&self) -> TimedState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TimedState::Active { .. })
    }

    /// `Idle -> Active`. Returns `false` from any other state.
    pub fn activate(&mut self, now: Instant) -> bool {
        if self.state != TimedState::Idle {
            return false;
        }
        self.state = TimedState::Active {
            started: now,
            deadline: now + self.duration,
        };
        true
    }

    /// `Active -> Expired` once the deadline has passed.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        match self.state {
            TimedState::Active { deadline, .. } if now >= deadline => {
                self.state = TimedState::Expired;
                true
            }
            _ => false,
        }
    }

    /// `Active -> Expired` regardless of the deadline.
    pub fn force_expire(&mut self) -> bool {
        if self.is_active() {
            self.state = TimedState::Expired;
            true
        } else {
            false
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimedState::Active { deadline, .. } => Some(deadline.saturating_duration_since(now)),
            _ => None,
        }
    }
}

/// Active timed effects, shared between request handling and the host tick.
#[derive(Debug, Default)]
pub struct TimedEffects {
    active: Mutex<Vec<TimedEffect>>,
}

impl TimedEffects {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TimedEffect>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Track an effect that has been activated.
    pub fn insert(&self, effect: TimedEffect) {
        debug_assert!(effect.is_active());
        self.lock().push(effect);
    }

    /// Activate and track `effect` unless one with the same base code is
    /// still active. The check and the insert happen under one lock.
    ///
    /// Returns the new effect's remaining time, or the time left on the
    /// effect already running.
    pub fn try_start(&self, mut effect: TimedEffect, now: Instant) -> Result<Duration, Duration> {
        let mut active = self.lock();
        if let Some(left) = find_remaining(&active, effect.request.base_code(), now) {
            return Err(left);
        }
        effect.activate(now);
        let remaining = effect.remaining(now).unwrap_or(effect.duration);
        active.push(effect);
        Ok(remaining)
    }

    /// Forget an effect without expiring it, e.g. when its start failed.
    pub fn remove(&self, id: u64) -> Option<TimedEffect> {
        let mut active = self.lock();
        let index = active.iter().position(|e| e.request.id == id)?;
        Some(active.remove(index))
    }

    /// Time left on the active effect with this base code, if any.
    pub fn remaining_for(&self, base_code: &str, now: Instant) -> Option<Duration> {
        find_remaining(&self.lock(), base_code, now)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every effect whose deadline has passed.
    pub fn take_expired(&self, now: Instant) -> Vec<TimedEffect> {
        let mut active = self.lock();
        let mut expired = Vec::new();
        let mut i = 0;
        while i < active.len() {
            if active[i].expire_if_due(now) {
                expired.push(active.remove(i));
            } else {
                i += 1;
            }
        }
        expired
    }

    /// Expire and return everything, for shutdown.
    pub fn drain(&self) -> Vec<TimedEffect> {
        let mut active = self.lock();
        active
            .drain(..)
            .map(|mut e| {
                e.force_expire();
                e
            })
            .collect()
    }
}

fn find_remaining(active: &[TimedEffect], base_code: &str, now: Instant) -> Option<Duration> {
    active
        .iter()
        .find(|e| e.request.base_code() == base_code)
        .and_then(|e| e.remaining(now))
}
