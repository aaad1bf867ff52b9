use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use crate::domain::UserId;

/// Per-user sliding-window admission counter.
///
/// Best-effort abuse protection: nothing is persisted across restarts.
/// Denied calls are not recorded, so a flooding user recovers as soon as the
/// admitted calls age out of the window.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    enabled: bool,
    max_calls: u32,
    window: Duration,
    windows: HashMap<UserId, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(enabled: bool, max_calls: u32, window: Duration) -> Self {
        Self {
            enabled,
            max_calls,
            window,
            windows: HashMap::new(),
        }
    }

    pub fn admit(&mut self, user_id: UserId) -> bool {
        self.admit_at(user_id, Instant::now())
    }

    pub fn admit_at(&mut self, user_id: UserId, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let calls = self.windows.entry(user_id).or_default();
        while let Some(first) = calls.front() {
            if now.duration_since(*first) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }

        if calls.len() >= self.max_calls as usize {
            return false;
        }

        calls.push_back(now);
        true
    }
}
