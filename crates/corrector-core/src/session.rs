use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{CorrectionMode, UserId, DEFAULT_TONE};

/// Per-user preferences and correction history.
///
/// Lives for the process lifetime; there is no eviction and no persistence.
#[derive(Clone, Debug)]
pub struct Session {
    pub desired_tone: String,
    pub mode: CorrectionMode,
    pub awaiting_custom_tone: bool,
    pub last_original: Option<String>,
    pub last_corrected: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            desired_tone: DEFAULT_TONE.to_string(),
            mode: CorrectionMode::default(),
            awaiting_custom_tone: false,
            last_original: None,
            last_corrected: None,
        }
    }
}

/// In-memory session store, keyed by user.
///
/// Sessions are created lazily on first access. Every operation runs inside
/// one critical section, so concurrent handlers for the same user can never
/// observe a torn update (e.g. one task's original paired with another
/// task's correction).
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with<R>(&self, user_id: UserId, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut map = self.inner.lock().await;
        f(map.entry(user_id).or_default())
    }

    /// Current state of the user's session (created with defaults if absent).
    pub async fn snapshot(&self, user_id: UserId) -> Session {
        self.with(user_id, |s| s.clone()).await
    }

    pub async fn set_tone(&self, user_id: UserId, tone: impl Into<String>) {
        let tone = tone.into();
        self.with(user_id, move |s| s.desired_tone = tone).await
    }

    pub async fn set_mode(&self, user_id: UserId, mode: CorrectionMode) {
        self.with(user_id, |s| s.mode = mode).await
    }

    pub async fn set_awaiting_custom_tone(&self, user_id: UserId, awaiting: bool) {
        self.with(user_id, |s| s.awaiting_custom_tone = awaiting)
            .await
    }

    /// Atomically read-and-clear the awaiting flag, so a rapid double-submit
    /// consumes it exactly once.
    pub async fn take_awaiting_custom_tone(&self, user_id: UserId) -> bool {
        self.with(user_id, |s| std::mem::take(&mut s.awaiting_custom_tone))
            .await
    }

    /// Record a completed correction; both history fields are set together.
    pub async fn record_correction(&self, user_id: UserId, original: String, corrected: String) {
        self.with(user_id, move |s| {
            s.last_original = Some(original);
            s.last_corrected = Some(corrected);
        })
        .await
    }

    pub async fn last_original(&self, user_id: UserId) -> Option<String> {
        self.with(user_id, |s| s.last_original.clone()).await
    }
}
