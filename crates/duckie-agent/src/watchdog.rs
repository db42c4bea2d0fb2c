// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user inactivity reminders.
//!
//! Each user has at most one pending timer. A timer is a spawned task racing
//! a sleep against its [`CancellationToken`]; on firing it asks the
//! navigation probe where the user is and only reminds users who are
//! passively browsing topics or a lecture. At most one reminder per user is
//! left in the chat: the previous one is deleted before a new one is sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use duckie_core::{ContentButton, MessageId, NavigationProbe, ReminderPrompt, ReminderSink, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delay and reminder content.
#[derive(Debug, Clone)]
pub struct WatchdogSettings {
    pub delay: Duration,
    pub prompt: ReminderPrompt,
}

impl WatchdogSettings {
    pub fn from_config(config: &duckie_config::model::WatchdogConfig) -> Self {
        Self {
            delay: Duration::from_secs(config.delay_secs),
            prompt: ReminderPrompt {
                text: config.reminder_text.clone(),
                yes: ContentButton::new(&config.yes_label, &config.yes_callback),
                no: ContentButton::new(&config.no_label, &config.no_callback),
            },
        }
    }
}

struct TimerEntry {
    generation: u64,
    token: CancellationToken,
}

struct WatchdogInner {
    settings: WatchdogSettings,
    sink: Arc<dyn ReminderSink>,
    timers: DashMap<UserId, TimerEntry>,
    reminders: DashMap<UserId, MessageId>,
    generations: AtomicU64,
}

/// Cancellable delayed-reminder scheduler. Clones share state.
#[derive(Clone)]
pub struct ActivityWatchdog {
    inner: Arc<WatchdogInner>,
}

impl ActivityWatchdog {
    pub fn new(settings: WatchdogSettings, sink: Arc<dyn ReminderSink>) -> Self {
        Self {
            inner: Arc::new(WatchdogInner {
                settings,
                sink,
                timers: DashMap::new(),
                reminders: DashMap::new(),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// Replace any pending timer for `user` with a fresh one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, user: UserId, probe: Arc<dyn NavigationProbe>) {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        if let Some(previous) = self.inner.timers.insert(
            user,
            TimerEntry {
                generation,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
        }
        debug!(user = %user, generation, "activity timer started");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(user = %user, generation, "activity timer cancelled");
                    return;
                }
                _ = tokio::time::sleep(inner.settings.delay) => {}
            }

            inner.fire(user, probe.as_ref(), &token).await;
            inner
                .timers
                .remove_if(&user, |_, entry| entry.generation == generation);
        });
    }

    /// Cancel the pending timer for `user`, if any.
    pub fn cancel(&self, user: UserId) {
        if let Some((_, entry)) = self.inner.timers.remove(&user) {
            entry.token.cancel();
            debug!(user = %user, "activity timer cancelled");
        }
    }

    /// Cancel the timer and forget the last reminder sent to `user`.
    pub fn reset(&self, user: UserId) {
        self.cancel(user);
        self.inner.reminders.remove(&user);
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&self) {
        let users: Vec<UserId> = self.inner.timers.iter().map(|e| *e.key()).collect();
        for user in users {
            self.cancel(user);
        }
    }

    pub fn is_pending(&self, user: UserId) -> bool {
        self.inner.timers.contains_key(&user)
    }

    pub fn last_reminder(&self, user: UserId) -> Option<MessageId> {
        self.inner.reminders.get(&user).map(|id| *id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.timers.len()
    }
}

impl WatchdogInner {
    async fn fire(&self, user: UserId, probe: &dyn NavigationProbe, token: &CancellationToken) {
        let state = probe.current_state(user).await;
        if !state.is_some_and(|s| s.is_passive()) {
            debug!(user = %user, state = ?state, "user not browsing, reminder skipped");
            return;
        }
        if token.is_cancelled() {
            return;
        }

        if let Some((_, previous)) = self.reminders.remove(&user)
            && let Err(e) = self.sink.delete_message(user, previous).await
        {
            warn!(user = %user, message = %previous, error = %e, "failed to delete previous reminder");
        }

        match self.sink.send_reminder(user, &self.settings.prompt).await {
            Ok(message) => {
                self.reminders.insert(user, message);
                info!(user = %user, message = %message, "inactivity reminder sent");
            }
            Err(e) => warn!(user = %user, error = %e, "failed to send inactivity reminder"),
        }
    }
}
