// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-slot gate for the interactive chat mode.
//!
//! At most one user holds the slot process-wide. Acquisition and release are
//! linearized through one async mutex; the holder is also published to an
//! [`ArcSwapOption`] so it can be read without waiting on that mutex.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use duckie_core::{ChatId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Identity of the current slot holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHolder {
    pub user: UserId,
    pub chat: ChatId,
}

struct Session {
    holder: SessionHolder,
    /// Serializes the holder's own messages.
    lock: Arc<Mutex<()>>,
}

/// The single interactive-session slot.
pub struct SessionArbiter {
    session: Mutex<Option<Session>>,
    snapshot: ArcSwapOption<SessionHolder>,
}

impl Default for SessionArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionArbiter {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Take the slot for `user`. Re-entry by the current holder succeeds and
    /// leaves the session unchanged; any other user is refused while it is held.
    pub async fn try_acquire(&self, user: UserId, chat: ChatId) -> bool {
        let mut session = self.session.lock().await;
        match session.as_ref() {
            None => {
                let holder = SessionHolder { user, chat };
                *session = Some(Session {
                    holder,
                    lock: Arc::new(Mutex::new(())),
                });
                self.snapshot.store(Some(Arc::new(holder)));
                info!(user = %user, chat = %chat, "interactive session acquired");
                true
            }
            Some(current) if current.holder.user == user => {
                debug!(user = %user, "holder re-entered interactive session");
                true
            }
            Some(current) => {
                debug!(
                    user = %user,
                    holder = %current.holder.user,
                    "interactive session busy"
                );
                false
            }
        }
    }

    /// Free the slot if `user` holds it. Returns whether anything changed.
    pub async fn release(&self, user: UserId) -> bool {
        let mut session = self.session.lock().await;
        match session.as_ref() {
            Some(current) if current.holder.user == user => {
                *session = None;
                self.snapshot.store(None);
                info!(user = %user, "interactive session released");
                true
            }
            _ => false,
        }
    }

    /// Last published holder. May be momentarily stale.
    pub fn current_holder(&self) -> Option<(UserId, ChatId)> {
        self.snapshot
            .load_full()
            .map(|holder| (holder.user, holder.chat))
    }

    /// The per-session message lock, if `user` holds the slot.
    pub async fn holder_lock(&self, user: UserId) -> Option<Arc<Mutex<()>>> {
        let session = self.session.lock().await;
        session
            .as_ref()
            .filter(|s| s.holder.user == user)
            .map(|s| Arc::clone(&s.lock))
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);
    const CHAT_A: ChatId = ChatId(10);
    const CHAT_B: ChatId = ChatId(20);

    #[tokio::test]
    async fn acquire_release_scenario() {
        let arbiter = SessionArbiter::new();

        assert!(arbiter.try_acquire(ALICE, CHAT_A).await);
        assert!(!arbiter.try_acquire(BOB, CHAT_B).await);
        assert_eq!(arbiter.current_holder(), Some((ALICE, CHAT_A)));
        assert!(arbiter.try_acquire(ALICE, CHAT_A).await);
        assert!(!arbiter.release(BOB).await);
        assert!(arbiter.release(ALICE).await);
        assert_eq!(arbiter.current_holder(), None);
    }

    #[tokio::test]
    async fn reentry_keeps_original_chat() {
        let arbiter = SessionArbiter::new();
        assert!(arbiter.try_acquire(ALICE, CHAT_A).await);
        assert!(arbiter.try_acquire(ALICE, CHAT_B).await);
        assert_eq!(arbiter.current_holder(), Some((ALICE, CHAT_A)));
    }

    #[tokio::test]
    #[traced_test]
    async fn refusal_is_logged_with_holder() {
        let arbiter = SessionArbiter::new();
        arbiter.try_acquire(ALICE, CHAT_A).await;
        assert!(!arbiter.try_acquire(BOB, CHAT_B).await);
        assert!(logs_contain("interactive session busy"));
    }

    #[tokio::test]
    async fn release_when_free_is_a_no_op() {
        let arbiter = SessionArbiter::new();
        assert!(!arbiter.release(ALICE).await);
        assert_eq!(arbiter.current_holder(), None);
    }

    #[tokio::test]
    async fn slot_is_reusable_after_release() {
        let arbiter = SessionArbiter::new();
        assert!(arbiter.try_acquire(ALICE, CHAT_A).await);
        assert!(arbiter.release(ALICE).await);
        assert!(arbiter.try_acquire(BOB, CHAT_B).await);
        assert_eq!(arbiter.current_holder(), Some((BOB, CHAT_B)));
    }

    #[tokio::test]
    async fn holder_lock_only_for_holder() {
        let arbiter = SessionArbiter::new();
        assert!(arbiter.holder_lock(ALICE).await.is_none());
        arbiter.try_acquire(ALICE, CHAT_A).await;
        let first = arbiter.holder_lock(ALICE).await.unwrap();
        let second = arbiter.holder_lock(ALICE).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(arbiter.holder_lock(BOB).await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquisitions_admit_exactly_one() {
        let arbiter = Arc::new(SessionArbiter::new());
        let mut handles = Vec::new();
        for id in 0..32 {
            let arbiter = Arc::clone(&arbiter);
            handles.push(tokio::spawn(async move {
                arbiter.try_acquire(UserId(id), ChatId(id)).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert!(arbiter.current_holder().is_some());
    }
}
