// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messenger-side collaborators: reminder delivery, navigation state
//! and content lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use duckie_core::{
    Content, ContentResolver, DuckieError, MessageId, NavigationProbe, NavigationState,
    ReminderPrompt, ReminderSink, UserId,
};

/// A reminder captured by [`RecordingReminderSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReminder {
    pub user: UserId,
    pub prompt: ReminderPrompt,
    pub message: MessageId,
}

/// Records reminders instead of sending them.
///
/// Message ids are assigned sequentially starting at 1.
#[derive(Debug, Clone, Default)]
pub struct RecordingReminderSink {
    sent: Arc<Mutex<Vec<SentReminder>>>,
    deleted: Arc<Mutex<Vec<(UserId, MessageId)>>>,
    next_id: Arc<AtomicI64>,
    fail_deletes: Arc<AtomicBool>,
}

impl RecordingReminderSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `delete_message` call fail, as when the user already deleted it.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentReminder> {
        self.sent.lock().await.clone()
    }

    pub async fn deleted(&self) -> Vec<(UserId, MessageId)> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl ReminderSink for RecordingReminderSink {
    async fn send_reminder(
        &self,
        user: UserId,
        prompt: &ReminderPrompt,
    ) -> Result<MessageId, DuckieError> {
        let message = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.sent.lock().await.push(SentReminder {
            user,
            prompt: prompt.clone(),
            message,
        });
        Ok(message)
    }

    async fn delete_message(&self, user: UserId, message: MessageId) -> Result<(), DuckieError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DuckieError::Channel {
                message: format!("message {message} not found"),
                source: None,
            });
        }
        self.deleted.lock().await.push((user, message));
        Ok(())
    }
}

/// Navigation state controlled directly by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNavigationProbe {
    states: Arc<Mutex<HashMap<UserId, NavigationState>>>,
}

impl ScriptedNavigationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, user: UserId, state: NavigationState) {
        self.states.lock().await.insert(user, state);
    }

    pub async fn clear(&self, user: UserId) {
        self.states.lock().await.remove(&user);
    }
}

#[async_trait]
impl NavigationProbe for ScriptedNavigationProbe {
    async fn current_state(&self, user: UserId) -> Option<NavigationState> {
        self.states.lock().await.get(&user).copied()
    }
}

/// In-memory content tree keyed by topic identifier.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    topics: HashMap<String, Content>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: &str, content: Content) -> Self {
        self.topics.insert(topic.to_string(), content);
        self
    }
}

#[async_trait]
impl ContentResolver for StaticContent {
    async fn resolve(&self, topic: &str) -> Result<Content, DuckieError> {
        self.topics
            .get(topic)
            .cloned()
            .ok_or_else(|| DuckieError::Internal(format!("unknown topic: {topic}")))
    }
}

#[cfg(test)]
mod tests {
    use duckie_core::ContentButton;

    use super::*;

    fn prompt() -> ReminderPrompt {
        ReminderPrompt {
            text: "still there?".into(),
            yes: ContentButton::new("yes", "still_learning"),
            no: ContentButton::new("no", "return_to_menu"),
        }
    }

    #[tokio::test]
    async fn reminder_ids_are_sequential() {
        let sink = RecordingReminderSink::new();
        let first = sink.send_reminder(UserId(1), &prompt()).await.unwrap();
        let second = sink.send_reminder(UserId(2), &prompt()).await.unwrap();
        assert_eq!(first, MessageId(1));
        assert_eq!(second, MessageId(2));
        assert_eq!(sink.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn failing_deletes_are_not_recorded() {
        let sink = RecordingReminderSink::new();
        sink.fail_deletes(true);
        assert!(sink.delete_message(UserId(1), MessageId(5)).await.is_err());
        assert!(sink.deleted().await.is_empty());
    }

    #[tokio::test]
    async fn probe_returns_set_state() {
        let probe = ScriptedNavigationProbe::new();
        assert_eq!(probe.current_state(UserId(1)).await, None);
        probe.set(UserId(1), NavigationState::Lecture).await;
        assert_eq!(
            probe.current_state(UserId(1)).await,
            Some(NavigationState::Lecture)
        );
    }

    #[tokio::test]
    async fn unknown_topic_is_an_error() {
        let content = StaticContent::new().with_topic("start", Content::text("menu"));
        assert_eq!(content.resolve("start").await.unwrap().text, "menu");
        assert!(content.resolve("missing").await.is_err());
    }
}
