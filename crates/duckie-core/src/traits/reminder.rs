// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound surface used by the activity watchdog.

use async_trait::async_trait;

use crate::error::DuckieError;
use crate::types::{MessageId, ReminderPrompt, UserId};

/// The place reminders are rendered.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    /// Sends a yes/no reminder to the user's private chat.
    async fn send_reminder(
        &self,
        user: UserId,
        prompt: &ReminderPrompt,
    ) -> Result<MessageId, DuckieError>;

    /// Deletes a previously sent message.
    async fn delete_message(&self, user: UserId, message: MessageId) -> Result<(), DuckieError>;
}
