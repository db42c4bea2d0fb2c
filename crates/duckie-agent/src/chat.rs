// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interactive chat pipeline: slot check, inference round trip and
//! answer cleanup, plus entering and leaving the mode.

use std::sync::Arc;

use duckie_core::{ChatId, Content, ContentResolver, UserId};
use duckie_inference::InferenceGateway;
use duckie_prompt::PromptCodec;
use tracing::{debug, info, warn};

use crate::arbiter::SessionArbiter;
use crate::watchdog::ActivityWatchdog;

/// What the messenger adapter should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Interactive mode entered; `exit_label` names the leave button.
    Entered { text: String, exit_label: String },
    /// Another user holds the slot.
    Busy(String),
    /// A message arrived from a user who does not hold the slot.
    NotHolder(String),
    /// The tutor's cleaned answer.
    Answer(String),
    /// Interactive mode left; the start menu to display.
    Exited(Content),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Entered { text, .. } => text,
            Reply::Busy(text) | Reply::NotHolder(text) | Reply::Answer(text) => text,
            Reply::Exited(content) => &content.text,
        }
    }
}

/// User-facing notices of the pipeline.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub busy_message: String,
    pub enter_message: String,
    pub exit_label: String,
    pub not_holder_message: String,
    pub exit_message: String,
    pub start_topic: String,
}

impl ChatSettings {
    pub fn from_config(config: &duckie_config::model::InteractiveConfig) -> Self {
        Self {
            busy_message: config.busy_message.clone(),
            enter_message: config.enter_message.clone(),
            exit_label: config.exit_label.clone(),
            not_holder_message: config.not_holder_message.clone(),
            exit_message: config.exit_message.clone(),
            start_topic: config.start_topic.clone(),
        }
    }
}

/// Ties the session slot, the inference gateway and the activity watchdog
/// together for one bot process.
pub struct InteractiveChat {
    arbiter: Arc<SessionArbiter>,
    gateway: Arc<InferenceGateway>,
    watchdog: ActivityWatchdog,
    content: Arc<dyn ContentResolver>,
    codec: PromptCodec,
    settings: ChatSettings,
}

impl InteractiveChat {
    pub fn new(
        arbiter: Arc<SessionArbiter>,
        gateway: Arc<InferenceGateway>,
        watchdog: ActivityWatchdog,
        content: Arc<dyn ContentResolver>,
        codec: PromptCodec,
        settings: ChatSettings,
    ) -> Self {
        Self {
            arbiter,
            gateway,
            watchdog,
            content,
            codec,
            settings,
        }
    }

    /// Try to enter interactive mode. A refusal is always answered.
    pub async fn enter(&self, user: UserId, chat: ChatId) -> Reply {
        self.watchdog.reset(user);

        if !self.arbiter.try_acquire(user, chat).await {
            info!(user = %user, "interactive mode busy, entry refused");
            return Reply::Busy(self.settings.busy_message.clone());
        }

        Reply::Entered {
            text: self.settings.enter_message.clone(),
            exit_label: self.settings.exit_label.clone(),
        }
    }

    /// Answer a message typed in interactive mode.
    ///
    /// Messages of the holder are answered one at a time in arrival order.
    pub async fn handle_message(&self, user: UserId, text: &str) -> Reply {
        let Some(lock) = self.arbiter.holder_lock(user).await else {
            debug!(user = %user, "message from non-holder");
            return Reply::NotHolder(self.settings.not_holder_message.clone());
        };
        let _turn = lock.lock().await;

        let answer = self.gateway.generate(text).await;
        let mode = self.gateway.settings().worker.mode;
        Reply::Answer(
            self.codec
                .postprocess(&answer, Some(mode.system_instruction())),
        )
    }

    /// Leave interactive mode and return the start menu.
    pub async fn exit(&self, user: UserId) -> Reply {
        if !self.arbiter.release(user).await {
            debug!(user = %user, "exit without holding the slot");
        }
        self.watchdog.reset(user);

        match self.content.resolve(&self.settings.start_topic).await {
            Ok(content) => Reply::Exited(content),
            Err(e) => {
                warn!(topic = %self.settings.start_topic, error = %e, "failed to resolve start menu");
                Reply::Exited(Content::text(&self.settings.exit_message))
            }
        }
    }

    pub fn arbiter(&self) -> &SessionArbiter {
        &self.arbiter
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    pub fn watchdog(&self) -> &ActivityWatchdog {
        &self.watchdog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_covers_every_variant() {
        let entered = Reply::Entered {
            text: "hello".into(),
            exit_label: "leave".into(),
        };
        assert_eq!(entered.text(), "hello");
        assert_eq!(Reply::Busy("busy".into()).text(), "busy");
        assert_eq!(Reply::Answer("4".into()).text(), "4");
        assert_eq!(Reply::Exited(Content::text("menu")).text(), "menu");
    }

    #[test]
    fn settings_copy_config_notices() {
        let config = duckie_config::model::InteractiveConfig {
            start_topic: "main".into(),
            ..Default::default()
        };
        let settings = ChatSettings::from_config(&config);
        assert_eq!(settings.start_topic, "main");
        assert_eq!(settings.busy_message, config.busy_message);
    }
}
