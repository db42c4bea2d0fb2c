// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Duckie engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Messenger user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Messenger chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Identifier of a message the bot has sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Correlation token tying one inference request to its response slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a single entry in a structured chat request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of a structured chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters handed to the language model for every generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Upper bound on newly generated tokens.
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    pub repetition_penalty: f32,
    /// Sampling is always enabled for tutor answers.
    pub do_sample: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 150,
            temperature: 0.7,
            top_p: 0.95,
            repetition_penalty: 1.2,
            do_sample: true,
        }
    }
}

/// Where a user currently is in the menu tree.
///
/// Supplied by the navigation state store; the activity watchdog only acts
/// on the two passive browsing states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum NavigationState {
    /// Top-level menu.
    Menu,
    /// Choosing a subject or subtopic.
    Topics,
    /// Scrolling through lecture content.
    Lecture,
    /// Talking to the tutor in interactive mode.
    Chatting,
}

impl NavigationState {
    /// True for the states in which a user is passively browsing content.
    pub fn is_passive(self) -> bool {
        matches!(self, NavigationState::Topics | NavigationState::Lecture)
    }
}

/// A navigation button: visible label plus the identifier it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentButton {
    pub label: String,
    pub target: String,
}

impl ContentButton {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// A resolved node of the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    /// Buttons in display order.
    pub buttons: Vec<ContentButton>,
    pub image_path: Option<PathBuf>,
    pub video_path: Option<PathBuf>,
}

impl Content {
    /// Plain text content without buttons or media.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            image_path: None,
            video_path: None,
        }
    }
}

/// The yes/no inactivity reminder sent by the activity watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPrompt {
    pub text: String,
    /// "Still here" answer.
    pub yes: ContentButton,
    /// "Take me back" answer.
    pub no: ContentButton,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn chat_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("rules")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"rules"}"#);
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
        assert_eq!(ChatRole::from_str("user").unwrap(), ChatRole::User);
    }

    #[test]
    fn only_topics_and_lecture_are_passive() {
        assert!(NavigationState::Topics.is_passive());
        assert!(NavigationState::Lecture.is_passive());
        assert!(!NavigationState::Menu.is_passive());
        assert!(!NavigationState::Chatting.is_passive());
    }

    #[test]
    fn navigation_state_parses_snake_case() {
        assert_eq!(
            NavigationState::from_str("lecture").unwrap(),
            NavigationState::Lecture
        );
        assert_eq!(NavigationState::Chatting.to_string(), "chatting");
    }

    #[test]
    fn sampling_defaults_enable_sampling() {
        let params = SamplingParams::default();
        assert!(params.do_sample);
        assert_eq!(params.max_new_tokens, 150);
    }

    #[test]
    fn ids_display_as_numbers() {
        assert_eq!(UserId(42).to_string(), "42");
        assert_eq!(ChatId(-100).to_string(), "-100");
        assert_eq!(RequestId("abc".into()).to_string(), "abc");
    }
}
