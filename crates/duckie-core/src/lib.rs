// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Duckie tutor bot.
//!
//! This crate provides the error type, identifier newtypes, and the narrow
//! adapter traits through which the interactive-session engine talks to the
//! rest of the bot: the language model, the navigation state store, the
//! content tree, and the place reminders are rendered.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DuckieError;
pub use types::{
    ChatId, ChatMessage, ChatRole, Content, ContentButton, MessageId, NavigationState,
    ReminderPrompt, RequestId, SamplingParams, UserId,
};

pub use traits::{ContentResolver, LanguageModel, ModelLoader, NavigationProbe, ReminderSink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duckie_error_has_all_variants() {
        let _model = DuckieError::Model {
            message: "test".into(),
            source: None,
        };
        let _worker = DuckieError::Worker("test".into());
        let _channel = DuckieError::Channel {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _journal = DuckieError::Journal {
            source: std::io::Error::other("test"),
        };
        let _internal = DuckieError::Internal("test".into());
    }

    #[test]
    fn error_messages_are_prefixed_by_category() {
        let err = DuckieError::Model {
            message: "weights missing".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "model error: weights missing");

        let err = DuckieError::Worker("inference worker is stopping".into());
        assert_eq!(err.to_string(), "worker error: inference worker is stopping");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_model<T: LanguageModel>() {}
        fn _assert_loader<T: ModelLoader>() {}
        fn _assert_sink<T: ReminderSink>() {}
        fn _assert_probe<T: NavigationProbe>() {}
        fn _assert_resolver<T: ContentResolver>() {}
    }
}
