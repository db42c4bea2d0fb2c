// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Duckie tutor bot.

use thiserror::Error;

/// The primary error type used across the Duckie adapter traits and core operations.
///
/// None of these ever reach a user directly: the inference gateway and the
/// interactive pipeline turn them into configured, user-displayable text.
#[derive(Debug, Error)]
pub enum DuckieError {
    /// Language model errors (load failure, generation failure, backend unreachable).
    #[error("model error: {message}")]
    Model {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Inference worker lifecycle errors (spawn failure, dead worker, closed channel).
    #[error("worker error: {0}")]
    Worker(String),

    /// Messaging channel errors (send or delete failed).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Interaction journal write errors.
    #[error("journal error: {source}")]
    Journal { source: std::io::Error },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DuckieError {
    /// Shorthand for a model error without an underlying source.
    pub fn model(message: impl Into<String>) -> Self {
        DuckieError::Model {
            message: message.into(),
            source: None,
        }
    }
}
