// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language model traits used by the inference worker.

use crate::error::DuckieError;
use crate::types::{ChatMessage, SamplingParams};

/// A loaded language model.
///
/// Owned exclusively by the inference worker thread and called strictly
/// serially, so implementations may keep mutable state and block freely.
pub trait LanguageModel: Send {
    /// Model identifier used in logs.
    fn name(&self) -> &str;

    /// Generates a completion for a structured chat request.
    ///
    /// Returns only the newly generated text, never the echoed prompt.
    fn generate(
        &mut self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, DuckieError>;
}

/// Produces a [`LanguageModel`] on the worker thread.
///
/// Called once per worker start; a restarted worker loads again. A load
/// error puts the worker into degraded mode rather than stopping it.
pub trait ModelLoader: Send + Sync + 'static {
    fn load(&self) -> Result<Box<dyn LanguageModel>, DuckieError>;
}
