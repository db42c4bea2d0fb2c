// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction and response cleanup.

pub mod codec;
pub mod mode;

pub use codec::{CONTROL_TOKENS, MIN_ANSWER_CHARS, NO_ANSWER_MESSAGE, PromptCodec, render_chatml};
pub use mode::PromptMode;
