// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! The language model traits are synchronous because the model lives on the
//! dedicated inference thread. The bot-facing traits use `#[async_trait]`
//! and are called from tasks on the event loop.

pub mod content;
pub mod model;
pub mod navigation;
pub mod reminder;

pub use content::ContentResolver;
pub use model::{LanguageModel, ModelLoader};
pub use navigation::NavigationProbe;
pub use reminder::ReminderSink;
