// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Duckie integration tests.
//!
//! Provides scripted adapters for fast, deterministic tests without a model
//! server or a messenger.
//!
//! # Components
//!
//! - [`ScriptedLoader`] - model loader whose model follows a script of replies, failures, delays and panics
//! - [`RecordingReminderSink`] - reminder sink capturing sent and deleted reminders
//! - [`ScriptedNavigationProbe`] - navigation state set directly by the test
//! - [`StaticContent`] - in-memory content tree

pub mod mock_channel;
pub mod mock_model;

pub use mock_channel::{RecordingReminderSink, ScriptedNavigationProbe, SentReminder, StaticContent};
pub use mock_model::{ScriptedLoader, Step};
