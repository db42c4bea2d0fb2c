// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive-session engine of the Duckie tutor bot.
//!
//! - [`SessionArbiter`] admits one user at a time into interactive mode.
//! - [`ActivityWatchdog`] reminds idle browsing users that the bot is there.
//! - [`InteractiveChat`] routes interactive messages through the inference gateway.

pub mod arbiter;
pub mod chat;
pub mod shutdown;
pub mod watchdog;

pub use arbiter::{SessionArbiter, SessionHolder};
pub use chat::{ChatSettings, InteractiveChat, Reply};
pub use shutdown::{drain, install_signal_handler};
pub use watchdog::{ActivityWatchdog, WatchdogSettings};
