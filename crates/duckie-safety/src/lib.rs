// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safety filtering for untrusted user input.
//!
//! [`SafetyFilter`] runs an ordered chain of [`SafetyRule`]s over the
//! lowercased input; the first rule that matches decides the verdict.
//! A rejected input is never dropped: callers prefix it with
//! [`REJECTION_MARKER`] and forward it anyway, so the model produces its own
//! deflection. [`sanitize`] always runs afterwards.

pub mod filter;
pub mod patterns;
pub mod rules;

pub use filter::{REJECTION_MARKER, SafetyFilter, mark_rejected, sanitize};
pub use rules::{PhraseRule, SafetyCheckResult, SafetyRule, SafetyViolation, TopicRule};
