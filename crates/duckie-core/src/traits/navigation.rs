// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to per-user navigation state.

use async_trait::async_trait;

use crate::types::{NavigationState, UserId};

/// Reads where a user currently is in the menu tree.
#[async_trait]
pub trait NavigationProbe: Send + Sync {
    /// Returns the user's current state, or `None` if the user has none
    /// (fresh conversation or cleared state).
    async fn current_state(&self, user: UserId) -> Option<NavigationState>;
}
