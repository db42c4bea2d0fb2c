// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the menu/content tree.

use async_trait::async_trait;

use crate::error::DuckieError;
use crate::types::Content;

/// Resolves a topic identifier into renderable content.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Looks up `topic`; unknown identifiers are an error.
    async fn resolve(&self, topic: &str) -> Result<Content, DuckieError>;
}
