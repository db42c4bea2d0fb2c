// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concrete [`duckie_core::ModelLoader`] implementations.

pub mod ollama;

pub use ollama::{OllamaLoader, OllamaModel};
