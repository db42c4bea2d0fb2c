// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference for the Duckie tutor bot.
//!
//! A single [`InferenceWorker`] thread owns the language model; the
//! [`InferenceGateway`] is the only way to reach it from async code. The
//! gateway starts the worker lazily, restarts it when its thread has died,
//! and turns every failure into user-displayable text.

pub mod backend;
pub mod gateway;
pub mod journal;
pub mod worker;

pub use backend::{OllamaLoader, OllamaModel};
pub use gateway::{GatewaySettings, InferenceGateway, WorkerLifecycle};
pub use journal::{InteractionJournal, InteractionRecord, RawResponseRecord};
pub use worker::{
    InferenceOutcome, InferenceRequest, InferenceResponse, InferenceWorker, WorkerCommand,
    WorkerSettings,
};
