// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inference worker: one OS thread that exclusively owns the model.
//!
//! The worker is reached only through its command channel. Requests are
//! processed strictly one at a time; each carries its own one-shot reply
//! slot, so a caller that stopped waiting simply never sees the answer.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use duckie_core::{DuckieError, LanguageModel, ModelLoader, RequestId, SamplingParams};
use duckie_prompt::{PromptCodec, PromptMode, render_chatml};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::journal::{InteractionJournal, InteractionRecord, RawResponseRecord};

/// Thread name of the worker, visible in panics and debuggers.
pub const WORKER_THREAD_NAME: &str = "duckie-inference";

/// Messages accepted by the worker loop.
#[derive(Debug)]
pub enum WorkerCommand {
    Generate(InferenceRequest),
    /// Shutdown sentinel: the loop exits once it is dequeued.
    Stop,
}

/// A single prompt and the slot its answer goes to.
#[derive(Debug)]
pub struct InferenceRequest {
    pub id: RequestId,
    pub prompt: String,
    pub reply: oneshot::Sender<InferenceResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResponse {
    pub id: RequestId,
    pub outcome: InferenceOutcome,
}

/// What the worker produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceOutcome {
    /// A cleaned model answer.
    Completed(String),
    /// Configured error text standing in for an answer.
    Fallback(String),
}

impl InferenceOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, InferenceOutcome::Fallback(_))
    }

    pub fn into_text(self) -> String {
        match self {
            InferenceOutcome::Completed(text) | InferenceOutcome::Fallback(text) => text,
        }
    }
}

/// Per-request behaviour of the worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub params: SamplingParams,
    pub mode: PromptMode,
    /// Extra attempts after a failed generation.
    pub num_retries: u32,
    pub error_message: String,
}

impl WorkerSettings {
    pub fn from_config(config: &duckie_config::model::InferenceConfig) -> Self {
        Self {
            params: SamplingParams {
                max_new_tokens: config.max_new_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                repetition_penalty: config.repetition_penalty,
                do_sample: true,
            },
            mode: PromptMode::Math,
            num_retries: config.num_retries,
            error_message: config.error_message.clone(),
        }
    }
}

/// Everything a worker thread needs; consumed by [`InferenceWorker::spawn`].
pub struct InferenceWorker {
    loader: Arc<dyn ModelLoader>,
    codec: PromptCodec,
    journal: InteractionJournal,
    settings: WorkerSettings,
}

impl InferenceWorker {
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        codec: PromptCodec,
        journal: InteractionJournal,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            loader,
            codec,
            journal,
            settings,
        }
    }

    /// Start the worker thread.
    ///
    /// `exited` is dropped when the thread finishes, including by panic, which
    /// lets the owner wait for exit without blocking.
    pub fn spawn(
        self,
        commands: mpsc::UnboundedReceiver<WorkerCommand>,
        exited: oneshot::Sender<()>,
    ) -> Result<JoinHandle<()>, DuckieError> {
        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _exited = exited;
                self.run(commands);
            })
            .map_err(|e| DuckieError::Worker(format!("failed to spawn inference thread: {e}")))
    }

    fn run(self, mut commands: mpsc::UnboundedReceiver<WorkerCommand>) {
        let mut model = match self.loader.load() {
            Ok(model) => {
                info!(model = model.name(), "model loaded");
                Ok(model)
            }
            Err(e) => {
                error!(error = %e, "model failed to load, worker running degraded");
                Err(e.to_string())
            }
        };

        while let Some(command) = commands.blocking_recv() {
            let request = match command {
                WorkerCommand::Stop => {
                    info!("stop sentinel received");
                    break;
                }
                WorkerCommand::Generate(request) => request,
            };

            debug!(request_id = %request.id, "processing request");
            let outcome = match model.as_mut() {
                Ok(model) => self.process(model.as_mut(), &request.prompt),
                Err(reason) => self.degraded(&request.prompt, reason),
            };

            let response = InferenceResponse {
                id: request.id.clone(),
                outcome,
            };
            if request.reply.send(response).is_err() {
                warn!(request_id = %request.id, "caller stopped waiting, discarding response");
            }
        }

        info!("inference worker exiting");
    }

    fn degraded(&self, prompt: &str, reason: &str) -> InferenceOutcome {
        error!("model not loaded, answering with fallback");
        self.journal.record_interaction(&InteractionRecord::new(
            prompt,
            &self.settings.error_message,
            std::time::Duration::ZERO,
            Some(format!("model not loaded: {reason}")),
        ));
        InferenceOutcome::Fallback(self.settings.error_message.clone())
    }

    fn process(&self, model: &mut dyn LanguageModel, prompt: &str) -> InferenceOutcome {
        let started = Instant::now();
        let mode = self.settings.mode;
        let messages = self.codec.build(prompt, mode);
        let mut attempt = 0;

        loop {
            let result = catch_unwind(AssertUnwindSafe(|| {
                model.generate(&messages, &self.settings.params)
            }))
            .unwrap_or_else(|panic| {
                Err(DuckieError::Internal(format!(
                    "generation panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });

            match result {
                Ok(raw) => {
                    let cleaned = self
                        .codec
                        .postprocess(&raw, Some(mode.system_instruction()));
                    let templated = render_chatml(&messages);
                    let elapsed = started.elapsed();
                    info!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        chars = cleaned.chars().count(),
                        "answer generated"
                    );
                    self.journal
                        .record_raw(&RawResponseRecord::new(&templated, &raw, &cleaned));
                    self.journal.record_interaction(&InteractionRecord::new(
                        templated, &cleaned, elapsed, None,
                    ));
                    return InferenceOutcome::Completed(cleaned);
                }
                Err(e) if attempt < self.settings.num_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "generation failed, retrying");
                }
                Err(e) => {
                    error!(error = %e, attempts = attempt + 1, "generation failed");
                    self.journal.record_interaction(&InteractionRecord::new(
                        prompt,
                        &self.settings.error_message,
                        started.elapsed(),
                        Some(e.to_string()),
                    ));
                    return InferenceOutcome::Fallback(self.settings.error_message.clone());
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_text_drops_variant() {
        assert_eq!(InferenceOutcome::Fallback("x".into()).into_text(), "x");
        assert!(InferenceOutcome::Fallback("x".into()).is_fallback());
        assert!(!InferenceOutcome::Completed("x".into()).is_fallback());
    }

    #[test]
    fn panic_message_handles_both_payload_kinds() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn settings_from_config_enable_sampling() {
        let config = duckie_config::model::InferenceConfig::default();
        let settings = WorkerSettings::from_config(&config);
        assert!(settings.params.do_sample);
        assert_eq!(settings.params.max_new_tokens, 150);
        assert_eq!(settings.num_retries, 1);
        assert_eq!(settings.mode, PromptMode::Math);
    }
}
