// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async-facing entry point to the inference worker.
//!
//! The gateway owns the worker's lifecycle and the request channel. Each call
//! to [`InferenceGateway::generate`] gets a fresh correlation id and its own
//! one-shot reply slot, and waits for the first of {reply, deadline}. A late
//! reply finds its slot closed and is discarded by the worker, so it can
//! never be handed to a different caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use duckie_core::{DuckieError, ModelLoader, RequestId};
use duckie_prompt::PromptCodec;
use strum::Display;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::journal::{InteractionJournal, InteractionRecord};
use crate::worker::{
    InferenceOutcome, InferenceRequest, InferenceWorker, WorkerCommand, WorkerSettings,
};

/// Lifecycle of the worker as seen by its gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WorkerLifecycle {
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

/// Timing and user-facing texts of the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Upper bound on one `generate` call.
    pub timeout: Duration,
    /// How long `stop` waits for the worker thread to exit.
    pub shutdown_timeout: Duration,
    pub timeout_message: String,
    pub error_message: String,
    pub worker: WorkerSettings,
}

impl GatewaySettings {
    pub fn from_config(config: &duckie_config::model::InferenceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
            timeout_message: config.timeout_message.clone(),
            error_message: config.error_message.clone(),
            worker: WorkerSettings::from_config(config),
        }
    }
}

struct WorkerSlot {
    state: WorkerLifecycle,
    commands: Option<mpsc::UnboundedSender<WorkerCommand>>,
    handle: Option<JoinHandle<()>>,
    exited: Option<oneshot::Receiver<()>>,
}

impl WorkerSlot {
    fn thread_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Facade the rest of the bot calls to get answers from the model.
pub struct InferenceGateway {
    loader: Arc<dyn ModelLoader>,
    codec: PromptCodec,
    journal: InteractionJournal,
    settings: GatewaySettings,
    slot: Mutex<WorkerSlot>,
}

impl InferenceGateway {
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        codec: PromptCodec,
        journal: InteractionJournal,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            loader,
            codec,
            journal,
            settings,
            slot: Mutex::new(WorkerSlot {
                state: WorkerLifecycle::NotStarted,
                commands: None,
                handle: None,
                exited: None,
            }),
        }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn state(&self) -> WorkerLifecycle {
        self.lock_slot().state
    }

    /// True while the worker thread exists and has not exited.
    pub fn is_alive(&self) -> bool {
        self.lock_slot().thread_alive()
    }

    /// Start the worker if it is not already running. Model loading happens on
    /// the worker thread, so this returns before the model is ready.
    pub fn start(&self) -> Result<(), DuckieError> {
        self.ensure_running().map(|_| ())
    }

    /// Send the shutdown sentinel and wait for the worker to exit.
    ///
    /// If the thread does not exit within the shutdown timeout it is detached:
    /// its command channel is closed, so it exits as soon as the generation it
    /// is stuck in returns.
    pub async fn stop(&self) {
        let (commands, handle, exited) = {
            let mut slot = self.lock_slot();
            if slot.state != WorkerLifecycle::Running {
                return;
            }
            slot.state = WorkerLifecycle::Stopping;
            (slot.commands.take(), slot.handle.take(), slot.exited.take())
        };
        info!("stopping inference worker");

        if let Some(commands) = &commands {
            let _ = commands.send(WorkerCommand::Stop);
        }

        let exited_in_time = match exited {
            Some(exited) => tokio::time::timeout(self.settings.shutdown_timeout, exited)
                .await
                .is_ok(),
            None => true,
        };

        if exited_in_time {
            if let Some(handle) = handle {
                let joined = tokio::task::spawn_blocking(move || handle.join()).await;
                if !matches!(joined, Ok(Ok(()))) {
                    warn!("inference worker panicked before shutdown");
                }
            }
            info!("inference worker stopped");
        } else {
            warn!(
                timeout_secs = self.settings.shutdown_timeout.as_secs_f64(),
                "inference worker did not exit in time, detaching"
            );
            drop(commands);
            drop(handle);
        }

        self.lock_slot().state = WorkerLifecycle::Stopped;
    }

    /// Get an answer for `prompt`. Never fails: errors and timeouts become the
    /// configured texts.
    pub async fn generate(&self, prompt: &str) -> String {
        let started = Instant::now();

        let id = RequestId(Uuid::new_v4().to_string());
        let (reply, response) = oneshot::channel();
        let request = InferenceRequest {
            id: id.clone(),
            prompt: prompt.to_string(),
            reply,
        };
        if let Err(e) = self.enqueue(request) {
            error!(request_id = %id, error = %e, "inference worker unavailable");
            return self
                .fail(prompt, &self.settings.error_message, started, e.to_string())
                .await;
        }
        debug!(request_id = %id, "request enqueued");

        match tokio::time::timeout(self.settings.timeout, response).await {
            Ok(Ok(response)) => match response.outcome {
                InferenceOutcome::Completed(text) => text,
                InferenceOutcome::Fallback(text) => {
                    warn!(request_id = %id, "worker answered with fallback");
                    text
                }
            },
            Ok(Err(_)) => {
                error!(request_id = %id, "inference worker died while processing request");
                self.mark_dead();
                self.fail(
                    prompt,
                    &self.settings.error_message,
                    started,
                    "worker exited without answering".to_string(),
                )
                .await
            }
            Err(_) => {
                let elapsed = started.elapsed();
                warn!(
                    request_id = %id,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "generation timed out"
                );
                self.fail(
                    prompt,
                    &self.settings.timeout_message,
                    started,
                    format!("generation timed out after {:.2}s", elapsed.as_secs_f64()),
                )
                .await
            }
        }
    }

    /// Hand a request to the worker. A closed channel means the worker died
    /// since the last liveness check, so it is restarted once and the send retried.
    fn enqueue(&self, request: InferenceRequest) -> Result<(), DuckieError> {
        let commands = self.ensure_running()?;
        let command = match commands.send(WorkerCommand::Generate(request)) {
            Ok(()) => return Ok(()),
            Err(mpsc::error::SendError(command)) => command,
        };

        warn!("inference worker channel closed, restarting");
        self.mark_dead();
        self.ensure_running()?
            .send(command)
            .map_err(|_| DuckieError::Worker("inference worker exited immediately".into()))
    }

    /// Forget a worker known to be dead so the next call starts a new one.
    fn mark_dead(&self) {
        let mut slot = self.lock_slot();
        if slot.state == WorkerLifecycle::Running {
            slot.commands = None;
            slot.exited = None;
        }
    }

    /// Journal a failed call off the runtime threads and return `text`.
    async fn fail(&self, prompt: &str, text: &str, started: Instant, error: String) -> String {
        let record = InteractionRecord::new(prompt, text, started.elapsed(), Some(error));
        let journal = self.journal.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || journal.record_interaction(&record)).await
        {
            warn!(error = %e, "journal task failed");
        }
        text.to_string()
    }

    /// Return the command sender of a running worker, starting or restarting
    /// it first when needed.
    fn ensure_running(&self) -> Result<mpsc::UnboundedSender<WorkerCommand>, DuckieError> {
        let mut slot = self.lock_slot();

        if slot.state == WorkerLifecycle::Running
            && slot.thread_alive()
            && let Some(commands) = &slot.commands
        {
            return Ok(commands.clone());
        }

        match slot.state {
            WorkerLifecycle::Running => warn!("inference worker died, restarting"),
            WorkerLifecycle::Stopping => {
                return Err(DuckieError::Worker("inference worker is stopping".into()));
            }
            _ => info!("starting inference worker"),
        }
        // An unfinished old thread is detached; its channel is already closed.
        if let Some(old) = slot.handle.take()
            && old.is_finished()
            && old.join().is_err()
        {
            warn!("previous inference worker had panicked");
        }

        let (commands, receiver) = mpsc::unbounded_channel();
        let (exited_tx, exited_rx) = oneshot::channel();
        let worker = InferenceWorker::new(
            Arc::clone(&self.loader),
            self.codec.clone(),
            self.journal.clone(),
            self.settings.worker.clone(),
        );
        let handle = worker.spawn(receiver, exited_tx)?;

        slot.state = WorkerLifecycle::Running;
        slot.commands = Some(commands.clone());
        slot.handle = Some(handle);
        slot.exited = Some(exited_rx);
        Ok(commands)
    }

    fn lock_slot(&self) -> MutexGuard<'_, WorkerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
