// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted language model for deterministic worker tests.
//!
//! The model runs on the inference worker thread, so all state sits behind
//! std synchronization primitives rather than async ones.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use duckie_core::{ChatMessage, DuckieError, LanguageModel, ModelLoader, SamplingParams};

/// One scripted generation outcome.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(String),
    Fail(String),
    Panic,
    /// Block the worker thread, then reply.
    Sleep(Duration, String),
}

#[derive(Debug, Default)]
struct ScriptState {
    steps: Mutex<VecDeque<Step>>,
    load_error: Option<String>,
    panic_loads: AtomicUsize,
    loads: AtomicUsize,
    generations: AtomicUsize,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

/// A [`ModelLoader`] producing [`ScriptedModel`]s that share one script.
///
/// When the script runs out, the model replies with a fixed default answer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoader {
    state: Arc<ScriptState>,
}

/// Answer used once the script is exhausted.
pub const DEFAULT_ANSWER: &str = "Два плюс два равно четырем.";

impl ScriptedLoader {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            state: Arc::new(ScriptState {
                steps: Mutex::new(steps.into()),
                ..Default::default()
            }),
        }
    }

    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self::new(responses.into_iter().map(|r| Step::Reply(r.to_string())).collect())
    }

    /// Every load fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            state: Arc::new(ScriptState {
                load_error: Some(message.to_string()),
                ..Default::default()
            }),
        }
    }

    /// A model that blocks for `delay` on every request.
    pub fn sleeping(delay: Duration) -> Self {
        let steps = (0..16)
            .map(|_| Step::Sleep(delay, "поздний ответ, который никто не ждет.".to_string()))
            .collect();
        Self::new(steps)
    }

    /// The first `count` loads panic, killing the worker thread.
    pub fn panic_on_first_loads(self, count: usize) -> Self {
        self.state.panic_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn load_count(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }

    pub fn generation_count(&self) -> usize {
        self.state.generations.load(Ordering::SeqCst)
    }

    /// Chat requests received so far, in order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(&self) -> Result<Box<dyn LanguageModel>, DuckieError> {
        self.state.loads.fetch_add(1, Ordering::SeqCst);

        let remaining = self.state.panic_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.state.panic_loads.store(remaining - 1, Ordering::SeqCst);
            panic!("scripted load panic");
        }

        if let Some(message) = &self.state.load_error {
            return Err(DuckieError::model(message.clone()));
        }
        Ok(Box::new(ScriptedModel {
            state: Arc::clone(&self.state),
        }))
    }
}

/// The model handed out by [`ScriptedLoader`].
pub struct ScriptedModel {
    state: Arc<ScriptState>,
}

impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate(
        &mut self,
        messages: &[ChatMessage],
        _params: &SamplingParams,
    ) -> Result<String, DuckieError> {
        self.state.generations.fetch_add(1, Ordering::SeqCst);
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        let step = self
            .state
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            None => Ok(DEFAULT_ANSWER.to_string()),
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(message)) => Err(DuckieError::model(message)),
            Some(Step::Panic) => panic!("scripted generation panic"),
            Some(Step::Sleep(delay, text)) => {
                std::thread::sleep(delay);
                Ok(text)
            }
        }
    }
}
