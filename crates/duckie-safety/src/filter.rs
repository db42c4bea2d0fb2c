// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ordered safety rule chain and input sanitization.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use crate::patterns::{
    FORBIDDEN_TOPICS, INJECTION_PHRASES, REASON_FORBIDDEN_TOPIC, REASON_UNDISCLOSABLE,
    REASON_UNPROCESSABLE, SPAM_PHRASES, SYSTEM_PROMPT_PHRASES,
};
use crate::rules::{PhraseRule, SafetyCheckResult, SafetyRule, SafetyViolation, TopicRule};

/// Prefix attached to input the filter flagged, before it is forwarded to the model.
pub const REJECTION_MARKER: &str = "[запрос отклонен системой безопасности]";

/// Default chain in priority order: injection, instruction probing, topics, spam.
static DEFAULT_RULES: LazyLock<Vec<Arc<dyn SafetyRule>>> = LazyLock::new(|| {
    vec![
        Arc::new(
            PhraseRule::new(
                "prompt_injection",
                SafetyViolation::PromptInjection,
                REASON_UNPROCESSABLE,
                INJECTION_PHRASES,
            )
            .unwrap(),
        ) as Arc<dyn SafetyRule>,
        Arc::new(
            PhraseRule::new(
                "system_prompt_probe",
                SafetyViolation::SystemPromptLeak,
                REASON_UNDISCLOSABLE,
                SYSTEM_PROMPT_PHRASES,
            )
            .unwrap(),
        ) as Arc<dyn SafetyRule>,
        Arc::new(TopicRule::new(
            "forbidden_topic",
            SafetyViolation::ForbiddenTopic,
            REASON_FORBIDDEN_TOPIC,
            FORBIDDEN_TOPICS,
        )) as Arc<dyn SafetyRule>,
        Arc::new(
            PhraseRule::new("spam", SafetyViolation::Spam, REASON_UNPROCESSABLE, SPAM_PHRASES)
                .unwrap(),
        ) as Arc<dyn SafetyRule>,
    ]
});

/// Markup-like tags: `<b>`, `</input>`, `<|im_end|>`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Control tokens of the `<|...|>` form.
static CONTROL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\|.*?\|>").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Stateless classifier over an ordered rule chain.
///
/// Cloning is cheap; rules are shared.
#[derive(Clone)]
pub struct SafetyFilter {
    rules: Vec<Arc<dyn SafetyRule>>,
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl std::fmt::Debug for SafetyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyFilter")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl SafetyFilter {
    /// Build a filter from an explicit chain. Earlier rules take priority.
    pub fn new(rules: Vec<Arc<dyn SafetyRule>>) -> Self {
        Self { rules }
    }

    /// Append a rule at the lowest priority.
    pub fn with_rule(mut self, rule: Arc<dyn SafetyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Classify `text`. Total and deterministic; the first matching rule wins.
    pub fn check(&self, text: &str) -> SafetyCheckResult {
        let lowered = text.to_lowercase();
        for rule in &self.rules {
            if let Some(result) = rule.evaluate(&lowered) {
                warn!(
                    rule = rule.name(),
                    violation = ?result.violation,
                    details = ?result.details,
                    "unsafe input detected"
                );
                return result;
            }
        }
        SafetyCheckResult::safe()
    }

    /// See [`sanitize`].
    pub fn sanitize(&self, text: &str) -> String {
        sanitize(text)
    }
}

/// Strip tags and control tokens, collapse whitespace runs to one space, trim.
pub fn sanitize(text: &str) -> String {
    let text = TAG_RE.replace_all(text, "");
    let text = CONTROL_TOKEN_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Prefix `text` with [`REJECTION_MARKER`].
pub fn mark_rejected(text: &str) -> String {
    format!("{REJECTION_MARKER} {text}")
}
