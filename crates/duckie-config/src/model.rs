// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Duckie tutor bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Duckie configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DuckieConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Language model worker settings.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// User-facing notices of the interactive chat mode.
    #[serde(default)]
    pub interactive: InteractiveConfig,

    /// Inactivity reminder settings.
    #[serde(default)]
    pub watchdog: WatchdogConfig,

    /// Interaction journal settings.
    #[serde(default)]
    pub journal: JournalConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "duckie".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Language model and inference worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL of the Ollama-compatible model server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier on the model server.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Maximum number of newly generated tokens per answer.
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    /// Upper bound on one `generate` call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed generation before falling back.
    #[serde(default = "default_num_retries")]
    pub num_retries: u32,

    /// How long `stop` waits for the worker thread before detaching it.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// HTTP timeout for a single call to the model server.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Start the worker (and load the model) at startup instead of on first use.
    #[serde(default = "default_preload")]
    pub preload: bool,

    /// Text returned when the model is unavailable or a request failed.
    ///
    /// Goes through the same answer cleanup as model output: end it with a
    /// period and keep it at least 10 characters long, or it is rewritten.
    #[serde(default = "default_error_message")]
    pub error_message: String,

    /// Text returned when generation exceeded `timeout_secs`.
    ///
    /// Cleaned like `error_message`, so the same rules apply.
    #[serde(default = "default_timeout_message")]
    pub timeout_message: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model_name: default_model_name(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            timeout_secs: default_timeout_secs(),
            num_retries: default_num_retries(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            preload: default_preload(),
            error_message: default_error_message(),
            timeout_message: default_timeout_message(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model_name() -> String {
    "qwen2.5:3b-instruct".to_string()
}

fn default_max_new_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_repetition_penalty() -> f32 {
    1.2
}

fn default_timeout_secs() -> u64 {
    900
}

fn default_num_retries() -> u32 {
    1
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_preload() -> bool {
    true
}

fn default_error_message() -> String {
    "Извини, Duckie сейчас недоступен. Пожалуйста, попробуй позже.".to_string()
}

fn default_timeout_message() -> String {
    "Извини, запрос занял слишком много времени. Пожалуйста, попробуй позже или задай более простой вопрос."
        .to_string()
}

/// Notices shown around the interactive chat mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InteractiveConfig {
    /// Shown when another user holds the chat slot.
    #[serde(default = "default_busy_message")]
    pub busy_message: String,

    /// Shown after successfully entering interactive mode.
    #[serde(default = "default_enter_message")]
    pub enter_message: String,

    /// Label of the button that leaves interactive mode.
    #[serde(default = "default_exit_label")]
    pub exit_label: String,

    /// Shown when a message arrives from a user who does not hold the slot.
    #[serde(default = "default_not_holder_message")]
    pub not_holder_message: String,

    /// Shown if the start menu cannot be resolved after leaving.
    #[serde(default = "default_exit_message")]
    pub exit_message: String,

    /// Content identifier shown after leaving interactive mode.
    #[serde(default = "default_start_topic")]
    pub start_topic: String,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            busy_message: default_busy_message(),
            enter_message: default_enter_message(),
            exit_label: default_exit_label(),
            not_holder_message: default_not_holder_message(),
            exit_message: default_exit_message(),
            start_topic: default_start_topic(),
        }
    }
}

fn default_busy_message() -> String {
    "Извиняюсь, но интерактивный режим сейчас занят другим пользователем. Пожалуйста, подожди и попробуй позже =)"
        .to_string()
}

fn default_enter_message() -> String {
    "Ты вошел в интерактивный режим. Теперь ты можешь общаться с ботом.\nДля выхода нажми кнопку 'Выйти из интерактивного режима'"
        .to_string()
}

fn default_exit_label() -> String {
    "Выйти из интерактивного режима".to_string()
}

fn default_not_holder_message() -> String {
    "Интерактивный режим сейчас недоступен. Вернись в меню и попробуй войти снова.".to_string()
}

fn default_exit_message() -> String {
    "Ты вышел из интерактивного режима.".to_string()
}

fn default_start_topic() -> String {
    "start".to_string()
}

/// Inactivity reminder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WatchdogConfig {
    /// Seconds of inactivity before the reminder fires.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    #[serde(default = "default_reminder_text")]
    pub reminder_text: String,

    #[serde(default = "default_yes_label")]
    pub yes_label: String,

    #[serde(default = "default_yes_callback")]
    pub yes_callback: String,

    #[serde(default = "default_no_label")]
    pub no_label: String,

    #[serde(default = "default_no_callback")]
    pub no_callback: String,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            reminder_text: default_reminder_text(),
            yes_label: default_yes_label(),
            yes_callback: default_yes_callback(),
            no_label: default_no_label(),
            no_callback: default_no_callback(),
        }
    }
}

fn default_delay_secs() -> u64 {
    120
}

fn default_reminder_text() -> String {
    "Привет! Ты еще изучаешь материал?".to_string()
}

fn default_yes_label() -> String {
    "Да".to_string()
}

fn default_yes_callback() -> String {
    "still_learning".to_string()
}

fn default_no_label() -> String {
    "Нет, верни в начало".to_string()
}

fn default_no_callback() -> String {
    "return_to_menu".to_string()
}

/// Interaction journal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// Write the daily JSONL journals at all.
    #[serde(default = "default_journal_enabled")]
    pub enabled: bool,

    /// Directory holding `llm_interactions_*.jsonl` and `llm_raw_responses_*.jsonl`.
    #[serde(default = "default_journal_directory")]
    pub directory: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: default_journal_enabled(),
            directory: default_journal_directory(),
        }
    }
}

fn default_journal_enabled() -> bool {
    true
}

fn default_journal_directory() -> String {
    "logs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_inference_matches_tutor_profile() {
        let config = InferenceConfig::default();
        assert_eq!(config.max_new_tokens, 150);
        assert_eq!(config.timeout_secs, 900);
        assert_eq!(config.num_retries, 1);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!((config.top_p - 0.95).abs() < f32::EPSILON);
        assert!((config.repetition_penalty - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: DuckieConfig = toml::from_str("").unwrap();
        assert_eq!(config.bot.name, "duckie");
        assert_eq!(config.watchdog.delay_secs, 120);
        assert_eq!(config.watchdog.yes_callback, "still_learning");
        assert_eq!(config.interactive.start_topic, "start");
        assert!(config.journal.enabled);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: DuckieConfig = toml::from_str(
            r#"
[inference]
timeout_secs = 30
"#,
        )
        .unwrap();
        assert_eq!(config.inference.timeout_secs, 30);
        assert_eq!(config.inference.model_name, "qwen2.5:3b-instruct");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = toml::from_str::<DuckieConfig>(
            r#"
[watchdog]
delay = 5
"#,
        );
        assert!(result.is_err());
    }
}
