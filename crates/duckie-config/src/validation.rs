// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as sampling ranges, non-zero timeouts, and non-empty user-facing text.

use crate::diagnostic::ConfigError;
use crate::model::DuckieConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DuckieConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        fail(format!(
            "bot.log_level `{}` must be one of: {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let inference = &config.inference;
    let endpoint = inference.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        fail(format!(
            "inference.endpoint `{endpoint}` must be an http:// or https:// URL"
        ));
    }

    if inference.model_name.trim().is_empty() {
        fail("inference.model_name must not be empty".to_string());
    }

    if inference.max_new_tokens == 0 {
        fail("inference.max_new_tokens must be at least 1".to_string());
    }

    if !(inference.temperature > 0.0) {
        fail(format!(
            "inference.temperature must be positive, got {}",
            inference.temperature
        ));
    }

    if !(inference.top_p > 0.0 && inference.top_p <= 1.0) {
        fail(format!(
            "inference.top_p must be in (0, 1], got {}",
            inference.top_p
        ));
    }

    if !(inference.repetition_penalty > 0.0) {
        fail(format!(
            "inference.repetition_penalty must be positive, got {}",
            inference.repetition_penalty
        ));
    }

    if inference.timeout_secs == 0 {
        fail("inference.timeout_secs must be at least 1".to_string());
    }

    if inference.request_timeout_secs == 0 {
        fail("inference.request_timeout_secs must be at least 1".to_string());
    }

    for (key, value) in [
        ("inference.error_message", &inference.error_message),
        ("inference.timeout_message", &inference.timeout_message),
        ("interactive.busy_message", &config.interactive.busy_message),
        ("interactive.enter_message", &config.interactive.enter_message),
        ("interactive.not_holder_message", &config.interactive.not_holder_message),
        ("interactive.exit_message", &config.interactive.exit_message),
        ("watchdog.reminder_text", &config.watchdog.reminder_text),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if config.watchdog.delay_secs == 0 {
        fail("watchdog.delay_secs must be at least 1".to_string());
    }

    if config.journal.enabled && config.journal.directory.trim().is_empty() {
        fail("journal.directory must not be empty when the journal is enabled".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = DuckieConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut config = DuckieConfig::default();
        config.inference.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "timeout_secs"));
    }

    #[test]
    fn top_p_out_of_range_fails_validation() {
        let mut config = DuckieConfig::default();
        config.inference.top_p = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "top_p"));
    }

    #[test]
    fn non_http_endpoint_fails_validation() {
        let mut config = DuckieConfig::default();
        config.inference.endpoint = "localhost:11434".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "inference.endpoint"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = DuckieConfig::default();
        config.bot.log_level = "loud".to_string();
        config.watchdog.delay_secs = 0;
        config.inference.error_message = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "log_level"));
        assert!(has_error(&errors, "delay_secs"));
        assert!(has_error(&errors, "error_message"));
    }

    #[test]
    fn disabled_journal_may_have_empty_directory() {
        let mut config = DuckieConfig::default();
        config.journal.enabled = false;
        config.journal.directory = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
