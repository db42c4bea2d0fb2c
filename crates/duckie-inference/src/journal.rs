// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only daily JSONL journals of model interactions.
//!
//! Two files per calendar day live in the journal directory:
//! `llm_interactions_YYYYMMDD.jsonl` and `llm_raw_responses_YYYYMMDD.jsonl`.
//! Write failures are logged and swallowed; a broken journal never affects
//! an answer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use duckie_core::DuckieError;
use serde::{Deserialize, Serialize};
use tracing::error;

const INTERACTIONS_PREFIX: &str = "llm_interactions";
const RAW_RESPONSES_PREFIX: &str = "llm_raw_responses";

/// One line of the interaction journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: String,
    pub prompt: String,
    pub response: String,
    /// Seconds with two decimals and an `s` suffix, e.g. `1.25s`.
    pub duration: String,
    pub error: Option<String>,
}

impl InteractionRecord {
    pub fn new(
        prompt: impl Into<String>,
        response: impl Into<String>,
        elapsed: Duration,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: now_timestamp(),
            prompt: prompt.into(),
            response: response.into(),
            duration: format!("{:.2}s", elapsed.as_secs_f64()),
            error,
        }
    }
}

/// One line of the raw-vs-cleaned response journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponseRecord {
    pub timestamp: String,
    pub prompt: String,
    pub raw_response: String,
    pub cleaned_response: String,
}

impl RawResponseRecord {
    pub fn new(
        prompt: impl Into<String>,
        raw_response: impl Into<String>,
        cleaned_response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: now_timestamp(),
            prompt: prompt.into(),
            raw_response: raw_response.into(),
            cleaned_response: cleaned_response.into(),
        }
    }
}

fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Writer for both daily journals. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InteractionJournal {
    directory: PathBuf,
    enabled: bool,
}

impl InteractionJournal {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            enabled: true,
        }
    }

    /// A journal that drops every record.
    pub fn disabled() -> Self {
        Self {
            directory: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn from_config(config: &duckie_config::model::JournalConfig) -> Self {
        if config.enabled {
            Self::new(&config.directory)
        } else {
            Self::disabled()
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn interactions_path(&self, date: NaiveDate) -> PathBuf {
        self.daily_path(INTERACTIONS_PREFIX, date)
    }

    pub fn raw_responses_path(&self, date: NaiveDate) -> PathBuf {
        self.daily_path(RAW_RESPONSES_PREFIX, date)
    }

    pub fn record_interaction(&self, record: &InteractionRecord) {
        if let Err(e) = self.append(INTERACTIONS_PREFIX, record) {
            error!(error = %e, "failed to write interaction journal");
        }
    }

    pub fn record_raw(&self, record: &RawResponseRecord) {
        if let Err(e) = self.append(RAW_RESPONSES_PREFIX, record) {
            error!(error = %e, "failed to write raw response journal");
        }
    }

    fn daily_path(&self, prefix: &str, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("{prefix}_{}.jsonl", date.format("%Y%m%d")))
    }

    fn append<T: Serialize>(&self, prefix: &str, record: &T) -> Result<(), DuckieError> {
        if !self.enabled {
            return Ok(());
        }

        let mut line = serde_json::to_string(record)
            .map_err(|e| DuckieError::Internal(format!("journal serialization failed: {e}")))?;
        line.push('\n');

        std::fs::create_dir_all(&self.directory)
            .map_err(|source| DuckieError::Journal { source })?;
        let path = self.daily_path(prefix, Local::now().date_naive());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| DuckieError::Journal { source })?;
        file.write_all(line.as_bytes())
            .map_err(|source| DuckieError::Journal { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn interaction_record_formats_duration() {
        let record = InteractionRecord::new("p", "r", Duration::from_millis(1234), None);
        assert_eq!(record.duration, "1.23s");
        assert!(record.error.is_none());
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let journal = InteractionJournal::new(dir.path().join("logs"));

        journal.record_interaction(&InteractionRecord::new("a", "b", Duration::ZERO, None));
        journal.record_interaction(&InteractionRecord::new(
            "c",
            "d",
            Duration::ZERO,
            Some("boom".into()),
        ));

        let content = std::fs::read_to_string(journal.interactions_path(today())).unwrap();
        let lines: Vec<InteractionRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].prompt, "a");
        assert_eq!(lines[1].error.as_deref(), Some("boom"));
    }

    #[test]
    fn raw_records_go_to_separate_file() {
        let dir = tempfile::tempdir().unwrap();
        let journal = InteractionJournal::new(dir.path());

        journal.record_raw(&RawResponseRecord::new("prompt", "<|im_end|>raw", "raw"));

        assert!(!journal.interactions_path(today()).exists());
        let content = std::fs::read_to_string(journal.raw_responses_path(today())).unwrap();
        let record: RawResponseRecord = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(record.raw_response, "<|im_end|>raw");
        assert_eq!(record.cleaned_response, "raw");
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let journal = InteractionJournal::new(dir.path());
        journal.record_interaction(&InteractionRecord::new("привет", "ответ", Duration::ZERO, None));
        let content = std::fs::read_to_string(journal.interactions_path(today())).unwrap();
        assert!(content.contains("привет"));
    }

    #[test]
    fn write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let journal = InteractionJournal::new(&blocker);

        // Must not panic.
        journal.record_interaction(&InteractionRecord::new("p", "r", Duration::ZERO, None));
        assert!(journal.append(INTERACTIONS_PREFIX, &"x").is_err());
    }

    #[test]
    fn disabled_journal_writes_nothing() {
        let journal = InteractionJournal::disabled();
        assert!(journal.append(INTERACTIONS_PREFIX, &"x").is_ok());
    }

    #[test]
    fn daily_file_names() {
        let journal = InteractionJournal::new("logs");
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            journal.interactions_path(date),
            PathBuf::from("logs/llm_interactions_20260307.jsonl")
        );
        assert_eq!(
            journal.raw_responses_path(date),
            PathBuf::from("logs/llm_raw_responses_20260307.jsonl")
        );
    }
}
