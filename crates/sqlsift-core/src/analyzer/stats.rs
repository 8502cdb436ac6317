//! Timing and failure aggregates

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};

static ELAPSED_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*ms\.\s*$").expect("elapsed time pattern is valid"));

/// Read the trailing `<n> ms.` annotation of a logged statement
pub fn extract_duration_ms(statement: &str) -> Result<u64> {
    ELAPSED_TIME
        .captures(statement.trim_end())
        .and_then(|caps| caps[1].parse().ok())
        .ok_or(ParseError::TimingUnavailable)
}

/// Elapsed-time statistics over parsed statements.
///
/// `statements_at_max` is a ratchet history: every statement that raised
/// the maximum is appended, not just the final record holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    #[serde(rename = "durations_ms")]
    all_durations_ms: Vec<u64>,
    #[serde(rename = "max_ms")]
    max_duration_ms: u64,
    statements_at_max: Vec<String>,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, duration_ms: u64, statement: &str) {
        self.all_durations_ms.push(duration_ms);
        if duration_ms > self.max_duration_ms {
            self.max_duration_ms = duration_ms;
            self.statements_at_max.push(statement.to_string());
        }
    }

    pub fn all_durations_ms(&self) -> &[u64] {
        &self.all_durations_ms
    }

    pub fn max_duration_ms(&self) -> u64 {
        self.max_duration_ms
    }

    pub fn statements_at_max(&self) -> &[String] {
        &self.statements_at_max
    }

    /// Mean of all durations, `None` before the first observation
    pub fn average_duration_ms(&self) -> Option<f64> {
        if self.all_durations_ms.is_empty() {
            return None;
        }
        let total: u64 = self.all_durations_ms.iter().sum();
        Some(total as f64 / self.all_durations_ms.len() as f64)
    }

    /// Concatenate another stream's statistics after this one's
    pub fn merge(&mut self, other: &TimingStats) {
        self.all_durations_ms
            .extend_from_slice(&other.all_durations_ms);
        self.statements_at_max
            .extend(other.statements_at_max.iter().cloned());
        self.max_duration_ms = self.max_duration_ms.max(other.max_duration_ms);
    }

    pub fn is_empty(&self) -> bool {
        self.all_durations_ms.is_empty()
    }
}

/// Statements that could not be analyzed, in the order they were seen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLog {
    #[serde(rename = "last")]
    last_failed: Option<String>,
    #[serde(rename = "all")]
    all_failed: Vec<String>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, statement: &str) {
        self.last_failed = Some(statement.to_string());
        self.all_failed.push(statement.to_string());
    }

    pub fn last_failed(&self) -> Option<&str> {
        self.last_failed.as_deref()
    }

    pub fn all_failed(&self) -> &[String] {
        &self.all_failed
    }

    pub fn merge(&mut self, other: &FailureLog) {
        self.all_failed.extend(other.all_failed.iter().cloned());
        if other.last_failed.is_some() {
            self.last_failed = other.last_failed.clone();
        }
    }

    pub fn len(&self) -> usize {
        self.all_failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_failed.is_empty()
    }
}
