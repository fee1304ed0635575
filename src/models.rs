//! Core data structures for task record processing.
//!
//! Defines the projected task record, per-task outcomes and the
//! summary reported after a parallel processing run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A task record projected from the task file
///
/// `question`, `prepare_code` and `run_code` have had their outer quoting
/// or fencing removed; `id` and `owner` are trimmed raw values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    pub id: String,
    pub owner: String,
    pub question: String,
    pub prepare_code: String,
    pub run_code: String,
}

/// Final status of one processed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Failure,
}

/// Outcome of processing a single task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub id: String,
    pub status: TaskStatus,
    pub message: String,
}

impl TaskOutcome {
    pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Success,
            message: message.into(),
        }
    }

    pub fn failure(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Processing statistics for a parallel run
#[derive(Debug, Default, Clone)]
pub struct ProcessingSummary {
    /// Records handed to the worker pool
    pub submitted: usize,
    /// Records whose outcome was collected
    pub processed: usize,
    /// Successful task outcomes
    pub succeeded: Vec<TaskOutcome>,
    /// Failed task outcomes, needing manual attention
    pub failed: Vec<TaskOutcome>,
    /// Records skipped by the parser
    pub malformed_records: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl ProcessingSummary {
    /// Record a task outcome
    pub fn record(&mut self, outcome: TaskOutcome) {
        self.processed += 1;
        match outcome.status {
            TaskStatus::Success => self.succeeded.push(outcome),
            TaskStatus::Failure => self.failed.push(outcome),
        }
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            (self.succeeded.len() as f64 / self.processed as f64) * 100.0
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
