//! Record boundary detection and line buffering
//!
//! A record starts at the first input line, and again at every line that
//! matches the record-start signature while a record is already open. The
//! check is made on the raw physical line; quote and fence state of earlier
//! lines is not considered.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::RECORD_START_PATTERN;

static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RECORD_START_PATTERN).expect("record start pattern is valid"));

/// Check whether a line starts a new record (`^[0-9]+,`)
pub fn is_record_start(line: &str) -> bool {
    RECORD_START.is_match(line)
}

/// Text of one complete record, with the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedRecord {
    pub start_line: usize,
    pub text: String,
}

/// Lines accumulated for the record currently being read
#[derive(Debug, Default)]
pub struct RecordBuffer {
    lines: Vec<String>,
    start_line: usize,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Feed the next physical line (1-based `line_number`)
    ///
    /// Returns the previous record when this line closes it.
    pub fn push_line(&mut self, line_number: usize, line: String) -> Option<BufferedRecord> {
        if self.lines.is_empty() {
            self.start_line = line_number;
            self.lines.push(line);
            return None;
        }

        if is_record_start(&line) {
            let completed = self.take();
            self.start_line = line_number;
            self.lines.push(line);
            return completed;
        }

        self.lines.push(line);
        None
    }

    /// Flush whatever is buffered at end of input
    pub fn finish(&mut self) -> Option<BufferedRecord> {
        self.take()
    }

    fn take(&mut self) -> Option<BufferedRecord> {
        if self.lines.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.lines).join("\n");
        Some(BufferedRecord {
            start_line: self.start_line,
            text,
        })
    }
}
