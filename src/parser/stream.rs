//! Lazy, owner-filtered stream of task records
//!
//! Lines are pulled from the source only when the consumer asks for the next
//! record. Records that cannot be projected are diagnosed and skipped, so one
//! bad record never ends the stream. The source is owned by the stream and
//! released when the stream is dropped, whether or not it was exhausted.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::FusedIterator;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::boundary::{BufferedRecord, RecordBuffer};
use super::projector::project_record;
use crate::error::{Result, TaskError};
use crate::models::ParsedRecord;

/// Statistics for a record stream
#[derive(Debug, Default, Clone)]
pub struct StreamStats {
    /// Records assembled from the source
    pub records_seen: usize,
    /// Records handed to the consumer
    pub records_yielded: usize,
    /// Well-formed records whose owner did not match the filter
    pub records_filtered: usize,
    /// Records skipped because they could not be projected
    pub records_malformed: usize,
}

impl StreamStats {
    /// Records read but not handed to the consumer
    pub fn records_skipped(&self) -> usize {
        self.records_filtered + self.records_malformed
    }
}

/// Pull-based stream of records owned by a single person
pub struct RecordStream<R> {
    lines: Lines<R>,
    line_number: usize,
    buffer: RecordBuffer,
    owner_filter: String,
    stats: StreamStats,
    read_error: Option<TaskError>,
    finished: bool,
}

impl RecordStream<BufReader<File>> {
    /// Open a task file for streaming
    ///
    /// A source that cannot be opened is reported as `SourceUnavailable`
    /// rather than producing an empty stream.
    pub fn open(path: &Path, owner_filter: impl Into<String>) -> Result<Self> {
        let file = File::open(path).map_err(|source| TaskError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Streaming task records from {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), owner_filter))
    }
}

impl<R: BufRead> RecordStream<R> {
    pub fn from_reader(reader: R, owner_filter: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            buffer: RecordBuffer::new(),
            owner_filter: owner_filter.into(),
            stats: StreamStats::default(),
            read_error: None,
            finished: false,
        }
    }

    pub fn owner_filter(&self) -> &str {
        &self.owner_filter
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Take the read failure that ended the stream early, if any
    pub fn take_error(&mut self) -> Option<TaskError> {
        self.read_error.take()
    }

    /// Project a completed record and apply the owner filter
    fn accept(&mut self, record: BufferedRecord) -> Option<ParsedRecord> {
        self.stats.records_seen += 1;

        match project_record(&record) {
            Ok(parsed) if parsed.owner == self.owner_filter => {
                self.stats.records_yielded += 1;
                Some(parsed)
            }
            Ok(parsed) => {
                self.stats.records_filtered += 1;
                debug!(
                    "Record {} (line {}) belongs to '{}', skipping",
                    parsed.id, record.start_line, parsed.owner
                );
                None
            }
            Err(e) => {
                self.stats.records_malformed += 1;
                match &e {
                    TaskError::MalformedRecord { preview, .. } => {
                        warn!("{}. Skipping. Content hint: {}", e, preview);
                    }
                    _ => warn!("Error processing record starting line {}: {}", record.start_line, e),
                }
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = ParsedRecord;

    fn next(&mut self) -> Option<ParsedRecord> {
        while !self.finished {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.line_number += 1;
                    if let Some(completed) = self.buffer.push_line(self.line_number, line) {
                        if let Some(record) = self.accept(completed) {
                            return Some(record);
                        }
                    }
                }
                Some(Err(source)) => {
                    // The buffered record may be truncated, so it is dropped.
                    self.finished = true;
                    let e = TaskError::SourceRead {
                        line: self.line_number + 1,
                        source,
                    };
                    error!("{}", e);
                    self.read_error = Some(e);
                }
                None => {
                    self.finished = true;
                    if let Some(completed) = self.buffer.finish() {
                        if let Some(record) = self.accept(completed) {
                            return Some(record);
                        }
                    }
                    debug!(
                        "Stream finished: {} seen, {} yielded, {} malformed",
                        self.stats.records_seen,
                        self.stats.records_yielded,
                        self.stats.records_malformed
                    );
                }
            }
        }

        None
    }
}

impl<R: BufRead> FusedIterator for RecordStream<R> {}
