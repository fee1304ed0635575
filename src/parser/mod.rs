//! Parser for fenced multi-line task files
//!
//! Each logical record spans one or more physical lines and holds seven
//! comma-separated columns. The question column may be double-quoted with
//! doubled-quote escaping; the two code columns may be wrapped in
//! triple-backtick fences and contain newlines and commas.
//!
//! ## Architecture
//!
//! - [`boundary`] - record-start detection and line buffering
//! - [`splitter`] - quote and fence aware field splitting
//! - [`cleaner`] - outer quote and fence removal
//! - [`projector`] - seven-column schema projection
//! - [`stream`] - lazy owner-filtered record stream
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use taskscript::parser::RecordStream;
//!
//! # fn example() -> taskscript::Result<()> {
//! let stream = RecordStream::open(Path::new("AllTask.csv"), "Alice")?;
//! for record in stream {
//!     println!("{}: {}", record.id, record.question);
//! }
//! # Ok(())
//! # }
//! ```

pub mod boundary;
pub mod cleaner;
pub mod projector;
pub mod splitter;
pub mod stream;

pub use boundary::{BufferedRecord, RecordBuffer, is_record_start};
pub use projector::project_record;
pub use splitter::split_fields;
pub use stream::{RecordStream, StreamStats};
