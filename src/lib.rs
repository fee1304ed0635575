//! Task Script Library
//!
//! Streams task records out of a multi-line, fenced, seven-column CSV file
//! and turns each record owned by a given person into a verification
//! script for its computed result.
//!
//! This library provides tools for:
//! - Splitting lines on delimiters outside quotes and fenced code blocks
//! - Grouping physical lines into logical records
//! - Projecting records into typed values and filtering them by owner
//! - Running record code through a pool of script executors
//! - Writing one verification script per record

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod models;
pub mod parser;
pub mod processor;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TaskError};
pub use models::ParsedRecord;
pub use parser::RecordStream;
