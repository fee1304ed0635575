//! Projection of buffered record text onto the task record schema

use super::boundary::BufferedRecord;
use super::cleaner::{strip_fence, unquote_field};
use super::splitter::split_fields;
use crate::constants::{
    FIELD_COUNT, FIELD_DELIMITER, MAX_FIELD_SPLITS, RECORD_PREVIEW_CHARS, columns,
};
use crate::error::{Result, TaskError};
use crate::models::ParsedRecord;

/// Split a record into its raw columns
///
/// Fails with `MalformedRecord` when fewer than seven columns are recovered.
pub fn split_record(record: &BufferedRecord) -> Result<Vec<String>> {
    let fields = split_fields(&record.text, FIELD_DELIMITER, Some(MAX_FIELD_SPLITS));

    if fields.len() < FIELD_COUNT {
        return Err(TaskError::MalformedRecord {
            line: record.start_line,
            found: fields.len(),
            preview: preview(&record.text),
        });
    }

    Ok(fields)
}

/// Turn a buffered record into a cleaned `ParsedRecord`
pub fn project_record(record: &BufferedRecord) -> Result<ParsedRecord> {
    let fields = split_record(record)?;

    Ok(ParsedRecord {
        id: fields[columns::ID].trim().to_string(),
        owner: fields[columns::OWNER].trim().to_string(),
        question: unquote_field(&fields[columns::QUESTION]),
        prepare_code: strip_fence(&fields[columns::PREPARE_CODE]),
        run_code: strip_fence(&fields[columns::RUN_CODE]),
    })
}

/// First characters of a record for diagnostics
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(RECORD_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
