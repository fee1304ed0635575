//! Application constants for the task script processor
//!
//! This module contains the task file format constants, column layout,
//! default values and generated-script fragments used throughout the crate.

// =============================================================================
// Task File Format
// =============================================================================

/// Marker that opens and closes a fenced code block
pub const FENCE_MARKER: &str = "```";

/// Quote character for CSV-style quoted fields
pub const QUOTE_CHAR: char = '"';

/// Column delimiter
pub const FIELD_DELIMITER: char = ',';

/// Number of logical columns in every record
pub const FIELD_COUNT: usize = 7;

/// Maximum number of delimiter splits (the last column absorbs the rest)
pub const MAX_FIELD_SPLITS: usize = FIELD_COUNT - 1;

/// Pattern a physical line must match to start a new record
pub const RECORD_START_PATTERN: &str = r"^[0-9]+,";

/// Number of characters of record text included in diagnostics
pub const RECORD_PREVIEW_CHARS: usize = 200;

/// Column positions within a record
///
/// Layout: `id, owner, status, functionName, question, prepareCode, runCode`.
/// The status and function name columns are parsed but not projected.
pub mod columns {
    pub const ID: usize = 0;
    pub const OWNER: usize = 1;
    pub const STATUS: usize = 2;
    pub const FUNCTION_NAME: usize = 3;
    pub const QUESTION: usize = 4;
    pub const PREPARE_CODE: usize = 5;
    pub const RUN_CODE: usize = 6;
}

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default task file name
pub const DEFAULT_INPUT_FILE: &str = "AllTask.csv";

/// Default directory for generated verification scripts
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default number of parallel workers
pub const DEFAULT_WORKERS: usize = 10;

/// Maximum number of parallel workers accepted by validation
pub const MAX_WORKERS: usize = 100;

/// Default executor client program
pub const DEFAULT_EXECUTOR_PROGRAM: &str = "ddb-exec";

/// Default database port
pub const DEFAULT_DB_PORT: u16 = 8848;

// =============================================================================
// Script Generation
// =============================================================================

/// Variable the task scripts assign their answer to
pub const RESULT_VARIABLE: &str = "result";

/// Variable the verification script recomputes the answer into
pub const EXPECTED_VARIABLE: &str = "result1";

/// Assertion fragments keyed by result kind
pub mod assertions {
    pub const VECTOR: &str = "assert(eqObj(result, result1))";
    pub const LIST: &str = "assert(each(eqObj, result, result1))";
    pub const SCALAR: &str = "assert(result == result1)";
    pub const TABLE: &str = "assert(each(eqObj, result1.values(), result.values()))";
}

/// Get the file name a verification script is saved under
pub fn script_filename(record_id: &str) -> String {
    record_id.trim().to_string()
}
