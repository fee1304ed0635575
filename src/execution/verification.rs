//! Verification script synthesis
//!
//! A verification script re-runs the task code with its answer variable
//! renamed, then asserts that the recomputed value equals the one the
//! engine produced.

use super::result::ResultValue;
use crate::constants::{EXPECTED_VARIABLE, RESULT_VARIABLE, assertions};

/// Build the script that is sent to the engine for a task
///
/// Surrounding whitespace and stray quote characters are stripped from both
/// code blocks; the script evaluates `result` last so the engine returns it.
pub fn run_script(prepare_code: &str, run_code: &str) -> String {
    format!(
        "{}\n{}\n{}\n",
        strip_script_quotes(prepare_code),
        strip_script_quotes(run_code),
        RESULT_VARIABLE
    )
}

/// Trim whitespace and any surrounding `"` or `'` characters
pub fn strip_script_quotes(code: &str) -> &str {
    code.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Assertion line for a result kind
pub fn assertion_for(result: &ResultValue) -> &'static str {
    match result {
        ResultValue::Vector(_) => assertions::VECTOR,
        ResultValue::List(_) => assertions::LIST,
        ResultValue::Scalar(_) => assertions::SCALAR,
        ResultValue::Table(_) => assertions::TABLE,
    }
}

/// Generate a self-checking script for a task and its engine result
///
/// Every occurrence of `result` in the code is renamed to `result1`,
/// including occurrences inside longer identifiers.
pub fn verification_script(prepare_code: &str, run_code: &str, result: &ResultValue) -> String {
    let prepare = prepare_code.replace(RESULT_VARIABLE, EXPECTED_VARIABLE);
    let run = run_code.replace(RESULT_VARIABLE, EXPECTED_VARIABLE);

    format!("{}\n{}\n{}", prepare, run, assertion_for(result))
}
