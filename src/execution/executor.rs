//! Script executor abstractions
//!
//! Workers never share an executor: each one asks the factory for its own
//! connection and keeps it for the lifetime of the worker.

use serde_json::Value;
use std::future::Future;

use crate::error::Result;

/// What the engine reported for one script
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The script ran; carries the value of `result`
    Success(Value),
    /// The engine rejected or failed to run the script
    Failure(String),
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success(_))
    }
}

/// A connection that can run scripts against the engine
pub trait ScriptExecutor: Send + 'static {
    /// Run a script and report its result
    ///
    /// `Err` means the executor itself failed (spawn, I/O, malformed
    /// response); a script the engine could not run is `Ok(Failure)`.
    fn execute(&mut self, script: &str) -> impl Future<Output = Result<ExecutionOutcome>> + Send;
}

/// Creates one executor per worker
pub trait ExecutorFactory: Send + Sync + 'static {
    type Executor: ScriptExecutor;

    fn connect(&self, worker_id: usize) -> Result<Self::Executor>;
}
