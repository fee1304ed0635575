//! Executor backed by an external client program
//!
//! The client receives connection settings in `DDB_*` environment variables
//! and the script on stdin. It must print one JSON document on stdout:
//! `{"ok": true, "value": ...}` or `{"ok": false, "error": "..."}`.

use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::executor::{ExecutionOutcome, ExecutorFactory, ScriptExecutor};
use crate::config::ExecutorConfig;
use crate::error::{Result, TaskError};

#[derive(Debug, Deserialize)]
struct ClientResponse {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Factory handing each worker its own command executor
#[derive(Debug, Clone)]
pub struct CommandExecutorFactory {
    config: ExecutorConfig,
}

impl CommandExecutorFactory {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }
}

impl ExecutorFactory for CommandExecutorFactory {
    type Executor = CommandExecutor;

    fn connect(&self, worker_id: usize) -> Result<CommandExecutor> {
        debug!(
            "Worker {} using client '{}' for {}:{}",
            worker_id, self.config.program, self.config.host, self.config.port
        );
        Ok(CommandExecutor::new(self.config.clone()))
    }
}

/// Runs each script through one invocation of the client program
#[derive(Debug)]
pub struct CommandExecutor {
    config: ExecutorConfig,
}

impl CommandExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    fn parse_response(stdout: &[u8]) -> Result<ExecutionOutcome> {
        let response: ClientResponse = serde_json::from_slice(stdout)?;

        if response.ok {
            Ok(ExecutionOutcome::Success(response.value))
        } else {
            Ok(ExecutionOutcome::Failure(
                response
                    .error
                    .unwrap_or_else(|| "script could not be run".to_string()),
            ))
        }
    }
}

impl ScriptExecutor for CommandExecutor {
    async fn execute(&mut self, script: &str) -> Result<ExecutionOutcome> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .envs(self.config.connection_env())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TaskError::configuration(format!(
                    "Failed to start executor '{}': {}",
                    self.config.program, e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(script.as_bytes()).await {
                Ok(()) => {}
                // The client may exit without reading the whole script.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    warn!("Executor closed stdin early");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("executor exited with {}", output.status)
            } else {
                stderr
            };
            return Ok(ExecutionOutcome::Failure(message));
        }

        Self::parse_response(&output.stdout)
    }
}
