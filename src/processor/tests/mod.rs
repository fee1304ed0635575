//! Integration tests for the processor module
//!
//! Runs the worker pool against temporary task files with an in-memory
//! executor standing in for the database engine.


use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::execution::{ExecutionOutcome, ExecutorFactory, ScriptExecutor};

/// Mock engine: the answer depends on markers in the script text
#[derive(Debug, Clone, Default)]
pub struct MockExecutorFactory {
    pub connections: Arc<AtomicUsize>,
    pub scripts: Arc<Mutex<Vec<String>>>,
    /// Workers with an id below this are refused a connection
    pub refused_workers: usize,
}

impl MockExecutorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self::refusing_first(usize::MAX)
    }

    pub fn refusing_first(refused_workers: usize) -> Self {
        Self {
            refused_workers,
            ..Self::default()
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn executed_scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl ExecutorFactory for MockExecutorFactory {
    type Executor = MockExecutor;

    fn connect(&self, worker_id: usize) -> Result<MockExecutor> {
        if worker_id < self.refused_workers {
            return Err(TaskError::configuration(format!(
                "worker {} could not connect",
                worker_id
            )));
        }
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(MockExecutor {
            scripts: self.scripts.clone(),
        })
    }
}

pub struct MockExecutor {
    scripts: Arc<Mutex<Vec<String>>>,
}

impl ScriptExecutor for MockExecutor {
    async fn execute(&mut self, script: &str) -> Result<ExecutionOutcome> {
        self.scripts.lock().unwrap().push(script.to_string());

        if script.contains("explode") {
            panic!("engine client aborted");
        }
        if script.contains("crash") {
            return Err(TaskError::Io(std::io::Error::other("engine connection lost")));
        }
        if script.contains("syntaxError") {
            return Ok(ExecutionOutcome::Failure("Syntax Error: [line #1]".to_string()));
        }

        let value = if script.contains("vector") {
            json!([1, 2, 3])
        } else if script.contains("table") {
            json!({"sym": ["A"], "price": [1.5]})
        } else if script.contains("string") {
            json!("text")
        } else {
            json!(42)
        };
        Ok(ExecutionOutcome::Success(value))
    }
}

/// One task record in file format
pub fn task_record(id: &str, owner: &str, prepare: &str, run: &str) -> String {
    format!(
        "{},{},no,fn{},\"Question {}?\",```\n{}\n```,```\n{}\n```\n",
        id, owner, id, id, prepare, run
    )
}

/// Write a task file into `dir`
pub fn write_task_file(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("AllTask.csv");
    std::fs::write(&path, content).unwrap();
    path
}

/// Configuration writing scripts under `dir/output`
pub fn test_config(input: &Path, dir: &Path, owner: &str, workers: usize) -> Config {
    Config::new(input, owner)
        .with_output_dir(dir.join("output"))
        .with_workers(workers)
}
