//! Configuration management and validation.
//!
//! Processing settings and executor connection settings are explicit
//! values passed into the stream and the worker pool. Nothing in the
//! library reads process-wide state; the CLI fills these in from
//! arguments and environment variables.

use crate::constants::{
    DEFAULT_DB_PORT, DEFAULT_EXECUTOR_PROGRAM, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR,
    DEFAULT_WORKERS, MAX_WORKERS,
};
use crate::error::{Result, TaskError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Connection settings for the script execution client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Client program that runs a script read from stdin
    pub program: String,

    /// Extra arguments passed to the client program
    pub args: Vec<String>,

    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database user
    pub user: String,

    /// Database password
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_EXECUTOR_PROGRAM.to_string(),
            args: Vec::new(),
            host: "localhost".to_string(),
            port: DEFAULT_DB_PORT,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl ExecutorConfig {
    /// Environment handed to the client program
    pub fn connection_env(&self) -> Vec<(&'static str, String)> {
        vec![
            ("DDB_HOST", self.host.clone()),
            ("DDB_PORT", self.port.to_string()),
            ("DDB_USER", self.user.clone()),
            ("DDB_PASSWD", self.password.clone()),
        ]
    }
}

/// Global configuration for task processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Task file to read
    pub input_path: PathBuf,

    /// Owner whose records are processed
    pub owner_filter: String,

    /// Directory for generated verification scripts
    pub output_dir: PathBuf,

    /// Number of parallel workers
    pub workers: usize,

    /// Capacity of the bounded work queue between stream and workers
    pub queue_capacity: usize,

    /// Show a progress spinner while processing
    pub show_progress: bool,

    /// Script execution client settings
    pub executor: ExecutorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_FILE),
            owner_filter: String::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_WORKERS * 2,
            show_progress: false,
            executor: ExecutorConfig::default(),
        }
    }
}

impl Config {
    /// Create configuration for an input file and owner
    pub fn new(input_path: impl Into<PathBuf>, owner_filter: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            owner_filter: owner_filter.into(),
            ..Self::default()
        }
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the worker count; the queue keeps two slots per worker
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self.queue_capacity = workers.saturating_mul(2).max(1);
        self
    }

    /// Size the workers to the available CPU cores
    pub fn with_auto_workers(self) -> Self {
        let workers = num_cpus::get().clamp(1, MAX_WORKERS);
        self.with_workers(workers)
    }

    /// Set the work queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Enable the progress spinner
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Configure the execution client
    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.owner_filter.trim().is_empty() {
            return Err(TaskError::configuration("Owner filter cannot be empty"));
        }

        if self.owner_filter.trim() != self.owner_filter {
            return Err(TaskError::configuration(format!(
                "Owner filter '{}' has surrounding whitespace and would never match",
                self.owner_filter
            )));
        }

        if self.workers == 0 {
            return Err(TaskError::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.workers > MAX_WORKERS {
            return Err(TaskError::configuration(format!(
                "Number of workers cannot exceed {}",
                MAX_WORKERS
            )));
        }

        if self.queue_capacity == 0 {
            return Err(TaskError::configuration(
                "Queue capacity must be greater than 0",
            ));
        }

        if self.executor.program.trim().is_empty() {
            return Err(TaskError::configuration(
                "Executor program cannot be empty",
            ));
        }

        debug!(
            "Configuration valid: owner='{}', workers={}, queue={}",
            self.owner_filter, self.workers, self.queue_capacity
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input_path, PathBuf::from("AllTask.csv"));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.workers, 10);
        assert_eq!(config.queue_capacity, 20);
        assert_eq!(config.executor.port, 8848);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new("tasks.csv", "Alice")
            .with_output_dir("/tmp/scripts")
            .with_workers(3)
            .with_progress();

        assert_eq!(config.owner_filter, "Alice");
        assert_eq!(config.workers, 3);
        assert_eq!(config.queue_capacity, 6);
        assert!(config.show_progress);
        assert!(config.validate().is_ok());

        let config = config.with_queue_capacity(1);
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_auto_workers_within_bounds() {
        let config = Config::new("tasks.csv", "Alice").with_auto_workers();
        assert!(config.workers >= 1 && config.workers <= MAX_WORKERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(Config::default().validate().is_err());
        assert!(Config::new("t.csv", " Alice").validate().is_err());
        assert!(Config::new("t.csv", "Alice").with_workers(0).validate().is_err());
        assert!(Config::new("t.csv", "Alice").with_workers(101).validate().is_err());
        assert!(
            Config::new("t.csv", "Alice")
                .with_queue_capacity(0)
                .validate()
                .is_err()
        );

        let executor = ExecutorConfig {
            program: "  ".to_string(),
            ..ExecutorConfig::default()
        };
        let result = Config::new("t.csv", "Alice").with_executor(executor).validate();
        assert!(matches!(result, Err(TaskError::Configuration { .. })));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let executor = ExecutorConfig {
            password: "secret".to_string(),
            ..ExecutorConfig::default()
        };
        let json = serde_json::to_string(&executor).unwrap();
        assert!(!json.contains("secret"));

        let env = executor.connection_env();
        assert!(env.contains(&("DDB_PASSWD", "secret".to_string())));
        assert!(env.contains(&("DDB_PORT", "8848".to_string())));
    }
}
