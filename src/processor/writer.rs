//! Verification script output
//!
//! Scripts are written one file per task, named by the task id, into the
//! configured output directory. Existing files are overwritten.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::script_filename;
use crate::error::{Result, TaskError};

/// Writer for generated verification scripts
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    output_dir: PathBuf,
}

impl ScriptWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a task's script is written to
    pub fn script_path(&self, record_id: &str) -> Result<PathBuf> {
        let name = script_filename(record_id);

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(TaskError::execution(
                record_id,
                "record id cannot be used as a file name",
            ));
        }

        Ok(self.output_dir.join(name))
    }

    /// Save a script, creating the output directory if needed
    pub async fn save(&self, record_id: &str, script: &str) -> Result<PathBuf> {
        let path = self.script_path(record_id)?;

        fs::create_dir_all(&self.output_dir).await?;
        fs::write(&path, script).await?;

        debug!("Saved verification script to {}", path.display());
        Ok(path)
    }
}
