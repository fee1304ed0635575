//! Script execution and verification script generation
//!
//! - [`executor`] - executor and factory traits
//! - [`command`] - executor backed by an external client program
//! - [`result`] - closed set of engine result kinds
//! - [`verification`] - run-script assembly and verification script synthesis

pub mod command;
pub mod executor;
pub mod result;
pub mod verification;

pub use command::{CommandExecutor, CommandExecutorFactory};
pub use executor::{ExecutionOutcome, ExecutorFactory, ScriptExecutor};
pub use result::ResultValue;
pub use verification::{run_script, verification_script};
