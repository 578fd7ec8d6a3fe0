// Remote Executor Port
// Abstraction over the external capability that runs the remote copy pipeline

use async_trait::async_trait;
use thiserror::Error;

/// Result of running one command line
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors (BackupExecutionError)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Command exited with status {exit_code:?}: {stderr}")]
    NonZeroExit {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Backup task panicked: {0}")]
    Panicked(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Remote Executor trait
///
/// Implementations:
/// - ShellExecutor: runs the command line through `sh -c`
/// - RecordingExecutor: test double that records command lines
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run a shell-like command line to completion
    ///
    /// A non-zero exit is reported as `Ok` with `ExecutionStatus::Failed`;
    /// `Err` means the command could not be run at all.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::IoError if collecting its output fails
    async fn run(&self, command: &str) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock executor behavior for a matching command
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit 0
        Success,
        /// Exit non-zero with stderr
        Fail(String),
        /// Could not start the process
        SpawnError(String),
        /// Panic inside the executor (for isolation testing)
        Panic(String),
        /// Never finish (until the runtime shuts down)
        Hang,
    }

    /// Records every command line; behavior is chosen by substring match
    pub struct RecordingExecutor {
        rules: Mutex<Vec<(String, MockBehavior)>>,
        default_behavior: MockBehavior,
        commands: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingExecutor {
        pub fn new(default_behavior: MockBehavior) -> Self {
            Self {
                rules: Mutex::new(Vec::new()),
                default_behavior,
                commands: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        /// Commands containing `pattern` (e.g. a host address) behave as given
        pub fn with_rule(self, pattern: impl Into<String>, behavior: MockBehavior) -> Self {
            self.rules.lock().unwrap().push((pattern.into(), behavior));
            self
        }

        pub fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.commands.lock().unwrap().len()
        }

        fn behavior_for(&self, command: &str) -> MockBehavior {
            self.rules
                .lock()
                .unwrap()
                .iter()
                .find(|(pattern, _)| command.contains(pattern.as_str()))
                .map(|(_, behavior)| behavior.clone())
                .unwrap_or_else(|| self.default_behavior.clone())
        }
    }

    #[async_trait]
    impl RemoteExecutor for RecordingExecutor {
        async fn run(&self, command: &str) -> Result<ExecutionResult, ExecutionError> {
            self.commands.lock().unwrap().push(command.to_string());
            let behavior = self.behavior_for(command);

            match behavior {
                MockBehavior::Success => Ok(ExecutionResult {
                    status: ExecutionStatus::Success,
                    duration_ms: 100,
                    exit_code: Some(0),
                    stdout: Some(String::new()),
                    stderr: Some(String::new()),
                }),
                MockBehavior::Fail(stderr) => Ok(ExecutionResult {
                    status: ExecutionStatus::Failed,
                    duration_ms: 100,
                    exit_code: Some(255),
                    stdout: Some(String::new()),
                    stderr: Some(stderr),
                }),
                MockBehavior::SpawnError(msg) => Err(ExecutionError::SpawnFailed(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for isolation testing
                }
                MockBehavior::Hang => std::future::pending().await,
            }
        }
    }
}
