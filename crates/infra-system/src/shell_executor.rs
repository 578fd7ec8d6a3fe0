// Shell executor: runs the backup pipeline as a child process
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use ddbackup_core::port::remote_executor::{
    ExecutionError, ExecutionResult, ExecutionStatus, RemoteExecutor,
};
use ddbackup_core::port::TimeProvider;

/// Interpreter used when none is configured
pub const DEFAULT_SHELL: &str = "sh";

/// Shell executor
/// Spawns `sh -c <command line>` with an allowlisted environment
pub struct ShellExecutor {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
    shell: String,
}

impl ShellExecutor {
    /// Create a new shell executor
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    /// * `env_allowlist` - Variables passed through from the daemon's environment
    ///
    /// # Example
    /// ```ignore
    /// let executor = ShellExecutor::new(
    ///     Arc::new(SystemTimeProvider),
    ///     vec!["PATH".to_string(), "HOME".to_string(), "SSH_AUTH_SOCK".to_string()],
    /// );
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>, env_allowlist: Vec<String>) -> Self {
        Self {
            time_provider,
            env_allowlist,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Use a different interpreter (must accept `-c <line>`)
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Filter environment variables to allowlist only
    fn filter_env(&self, env: &HashMap<String, String>) -> HashMap<String, String> {
        env.iter()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(&self, command: &str) -> Result<std::process::Output, ExecutionError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let filtered_env = self.filter_env(&env);

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .env_clear()
            .envs(&filtered_env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(e.to_string()))?;

        child
            .wait_with_output()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Build execution result from process output
    fn build_result(&self, output: std::process::Output, duration_ms: i64) -> ExecutionResult {
        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        ExecutionResult {
            status,
            exit_code: output.status.code(),
            duration_ms,
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        }
    }
}

#[async_trait]
impl RemoteExecutor for ShellExecutor {
    async fn run(&self, command: &str) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now();

        debug!(shell = %self.shell, command = %command, "Starting shell execution");

        let output = self.spawn_and_wait(command).await?;

        let duration_ms = (self.time_provider.now() - start_time).num_milliseconds();
        let result = self.build_result(output, duration_ms);

        info!(
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Shell execution completed"
        );

        Ok(result)
    }
}
