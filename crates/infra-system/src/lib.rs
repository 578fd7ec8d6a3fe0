// ddbackup Infrastructure - System Adapters
// Implements: RemoteExecutor

pub mod shell_executor;

pub use shell_executor::ShellExecutor;
