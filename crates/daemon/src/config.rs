//! Daemon configuration from `DDBACKUP_*` environment variables

use anyhow::{Context, Result};
use ddbackup_api_http::HttpServerConfig;
use ddbackup_core::domain::BackupCommand;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "./config/devices.db";

/// Variables the backup pipeline may see (ssh needs HOME and the agent socket)
const EXECUTOR_ENV_ALLOWLIST: [&str; 4] = ["PATH", "HOME", "USER", "SSH_AUTH_SOCK"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: PathBuf,
    pub http: HttpServerConfig,
    pub backup_command: BackupCommand,
    pub log_format: LogFormat,
    pub env_allowlist: Vec<String>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DDBACKUP_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = PathBuf::from(shellexpand::tilde(&db_path).into_owned());

        let mut http = HttpServerConfig::default();
        if let Some(host) = lookup("DDBACKUP_HTTP_HOST") {
            http.host = host;
        }
        if let Some(raw) = lookup("DDBACKUP_HTTP_PORT") {
            http.port = raw
                .parse()
                .with_context(|| format!("DDBACKUP_HTTP_PORT is not a port number: {}", raw))?;
        }
        if let Some(dir) = lookup("DDBACKUP_STATIC_DIR") {
            http.static_dir = PathBuf::from(shellexpand::tilde(&dir).into_owned());
        }

        let defaults = BackupCommand::default();
        let backup_command = BackupCommand {
            source_device: lookup("DDBACKUP_SOURCE_DEVICE").unwrap_or(defaults.source_device),
            block_size: lookup("DDBACKUP_BLOCK_SIZE").unwrap_or(defaults.block_size),
        };

        let log_format = match lookup("DDBACKUP_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            db_path,
            http,
            backup_command,
            log_format,
            env_allowlist: EXECUTOR_ENV_ALLOWLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
    }
}
