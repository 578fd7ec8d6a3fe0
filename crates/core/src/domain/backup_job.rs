// Backup Job Domain Model (transient, never persisted)

use crate::domain::Device;
use crate::port::ExecutionError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;

/// Job ID (UUID v4)
pub type JobId = String;

/// Shape of the remote copy pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupCommand {
    /// Raw block device read on the remote host
    pub source_device: String,
    /// `bs=` operand for the remote `dd`
    pub block_size: String,
}

impl Default for BackupCommand {
    fn default() -> Self {
        Self {
            source_device: "/dev/mmcblk0".to_string(),
            block_size: "1M".to_string(),
        }
    }
}

impl BackupCommand {
    /// Remote read -> compress -> stream into a local file
    ///
    /// Every operand is shell-quoted; the remote half is quoted twice since it
    /// passes through the local shell and then the remote one. `--` keeps a
    /// user name starting with `-` from being read as an ssh option.
    ///
    /// # Errors
    /// - ExecutionError::InvalidCommand if an operand cannot be quoted (NUL byte)
    pub fn render(&self, device: &Device, local_output: &str) -> Result<String, ExecutionError> {
        let remote = format!(
            "sudo dd {} {} | gzip -",
            quote(&format!("if={}", self.source_device))?,
            quote(&format!("bs={}", self.block_size))?,
        );

        Ok(format!(
            "ssh -- {} {} | dd {}",
            quote(&device.ssh_target())?,
            quote(&remote)?,
            quote(&format!("of={}", local_output))?,
        ))
    }
}

fn quote(operand: &str) -> Result<Cow<'_, str>, ExecutionError> {
    shlex::try_quote(operand)
        .map_err(|_| ExecutionError::InvalidCommand(format!("cannot quote {:?}", operand)))
}

/// `~/backup-<timestamp>.gz` with `:` and `.` replaced so the name is filesystem-safe
pub fn format_output_file(at: &DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("~/backup-{}.gz", stamp)
}

/// One device's backup attempt for one scheduler tick
#[derive(Debug, Clone)]
pub struct BackupJob {
    pub id: JobId,
    pub device: Device,
    /// Always derived from `started_at`; the device's own hint is ignored
    pub output_file: String,
    /// Shell command line handed to the executor
    pub command: String,
    pub started_at: DateTime<Utc>,
}

impl BackupJob {
    pub fn new(
        id: JobId,
        device: Device,
        started_at: DateTime<Utc>,
        command: &BackupCommand,
    ) -> Result<Self, ExecutionError> {
        let output_file = format_output_file(&started_at);
        // Resolve `~` here so the pipeline does not rely on the shell's tilde rules
        let local_output = shellexpand::tilde(&output_file).into_owned();
        let command = command.render(&device, &local_output)?;

        Ok(Self {
            id,
            device,
            output_file,
            command,
            started_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewDevice;
    use chrono::TimeZone;

    #[test]
    fn test_output_file_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 2, 0, 0).unwrap();
        assert_eq!(
            format_output_file(&at),
            "~/backup-2024-01-15T02-00-00-000Z.gz"
        );
    }

    #[test]
    fn test_output_file_keeps_milliseconds() {
        let at = Utc.timestamp_millis_opt(1_705_284_000_123).unwrap();
        assert_eq!(
            format_output_file(&at),
            "~/backup-2024-01-15T02-00-00-123Z.gz"
        );
    }

    #[test]
    fn test_job_ignores_device_output_hint() {
        let device = NewDevice::new("pi", "10.0.0.5", "/mnt/custom.img").with_id(1);
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 2, 0, 0).unwrap();

        let job =
            BackupJob::new("job-1".to_string(), device, at, &BackupCommand::default()).unwrap();

        assert_eq!(job.output_file, "~/backup-2024-01-15T02-00-00-000Z.gz");
        assert!(!job.command.contains("/mnt/custom.img"));
    }

    #[test]
    fn test_command_pipeline() {
        let device = NewDevice::new("pi", "10.0.0.5", "").with_id(1);
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 2, 0, 0).unwrap();

        let job =
            BackupJob::new("job-1".to_string(), device, at, &BackupCommand::default()).unwrap();

        let words = shlex::split(&job.command).unwrap();
        assert_eq!(
            words[..6],
            [
                "ssh",
                "--",
                "pi@10.0.0.5",
                "sudo dd if=/dev/mmcblk0 bs=1M | gzip -",
                "|",
                "dd"
            ]
        );
        assert_eq!(words.len(), 7);
        assert!(words[6].starts_with("of="));
        assert!(words[6].ends_with("backup-2024-01-15T02-00-00-000Z.gz"));
    }

    #[test]
    fn test_custom_source_device() {
        let device = NewDevice::new("root", "nas.local", "").with_id(2);
        let command = BackupCommand {
            source_device: "/dev/sda".to_string(),
            block_size: "4M".to_string(),
        };

        let rendered = command.render(&device, "/tmp/out.gz").unwrap();

        let words = shlex::split(&rendered).unwrap();
        assert_eq!(
            words,
            [
                "ssh",
                "--",
                "root@nas.local",
                "sudo dd if=/dev/sda bs=4M | gzip -",
                "|",
                "dd",
                "of=/tmp/out.gz"
            ]
        );
    }

    #[test]
    fn test_shell_metacharacters_stay_inside_one_argument() {
        let device = NewDevice::new("pi", "10.0.0.5 true; touch /tmp/pwned;", "").with_id(3);
        let command = BackupCommand {
            source_device: "/dev/sda; reboot".to_string(),
            block_size: "1M".to_string(),
        };

        let rendered = command.render(&device, "/tmp/out $(id).gz").unwrap();

        let words = shlex::split(&rendered).unwrap();
        assert_eq!(words.len(), 7);
        assert_eq!(words[2], "pi@10.0.0.5 true; touch /tmp/pwned;");
        assert_eq!(words[6], "of=/tmp/out $(id).gz");

        // The remote shell sees the device path as one word too
        let remote = shlex::split(&words[3]).unwrap();
        assert_eq!(
            remote,
            ["sudo", "dd", "if=/dev/sda; reboot", "bs=1M", "|", "gzip", "-"]
        );
    }

    #[test]
    fn test_nul_byte_rejected() {
        let device = NewDevice::new("pi", "10.0.0.5\0", "").with_id(4);

        let result = BackupCommand::default().render(&device, "/tmp/out.gz");

        assert!(matches!(result, Err(ExecutionError::InvalidCommand(_))));
    }
}
