// Schedule Domain Constants

/// Expression stored on first boot: daily at 02:00
pub const DEFAULT_CRON: &str = "0 2 * * *";

/// The schedule table holds exactly one row with this id
pub const SCHEDULE_ROW_ID: i64 = 1;
