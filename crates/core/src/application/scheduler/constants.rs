// Scheduler constants (no magic values)
use std::time::Duration;

/// Longest single sleep of the trigger loop.
/// The wall clock is re-read after each sleep, so clock adjustments are picked up within this window.
pub const MAX_TRIGGER_SLEEP: Duration = Duration::from_secs(60);
