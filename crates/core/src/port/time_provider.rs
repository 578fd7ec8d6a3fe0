// Time Provider Port (for testability)

use chrono::{DateTime, Utc};

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub mod mocks {
    use super::*;

    /// Always returns the same instant
    pub struct FixedTimeProvider(pub DateTime<Utc>);

    impl TimeProvider for FixedTimeProvider {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Wall clock that follows tokio's (pausable) clock from a fixed origin.
    ///
    /// With `tokio::time::pause()`, `tokio::time::advance` moves this clock and the
    /// trigger's sleeps together, so cron firings can be tested without waiting.
    pub struct TokioClock {
        origin: DateTime<Utc>,
        started: tokio::time::Instant,
    }

    impl TokioClock {
        pub fn starting_at(origin: DateTime<Utc>) -> Self {
            Self {
                origin,
                started: tokio::time::Instant::now(),
            }
        }
    }

    impl TimeProvider for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = self.started.elapsed();
            self.origin + chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero())
        }
    }
}
