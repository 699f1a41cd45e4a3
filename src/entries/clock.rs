use chrono::Utc;
use uuid::Uuid;

/// Source of entry timestamps, in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Source of entry identifiers. Every call must return an id that was never
/// handed out before, including ids of entries that have since been removed.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
pub(crate) mod fixed {
    use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

    use super::{Clock, IdGenerator};

    /// Clock that starts at a fixed instant and advances by `step_ms` per read.
    pub struct SteppingClock {
        next: AtomicI64,
        step_ms: i64,
    }

    impl SteppingClock {
        pub fn new(start_ms: i64, step_ms: i64) -> Self {
            Self {
                next: AtomicI64::new(start_ms),
                step_ms,
            }
        }

        pub fn frozen(at_ms: i64) -> Self {
            Self::new(at_ms, 0)
        }
    }

    impl Clock for SteppingClock {
        fn now_ms(&self) -> i64 {
            self.next.fetch_add(self.step_ms, Ordering::SeqCst)
        }
    }

    /// Yields `entry-1`, `entry-2`, ...
    #[derive(Default)]
    pub struct SequentialIds {
        counter: AtomicU64,
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("entry-{n}")
        }
    }
}
