//! Time types for Scriptorium.
//!
//! Wall clock time is metadata only; it never feeds execution logic.

use serde::{Deserialize, Serialize};

/// Wall clock timestamp - for version metadata, not for execution logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub seconds: u64,
    /// Nanosecond remainder
    pub nanos: u32,
}

impl Timestamp {
    /// Maximum nanoseconds per second
    pub const NANOS_PER_SEC: u32 = 1_000_000_000;

    /// Create a new timestamp
    #[must_use]
    pub const fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Get current timestamp
    #[allow(clippy::missing_panics_doc)]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards");
        Self {
            seconds: duration.as_secs(),
            nanos: duration.subsec_nanos(),
        }
    }

    /// Convert to milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u128 {
        self.seconds as u128 * 1_000 + self.nanos as u128 / 1_000_000
    }

    /// Milliseconds elapsed since another timestamp (saturating)
    #[must_use]
    pub fn millis_since(&self, earlier: &Timestamp) -> u128 {
        self.as_millis().saturating_sub(earlier.as_millis())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_as_millis() {
        let t = Timestamp::new(2, 500_000_000);
        assert_eq!(t.as_millis(), 2_500);
    }

    #[test]
    fn test_timestamp_ord() {
        let t1 = Timestamp::new(100, 0);
        let t2 = Timestamp::new(100, 1);
        let t3 = Timestamp::new(101, 0);

        assert!(t1 < t2);
        assert!(t2 < t3);
    }

    #[test]
    fn test_millis_since() {
        let t1 = Timestamp::new(100, 0);
        let t2 = Timestamp::new(101, 500_000_000);

        assert_eq!(t2.millis_since(&t1), 1_500);
        // Saturates instead of underflowing
        assert_eq!(t1.millis_since(&t2), 0);
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let t1 = Timestamp::now();
        let t2 = Timestamp::now();
        assert!(t2 >= t1);
    }
}
