//! Transform configuration.

use chrono::{DateTime, Utc};

/// `toUTCString`-style rendering, e.g. `Sat, 17 Oct 2026 12:00:00 GMT`.
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Source of `data.timestamp` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// Always the same instant (replay, tests).
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Current instant according to this clock.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// Current instant rendered as a node timestamp.
    pub fn timestamp(&self) -> String {
        format_timestamp(&self.now())
    }
}

/// Render an instant as a node timestamp.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Configuration shared by all transforms of a `Transformer`.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Salt prefixed to every digest step. Empty in production use.
    pub salt: String,
    /// Timestamp source.
    pub clock: Clock,
}

impl TransformConfig {
    /// Default configuration: no salt, system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest salt.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Set the timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 5).unwrap();
        assert_eq!(format_timestamp(&at), "Sat, 17 Oct 2026 12:00:05 GMT");
    }

    #[test]
    fn test_fixed_clock() {
        let at = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let clock = Clock::Fixed(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.timestamp(), "Thu, 02 Jan 2020 03:04:05 GMT");
    }

    #[test]
    fn test_config_defaults() {
        let config = TransformConfig::default();
        assert!(config.salt.is_empty());
        assert_eq!(config.clock, Clock::System);

        let config = TransformConfig::new().with_salt("s");
        assert_eq!(config.salt, "s");
    }
}
