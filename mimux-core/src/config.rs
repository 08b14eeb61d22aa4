//! The two environment-variable knobs spec'd in spec.md §6, read with the
//! same "invalid value logs and falls back to the default" behavior as the
//! original's `readIntFromEnv` macro.

use std::time::Duration;

/// Default timeout passed to the OS readiness primitive, in milliseconds.
/// `-1` would mean "wait indefinitely"; the implementation default here is
/// a small positive timeout so a lossy readiness primitive can't wedge the
/// loop forever.
pub const DEFAULT_POLL_TIMEOUT_MSEC: i32 = 1000;

/// Default sleep, in microseconds, when no forward progress is currently
/// possible (every output busy, nothing readable).
pub const DEFAULT_THROTTLE_SLEEP_USEC: u64 = 1000;

/// Runtime configuration for [`crate::run`], normally built via
/// [`Config::from_env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub poll_timeout_msec: i32,
    pub throttle_sleep: Duration,
}

impl Config {
    /// Reads `POLL_TIMEOUT_MSEC` and `THROTTLE_SLEEP_USEC` from the
    /// environment, falling back to the implementation defaults (and
    /// logging a warning) for missing or out-of-range values.
    pub fn from_env() -> Self {
        Self {
            poll_timeout_msec: read_env_int(
                "POLL_TIMEOUT_MSEC",
                DEFAULT_POLL_TIMEOUT_MSEC as i64,
                |v| v >= -1,
            ) as i32,
            throttle_sleep: Duration::from_micros(read_env_int(
                "THROTTLE_SLEEP_USEC",
                DEFAULT_THROTTLE_SLEEP_USEC as i64,
                |v| v >= 0,
            ) as u64),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_timeout_msec: DEFAULT_POLL_TIMEOUT_MSEC,
            throttle_sleep: Duration::from_micros(DEFAULT_THROTTLE_SLEEP_USEC),
        }
    }
}

fn read_env_int(name: &str, default: i64, condition: impl Fn(i64) -> bool) -> i64 {
    let Ok(raw) = std::env::var(name) else {
        return default;
    };
    match raw.parse::<i64>() {
        Ok(value) if condition(value) => {
            tracing::debug!(%name, value, "read config from environment");
            value
        }
        Ok(value) => {
            tracing::warn!(%name, value, default, "invalid value, using default");
            default
        }
        Err(_) => {
            tracing::warn!(%name, raw, default, "unparseable value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_timeout_msec, DEFAULT_POLL_TIMEOUT_MSEC);
        assert_eq!(
            config.throttle_sleep,
            Duration::from_micros(DEFAULT_THROTTLE_SLEEP_USEC)
        );
    }
}
