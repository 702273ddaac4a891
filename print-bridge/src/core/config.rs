use std::time::Duration;

use chrono_tz::Tz;

use crate::printing::RetryPolicy;

const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Istanbul;

/// Bridge configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Settings and state directory |
/// | HTTP_PORT | 3005 | HTTP API port |
/// | PROBE_TIMEOUT_MS | 3000 | Bound on a single address probe |
/// | WRITE_TIMEOUT_MS | 10000 | Bound on transmitting one ticket |
/// | PRINT_MAX_RETRIES | 2 | Retries after the first failed attempt |
/// | PRINT_RETRY_BACKOFF_MS | 250 | Linear backoff step between attempts |
/// | PAPER_WIDTH | 48 | Characters per line (80mm = 48, 58mm = 32) |
/// | TIMEZONE | Europe/Istanbul | Ticket timestamp zone |
/// | LOG_LEVEL | info | Default log filter |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | Daily rolling log files instead of stdout |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/var/lib/masa HTTP_PORT=3005 cargo run -p print-bridge
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub probe_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub print_max_retries: u32,
    pub print_retry_backoff_ms: u64,
    pub paper_width: usize,
    /// IANA zone name, e.g. `Europe/Istanbul`
    pub timezone: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3005),
            probe_timeout_ms: env_or("PROBE_TIMEOUT_MS", 3000),
            write_timeout_ms: env_or("WRITE_TIMEOUT_MS", 10_000),
            print_max_retries: env_or("PRINT_MAX_RETRIES", 2),
            print_retry_backoff_ms: env_or("PRINT_RETRY_BACKOFF_MS", 250),
            paper_width: env_or("PAPER_WIDTH", 48),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.name().into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
        }
    }

    /// Override work dir and port, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.print_max_retries,
            backoff: Duration::from_millis(self.print_retry_backoff_ms),
        }
    }

    /// Ticket time zone, Europe/Istanbul when the name is unknown
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "Unknown time zone, using {}", DEFAULT_TIMEZONE.name());
            DEFAULT_TIMEZONE
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_fallback() {
        let mut config = Config::with_overrides("/tmp/masa", 0);
        config.timezone = "Mars/Olympus".into();
        assert_eq!(config.tz(), chrono_tz::Europe::Istanbul);

        config.timezone = "Asia/Shanghai".into();
        assert_eq!(config.tz(), chrono_tz::Asia::Shanghai);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let mut config = Config::with_overrides("/tmp/masa", 0);
        config.print_max_retries = 3;
        config.print_retry_backoff_ms = 100;
        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay(2), Duration::from_millis(200));
    }
}
