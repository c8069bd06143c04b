//! # Logging configuration.
//!
//! [`LogConfig`] is parsed once at startup and frozen into the logger. The
//! output destination is chosen by a small textual convention borrowed from
//! operator-facing config files:
//!
//! - `CONSOLE` — stdout
//! - `SYSLOG` — the local syslog socket (unix only)
//! - a string starting with `.` or `/` — a file path
//! - anything containing `:` — a `host:port` TCP collector

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::logging::level::{LogLevel, Subsystem};

/// Where formatted log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Standard output.
    Console,
    /// Local syslog socket. Falls back to console on non-unix platforms.
    Syslog,
    /// Append to a file.
    File(PathBuf),
    /// Remote TCP collector; reconnects in the background on failure.
    Tcp { host: String, port: u16 },
}

impl FromStr for LogOutput {
    type Err = LogConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LogConfigError::UnknownOutput {
                value: String::new(),
            });
        }
        if s.eq_ignore_ascii_case("CONSOLE") {
            return Ok(LogOutput::Console);
        }
        if s.eq_ignore_ascii_case("SYSLOG") {
            return Ok(LogOutput::Syslog);
        }
        if s.starts_with('.') || s.starts_with('/') {
            return Ok(LogOutput::File(PathBuf::from(s)));
        }
        if let Some((host, port)) = s.rsplit_once(':') {
            let port = port.parse::<u16>().map_err(|_| LogConfigError::BadPort {
                value: s.to_owned(),
            })?;
            if host.is_empty() {
                return Err(LogConfigError::UnknownOutput {
                    value: s.to_owned(),
                });
            }
            return Ok(LogOutput::Tcp {
                host: host.to_owned(),
                port,
            });
        }
        Err(LogConfigError::UnknownOutput {
            value: s.to_owned(),
        })
    }
}

/// Errors from parsing operator-supplied logging settings.
#[derive(Error, Debug)]
pub enum LogConfigError {
    #[error("unknown log level {value:?}")]
    UnknownLevel { value: String },

    #[error("unknown log output {value:?} (expected CONSOLE, SYSLOG, a path, or host:port)")]
    UnknownOutput { value: String },

    #[error("bad port in log output {value:?}")]
    BadPort { value: String },
}

impl LogConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LogConfigError::UnknownLevel { .. } => "log_unknown_level",
            LogConfigError::UnknownOutput { .. } => "log_unknown_output",
            LogConfigError::BadPort { .. } => "log_bad_port",
        }
    }
}

/// Frozen logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Destination for formatted lines.
    pub output: LogOutput,

    /// When false, the fully synchronous strategy is used: each record is
    /// formatted and written inline by the calling thread. When true, records
    /// are staged in the bounded pool and flushed by the log task.
    pub asynchronous: bool,

    /// Emit ANSI colors (console output only).
    pub color: bool,

    /// Short application tag stamped on every line.
    pub app_name: String,

    /// Threshold applied to subsystems without an explicit override.
    pub default_level: LogLevel,

    /// Per-subsystem threshold overrides.
    pub levels: Vec<(Subsystem, LogLevel)>,

    /// Number of preallocated records in the staging pool.
    pub pool_size: usize,

    /// Period of the log task's flush timer.
    pub flush_period: Duration,

    /// Period of the TCP reconnect timer.
    pub connect_period: Duration,
}

impl LogConfig {
    /// Pool size clamped to at least one record.
    #[inline]
    pub fn pool_size_clamped(&self) -> usize {
        self.pool_size.max(1)
    }
}

impl Default for LogConfig {
    /// Console output, asynchronous staging, colors off, `INFO` everywhere,
    /// a 1024-record pool, 50 ms flush period, 2 s reconnect period.
    fn default() -> Self {
        Self {
            output: LogOutput::Console,
            asynchronous: true,
            color: false,
            app_name: "MME".to_owned(),
            default_level: LogLevel::Info,
            levels: Vec::new(),
            pool_size: 1024,
            flush_period: Duration::from_millis(50),
            connect_period: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_parsing_conventions() {
        assert_eq!("CONSOLE".parse::<LogOutput>().ok(), Some(LogOutput::Console));
        assert_eq!("syslog".parse::<LogOutput>().ok(), Some(LogOutput::Syslog));
        assert_eq!(
            "/var/log/mme.log".parse::<LogOutput>().ok(),
            Some(LogOutput::File(PathBuf::from("/var/log/mme.log")))
        );
        assert_eq!(
            "./mme.log".parse::<LogOutput>().ok(),
            Some(LogOutput::File(PathBuf::from("./mme.log")))
        );
        assert_eq!(
            "10.0.0.1:8514".parse::<LogOutput>().ok(),
            Some(LogOutput::Tcp {
                host: "10.0.0.1".to_owned(),
                port: 8514
            })
        );
    }

    #[test]
    fn output_parsing_rejects_garbage() {
        assert!("".parse::<LogOutput>().is_err());
        assert!("collector".parse::<LogOutput>().is_err());
        assert!("host:notaport".parse::<LogOutput>().is_err());
        assert!(":8514".parse::<LogOutput>().is_err());
    }
}
