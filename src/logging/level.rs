//! Severity levels and log subsystems.

use std::fmt;
use std::str::FromStr;

use crate::logging::config::LogConfigError;

/// Syslog-ordered severity. Lower numeric value means more severe.
///
/// A record is emitted when its level is **at or below** the configured
/// threshold for its subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
    Trace = 8,
}

impl LogLevel {
    /// Every level, most severe first.
    pub const ALL: &'static [LogLevel] = &[
        LogLevel::Emergency,
        LogLevel::Alert,
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Notice,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Fixed-width display name.
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Emergency => "EMERG",
            LogLevel::Alert => "ALERT",
            LogLevel::Critical => "CRITI",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNI",
            LogLevel::Notice => "NOTIC",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// ANSI color escape used when colored output is enabled.
    pub const fn ansi_color(self) -> &'static str {
        match self {
            LogLevel::Emergency | LogLevel::Alert => "\x1b[0;37;41m",
            LogLevel::Critical => "\x1b[0;31m",
            LogLevel::Error => "\x1b[0;31m",
            LogLevel::Warning => "\x1b[0;33m",
            LogLevel::Notice => "\x1b[0;34m",
            LogLevel::Info => "\x1b[0;36m",
            LogLevel::Debug => "\x1b[0;32m",
            LogLevel::Trace => "\x1b[0;37m",
        }
    }

    pub(crate) const fn from_u8(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Emergency,
            1 => LogLevel::Alert,
            2 => LogLevel::Critical,
            3 => LogLevel::Error,
            4 => LogLevel::Warning,
            5 => LogLevel::Notice,
            6 => LogLevel::Info,
            7 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LogConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMERGENCY" | "EMERG" => Ok(LogLevel::Emergency),
            "ALERT" => Ok(LogLevel::Alert),
            "CRITICAL" | "CRITI" => Ok(LogLevel::Critical),
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "NOTICE" => Ok(LogLevel::Notice),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            other => Err(LogConfigError::UnknownLevel {
                value: other.to_owned(),
            }),
        }
    }
}

/// Generates the [`Subsystem`] enum used to scope per-area severity
/// thresholds. One entry per protocol layer or service of the gateway.
macro_rules! define_subsystems {
    ($($(#[$meta:meta])* $name:ident => $label:literal),+ $(,)?) => {
        /// Origin area of a log record; each carries its own severity
        /// threshold.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Subsystem {
            $($(#[$meta])* $name,)+
        }

        impl Subsystem {
            /// Every subsystem, in declaration order.
            pub const ALL: &'static [Subsystem] = &[$(Subsystem::$name,)+];

            /// Number of subsystems; sizes the per-subsystem threshold table.
            pub const COUNT: usize = Subsystem::ALL.len();

            /// Fixed display label.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Subsystem::$name => $label,)+
                }
            }

            /// Dense index into the threshold table.
            #[inline]
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

define_subsystems! {
    /// The messaging core itself.
    Itti => "ITTI",
    /// S1AP signalling.
    S1ap => "S1AP",
    /// NGAP signalling.
    Ngap => "NGAP",
    /// SCTP transport.
    Sctp => "SCTP",
    /// UDP transport.
    Udp => "UDP",
    /// Mobility management application.
    MmeApp => "MME",
    /// Serving/PDN gateway application.
    SpgwApp => "SPGW",
    /// GTP-U user plane.
    Gtpv1u => "GTPU",
    /// NAS layer.
    Nas => "NAS",
    /// Configuration handling.
    Config => "CONF",
    /// Everything with no better home.
    Util => "UTIL",
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_syslog() {
        assert!(LogLevel::Emergency < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Trace);
        assert_eq!(LogLevel::ALL.len(), 9);
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("warn".parse::<LogLevel>().ok(), Some(LogLevel::Warning));
        assert_eq!("TRACE".parse::<LogLevel>().ok(), Some(LogLevel::Trace));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn subsystem_indices_are_dense() {
        for (i, sub) in Subsystem::ALL.iter().enumerate() {
            assert_eq!(sub.index(), i);
        }
        assert_eq!(Subsystem::COUNT, Subsystem::ALL.len());
    }
}
