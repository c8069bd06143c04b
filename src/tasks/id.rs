//! # Dense task identifier space.
//!
//! Every independently scheduled component of the gateway gets one entry in
//! the `define_tasks!` list below: protocol tasks (S1AP, NGAP, SCTP, ...),
//! service tasks (logging, health reporting, HA), and the two loopback tasks
//! used by latency probes. The macro keeps the enumeration, the name table,
//! and the index mapping in a single place, so adding a task is a one-line
//! change.

use std::fmt;

/// Generates [`TaskId`] with a stable dense `u8` representation, a complete
/// `ALL` slice, and a human-readable name per id.
macro_rules! define_tasks {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        /// Identity of one task: a small dense integer, stable for the
        /// process lifetime, used as the routing key by the dispatch table.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TaskId {
            $($(#[$meta])* $name,)+
        }

        impl TaskId {
            /// Every task id, in declaration order.
            pub const ALL: &'static [TaskId] = &[$(TaskId::$name,)+];

            /// Number of defined tasks.
            pub const COUNT: usize = Self::ALL.len();

            /// Human-readable task name for logging.
            pub const fn name(self) -> &'static str {
                match self {
                    $(TaskId::$name => stringify!($name),)+
                }
            }

            /// Dense index into per-task tables.
            #[inline]
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

define_tasks! {
    /// S1AP signalling towards eNodeBs.
    S1ap,
    /// NGAP signalling towards gNodeBs.
    Ngap,
    /// SCTP transport endpoint shared by S1AP and NGAP.
    Sctp,
    /// MME application logic.
    MmeApp,
    /// SGW/PGW application logic.
    SpgwApp,
    /// GTP-U user-plane tunnelling.
    Gtpv1u,
    /// UDP datagram transport.
    Udp,
    /// Synchronous logging service.
    Log,
    /// Thread-safe asynchronous logging service.
    SharedTsLog,
    /// Health/metrics reporting service.
    Service303,
    /// High-availability coordination.
    Ha,
    /// Deferred/background work service.
    AsyncSystem,
    /// Loopback endpoint for diagnostics and tests.
    Test1,
    /// Loopback endpoint for diagnostics and tests.
    Test2,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_stable() {
        for (i, id) in TaskId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
        assert_eq!(TaskId::ALL.len(), TaskId::COUNT);
    }

    #[test]
    fn names_match_variants() {
        assert_eq!(TaskId::Sctp.name(), "Sctp");
        assert_eq!(TaskId::SharedTsLog.to_string(), "SharedTsLog");
    }
}
