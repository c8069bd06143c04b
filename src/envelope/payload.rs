//! # Closed message-kind space and payload union.
//!
//! One `define_messages!` invocation generates both [`MessageKind`] (the dense
//! discriminant, with a stable name per kind) and [`Payload`] (the tagged
//! union sized to its largest variant). Keeping them in a single list
//! guarantees the two can never drift apart.

use crate::timers::TimerId;

/// Generates the [`MessageKind`] discriminant enum and the [`Payload`] tagged
/// union from one closed list of `Kind(PayloadType)` entries.
macro_rules! define_messages {
    ($($(#[$meta:meta])* $kind:ident($payload:ty)),+ $(,)?) => {
        /// Discriminant of a message, unique per payload shape.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKind {
            $($(#[$meta])* $kind,)+
        }

        impl MessageKind {
            /// Every message kind, in declaration order.
            pub const ALL: &'static [MessageKind] = &[$(MessageKind::$kind,)+];

            /// Human-readable kind name for logging.
            pub const fn name(self) -> &'static str {
                match self {
                    $(MessageKind::$kind => stringify!($kind),)+
                }
            }
        }

        /// The payload union: exactly one variant per message kind.
        ///
        /// Buffers embedded in a variant are owned by the variant; moving the
        /// payload (or dropping it) is the single release path for them.
        #[derive(Debug)]
        pub enum Payload {
            $($(#[$meta])* $kind($payload),)+
        }

        impl Payload {
            /// The kind tag matching this variant.
            pub const fn kind(&self) -> MessageKind {
                match self {
                    $(Payload::$kind(..) => MessageKind::$kind,)+
                }
            }
        }
    };
}

define_messages! {
    /// Reserved: instructs the destination task to tear down and exit.
    Terminate(Terminate),
    /// Reserved: synthesized by the timer registry, never sent by tasks.
    TimerExpired(TimerExpired),
    /// Diagnostic round-trip probe carrying a measured latency value.
    LatencyProbe(LatencyProbe),
    /// Inbound SCTP payload handed up to a signalling task.
    SctpDataInd(SctpData),
    /// Outbound SCTP payload handed down to the transport task.
    SctpDataReq(SctpData),
    /// Lower-layer delivery confirmation (or explicit failure) for a request.
    SctpLowerLayerConf(SctpLowerLayerConf),
    /// Liveness probe from the health reporting service.
    HealthPing(HealthPing),
}

/// Payload of the reserved terminate message. Carries nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminate;

/// Payload of a synthesized timer-expiry message.
#[derive(Debug, Clone, Copy)]
pub struct TimerExpired {
    /// Handle of the timer that fired.
    pub timer_id: TimerId,
    /// Opaque token supplied when the timer was armed.
    pub token: u64,
}

/// Payload of the diagnostic round-trip probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatencyProbe {
    /// Queue latency observed by the previous hop, in microseconds.
    pub latency_us: u64,
}

/// An SCTP data chunk moving up or down the stack.
///
/// The byte buffer is owned by the payload; constructing this struct is the
/// ownership transfer, and the consuming handler releases it by moving the
/// payload out or dropping the envelope.
#[derive(Debug)]
pub struct SctpData {
    /// SCTP association the chunk belongs to.
    pub assoc_id: u32,
    /// Stream number within the association.
    pub stream: u16,
    /// Payload protocol identifier (S1AP, NGAP, ...).
    pub ppid: u32,
    /// The chunk bytes, owned.
    pub buffer: Vec<u8>,
}

/// Lower-layer confirmation for an `SctpDataReq`.
///
/// Transport failures are converted into an explicit negative confirmation
/// rather than silently vanishing.
#[derive(Debug, Clone, Copy)]
pub struct SctpLowerLayerConf {
    /// Association the original request targeted.
    pub assoc_id: u32,
    /// Whether the lower layer accepted the data.
    pub success: bool,
}

/// Liveness probe payload. Carries nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthPing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_variants() {
        let p = Payload::SctpDataInd(SctpData {
            assoc_id: 1,
            stream: 0,
            ppid: 18,
            buffer: vec![0x60],
        });
        assert_eq!(p.kind(), MessageKind::SctpDataInd);
        assert_eq!(p.kind().name(), "SctpDataInd");
    }

    #[test]
    fn kind_space_is_closed_and_named() {
        assert_eq!(MessageKind::ALL.len(), 7);
        for kind in MessageKind::ALL {
            assert!(!kind.name().is_empty());
        }
    }
}
