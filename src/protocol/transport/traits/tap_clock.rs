//! Monotonic microsecond clock feeding the ISO-TP pacing logic.
use crate::infra::clock::Micros;

/// Source of free-running microsecond timestamps.
///
/// The counter is expected to wrap; consumers must only compare timestamps
/// through the helpers in [`crate::infra::clock`].
pub trait TapClock {
    /// Current counter value in microseconds.
    fn now_micros(&mut self) -> Micros;
}

/// Clock backed by `embassy-time`. The target's time driver provides the
/// underlying tick source.
pub struct EmbassyClock;

impl TapClock for EmbassyClock {
    fn now_micros(&mut self) -> Micros {
        embassy_time::Instant::now().as_micros() as Micros
    }
}
