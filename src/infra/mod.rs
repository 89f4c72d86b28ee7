//! Infrastructure shared by the interrupt and foreground contexts: the
//! bounded frame queue crossing between them, and the wraparound-safe
//! arithmetic over the free-running pacing counter.
pub mod clock;
pub mod queue;
