//! Wraparound-safe comparisons over the free-running microsecond counter
//! used to pace ISO-TP consecutive frames.
//!
//! The counter is 32 bits wide and wraps roughly every 71 minutes. All
//! elapsed-time questions are therefore answered in modular arithmetic:
//! `now.wrapping_sub(since)` is the true tick distance for any pair of
//! timestamps less than one full period apart, including pairs straddling
//! the wrap boundary. Never compare `now >= since + delta` directly.

/// Microsecond timestamp as produced by a free-running 32-bit counter.
pub type Micros = u32;

/// Ticks elapsed between `since` and `now`, correct across wraparound.
#[inline]
pub fn elapsed_micros(now: Micros, since: Micros) -> u32 {
    now.wrapping_sub(since)
}

/// Whether at least `required` microseconds have passed since `since`.
#[inline]
pub fn separation_elapsed(now: Micros, since: Micros, required: u32) -> bool {
    elapsed_micros(now, since) >= required
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
