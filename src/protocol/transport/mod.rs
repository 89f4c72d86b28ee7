//! CAN transport layer: wire-level frame model, bus abstraction traits, and
//! the queue depths shared by the routing fabric.

pub mod can_frame;
pub mod traits;

/// Depth of each per-interface receive queue (frames buffered for the host).
///
/// Receive bursts arrive from interrupt context while the foreground loop
/// drains toward the host link; 32 frames of headroom absorbs a sustained
/// burst at 500 kbit/s without forcing drops on a healthy link.
pub const CAN_RX_QUEUE_DEPTH: usize = 32;

/// Depth of each per-interface transmit queue (frames awaiting the wire).
///
/// Relay traffic and paced ISO-TP output share this queue; the wire drains
/// it faster than the peer interface can legally fill it, so half the
/// receive depth suffices.
pub const CAN_TX_QUEUE_DEPTH: usize = 16;
