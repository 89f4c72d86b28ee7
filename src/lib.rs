//! `korri-tap` library: frame routing and ISO-TP transport core for a
//! dual-interface CAN tap running in a `no_std` environment. The crate
//! exposes the infrastructure modules (bounded frame queue, pacing clock
//! arithmetic), the protocol logic (per-mode routing, ISO-TP transport
//! engine), and a supervisor service gluing both onto asynchronous CAN
//! bus drivers.
#![no_std]
//==================================================================================
/// Domain and low-level errors (transfer requests, ISO-TP sends, and
/// supervisor run failures).
pub mod error;
/// Interrupt-safe building blocks: the bounded SPSC frame queue and
/// wraparound-tolerant clock comparisons.
pub mod infra;
/// CAN tap protocol implementation: frame model, routing fabric, ISO-TP
/// segmentation/reassembly, and the firmware supervisor.
pub mod protocol;
//==================================================================================
