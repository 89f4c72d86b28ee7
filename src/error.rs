//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (host request decoding,
//! transfer startup, supervisor execution).
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur while starting an outbound ISO-TP transfer.
pub enum IsoTpSendError {
    /// Payload exceeds the 4095-byte maximum a 12-bit length field can carry.
    #[error("Payload too large: {len} bytes")]
    PayloadTooLarge { len: usize },
    /// The transmit queue refused the initial frame; nothing was sent.
    #[error("Transmit queue full")]
    QueueFull,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Failures while decoding a host transfer-request buffer.
pub enum RequestError {
    /// Buffer shorter than the fixed 12-byte request header.
    #[error("Request buffer too short: {len} bytes")]
    TooShort { len: usize },
}

#[derive(Debug, Error)]
/// Errors terminating the supervisor drive loop.
pub enum TapRunError<E0: core::fmt::Debug, E1: core::fmt::Debug> {
    /// The primary CAN bus failed to send or receive.
    #[error("Primary bus error: {0:?}")]
    Primary(E0),
    /// The secondary CAN bus failed to send or receive.
    #[error("Secondary bus error: {0:?}")]
    Secondary(E1),
}
