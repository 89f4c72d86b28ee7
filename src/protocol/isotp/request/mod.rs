//! Transfer request buffer as received from the host command link.
//!
//! The layout is fixed and shared with the host-side tooling: a 12-byte
//! header whose bytes 3–6 hold the outbound arbitration id (big endian),
//! bytes 7–10 the expected reply id, byte 11 the extended-addressing flag,
//! followed by the payload to transfer.
use super::IsoTpLink;
use crate::error::RequestError;

/// Fixed header length preceding the transfer payload.
pub const REQUEST_HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Parsed transfer request: addressing pair plus borrowed payload.
pub struct TransferRequest<'a> {
    /// Arbitration id the tap transmits with (peer-facing).
    pub tx_id: u32,
    /// Arbitration id the peer answers on.
    pub rx_id: u32,
    /// Whether both identifiers are 29-bit extended identifiers.
    pub extended: bool,
    /// Payload to transfer (empty for a receive-only request).
    pub payload: &'a [u8],
}

impl<'a> TransferRequest<'a> {
    /// Decode a request buffer. Fails when the buffer cannot hold the
    /// fixed header.
    pub fn parse(buffer: &'a [u8]) -> Result<Self, RequestError> {
        if buffer.len() < REQUEST_HEADER_LEN {
            return Err(RequestError::TooShort { len: buffer.len() });
        }
        let tx_id = u32::from_be_bytes([buffer[3], buffer[4], buffer[5], buffer[6]]);
        let rx_id = u32::from_be_bytes([buffer[7], buffer[8], buffer[9], buffer[10]]);
        Ok(Self {
            tx_id,
            rx_id,
            extended: buffer[11] != 0,
            payload: &buffer[REQUEST_HEADER_LEN..],
        })
    }

    /// Addressing part of the request.
    pub fn link(&self) -> IsoTpLink {
        IsoTpLink {
            tx_id: self.tx_id,
            rx_id: self.rx_id,
            extended: self.extended,
        }
    }
}
