//! In-memory representation of a classic CAN 2.0 frame as exchanged with
//! the controller drivers.
use embedded_can::{ExtendedId, Id, StandardId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw CAN frame as read from (or queued toward) the bus.
pub struct CanFrame {
    /// Arbitration identifier: 11 bits standard, 29 bits extended.
    pub id: u32,
    /// Whether `id` is a 29-bit extended identifier.
    pub extended: bool,
    /// Payload buffer; bytes beyond `len` are zero.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// All-zero frame used to initialize queue storage.
    pub const fn empty() -> Self {
        Self {
            id: 0,
            extended: false,
            data: [0; 8],
            len: 0,
        }
    }

    /// Build a frame from an identifier and up to eight payload bytes.
    /// Extra bytes are truncated.
    pub fn new(id: u32, extended: bool, payload: &[u8]) -> Self {
        let mut data = [0u8; 8];
        let len = payload.len().min(8);
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            extended,
            data,
            len,
        }
    }

    /// Immutable view over the valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

// Interop with `embedded-can` so HAL drivers can produce and consume tap
// frames directly.
impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let (raw, extended) = match id.into() {
            Id::Standard(std) => (std.as_raw() as u32, false),
            Id::Extended(ext) => (ext.as_raw(), true),
        };
        Some(CanFrame::new(raw, extended, data))
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        // Remote frames are not part of the tap's traffic model.
        None
    }

    fn is_extended(&self) -> bool {
        self.extended
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        if self.extended {
            // The mask keeps the raw value inside the valid 29-bit range, so
            // the fallback is unreachable.
            Id::Extended(ExtendedId::new(self.id & 0x1FFF_FFFF).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(StandardId::new((self.id & 0x7FF) as u16).unwrap_or(StandardId::ZERO))
        }
    }

    fn dlc(&self) -> usize {
        self.len
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
