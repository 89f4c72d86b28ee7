//! ISO-TP reassembly: rebuilds a transfer payload by collecting the First
//! Frame and its Consecutive Frames in sequence order.
use super::pci::{FrameType, CONSECUTIVE_FRAME_DATA, FIRST_FRAME_DATA, SINGLE_FRAME_MAX};
use super::MAX_TRANSFER_PAYLOAD;
use crate::protocol::transport::can_frame::CanFrame;

//==================================================================================Enums and Structs

#[derive(Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Frame not recognized as part of a transfer (wrong type, inactive
    /// session, or an invalid First Frame length).
    Ignored,
    /// A First Frame opened a transfer; the peer now expects a Continue
    /// reply before it sends the remaining fragments.
    TransferStarted,
    /// Consecutive Frame integrated but fragments are still missing.
    FragmentConsumed,
    /// Final fragment received; the payload is readable until the next
    /// transfer starts.
    MessageComplete { len: usize },
    /// Consecutive Frame out of order; the in-flight transfer was dropped.
    SequenceError { expected: u8, received: u8 },
}

/// Possible states for a reassembly session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SessionState {
    Inactive,
    InProgress,
}

/// Single-session reassembler owned by one interface's transport engine.
pub struct TransferAssembler {
    state: SessionState,
    buffer: [u8; MAX_TRANSFER_PAYLOAD],
    expected_len: usize,
    received_len: usize,
    next_sequence: u8,
}

impl TransferAssembler {
    /// Create an assembler in the inactive state.
    pub const fn new() -> Self {
        Self {
            state: SessionState::Inactive,
            buffer: [0; MAX_TRANSFER_PAYLOAD],
            expected_len: 0,
            received_len: 0,
            next_sequence: 1,
        }
    }

    /// Drop any in-flight transfer and make the session available again.
    pub fn reset(&mut self) {
        self.state = SessionState::Inactive;
        self.expected_len = 0;
        self.received_len = 0;
        self.next_sequence = 1;
        // No need to wipe the buffer; upcoming copies will overwrite it.
    }

    /// Bytes collected so far; after `MessageComplete` this is the whole
    /// reassembled payload, valid until the next First Frame arrives.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.received_len]
    }

    //==================================================================================Process Functions

    /// Integrate a frame captured by the armed receive filter.
    pub fn process_frame(&mut self, frame: &CanFrame) -> ProcessResult {
        match FrameType::of(frame.data[0]) {
            Some(FrameType::First) => self.start(frame),
            Some(FrameType::Consecutive) => self.append(frame),
            _ => ProcessResult::Ignored,
        }
    }

    fn start(&mut self, frame: &CanFrame) -> ProcessResult {
        let declared = (((frame.data[0] & 0x0F) as usize) << 8) | frame.data[1] as usize;

        // A multi-frame transfer is by definition longer than a Single Frame
        // could carry; anything else is a malformed First Frame.
        if declared <= SINGLE_FRAME_MAX || declared > MAX_TRANSFER_PAYLOAD {
            return ProcessResult::Ignored;
        }

        self.state = SessionState::InProgress;
        self.expected_len = declared;
        self.next_sequence = 1;

        let take = FIRST_FRAME_DATA.min(declared);
        self.buffer[..take].copy_from_slice(&frame.data[2..2 + take]);
        self.received_len = take;

        ProcessResult::TransferStarted
    }

    fn append(&mut self, frame: &CanFrame) -> ProcessResult {
        if self.state != SessionState::InProgress {
            return ProcessResult::Ignored;
        }

        let received = frame.data[0] & 0x0F;
        if received != self.next_sequence {
            let expected = self.next_sequence;
            self.reset();
            return ProcessResult::SequenceError { expected, received };
        }
        // Sequence numbers cycle 1..15 and then wrap through 0.
        self.next_sequence = (self.next_sequence + 1) & 0x0F;

        let remaining = self.expected_len - self.received_len;
        let take = remaining
            .min(CONSECUTIVE_FRAME_DATA)
            .min(frame.len.saturating_sub(1));
        self.buffer[self.received_len..self.received_len + take]
            .copy_from_slice(&frame.data[1..1 + take]);
        self.received_len += take;

        if self.received_len >= self.expected_len {
            // Release the session; the payload stays readable through
            // `payload` until the next transfer overwrites it.
            self.state = SessionState::Inactive;
            ProcessResult::MessageComplete {
                len: self.expected_len,
            }
        } else {
            ProcessResult::FragmentConsumed
        }
    }
}

impl Default for TransferAssembler {
    fn default() -> Self {
        Self::new()
    }
}
