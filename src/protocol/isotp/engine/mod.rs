//! ISO-TP transport engine: one instance per physical interface. Owns the
//! outbound segmentation state machine and the inbound reassembler, and
//! paces Consecutive Frames against the free-running microsecond counter.
//!
//! The engine never blocks and never allocates. Frames leave through the
//! interface's bounded transmit queue; a full queue defers (pacing) or
//! drops (flow-control replies) but never stalls the caller.
use super::assembler::{ProcessResult, TransferAssembler};
use super::pci::{
    self, FlowControl, FlowStatus, FrameType, CONSECUTIVE_FRAME_DATA, FIRST_FRAME_DATA,
    SINGLE_FRAME_MAX,
};
use super::{IsoTpLink, MAX_TRANSFER_PAYLOAD};
use crate::error::IsoTpSendError;
use crate::infra::clock::{separation_elapsed, Micros};
use crate::infra::queue::FrameQueue;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::CAN_TX_QUEUE_DEPTH;

//==================================================================================States and events

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outbound transfer state.
pub enum TransferState {
    /// No multi-frame transmission in flight.
    Idle,
    /// First Frame sent; waiting for the peer's Flow Control reply.
    AwaitingFlowControl,
    /// Peer granted transmission; Consecutive Frames are paced out.
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Why an in-flight transfer was torn down.
pub enum AbortReason {
    /// The peer sent a Flow Control abort/overflow frame.
    PeerAbort,
    /// The peer requested block-size-limited flow control, which this
    /// engine does not speak.
    BlockSizeUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Notable outcomes surfaced by the engine entry points.
pub enum TransportEvent {
    /// Nothing the caller needs to act on.
    None,
    /// A peer First Frame was answered with a Continue reply.
    FlowControlQueued,
    /// A reassembly fragment was accepted.
    FragmentConsumed,
    /// An inbound transfer finished; read it with [`IsoTpEngine::received`].
    MessageComplete { len: usize },
    /// A Consecutive Frame was queued for the wire.
    ConsecutiveQueued,
    /// The outbound transfer finished and the session returned to idle.
    TransferComplete,
    /// The peer asked to pause Consecutive Frames.
    Suspended,
    /// The peer granted (or resumed) transmission.
    ClearedToSend,
    /// The transfer was torn down.
    Aborted(AbortReason),
    /// An inbound Consecutive Frame broke the sequence; reassembly dropped.
    SequenceError { expected: u8, received: u8 },
}

//==================================================================================Engine

/// Per-interface ISO-TP session, driven by the receive path on one side and
/// the foreground poll on the other.
///
/// The session slot is persistent: a new transfer request overwrites it
/// outright, discarding whatever was in flight.
pub struct IsoTpEngine {
    link: IsoTpLink,
    /// Whether the receive filter on `link.rx_id` is armed.
    armed: bool,
    state: TransferState,
    /// Permission to emit the next Consecutive Frame (false = suspended).
    go: bool,
    tx_buffer: [u8; MAX_TRANSFER_PAYLOAD],
    tx_length: usize,
    /// Offset of the next unsent payload byte.
    tx_cursor: usize,
    /// Next Consecutive Frame sequence number (cycles 1..15, then 0).
    sequence: u8,
    /// Peer-mandated delay between Consecutive Frames.
    separation_micros: u32,
    last_tx_micros: Micros,
    assembler: TransferAssembler,
}

impl IsoTpEngine {
    /// Create an idle, unarmed engine. Suitable for `static` slots.
    pub const fn new() -> Self {
        Self {
            link: IsoTpLink {
                tx_id: 0,
                rx_id: 0,
                extended: false,
            },
            armed: false,
            state: TransferState::Idle,
            go: false,
            tx_buffer: [0; MAX_TRANSFER_PAYLOAD],
            tx_length: 0,
            tx_cursor: 0,
            sequence: 1,
            separation_micros: 0,
            last_tx_micros: 0,
            assembler: TransferAssembler::new(),
        }
    }

    /// Whether `id` matches the armed receive filter.
    pub fn matches(&self, id: u32) -> bool {
        self.armed && id == self.link.rx_id
    }

    /// Current outbound transfer state.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Whether the receive filter is armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Payload of the last completed inbound transfer. Valid until the next
    /// transfer starts overwriting it.
    pub fn received(&self) -> &[u8] {
        self.assembler.payload()
    }

    /// Detach the receive filter and discard all transfer state.
    pub fn reset(&mut self) {
        self.armed = false;
        self.state = TransferState::Idle;
        self.go = false;
        self.tx_length = 0;
        self.tx_cursor = 0;
        self.sequence = 1;
        self.separation_micros = 0;
        self.assembler.reset();
    }

    //==================================================================================Outbound

    /// Start an outbound transfer, replacing any transfer in flight.
    ///
    /// Payloads of up to seven bytes leave immediately as a Single Frame and
    /// the session stays idle. Anything larger sends a First Frame, arms the
    /// receive filter on `link.rx_id` for the peer's Flow Control reply, and
    /// waits for [`poll`](Self::poll) to pace the remainder out.
    pub fn begin_send(
        &mut self,
        link: IsoTpLink,
        payload: &[u8],
        tx_queue: &FrameQueue<CAN_TX_QUEUE_DEPTH>,
    ) -> Result<TransferState, IsoTpSendError> {
        if payload.len() > MAX_TRANSFER_PAYLOAD {
            return Err(IsoTpSendError::PayloadTooLarge { len: payload.len() });
        }

        self.link = link;
        self.assembler.reset();

        if payload.len() <= SINGLE_FRAME_MAX {
            let frame = pci::single_frame(link.tx_id, link.extended, payload);
            if !tx_queue.enqueue(&frame) {
                return Err(IsoTpSendError::QueueFull);
            }
            // No flow control follows a Single Frame; the session stays idle.
            self.state = TransferState::Idle;
            self.go = false;
            return Ok(TransferState::Idle);
        }

        let frame = pci::first_frame(
            link.tx_id,
            link.extended,
            payload.len(),
            &payload[..FIRST_FRAME_DATA],
        );
        if !tx_queue.enqueue(&frame) {
            return Err(IsoTpSendError::QueueFull);
        }

        self.tx_buffer[..payload.len()].copy_from_slice(payload);
        self.tx_length = payload.len();
        self.tx_cursor = FIRST_FRAME_DATA;
        self.sequence = 1;
        self.go = false;
        self.separation_micros = 0;
        self.armed = true;
        self.state = TransferState::AwaitingFlowControl;
        Ok(TransferState::AwaitingFlowControl)
    }

    /// Arm the receive filter for a peer-initiated transfer. Nothing is sent
    /// until the peer's First Frame arrives.
    pub fn begin_receive(&mut self, link: IsoTpLink) {
        self.link = link;
        self.armed = true;
        self.assembler.reset();
    }

    //==================================================================================Receive path

    /// Process a frame captured by the armed receive filter. Called from the
    /// receive path for every frame whose id satisfies
    /// [`matches`](Self::matches); safe in interrupt context.
    pub fn handle_frame(
        &mut self,
        frame: &CanFrame,
        now: Micros,
        tx_queue: &FrameQueue<CAN_TX_QUEUE_DEPTH>,
    ) -> TransportEvent {
        match FrameType::of(frame.data[0]) {
            Some(FrameType::FlowControl) => self.on_flow_control(frame, now),
            Some(FrameType::First) | Some(FrameType::Consecutive) => {
                self.on_reassembly(frame, tx_queue)
            }
            _ => TransportEvent::None,
        }
    }

    fn on_reassembly(
        &mut self,
        frame: &CanFrame,
        tx_queue: &FrameQueue<CAN_TX_QUEUE_DEPTH>,
    ) -> TransportEvent {
        match self.assembler.process_frame(frame) {
            ProcessResult::TransferStarted => {
                // Grant the whole transfer at once: no block-size ceiling,
                // no inter-frame delay.
                let reply = pci::flow_control(
                    self.link.tx_id,
                    self.link.extended,
                    FlowStatus::ContinueToSend,
                    0,
                    0,
                );
                if !tx_queue.enqueue(&reply) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("flow control reply dropped: tx queue full");
                    return TransportEvent::None;
                }
                TransportEvent::FlowControlQueued
            }
            ProcessResult::FragmentConsumed => TransportEvent::FragmentConsumed,
            ProcessResult::MessageComplete { len } => TransportEvent::MessageComplete { len },
            ProcessResult::SequenceError { expected, received } => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "consecutive frame out of sequence: expected {}, got {}",
                    expected,
                    received
                );
                TransportEvent::SequenceError { expected, received }
            }
            ProcessResult::Ignored => TransportEvent::None,
        }
    }

    fn on_flow_control(&mut self, frame: &CanFrame, now: Micros) -> TransportEvent {
        let Some(fc) = FlowControl::decode(frame.payload()) else {
            return TransportEvent::None;
        };

        match fc.status {
            FlowStatus::Abort => {
                #[cfg(feature = "defmt")]
                defmt::info!("peer aborted transfer");
                self.reset();
                TransportEvent::Aborted(AbortReason::PeerAbort)
            }
            FlowStatus::Wait => {
                // Suspend; only a later Continue resumes the transfer. No
                // timeout is enforced here.
                self.go = false;
                TransportEvent::Suspended
            }
            FlowStatus::ContinueToSend => {
                if self.state == TransferState::Idle {
                    // Stray Continue with nothing in flight.
                    return TransportEvent::None;
                }
                if fc.block_size != 0 {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "block size {} requested, which is unsupported; aborting transfer",
                        fc.block_size
                    );
                    self.reset();
                    return TransportEvent::Aborted(AbortReason::BlockSizeUnsupported);
                }
                self.separation_micros = pci::separation_micros(fc.separation_code);
                self.last_tx_micros = now;
                self.go = true;
                self.state = TransferState::Sending;
                TransportEvent::ClearedToSend
            }
        }
    }

    //==================================================================================Foreground poll

    /// Foreground tick: emit the next Consecutive Frame once the
    /// peer-mandated separation time has elapsed. Non-blocking; call at
    /// least once per scheduling pass.
    pub fn poll(
        &mut self,
        now: Micros,
        tx_queue: &FrameQueue<CAN_TX_QUEUE_DEPTH>,
    ) -> TransportEvent {
        if self.state != TransferState::Sending || !self.go {
            return TransportEvent::None;
        }
        if self.separation_micros != 0
            && !separation_elapsed(now, self.last_tx_micros, self.separation_micros)
        {
            return TransportEvent::None;
        }

        let remaining = self.tx_length - self.tx_cursor;
        let take = remaining.min(CONSECUTIVE_FRAME_DATA);
        let frame = pci::consecutive_frame(
            self.link.tx_id,
            self.link.extended,
            self.sequence,
            &self.tx_buffer[self.tx_cursor..self.tx_cursor + take],
        );
        if !tx_queue.enqueue(&frame) {
            // Queue full: leave the cursor in place; the next poll retries
            // the same fragment.
            #[cfg(feature = "defmt")]
            defmt::warn!("consecutive frame deferred: tx queue full");
            return TransportEvent::None;
        }

        self.last_tx_micros = now;
        self.sequence = (self.sequence + 1) & 0x0F;
        self.tx_cursor += take;

        if self.tx_cursor == self.tx_length {
            // Done. The filter stays armed so the peer's reply to this
            // transfer is still captured.
            self.go = false;
            self.state = TransferState::Idle;
            self.tx_length = 0;
            self.tx_cursor = 0;
            self.sequence = 1;
            self.separation_micros = 0;
            return TransportEvent::TransferComplete;
        }
        TransportEvent::ConsecutiveQueued
    }
}

impl Default for IsoTpEngine {
    fn default() -> Self {
        Self::new()
    }
}
