//! Per-mode dispatch of received CAN frames between the two physical
//! interfaces and the host-facing queues.
use crate::infra::queue::FrameQueue;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::{CAN_RX_QUEUE_DEPTH, CAN_TX_QUEUE_DEPTH};

//==================================================================================Identifiers and modes

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Identifier of a physical CAN interface.
pub enum BusId {
    Primary,
    Secondary,
}

impl BusId {
    /// The opposite interface (relay destination).
    pub fn other(self) -> Self {
        match self {
            BusId::Primary => BusId::Secondary,
            BusId::Secondary => BusId::Primary,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            BusId::Primary => 0,
            BusId::Secondary => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Process-wide operating mode, chosen once at configuration time and read
/// on every frame.
pub enum RoutingMode {
    /// Observe the primary interface only.
    SniffPrimary,
    /// Observe the secondary interface only.
    SniffSecondary,
    /// Mirror traffic between both interfaces while exposing every frame to
    /// the host.
    RelayBothWays,
}

//==================================================================================Queue fabric

/// Receive/transmit queue pair owned by one interface.
pub struct BusQueues {
    /// Frames captured off the wire, drained toward the host.
    pub rx: FrameQueue<CAN_RX_QUEUE_DEPTH>,
    /// Frames awaiting transmission on the wire.
    pub tx: FrameQueue<CAN_TX_QUEUE_DEPTH>,
}

impl BusQueues {
    /// Create an empty queue pair. Suitable for `static` storage.
    pub const fn new() -> Self {
        Self {
            rx: FrameQueue::new(),
            tx: FrameQueue::new(),
        }
    }
}

impl Default for BusQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue fabric for both interfaces.
pub struct TapQueues {
    pub primary: BusQueues,
    pub secondary: BusQueues,
}

impl TapQueues {
    /// Create the empty fabric. Suitable for `static` storage.
    pub const fn new() -> Self {
        Self {
            primary: BusQueues::new(),
            secondary: BusQueues::new(),
        }
    }

    /// Queue pair belonging to `bus`.
    pub fn bus(&self, bus: BusId) -> &BusQueues {
        match bus {
            BusId::Primary => &self.primary,
            BusId::Secondary => &self.secondary,
        }
    }
}

impl Default for TapQueues {
    fn default() -> Self {
        Self::new()
    }
}

//==================================================================================Routing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Outcome of one enqueue attempt during routing.
pub enum Delivery {
    /// Frame copied into the destination queue.
    Queued,
    /// Destination queue was full; the frame was dropped for that
    /// destination only.
    Dropped,
    /// Destination is not part of the active mode.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Per-destination report for one routed frame.
pub struct RouteReport {
    /// Host-visible receive queue of the originating interface.
    pub host: Delivery,
    /// Transmit queue of the opposite interface (relay only).
    pub forward: Delivery,
}

/// Dispatches received frames according to the active [`RoutingMode`].
pub struct FrameRouter {
    mode: RoutingMode,
}

impl FrameRouter {
    pub const fn new(mode: RoutingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Route a frame received on `bus` into the queue fabric.
    ///
    /// Never blocks: a full destination drops the frame for that destination
    /// and the remaining destinations are still served. The two destination
    /// writes of relay mode are not atomic as a pair; under pressure one can
    /// succeed while the other drops.
    pub fn route_received(&self, bus: BusId, frame: &CanFrame, queues: &TapQueues) -> RouteReport {
        match (self.mode, bus) {
            (RoutingMode::SniffPrimary, BusId::Primary)
            | (RoutingMode::SniffSecondary, BusId::Secondary) => RouteReport {
                host: self.push_host(bus, frame, queues),
                forward: Delivery::Skipped,
            },
            (RoutingMode::RelayBothWays, _) => RouteReport {
                host: self.push_host(bus, frame, queues),
                forward: self.push_forward(bus.other(), frame, queues),
            },
            // Frame from an interface the active mode does not observe.
            _ => RouteReport {
                host: Delivery::Skipped,
                forward: Delivery::Skipped,
            },
        }
    }

    fn push_host(&self, bus: BusId, frame: &CanFrame, queues: &TapQueues) -> Delivery {
        if queues.bus(bus).rx.enqueue(frame) {
            Delivery::Queued
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("rx enqueue overflow on {}", bus);
            Delivery::Dropped
        }
    }

    fn push_forward(&self, bus: BusId, frame: &CanFrame, queues: &TapQueues) -> Delivery {
        if queues.bus(bus).tx.enqueue(frame) {
            Delivery::Queued
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("tx enqueue overflow on {}", bus);
            Delivery::Dropped
        }
    }
}
