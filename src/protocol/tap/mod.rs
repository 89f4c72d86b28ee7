//! Top-level tap core gluing the router to the per-interface transport
//! engines. Exposes the two entry points of the runtime model: `on_frame`
//! for the receive interrupt and `poll` for the cooperative foreground
//! loop. State lives in explicit values handed to both entry points; there
//! are no process-wide globals.
pub mod supervisor;

use crate::error::IsoTpSendError;
use crate::infra::clock::Micros;
use crate::protocol::isotp::engine::{IsoTpEngine, TransferState, TransportEvent};
use crate::protocol::isotp::IsoTpLink;
use crate::protocol::router::{BusId, FrameRouter, RouteReport, RoutingMode, TapQueues};
use crate::protocol::transport::can_frame::CanFrame;

/// Frame routing and transport core for the dual-interface tap.
///
/// Owns one [`IsoTpEngine`] per physical interface and the mode-driven
/// router. The queue fabric is provided by the caller on every call so the
/// same core works against `static` queues shared with interrupt handlers.
pub struct CanTap {
    router: FrameRouter,
    engines: [IsoTpEngine; 2],
}

impl CanTap {
    /// Build a tap core for the given operating mode.
    pub const fn new(mode: RoutingMode) -> Self {
        Self {
            router: FrameRouter::new(mode),
            engines: [IsoTpEngine::new(), IsoTpEngine::new()],
        }
    }

    /// Active operating mode.
    pub fn mode(&self) -> RoutingMode {
        self.router.mode()
    }

    /// Transport engine owned by `bus`.
    pub fn engine(&self, bus: BusId) -> &IsoTpEngine {
        &self.engines[bus.index()]
    }

    /// Receive entry point, one call per frame captured on `bus`.
    ///
    /// Runs in interrupt context: only queue pushes and engine state
    /// transitions, bounded time, no waiting. Frames matching the armed
    /// ISO-TP filter are handed to the engine first, then routed normally —
    /// the host sees raw traffic even during an active session.
    pub fn on_frame(
        &mut self,
        bus: BusId,
        frame: &CanFrame,
        queues: &TapQueues,
        now: Micros,
    ) -> (RouteReport, TransportEvent) {
        let engine = &mut self.engines[bus.index()];
        let event = if engine.matches(frame.id) {
            engine.handle_frame(frame, now, &queues.bus(bus).tx)
        } else {
            TransportEvent::None
        };
        (self.router.route_received(bus, frame, queues), event)
    }

    /// Foreground tick: pace outbound Consecutive Frames on both
    /// interfaces. Non-blocking.
    pub fn poll(&mut self, queues: &TapQueues, now: Micros) -> [TransportEvent; 2] {
        [
            self.engines[0].poll(now, &queues.primary.tx),
            self.engines[1].poll(now, &queues.secondary.tx),
        ]
    }

    /// Start an outbound ISO-TP transfer on `bus`, replacing any transfer
    /// in flight there.
    pub fn begin_transfer(
        &mut self,
        bus: BusId,
        link: IsoTpLink,
        payload: &[u8],
        queues: &TapQueues,
    ) -> Result<TransferState, IsoTpSendError> {
        self.engines[bus.index()].begin_send(link, payload, &queues.bus(bus).tx)
    }

    /// Arm `bus` for a peer-initiated transfer.
    pub fn begin_listen(&mut self, bus: BusId, link: IsoTpLink) {
        self.engines[bus.index()].begin_receive(link);
    }
}
