//! Supervisor driving the tap core over two asynchronous CAN bus
//! endpoints.
//!
//! It keeps the routing/transport core alive and optionally offers:
//!
//! * a command channel to transmit raw frames and start ISO-TP transfers;
//! * a host channel carrying captured frames and completed transfers.
//!
//! Firmware decides which features it needs by providing pre-allocated
//! [`embassy_sync::channel::Channel`] instances. No allocation is performed
//! by the library and there is no dependency on a particular BSP: on bare
//! metal the same core can instead be driven straight from the receive
//! interrupt and a main-loop poll.

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
};
use embassy_time::Timer;
use futures_util::{future::select, future::Either, pin_mut};

use super::CanTap;
use crate::error::TapRunError;
use crate::protocol::isotp::engine::TransportEvent;
use crate::protocol::isotp::{IsoTpLink, MAX_TRANSFER_PAYLOAD};
use crate::protocol::router::{BusId, TapQueues};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::{can_bus::CanBus, tap_clock::TapClock};

/// Pacing tick when no bus traffic or command wakes the loop up (µs).
/// Short enough that even sub-millisecond separation times stay honest.
const POLL_TICK_MICROS: u64 = 200;

//==================================================================================Messages

/// Commands queued by the host-facing task.
pub enum TapCommand {
    /// Transmit one raw frame on `bus`.
    SendFrame { bus: BusId, frame: CanFrame },
    /// Start an outbound ISO-TP transfer on `bus`.
    BeginTransfer {
        bus: BusId,
        link: IsoTpLink,
        len: usize,
        payload: [u8; MAX_TRANSFER_PAYLOAD],
    },
    /// Arm `bus` for a peer-initiated ISO-TP transfer.
    Listen { bus: BusId, link: IsoTpLink },
}

/// Host-bound traffic produced by the supervisor.
pub enum HostEvent {
    /// Raw frame captured on `bus`.
    Frame { bus: BusId, frame: CanFrame },
    /// Completed inbound ISO-TP transfer reassembled on `bus`.
    Transfer {
        bus: BusId,
        len: usize,
        payload: [u8; MAX_TRANSFER_PAYLOAD],
    },
    /// The outbound ISO-TP transfer on `bus` finished.
    SendComplete { bus: BusId },
}

/// What woke the drive loop up.
enum Wake<E0, E1> {
    Primary(Result<CanFrame, E0>),
    Secondary(Result<CanFrame, E1>),
    Command(TapCommand),
    Tick,
}

//==================================================================================Supervisor

/// Runner that drives the tap core until a bus fails.
pub struct TapSupervisor<'a, B0, B1, K, const CMD_CAP: usize, const HOST_CAP: usize>
where
    B0: CanBus,
    B1: CanBus,
    K: TapClock,
{
    tap: CanTap,
    queues: &'a TapQueues,
    primary: B0,
    secondary: B1,
    clock: K,
    commands: Option<&'a Channel<CriticalSectionRawMutex, TapCommand, CMD_CAP>>,
    host: Option<&'a Channel<CriticalSectionRawMutex, HostEvent, HOST_CAP>>,
}

impl<'a, B0, B1, K, const CMD_CAP: usize, const HOST_CAP: usize>
    TapSupervisor<'a, B0, B1, K, CMD_CAP, HOST_CAP>
where
    B0: CanBus,
    B1: CanBus,
    K: TapClock,
{
    /// Assemble the supervisor around an already-configured tap core.
    pub fn new(
        tap: CanTap,
        queues: &'a TapQueues,
        primary: B0,
        secondary: B1,
        clock: K,
        commands: Option<&'a Channel<CriticalSectionRawMutex, TapCommand, CMD_CAP>>,
        host: Option<&'a Channel<CriticalSectionRawMutex, HostEvent, HOST_CAP>>,
    ) -> Self {
        Self {
            tap,
            queues,
            primary,
            secondary,
            clock,
            commands,
            host,
        }
    }

    /// Drive loop: flush queued frames to the wire, pace the engines, drain
    /// captured traffic toward the host, then sleep until a bus, a command,
    /// or the pacing tick wakes it up. Returns only on a bus failure.
    pub async fn drive(mut self) -> Result<(), TapRunError<B0::Error, B1::Error>> {
        loop {
            let now = self.clock.now_micros();
            let events = self.tap.poll(self.queues, now);
            self.publish_poll_events(events).await;
            self.flush_wire().await?;
            self.drain_host().await;

            let wake = {
                let rx0 = self.primary.recv();
                let rx1 = self.secondary.recv();
                pin_mut!(rx0);
                pin_mut!(rx1);
                let buses = select(rx0, rx1);
                let tick = Timer::after_micros(POLL_TICK_MICROS);
                pin_mut!(tick);

                match self.commands {
                    Some(command_channel) => {
                        let command = command_channel.receive();
                        pin_mut!(command);
                        match select(select(buses, command), tick).await {
                            Either::Left((inner, _)) => match inner {
                                Either::Left((bus_wake, _)) => match bus_wake {
                                    Either::Left((result, _)) => Wake::Primary(result),
                                    Either::Right((result, _)) => Wake::Secondary(result),
                                },
                                Either::Right((command, _)) => Wake::Command(command),
                            },
                            Either::Right(_) => Wake::Tick,
                        }
                    }
                    None => match select(buses, tick).await {
                        Either::Left((bus_wake, _)) => match bus_wake {
                            Either::Left((result, _)) => Wake::Primary(result),
                            Either::Right((result, _)) => Wake::Secondary(result),
                        },
                        Either::Right(_) => Wake::Tick,
                    },
                }
            };

            match wake {
                Wake::Primary(result) => {
                    let frame = result.map_err(TapRunError::Primary)?;
                    self.dispatch_frame(BusId::Primary, frame).await;
                }
                Wake::Secondary(result) => {
                    let frame = result.map_err(TapRunError::Secondary)?;
                    self.dispatch_frame(BusId::Secondary, frame).await;
                }
                Wake::Command(command) => self.handle_command(command),
                Wake::Tick => {}
            }
        }
    }

    async fn dispatch_frame(&mut self, bus: BusId, frame: CanFrame) {
        let now = self.clock.now_micros();
        let (_report, event) = self.tap.on_frame(bus, &frame, self.queues, now);
        if let TransportEvent::MessageComplete { len } = event {
            self.publish_transfer(bus, len).await;
        }
    }

    fn handle_command(&mut self, command: TapCommand) {
        match command {
            TapCommand::SendFrame { bus, frame } => {
                if !self.queues.bus(bus).tx.enqueue(&frame) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("host frame dropped: tx queue full on {}", bus);
                }
            }
            TapCommand::BeginTransfer {
                bus,
                link,
                len,
                payload,
            } => {
                let len = len.min(MAX_TRANSFER_PAYLOAD);
                if self
                    .tap
                    .begin_transfer(bus, link, &payload[..len], self.queues)
                    .is_err()
                {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("transfer request rejected on {}", bus);
                }
            }
            TapCommand::Listen { bus, link } => self.tap.begin_listen(bus, link),
        }
    }

    /// Drain both transmit queues onto their buses.
    async fn flush_wire(&mut self) -> Result<(), TapRunError<B0::Error, B1::Error>> {
        while let Some(frame) = self.queues.primary.tx.dequeue() {
            self.primary
                .send(&frame)
                .await
                .map_err(TapRunError::Primary)?;
        }
        while let Some(frame) = self.queues.secondary.tx.dequeue() {
            self.secondary
                .send(&frame)
                .await
                .map_err(TapRunError::Secondary)?;
        }
        Ok(())
    }

    /// Forward captured frames to the host channel, or discard them when the
    /// firmware provided none.
    async fn drain_host(&mut self) {
        let Some(host) = self.host else {
            while self.queues.primary.rx.dequeue().is_some() {}
            while self.queues.secondary.rx.dequeue().is_some() {}
            return;
        };
        while let Some(frame) = self.queues.primary.rx.dequeue() {
            host.send(HostEvent::Frame {
                bus: BusId::Primary,
                frame,
            })
            .await;
        }
        while let Some(frame) = self.queues.secondary.rx.dequeue() {
            host.send(HostEvent::Frame {
                bus: BusId::Secondary,
                frame,
            })
            .await;
        }
    }

    async fn publish_poll_events(&mut self, events: [TransportEvent; 2]) {
        let Some(host) = self.host else { return };
        for (bus, event) in [BusId::Primary, BusId::Secondary].into_iter().zip(events) {
            if event == TransportEvent::TransferComplete {
                host.send(HostEvent::SendComplete { bus }).await;
            }
        }
    }

    async fn publish_transfer(&mut self, bus: BusId, len: usize) {
        let Some(host) = self.host else { return };
        let mut payload = [0u8; MAX_TRANSFER_PAYLOAD];
        let received = self.tap.engine(bus).received();
        payload[..received.len()].copy_from_slice(received);
        host.send(HostEvent::Transfer { bus, len, payload }).await;
    }
}
