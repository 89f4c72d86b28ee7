/// Test doubles simulating the CAN buses during integration tests.
use korri_tap::protocol::transport::{can_frame::CanFrame, traits::can_bus::CanBus};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<CanFrame>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Construct a pair of interconnected endpoints (tap ↔ peer).
    pub fn create_pair() -> (Self, Self) {
        let (tap_tx, peer_rx) = mpsc::unbounded_channel();
        let (peer_tx, tap_rx) = mpsc::unbounded_channel();

        let tap_bus = Self {
            tx: tap_tx,
            rx: Arc::new(Mutex::new(tap_rx)),
        };

        let peer_bus = Self {
            tx: peer_tx,
            rx: Arc::new(Mutex::new(peer_rx)),
        };

        (tap_bus, peer_bus)
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(*frame).map_err(|_| ())?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<CanFrame, Self::Error> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(())
    }
}
