// StepScale core: connection gate, command latch and the wireless link seam.
//
// Both callback-driven flags are modelled as pure transitions. The BLE stack
// only forwards raw events; the sampling loop applies them once per tick.

use crate::config::MEASURE_COMMAND;

/// Notifications forwarded from the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
}

/// Side effects a link transition asks the loop to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Re-open discoverability so a new peer can attach.
    Advertise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn on_event(self, event: LinkEvent) -> (Self, Option<LinkAction>) {
        match event {
            LinkEvent::Connected => (ConnectionState::Connected, None),
            LinkEvent::Disconnected => (ConnectionState::Disconnected, Some(LinkAction::Advertise)),
        }
    }
}

/// One-shot "measure" request. A second request before the first is
/// serviced collapses into the same pending flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandLatch {
    pending: bool,
}

impl CommandLatch {
    pub fn is_set(&self) -> bool {
        self.pending
    }

    /// Exact, case-sensitive match; anything else leaves the latch untouched.
    pub fn on_write(self, payload: &[u8]) -> Self {
        if payload == MEASURE_COMMAND {
            Self { pending: true }
        } else {
            self
        }
    }

    pub fn clear(self) -> Self {
        Self { pending: false }
    }
}

/// Outbound half of the wireless service.
pub trait Link {
    /// Store `payload` in the reading characteristic and notify subscribers.
    /// Delivery is fire-and-forget; `Ok` only means the stack accepted it.
    fn publish(&mut self, payload: &[u8]) -> anyhow::Result<()>;

    fn start_advertising(&mut self) -> anyhow::Result<()>;
}
