// StepScale core: event plumbing between BLE callbacks and the sampling loop.
//
// Callbacks run on the BLE host task; the loop runs on its own thread. Two
// single-producer/single-consumer channels carry the events across and are
// drained once per tick, so a decision sees at most one tick of staleness.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::link::LinkEvent;

/// Producer half, cloned into each link-layer callback.
#[derive(Debug, Clone)]
pub struct EventSender {
    link_tx: Sender<LinkEvent>,
    write_tx: Sender<Vec<u8>>,
}

impl EventSender {
    pub fn link(&self, event: LinkEvent) {
        // Receiver gone means the loop has shut down; nothing to tell.
        let _ = self.link_tx.send(event);
    }

    pub fn write(&self, payload: &[u8]) {
        let _ = self.write_tx.send(payload.to_vec());
    }
}

/// Consumer half, owned by the sampling loop.
#[derive(Debug)]
pub struct EventInbox {
    link_rx: Receiver<LinkEvent>,
    write_rx: Receiver<Vec<u8>>,
}

impl EventInbox {
    /// Pending link events in arrival order.
    pub fn drain_link(&self) -> Vec<LinkEvent> {
        self.link_rx.try_iter().collect()
    }

    /// Pending command writes in arrival order.
    pub fn drain_writes(&self) -> Vec<Vec<u8>> {
        self.write_rx.try_iter().collect()
    }
}

pub fn channel() -> (EventSender, EventInbox) {
    let (link_tx, link_rx) = mpsc::channel();
    let (write_tx, write_rx) = mpsc::channel();
    (
        EventSender { link_tx, write_tx },
        EventInbox { link_rx, write_rx },
    )
}
