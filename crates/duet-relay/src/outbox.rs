//! Outbound events collected during one state mutation and handed to the
//! connections, in order, before the state lock is released.

use duet_common::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::protocol::ServerEvent;
use crate::registry::Registry;

pub struct Delivery {
    pub to: Handle,
    pub event: ServerEvent,
    outbox: mpsc::Sender<ServerEvent>,
}

#[derive(Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    /// Queue `event` for `to`. Returns false if `to` is not registered.
    pub fn push(&mut self, registry: &Registry, to: &Handle, event: ServerEvent) -> bool {
        let Some(outbox) = registry.outbox(to) else {
            debug!(handle = %to, "Dropping event for unregistered handle");
            return false;
        };
        self.deliveries.push(Delivery {
            to: to.clone(),
            event,
            outbox: outbox.clone(),
        });
        true
    }

    #[cfg(test)]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Hand every event to its connection without waiting. A full outbox
    /// drops the event; a closed one means the peer is already gone.
    pub fn dispatch(self) {
        for delivery in self.deliveries {
            match delivery.outbox.try_send(delivery.event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(handle = %delivery.to, "Outbox full, dropping event");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(handle = %delivery.to, "Outbox closed");
                }
            }
        }
    }
}
