use crate::synchronizer::{AcSynchronizer, SyncAction};

#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    connected: bool,
    ever_connected: bool,
    reconnects: u64,
    dropped_publishes: u64,
    retransmit_on_reconnect: bool,
}

impl ConnectivityMonitor {
    pub fn new(retransmit_on_reconnect: bool) -> Self {
        Self {
            connected: false,
            ever_connected: false,
            reconnects: 0,
            dropped_publishes: 0,
            retransmit_on_reconnect,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    pub fn dropped_publishes(&self) -> u64 {
        self.dropped_publishes
    }

    /// Marks the link up and returns the actions needed to resynchronize.
    ///
    /// The full status is always republished, whether or not it changed while
    /// offline. IR retransmission only happens on a genuine reconnect, never on
    /// the first connection after boot.
    pub fn on_connected(&mut self, sync: &AcSynchronizer) -> Vec<SyncAction> {
        let is_reconnect = self.ever_connected;
        if is_reconnect {
            self.reconnects = self.reconnects.saturating_add(1);
        }
        self.connected = true;
        self.ever_connected = true;

        sync.resync_actions(is_reconnect && self.retransmit_on_reconnect)
    }

    pub fn on_disconnected(&mut self) -> bool {
        std::mem::replace(&mut self.connected, false)
    }

    pub fn note_dropped(&mut self) {
        self.dropped_publishes = self.dropped_publishes.saturating_add(1);
    }
}
