use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{error, info};

use crate::{
    common::{
        errors::PlayerError,
        types::{ContextId, SessionId},
    },
    engine::EngineFactory,
    player::Player,
    protocol::OutgoingMessage,
};

const EVENT_QUEUE_CAP: usize = 1000;

/// The set of live players owned by one control-plane connection, plus the
/// outbound event pipe toward that connection.
///
/// The registry key-partitions all player state: operations on different
/// session ids never contend.
pub struct SessionContext {
    context_id: ContextId,
    engines: Arc<dyn EngineFactory>,
    players: DashMap<SessionId, Arc<Player>>,
    /// Sender for serialized outgoing events. Swapped on resume.
    sender: Mutex<flume::Sender<String>>,
    /// True while the control-plane connection is gone but the context is
    /// kept alive for resume.
    paused: AtomicBool,
    /// Events queued while paused.
    event_queue: Mutex<Vec<String>>,
}

impl SessionContext {
    pub fn new(
        context_id: ContextId,
        engines: Arc<dyn EngineFactory>,
        sender: flume::Sender<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            context_id,
            engines,
            players: DashMap::new(),
            sender: Mutex::new(sender),
            paused: AtomicBool::new(false),
            event_queue: Mutex::new(Vec::new()),
        })
    }

    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    pub(crate) fn engines(&self) -> &Arc<dyn EngineFactory> {
        &self.engines
    }

    /// Returns the player for `session_id`, creating it on first use.
    pub fn create(self: &Arc<Self>, session_id: SessionId) -> Arc<Player> {
        self.players
            .entry(session_id)
            .or_insert_with(|| Player::new(self, session_id))
            .clone()
    }

    pub fn get(&self, session_id: SessionId) -> Option<Arc<Player>> {
        self.players.get(&session_id).map(|p| p.clone())
    }

    /// Snapshot of all live players.
    pub fn all_players(&self) -> Vec<Arc<Player>> {
        self.players.iter().map(|e| e.value().clone()).collect()
    }

    /// Removes and tears down the player for `session_id`.
    ///
    /// The registry entry goes first, so a concurrent second call finds
    /// nothing to do and a failed engine close cannot leave a half
    /// registered player behind.
    pub fn destroy(&self, session_id: SessionId) -> Result<(), PlayerError> {
        match self.players.remove(&session_id) {
            Some((_, player)) => {
                info!("Destroying player {} in context {}", session_id, self.context_id);
                player.destroy()
            }
            None => Ok(()),
        }
    }

    /// Serializes and sends an event toward the control-plane client. While
    /// paused, the event is buffered for replay instead.
    pub fn send(&self, message: &OutgoingMessage) {
        if let Ok(json) = serde_json::to_string(message) {
            self.send_json(json);
        }
    }

    fn send_json(&self, json: String) {
        if self.paused.load(Ordering::Acquire) {
            let mut queue = self.event_queue.lock();
            if queue.len() >= EVENT_QUEUE_CAP {
                queue.remove(0); // Drop oldest event if queue is too large
            }
            queue.push(json);
        } else {
            let _ = self.sender.lock().send(json);
        }
    }

    pub fn is_global_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_global_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Installs a fresh sender after a control-plane reconnect.
    pub fn swap_sender(&self, sender: flume::Sender<String>) {
        *self.sender.lock() = sender;
    }

    /// Drains the events buffered while paused, in arrival order.
    pub fn drain_queued(&self) -> Vec<String> {
        std::mem::take(&mut *self.event_queue.lock())
    }

    /// Tears down every player. Per-player failures are logged and never
    /// abort the rest of the teardown.
    pub fn shutdown(&self) {
        if self.players.is_empty() {
            return;
        }
        info!("Shutting down session context {}", self.context_id);
        let ids: Vec<SessionId> = self.players.iter().map(|e| *e.key()).collect();
        for session_id in ids {
            if let Err(e) = self.destroy(session_id) {
                error!("Failed destroying player {}: {}", session_id, e);
            }
        }
    }
}

impl Drop for SessionContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
