use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEvent {
    pub event: String,
    pub payload: JsonValue,
}

impl RealtimeEvent {
    pub fn new(event: &str, payload: impl Serialize) -> Self {
        Self {
            event: event.to_string(),
            payload: serde_json::to_value(payload).unwrap_or_else(|_| json!(null)),
        }
    }
}

/// Per-user broadcast rooms. Delivery is best effort: events for a user with
/// no open socket are dropped, and a lagging socket skips what it missed.
#[derive(Clone, Default)]
pub struct RealtimeHub {
    rooms: Arc<RwLock<HashMap<Uuid, broadcast::Sender<RealtimeEvent>>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<RealtimeEvent> {
        let mut rooms = self.rooms.write().unwrap_or_else(|p| p.into_inner());
        rooms
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Returns how many live sockets received the event.
    pub fn publish(&self, user_id: Uuid, event: RealtimeEvent) -> usize {
        let sender = {
            let rooms = self.rooms.read().unwrap_or_else(|p| p.into_inner());
            rooms.get(&user_id).cloned()
        };
        let Some(sender) = sender else { return 0 };

        match sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                self.prune(user_id);
                0
            }
        }
    }

    /// Drops the room once its last subscriber has gone.
    pub fn prune(&self, user_id: Uuid) {
        let mut rooms = self.rooms.write().unwrap_or_else(|p| p.into_inner());
        if rooms
            .get(&user_id)
            .map(|s| s.receiver_count() == 0)
            .unwrap_or(false)
        {
            rooms.remove(&user_id);
        }
    }

    pub fn online_users(&self) -> usize {
        let rooms = self.rooms.read().unwrap_or_else(|p| p.into_inner());
        rooms.values().filter(|s| s.receiver_count() > 0).count()
    }
}
