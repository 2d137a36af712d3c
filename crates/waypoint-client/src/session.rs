//! Session-owned player state.
//!
//! Created once at login and shared (`Arc<Session>`) across every in-flight
//! call. The RPC core mutates the fields below but does not own the session
//! lifecycle. Mutation sites are limited to: credential (builder/dispatcher),
//! inventory + timestamp (inventory mutators), settings + hash (settings
//! mutator), call markers (dispatcher).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use dashmap::DashMap;

use waypoint_proto::envelope::Position;
use waypoint_proto::messages::{InventoryDelta, InventoryItem};

use crate::auth::{AuthTicket, Credential};

/// Current unix time in milliseconds.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Settings object plus the content hash the server keyed it with.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub value: serde_json::Value,
    pub hash: String,
}

pub struct Session {
    position: RwLock<Position>,
    credential: RwLock<Credential>,

    inventory: DashMap<u64, InventoryItem>,
    inventory_timestamp_ms: AtomicI64,

    settings: RwLock<Option<SettingsState>>,

    /// Unix ms of the last completed call; 0 until the first call lands.
    last_call_ms: AtomicI64,
    /// Position at which the last map fetch was issued.
    last_map_fetch: RwLock<Option<Position>>,
}

impl Session {
    pub fn new(position: Position, token: Bytes) -> Self {
        Self {
            position: RwLock::new(position),
            credential: RwLock::new(Credential::new(token)),
            inventory: DashMap::new(),
            inventory_timestamp_ms: AtomicI64::new(0),
            settings: RwLock::new(None),
            last_call_ms: AtomicI64::new(0),
            last_map_fetch: RwLock::new(None),
        }
    }

    // ---- position

    pub fn position(&self) -> Position {
        match self.position.read() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_position(&self, pos: Position) {
        match self.position.write() {
            Ok(mut g) => *g = pos,
            Err(poisoned) => *poisoned.into_inner() = pos,
        }
    }

    // ---- credential

    pub fn credential(&self) -> Credential {
        match self.credential.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_token(&self, token: Bytes) {
        self.with_credential(|c| c.token = token);
    }

    /// Install a refreshed ticket, superseding the current one.
    pub fn install_ticket(&self, ticket: AuthTicket) {
        self.with_credential(|c| c.ticket = Some(ticket));
    }

    /// Drop the current ticket so the next envelope falls back to the token.
    pub fn expire_ticket(&self) {
        self.with_credential(|c| c.ticket = None);
    }

    fn with_credential(&self, f: impl FnOnce(&mut Credential)) {
        match self.credential.write() {
            Ok(mut g) => f(&mut g),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    // ---- inventory

    pub fn inventory_timestamp_ms(&self) -> i64 {
        self.inventory_timestamp_ms.load(Ordering::Acquire)
    }

    pub fn inventory_len(&self) -> usize {
        self.inventory.len()
    }

    pub fn inventory_item(&self, id: u64) -> Option<InventoryItem> {
        self.inventory.get(&id).map(|e| e.value().clone())
    }

    /// Merge a server-pushed delta. A delta older than the stored timestamp
    /// is discarded; otherwise the timestamp advances and the included items
    /// replace their stored versions. Returns whether the delta was applied.
    pub fn apply_inventory_delta(&self, delta: InventoryDelta) -> bool {
        // Single atomic advance: concurrent routing of two deltas must never
        // let the older timestamp win.
        let prior = self
            .inventory_timestamp_ms
            .fetch_max(delta.new_timestamp_ms, Ordering::AcqRel);
        if delta.new_timestamp_ms < prior {
            return false;
        }
        for item in delta.items {
            self.inventory.insert(item.id, item);
        }
        true
    }

    pub fn remove_inventory_item(&self, id: u64) -> bool {
        self.inventory.remove(&id).is_some()
    }

    // ---- settings

    pub fn settings(&self) -> Option<SettingsState> {
        match self.settings.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn settings_hash(&self) -> Option<String> {
        self.settings().map(|s| s.hash)
    }

    pub fn replace_settings(&self, state: SettingsState) {
        match self.settings.write() {
            Ok(mut g) => *g = Some(state),
            Err(poisoned) => *poisoned.into_inner() = Some(state),
        }
    }

    // ---- call markers

    pub fn last_call_ms(&self) -> i64 {
        self.last_call_ms.load(Ordering::Acquire)
    }

    pub fn mark_call(&self, now_ms: i64) {
        self.last_call_ms.store(now_ms, Ordering::Release);
    }

    pub fn last_map_fetch(&self) -> Option<Position> {
        match self.last_map_fetch.read() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn mark_map_fetch(&self, pos: Position) {
        match self.last_map_fetch.write() {
            Ok(mut g) => *g = Some(pos),
            Err(poisoned) => *poisoned.into_inner() = Some(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            Position {
                latitude: 0.0,
                longitude: 0.0,
                altitude: 0.0,
                accuracy: 10.0,
            },
            Bytes::from_static(b"token"),
        )
    }

    fn item(id: u64, count: u32) -> InventoryItem {
        InventoryItem {
            id,
            kind: "ball".into(),
            count,
        }
    }

    #[test]
    fn stale_delta_is_discarded() {
        let s = session();
        assert!(s.apply_inventory_delta(InventoryDelta {
            new_timestamp_ms: 100,
            items: vec![item(1, 5)],
        }));
        assert!(!s.apply_inventory_delta(InventoryDelta {
            new_timestamp_ms: 99,
            items: vec![item(1, 0)],
        }));
        assert_eq!(s.inventory_timestamp_ms(), 100);
        assert_eq!(s.inventory_item(1).map(|i| i.count), Some(5));
    }

    #[test]
    fn equal_timestamp_delta_still_merges() {
        let s = session();
        s.apply_inventory_delta(InventoryDelta {
            new_timestamp_ms: 100,
            items: vec![item(1, 5)],
        });
        assert!(s.apply_inventory_delta(InventoryDelta {
            new_timestamp_ms: 100,
            items: vec![item(2, 3)],
        }));
        assert_eq!(s.inventory_len(), 2);
    }

    #[test]
    fn concurrent_deltas_never_regress_timestamp() {
        let s = std::sync::Arc::new(session());
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let s = std::sync::Arc::clone(&s);
                std::thread::spawn(move || {
                    for ts in [n * 10, n * 10 + 5, n] {
                        s.apply_inventory_delta(InventoryDelta {
                            new_timestamp_ms: ts,
                            items: vec![],
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(s.inventory_timestamp_ms(), 85);
    }

    #[test]
    fn ticket_install_and_expire() {
        let s = session();
        s.install_ticket(AuthTicket {
            data: Bytes::from_static(b"t"),
            expires_ms: i64::MAX,
        });
        assert!(s.credential().live_ticket(now_ms()).is_some());
        s.expire_ticket();
        assert!(s.credential().live_ticket(now_ms()).is_none());
    }
}
