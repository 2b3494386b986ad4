//! Notification ledger.
//!
//! Append-only, newest-first list of alerts with read/unread tracking
//! and an aggregate unread count. Entries are created by the tick
//! pipeline (price alerts) and the weather simulator; only the `read`
//! flag ever mutates after creation; nothing is ever deleted, so the
//! ledger grows for the lifetime of the process.
//!
//! Invariant: `unread_count == items.iter().filter(|n| !n.read).count()`
//! after every mutation. Each mutation is a single synchronous
//! read-modify-write; the store serializes access behind one lock.

use serde::{Deserialize, Serialize};

/// Category of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAlert,
    WeatherAlert,
}

/// A single user-visible alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique, generation-ordered id (time-derived decimal string).
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    /// Creation timestamp (Unix ms).
    pub created_at_ms: u64,
    pub read: bool,
}

/// Ordered alert ledger, newest first.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    /// Entries, newest at index 0.
    items: Vec<Notification>,
    /// Cached count of entries with `read == false`.
    unread_count: usize,
    /// Numeric value of the last issued id, for monotonicity when the
    /// clock stalls or ticks twice within a millisecond.
    last_id: u64,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new unread entry at the front and return its id.
    ///
    /// The id is `max(now_ms, last_id + 1)` so ids remain unique and
    /// strictly increasing even under a frozen test clock.
    pub fn insert(&mut self, kind: NotificationKind, message: String, now_ms: u64) -> String {
        let id_num = now_ms.max(self.last_id + 1);
        self.last_id = id_num;

        let id = id_num.to_string();
        self.items.insert(
            0,
            Notification {
                id: id.clone(),
                kind,
                message,
                created_at_ms: now_ms,
                read: false,
            },
        );
        self.unread_count += 1;

        debug_assert!(self.invariant_holds());
        id
    }

    /// Mark one entry read. Idempotent: unknown or already-read ids
    /// leave the ledger (and the unread count) untouched.
    ///
    /// Returns whether an entry transitioned from unread to read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if item.read {
            return false;
        }
        item.read = true;
        self.unread_count -= 1;

        debug_assert!(self.invariant_holds());
        true
    }

    /// Mark every entry read and reset the unread count.
    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
        self.unread_count = 0;

        debug_assert!(self.invariant_holds());
    }

    /// Snapshot of all entries, newest first.
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the unread-count invariant. Exposed for tests; mutation
    /// paths assert it in debug builds.
    pub fn invariant_holds(&self) -> bool {
        self.unread_count == self.items.iter().filter(|n| !n.read).count()
    }
}
