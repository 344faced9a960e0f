use crate::{error::SequenceError, role::SessionRole};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Copy, Clone)]
struct SessionCounters {
    inbound_expected: u32,
    outbound_last: u32,
}

struct Inner {
    sessions: HashMap<SessionRole, SessionCounters>,
    next_request_id: u64,
    order_id_counter: u64,
    order_id_path: Option<PathBuf>,
}

/// C1 — durable monotonic counters for inbound/outbound FIX sequence numbers
/// and client request/order ids, serialized under a single mutex per
/// spec.md §4.1.
///
/// The client-request-id counter is ephemeral (resets to 1 at process
/// start); the client-order-id counter is durable, loaded from a small file
/// at construction and flushed on every increment.
pub struct SequenceStore {
    inner: Mutex<Inner>,
}

impl SequenceStore {
    /// Open a store with no durable backing — the order-id counter starts at
    /// 1 and increments are not persisted. Useful for tests.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_request_id: 1,
                order_id_counter: 1,
                order_id_path: None,
            }),
        }
    }

    /// Open a store whose order-id counter is persisted to `path`.
    ///
    /// If `path` does not exist or cannot be parsed, starts from 1 and logs a
    /// warning — corruption never prevents startup (spec.md §4.1 Failure).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let order_id_counter = match fs::read_to_string(&path) {
            Ok(contents) => match contents.trim().parse::<u64>() {
                Ok(n) => n,
                Err(_) => {
                    tracing::warn!(path = %path.display(), "order-id file unparseable, starting from 1");
                    1
                }
            },
            Err(_) => {
                tracing::warn!(path = %path.display(), "order-id file missing, starting from 1");
                1
            }
        };

        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_request_id: 1,
                order_id_counter,
                order_id_path: Some(path),
            }),
        }
    }

    /// Allocate the next client request id. Ephemeral: resets to 1 every
    /// process start, never persisted.
    pub fn next_request_id(&self) -> String {
        let mut inner = self.inner.lock();
        let id = inner.next_request_id;
        inner.next_request_id += 1;
        id.to_string()
    }

    /// Allocate the next client order id, persisting the new counter value.
    pub fn next_order_id(&self) -> Result<String, SequenceError> {
        let mut inner = self.inner.lock();
        let id = inner.order_id_counter;
        inner.order_id_counter += 1;
        let next = inner.order_id_counter;
        persist(inner.order_id_path.as_deref(), next)?;
        Ok(id.to_string())
    }

    /// The most recently allocated order id without allocating a new one.
    pub fn current_order_id(&self) -> String {
        let inner = self.inner.lock();
        (inner.order_id_counter.saturating_sub(1)).to_string()
    }

    /// Reset a session's expected-inbound sequence number, e.g. on a
    /// sequence-reset from the counterparty.
    pub fn reset_inbound(&self, role: SessionRole, n: u32) {
        let mut inner = self.inner.lock();
        inner.sessions.entry(role).or_default().inbound_expected = n;
    }

    /// Record that an inbound message with sequence number `n` was accepted,
    /// advancing the expected-next counter to `n + 1`.
    pub fn advance_inbound(&self, role: SessionRole, n: u32) {
        let mut inner = self.inner.lock();
        inner.sessions.entry(role).or_default().inbound_expected = n + 1;
    }

    pub fn inbound_expected(&self, role: SessionRole) -> u32 {
        let inner = self.inner.lock();
        inner.sessions.get(&role).map_or(1, |c| c.inbound_expected.max(1))
    }

    /// Increment and return a session's outbound sequence number. Assigned
    /// at dequeue-and-send time, not at enqueue time (spec.md §5).
    pub fn bump_outbound(&self, role: SessionRole) -> u32 {
        let mut inner = self.inner.lock();
        let counters = inner.sessions.entry(role).or_default();
        counters.outbound_last += 1;
        counters.outbound_last
    }

    pub fn outbound_last(&self, role: SessionRole) -> u32 {
        let inner = self.inner.lock();
        inner.sessions.get(&role).map_or(0, |c| c.outbound_last)
    }

    /// Roll a session's outbound sequence back to 1, e.g. on session reset.
    pub fn reset_outbound(&self, role: SessionRole) {
        let mut inner = self.inner.lock();
        inner.sessions.entry(role).or_default().outbound_last = 0;
    }
}

fn persist(path: Option<&Path>, value: u64) -> Result<(), SequenceError> {
    let Some(path) = path else {
        return Ok(());
    };

    let mut file = fs::File::create(path).map_err(|source| SequenceError::Persist {
        path: path.display().to_string(),
        source,
    })?;
    write!(file, "{value}\n").map_err(|source| SequenceError::Persist {
        path: path.display().to_string(),
        source,
    })?;
    file.sync_all().map_err(|source| SequenceError::Persist {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_counter_starts_at_one_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SequenceStore::open(dir.path().join("missing.txt"));
        assert_eq!(store.next_order_id().unwrap(), "1");
        assert_eq!(store.next_order_id().unwrap(), "2");
    }

    #[test]
    fn order_id_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_id.txt");

        {
            let store = SequenceStore::open(&path);
            for expected in 1..=5 {
                assert_eq!(store.next_order_id().unwrap(), expected.to_string());
            }
        }

        // S6 — reconnect preserves the order-id counter across restarts.
        let store = SequenceStore::open(&path);
        assert_eq!(store.next_order_id().unwrap(), "6");
    }

    #[test]
    fn corrupted_order_id_file_falls_back_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_id.txt");
        fs::write(&path, "not-a-number").unwrap();

        let store = SequenceStore::open(&path);
        assert_eq!(store.next_order_id().unwrap(), "1");
    }

    #[test]
    fn outbound_sequence_is_strictly_monotonic() {
        let store = SequenceStore::in_memory();
        let seqs: Vec<_> = (0..5).map(|_| store.bump_outbound(SessionRole::Order)).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn reset_outbound_rolls_back_to_zero() {
        let store = SequenceStore::in_memory();
        store.bump_outbound(SessionRole::Order);
        store.bump_outbound(SessionRole::Order);
        store.reset_outbound(SessionRole::Order);
        assert_eq!(store.bump_outbound(SessionRole::Order), 1);
    }

    #[test]
    fn request_id_counter_is_ephemeral_per_store() {
        let store = SequenceStore::in_memory();
        assert_eq!(store.next_request_id(), "1");
        assert_eq!(store.next_request_id(), "2");
    }
}
