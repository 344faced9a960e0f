use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Unknown-position-event TTL (spec.md §5 Timeouts).
pub const PENDING_EVENT_TTL_SECS: i64 = 60;

/// An `ExecutionReport::OrderStatus` field update that arrived before its
/// parent position existed in the cache (spec.md §4.5: "Any execution
/// report for a position that is not in the cache is retained as a pending
/// event with a bounded TTL").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingUpdate {
    StopPrice(Decimal),
    TakeProfitPrice(Decimal),
}

struct Entry {
    update: PendingUpdate,
    recorded_at: DateTime<Utc>,
}

/// Holds execution-report updates for position ids not yet known to the
/// cache, keyed by `FXCM_POS_ID`, until either the parent position appears
/// ([`PendingEvents::take_ready`]) or the TTL expires
/// ([`PendingEvents::sweep_expired`]).
#[derive(Default)]
pub struct PendingEvents {
    entries: Mutex<HashMap<SmolStr, Vec<Entry>>>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&self, position_id: SmolStr, update: PendingUpdate, now: DateTime<Utc>) {
        self.entries
            .lock()
            .entry(position_id)
            .or_default()
            .push(Entry { update, recorded_at: now });
    }

    /// Remove and return every pending update recorded for `position_id`,
    /// regardless of age — called immediately after the position is
    /// inserted into the cache so deferred SL/TP attachments can replay.
    pub fn take_ready(&self, position_id: &str) -> Vec<PendingUpdate> {
        self.entries
            .lock()
            .remove(position_id)
            .map(|entries| entries.into_iter().map(|e| e.update).collect())
            .unwrap_or_default()
    }

    /// Drop every entry older than the TTL, logging a warning per dropped
    /// position id. Returns the number of position ids dropped.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = Duration::seconds(PENDING_EVENT_TTL_SECS);
        let mut entries = self.entries.lock();
        let expired: Vec<SmolStr> = entries
            .iter()
            .filter(|(_, v)| v.iter().all(|e| now - e.recorded_at >= ttl))
            .map(|(k, _)| k.clone())
            .collect();

        for position_id in &expired {
            tracing::warn!(%position_id, "pending execution report expired with no parent position");
            entries.remove(position_id);
        }
        expired.len()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_ready_drains_all_updates_for_id() {
        let pending = PendingEvents::new();
        let now = Utc::now();
        pending.defer(SmolStr::new("P1"), PendingUpdate::StopPrice(Decimal::ONE), now);
        pending.defer(SmolStr::new("P1"), PendingUpdate::TakeProfitPrice(Decimal::TWO), now);

        let updates = pending.take_ready("P1");
        assert_eq!(updates.len(), 2);
        assert_eq!(pending.pending_count(), 0);
    }

    #[test]
    fn sweep_expired_drops_only_stale_entries() {
        let pending = PendingEvents::new();
        let old = Utc::now() - Duration::seconds(61);
        let fresh = Utc::now();
        pending.defer(SmolStr::new("STALE"), PendingUpdate::StopPrice(Decimal::ONE), old);
        pending.defer(SmolStr::new("FRESH"), PendingUpdate::StopPrice(Decimal::ONE), fresh);

        let dropped = pending.sweep_expired(Utc::now());
        assert_eq!(dropped, 1);
        assert_eq!(pending.pending_count(), 1);
        assert!(pending.take_ready("FRESH").len() == 1);
    }
}
