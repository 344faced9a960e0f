use crate::{account::Account, error::CacheError, position::Position};
use parking_lot::RwLock;
use primefx_instrument::{Instrument, Tick};
use std::collections::{HashMap, HashSet};

/// C6 — State Cache.
///
/// Four independently-locked mappings plus a subscription set and a broker
/// parameter dictionary, per spec.md §4.6. Read operations take a shared
/// lock; mutations take an exclusive lock scoped to a single map, never
/// spanning two maps at once and never held across a call into another
/// component (spec.md §5).
#[derive(Default)]
pub struct StateCache {
    instruments: RwLock<HashMap<String, Instrument>>,
    latest_tick: RwLock<HashMap<String, Tick>>,
    positions: RwLock<HashMap<String, Position>>,
    accounts: RwLock<HashMap<String, Account>>,
    subscriptions: RwLock<HashSet<String>>,
    parameters: RwLock<HashMap<String, String>>,
    trading_desk_open: RwLock<bool>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    // --- instruments ---------------------------------------------------

    /// Insert or replace an instrument's static metadata. Instruments are
    /// created once from the broker's security list (spec.md §3); a later
    /// insert for the same symbol overwrites, matching a security-list
    /// refresh.
    pub fn insert_instrument(&self, instrument: Instrument) {
        self.instruments
            .write()
            .insert(instrument.symbol.to_string(), instrument);
    }

    pub fn instrument(&self, symbol: &str) -> Option<Instrument> {
        self.instruments.read().get(symbol).cloned()
    }

    pub fn set_trading_enabled(&self, symbol: &str, enabled: bool) -> Result<(), CacheError> {
        let mut instruments = self.instruments.write();
        match instruments.get_mut(symbol) {
            Some(instrument) => {
                instrument.trading_enabled = enabled;
                Ok(())
            }
            None => Err(CacheError::UnknownInstrument(symbol.into())),
        }
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.read().len()
    }

    // --- ticks -----------------------------------------------------------

    /// Record a new tick: updates the O(1) latest-tick map and pushes onto
    /// the owning instrument's bounded recent-tick ring.
    pub fn record_tick(&self, tick: Tick) {
        if let Some(instrument) = self.instruments.write().get_mut(tick.symbol.as_str()) {
            instrument.push_tick(tick.clone());
        }
        self.latest_tick.write().insert(tick.symbol.to_string(), tick);
    }

    pub fn latest_tick(&self, symbol: &str) -> Option<Tick> {
        self.latest_tick.read().get(symbol).cloned()
    }

    // --- positions ---------------------------------------------------------

    /// Insert a newly-observed position. Ignores (and logs) an insert for a
    /// position id already present — the broker is authoritative and
    /// duplicate inserts are a business error, not a cache-level panic
    /// (spec.md §7).
    pub fn insert_position(&self, position: Position) -> Result<(), CacheError> {
        let mut positions = self.positions.write();
        if positions.contains_key(position.position_id.as_str()) {
            let id = position.position_id.clone();
            tracing::warn!(position_id = %id, "duplicate position id on insert, ignoring");
            return Err(CacheError::DuplicatePosition(id));
        }
        positions.insert(position.position_id.to_string(), position);
        Ok(())
    }

    pub fn position(&self, position_id: &str) -> Option<Position> {
        self.positions.read().get(position_id).cloned()
    }

    pub fn remove_position(&self, position_id: &str) -> Option<Position> {
        self.positions.write().remove(position_id)
    }

    /// Apply `f` to the position with `position_id`. Rejected (cache
    /// unchanged) if the id is unknown — the caller (C5) is expected to
    /// surface this as a warning rather than create the position
    /// speculatively (spec.md §3 Invariants).
    pub fn update_position<F>(&self, position_id: &str, f: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut Position),
    {
        let mut positions = self.positions.write();
        match positions.get_mut(position_id) {
            Some(position) => {
                f(position);
                Ok(())
            }
            None => Err(CacheError::UnknownPosition(position_id.into())),
        }
    }

    pub fn positions_for_symbol(&self, symbol: &str) -> Vec<Position> {
        self.positions
            .read()
            .values()
            .filter(|p| p.symbol == symbol)
            .cloned()
            .collect()
    }

    pub fn positions_for_account(&self, account_id: &str) -> Vec<Position> {
        self.positions
            .read()
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect()
    }

    pub fn clear_positions_for_account(&self, account_id: &str) {
        self.positions.write().retain(|_, p| p.account_id != account_id);
    }

    pub fn position_count(&self) -> usize {
        self.positions.read().len()
    }

    // --- accounts ------------------------------------------------------

    /// Insert a brand new account, or merge `account`'s fields into an
    /// existing one (a `CollateralReport` refresh, e.g.).
    pub fn upsert_account(&self, account: Account) {
        self.accounts
            .write()
            .insert(account.account_id.to_string(), account);
    }

    pub fn account(&self, account_id: &str) -> Option<Account> {
        self.accounts.read().get(account_id).cloned()
    }

    pub fn update_account<F>(&self, account_id: &str, f: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut Account),
    {
        let mut accounts = self.accounts.write();
        match accounts.get_mut(account_id) {
            Some(account) => {
                f(account);
                Ok(())
            }
            None => Err(CacheError::UnknownAccount(account_id.into())),
        }
    }

    /// Recompute and store an account's `equity`/`free_margin`/`margin_ratio`
    /// from the live sum of its open positions' P&L (spec.md §4.5 step 4).
    pub fn refresh_account_derived(&self, account_id: &str) -> Result<(), CacheError> {
        let pnl_sum: rust_decimal::Decimal = self
            .positions_for_account(account_id)
            .iter()
            .map(|p| p.pnl)
            .sum();
        self.update_account(account_id, |account| account.refresh_derived(pnl_sum))
    }

    // --- subscriptions ---------------------------------------------------

    /// Returns `true` if `symbol` was not already subscribed.
    pub fn subscribe(&self, symbol: &str) -> bool {
        self.subscriptions.write().insert(symbol.to_string())
    }

    pub fn unsubscribe(&self, symbol: &str) {
        self.subscriptions.write().remove(symbol);
    }

    pub fn is_subscribed(&self, symbol: &str) -> bool {
        self.subscriptions.read().contains(symbol)
    }

    // --- broker parameters -----------------------------------------------

    pub fn set_parameter(&self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.write().insert(name.into(), value.into());
    }

    pub fn parameter(&self, name: &str) -> Option<String> {
        self.parameters.read().get(name).cloned()
    }

    pub fn set_trading_desk_open(&self, open: bool) {
        *self.trading_desk_open.write() = open;
    }

    pub fn is_trading_desk_open(&self) -> bool {
        *self.trading_desk_open.read()
    }

    /// Pure, read-only: identify the counter-pair instrument used to convert
    /// `symbol`'s P&L into `account_currency` (spec.md §4.6).
    pub fn counter_pair(&self, symbol: &str, account_currency: &str) -> Option<smol_str::SmolStr> {
        primefx_instrument::counter_pair(symbol, account_currency)
    }
}
