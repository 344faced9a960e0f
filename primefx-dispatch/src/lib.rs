//! C5 — Inbound Dispatcher.
//!
//! Cracks decoded FIX messages by `MsgType`, applies them to the state
//! cache, and computes the per-tick P&L recompute steps (spec.md §4.5).

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod pending;
pub mod pnl;

pub use dispatcher::{AccountDefaults, InboundDispatcher};
pub use error::DispatchError;
pub use events::{DispatchEvent, DispatchOutcome};
pub use pending::{PendingEvents, PendingUpdate};
