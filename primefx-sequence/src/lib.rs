//! C1 — Sequence Store.
//!
//! Durable per-session sequence counters plus the client request-id and
//! client order-id allocators, serialized under a single mutex.

pub mod error;
pub mod role;
pub mod store;

pub use error::SequenceError;
pub use role::SessionRole;
pub use store::SequenceStore;
