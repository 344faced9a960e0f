//! Instrument and Tick data model shared across the PrimeFX engine.
//!
//! This crate owns the immutable-once-created [`Instrument`] metadata and the
//! append-only [`Tick`] stream attached to it. Positions, accounts and the
//! fine-grained-locked cache that owns both of these live in `primefx-cache`.

pub mod counter_pair;
pub mod error;
pub mod instrument;
pub mod side;
pub mod tick;

pub use counter_pair::counter_pair;
pub use error::InstrumentError;
pub use instrument::{Instrument, ProductClass};
pub use side::Side;
pub use tick::Tick;
