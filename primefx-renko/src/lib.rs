//! C7 — Renko Aggregator.
//!
//! Converts a per-symbol tick stream into a stream of fixed-size Renko
//! bricks, independent of wall-clock time (spec.md §3 / §4.7).

pub mod aggregator;
pub mod brick;

pub use aggregator::RenkoAggregator;
pub use brick::{Direction, RenkoBrick};
